//! Builders for small single-page PDFs used in tests.

use std::fmt::Write as _;

/// Text placed on a page: x and y in points from the bottom-left corner.
pub type TextItem<'a> = (f64, f64, &'a str);

/// A lab report with the patient fields and a results table whose first
/// column has no header.
pub const LAB_REPORT: &[TextItem<'static>] = &[
    (50.0, 740.0, "City Diagnostics Laboratory"),
    (50.0, 720.0, "Patient Name : Jane Doe"),
    (50.0, 705.0, "Age : 45"),
    (50.0, 690.0, "Preliminary date/time : 05-MAR-24 10:15:00 AM"),
    (200.0, 660.0, "Result"),
    (300.0, 660.0, "Units"),
    (50.0, 645.0, "Creatinine"),
    (200.0, 645.0, "1.2"),
    (300.0, 645.0, "mg/dL"),
    (50.0, 630.0, "Urea"),
    (200.0, 630.0, "30"),
    (300.0, 630.0, "mg/dL"),
];

/// Builds the bytes of a one-page Letter-size PDF that draws each item in
/// 10pt Helvetica.
#[must_use]
pub fn single_page_pdf(items: &[TextItem<'_>]) -> Vec<u8> {
    let mut content = String::new();
    for (x, y, text) in items {
        let _ = writeln!(
            content,
            "BT /F1 10 Tf {x:.2} {y:.2} Td ({}) Tj ET",
            escape(text)
        );
    }

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
         /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        let _ = write!(pdf, "{} 0 obj\n{body}\nendobj\n", idx + 1);
    }

    let xref = pdf.len();
    let _ = write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(pdf, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    );

    pdf.into_bytes()
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
