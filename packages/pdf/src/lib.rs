#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Lab report extraction pipeline.
//!
//! Turns an uploaded lab report PDF into a [`PatientRecord`]:
//!
//! 1. Glyph positions are collected with pure-Rust [`pdf_extract`] and
//!    each page is rendered as space-aligned text ([`layout`]).
//! 2. Patient name, age and test date/time are matched on the first page
//!    ([`fields`]).
//! 3. Space-aligned tables are detected across all pages ([`text_table`])
//!    and the first one is reduced to a test-label → result mapping
//!    ([`results`]).
//! 4. Both are merged into one flat record ([`normalize`]).
//!
//! The primary entry points are [`process_report`] and
//! [`process_report_file`].

pub mod fields;
pub mod layout;
pub mod normalize;
pub mod results;
pub mod text_table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::path::Path;

use nephro_coach_report_models::PatientRecord;

/// Errors from reading a PDF.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// The document has no pages to read patient fields from.
    #[error("PDF has no pages")]
    NoPages,

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from turning a lab report into a record.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No table was detected anywhere in the document.
    #[error("No tables found in the PDF")]
    NoTables,

    /// The first table's schema lacks a required column.
    #[error("'{0}' column not found in the table")]
    MissingColumn(String),

    /// The PDF itself could not be read.
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

/// Extracts the layout-preserving text of every page in a PDF held in
/// memory. See [`layout`].
///
/// # Errors
///
/// Returns [`PdfError::Extraction`] if the bytes are not a readable PDF.
pub fn extract_page_texts(bytes: &[u8]) -> Result<Vec<String>, PdfError> {
    let mut doc = pdf_extract::Document::load_mem(bytes)
        .map_err(|e| PdfError::Extraction(format!("failed to load PDF: {e}")))?;

    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| PdfError::Extraction(format!("failed to decrypt PDF: {e}")))?;
    }

    let mut collector = layout::PageCollector::default();
    pdf_extract::output_doc(&doc, &mut collector)
        .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

    let pages: Vec<String> = collector
        .into_pages()
        .iter()
        .map(|glyphs| layout::render(glyphs))
        .collect();

    log::debug!(
        "Extracted {} page(s), {} characters of text",
        pages.len(),
        pages.iter().map(String::len).sum::<usize>()
    );

    Ok(pages)
}

/// Runs field extraction, table extraction and normalization over
/// already-extracted page text.
///
/// # Errors
///
/// * [`PdfError::NoPages`] if `pages` is empty
/// * [`ExtractionError::NoTables`] if no table is detected
/// * [`ExtractionError::MissingColumn`] if the first table lacks the
///   `Result` column or the unlabeled index column
pub fn process_pages(pages: &[String]) -> Result<PatientRecord, ExtractionError> {
    let first_page = pages.first().ok_or(PdfError::NoPages)?;
    let patient = fields::extract(first_page);

    let tables = text_table::detect(pages);
    let Some(table) = tables.first() else {
        return Err(ExtractionError::NoTables);
    };

    let test_results = results::extract(table)?;

    Ok(normalize::normalize(patient, test_results))
}

/// Processes a lab report PDF held in memory.
///
/// # Errors
///
/// Returns [`ExtractionError`] if the PDF cannot be read or its content
/// does not yield a results table. See [`process_pages`].
pub fn process_report(bytes: &[u8]) -> Result<PatientRecord, ExtractionError> {
    let pages = extract_page_texts(bytes)?;
    let record = process_pages(&pages)?;

    log::info!(
        "Processed lab report with {} test result(s)",
        record.results().count()
    );

    Ok(record)
}

/// Reads and processes a lab report PDF from disk.
///
/// # Errors
///
/// Returns [`ExtractionError`] if the file cannot be read or processed.
pub fn process_report_file(path: &Path) -> Result<PatientRecord, ExtractionError> {
    let bytes = std::fs::read(path).map_err(PdfError::Io)?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    process_report(&bytes)
}
