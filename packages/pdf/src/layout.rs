//! Layout-preserving page text.
//!
//! Plain PDF text extraction collapses every horizontal gap into one space
//! and puts blank lines between rows, which loses table columns. Instead,
//! [`PageCollector`] records where every glyph sits on the page and
//! [`render`] lays each page out on a character grid: glyphs sharing a
//! baseline form one line, glyphs of the same word are joined, words are
//! separated by one space, and wider gaps become at least two spaces with
//! the next cell placed at a column proportional to its x position.

use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};

/// Horizontal gap, in multiples of the font size, above which two glyphs
/// belong to different words.
const WORD_GAP: f64 = 0.15;

/// Horizontal gap, in multiples of the font size, above which text starts
/// a new cell.
const CELL_GAP: f64 = 1.0;

/// Width of one rendered character column, in multiples of the median font
/// size. Smaller than any real glyph advance so text never runs into the
/// column of the next cell.
const COLUMN_WIDTH: f64 = 0.3;

/// Vertical distance, in multiples of the font size, within which glyphs
/// share a line.
const LINE_TOLERANCE: f64 = 0.5;

/// Vertical gap between lines, in multiples of the font size, above which
/// a blank line is emitted.
const BLOCK_GAP: f64 = 3.0;

/// One glyph positioned on the page. Coordinates are in points with the
/// origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Left edge.
    pub x: f64,
    /// Baseline, growing downwards.
    pub y: f64,
    /// Horizontal advance.
    pub width: f64,
    /// Effective font size.
    pub size: f64,
    /// Decoded text, usually a single character.
    pub text: String,
}

/// Collects the glyphs of every page passed through [`pdf_extract`].
#[derive(Debug, Default)]
pub struct PageCollector {
    pages: Vec<Vec<Glyph>>,
    current: Vec<Glyph>,
    page_height: f64,
}

impl PageCollector {
    /// Glyphs of every completed page, in page order.
    #[must_use]
    pub fn into_pages(self) -> Vec<Vec<Glyph>> {
        self.pages
    }
}

impl OutputDev for PageCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.page_height = media_box.ury - media_box.lly;
        self.current.clear();
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        self.pages.push(std::mem::take(&mut self.current));
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        if char.trim().is_empty() {
            return Ok(());
        }

        let scaled_x = font_size.mul_add(trm.m11, font_size * trm.m21);
        let scaled_y = font_size.mul_add(trm.m12, font_size * trm.m22);
        let mut size = (scaled_x * scaled_y).abs().sqrt();
        if size <= f64::EPSILON {
            size = font_size.abs();
        }

        self.current.push(Glyph {
            x: trm.m31,
            y: self.page_height - trm.m32,
            width: width * size,
            size,
            text: char.to_string(),
        });

        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Renders one page of glyphs as space-aligned text.
#[must_use]
pub fn render(glyphs: &[Glyph]) -> String {
    let column_width = (median_size(glyphs) * COLUMN_WIDTH).max(0.5);

    let mut out = String::new();
    let mut prev: Option<(f64, f64)> = None;

    for line in group_lines(glyphs) {
        let Some(first) = line.first() else {
            continue;
        };

        if let Some((prev_y, prev_size)) = prev {
            out.push('\n');
            if first.y - prev_y > BLOCK_GAP * prev_size.max(first.size) {
                out.push('\n');
            }
        }
        prev = Some((first.y, first.size));

        render_line(&line, column_width, &mut out);
    }

    out
}

/// Groups glyphs into lines, top to bottom, each sorted left to right.
fn group_lines(glyphs: &[Glyph]) -> Vec<Vec<&Glyph>> {
    let mut sorted: Vec<&Glyph> = glyphs.iter().collect();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<&Glyph>> = Vec::new();
    let mut line_y = f64::NAN;

    for glyph in sorted {
        match lines.last_mut() {
            Some(line) if (glyph.y - line_y).abs() <= LINE_TOLERANCE * glyph.size => {
                line.push(glyph);
            }
            _ => {
                line_y = glyph.y;
                lines.push(vec![glyph]);
            }
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    lines
}

fn render_line(line: &[&Glyph], column_width: f64, out: &mut String) {
    let mut len = 0;
    let mut prev_end: Option<f64> = None;

    for glyph in line {
        match prev_end {
            None => pad_to(out, &mut len, column(glyph.x, column_width)),
            Some(end) => {
                let gap = glyph.x - end;
                if gap > CELL_GAP * glyph.size {
                    let target = column(glyph.x, column_width).max(len + 2);
                    pad_to(out, &mut len, target);
                } else if gap > WORD_GAP * glyph.size {
                    out.push(' ');
                    len += 1;
                }
            }
        }

        out.push_str(&glyph.text);
        len += glyph.text.chars().count();

        let end = glyph.x + glyph.width;
        prev_end = Some(prev_end.map_or(end, |e| e.max(end)));
    }
}

fn pad_to(out: &mut String, len: &mut usize, target: usize) {
    while *len < target {
        out.push(' ');
        *len += 1;
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn column(x: f64, column_width: f64) -> usize {
    (x.max(0.0) / column_width).round() as usize
}

fn median_size(glyphs: &[Glyph]) -> f64 {
    let mut sizes: Vec<f64> = glyphs.iter().map(|g| g.size).collect();
    if sizes.is_empty() {
        return 0.0;
    }
    sizes.sort_by(f64::total_cmp);
    sizes[sizes.len() / 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_table;

    /// Lays `text` out as glyphs of 0.5em advance starting at (`x`, `y`).
    fn word(x: f64, y: f64, text: &str) -> Vec<Glyph> {
        let size = 10.0;
        let mut glyphs = Vec::new();
        let mut cursor = x;
        for c in text.chars() {
            if c != ' ' {
                glyphs.push(Glyph {
                    x: cursor,
                    y,
                    width: 0.5 * size,
                    size,
                    text: c.to_string(),
                });
            }
            cursor += 0.5 * size;
        }
        glyphs
    }

    fn page(items: &[(f64, f64, &str)]) -> Vec<Glyph> {
        items
            .iter()
            .flat_map(|(x, y, text)| word(*x, *y, text))
            .collect()
    }

    #[test]
    fn words_on_one_baseline_keep_single_spaces() {
        let text = render(&page(&[(50.0, 100.0, "Patient Name : Jane Doe")]));
        assert_eq!(text.trim(), "Patient Name : Jane Doe");
    }

    #[test]
    fn distant_cells_are_separated_by_wide_gaps() {
        let text = render(&page(&[
            (50.0, 100.0, "Creatinine"),
            (200.0, 100.0, "1.2"),
            (300.0, 100.0, "mg/dL"),
        ]));

        assert_eq!(
            text.split_whitespace().collect::<Vec<_>>(),
            ["Creatinine", "1.2", "mg/dL"]
        );
        assert!(text.contains("Creatinine  "));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn rows_are_consecutive_lines_in_reading_order() {
        let text = render(&page(&[
            (50.0, 130.0, "Urea"),
            (50.0, 100.0, "Header"),
            (50.0, 115.0, "Creatinine"),
        ]));

        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        assert_eq!(lines, ["Header", "Creatinine", "Urea"]);
    }

    #[test]
    fn large_vertical_gap_inserts_blank_line() {
        let text = render(&page(&[(50.0, 100.0, "Top"), (50.0, 200.0, "Bottom")]));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn aligned_columns_become_a_detectable_table() {
        let text = render(&page(&[
            (200.0, 100.0, "Result"),
            (300.0, 100.0, "Units"),
            (50.0, 115.0, "Creatinine"),
            (200.0, 115.0, "1.2"),
            (300.0, 115.0, "mg/dL"),
            (50.0, 130.0, "Urea"),
            (200.0, 130.0, "30"),
            (300.0, 130.0, "mg/dL"),
        ]));

        let tables = text_table::detect(&[text]);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns(), ["Unnamed: 0", "Result", "Units"]);
        assert_eq!(tables[0].rows()[1]["Unnamed: 0"], "Urea");
        assert_eq!(tables[0].rows()[1]["Result"], "30");
    }

    #[test]
    fn empty_page_renders_empty() {
        assert_eq!(render(&[]), "");
    }
}
