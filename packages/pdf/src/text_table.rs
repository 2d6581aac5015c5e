//! Table detection over space-aligned PDF text.
//!
//! Lab reports lay their results out as space-aligned columns. A table is
//! a run of consecutive lines that each split into at least two cells,
//! where cells are separated by a tab or by two or more spaces. The first
//! line of the run is the header; its cell offsets become the column
//! boundaries, and every body cell lands in the column whose start is
//! nearest to it.
//!
//! When the body has cells left of the first header cell (a blank leading
//! header), an unlabeled column is prepended. Unlabeled columns are named
//! `Unnamed: <position>`, the way dataframe readers name them.

use std::collections::BTreeMap;

/// Prefix of the generated name for a column with a blank header.
pub const UNNAMED_PREFIX: &str = "Unnamed: ";

/// A table row keyed by column name. Empty cells are absent.
pub type Row = BTreeMap<String, String>;

/// A table detected in the PDF text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Creates a table from a column schema and rows.
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Column names in left-to-right order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Body rows in top-to-bottom order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns `true` if the schema contains `name`, regardless of whether
    /// any row has a value for it.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Returns the generated name for an unlabeled column at `position`.
#[must_use]
pub fn unnamed_column(position: usize) -> String {
    format!("{UNNAMED_PREFIX}{position}")
}

/// A non-empty run of text within a line and its character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    offset: usize,
    text: String,
}

/// Detects every table in `pages`, in page order.
#[must_use]
pub fn detect(pages: &[String]) -> Vec<Table> {
    let mut tables = Vec::new();

    for (page_idx, page) in pages.iter().enumerate() {
        let before = tables.len();
        let mut block: Vec<Vec<Cell>> = Vec::new();

        for line in page.lines() {
            let cells = split_cells(line);
            if cells.len() >= 2 {
                block.push(cells);
            } else {
                flush_block(&mut block, &mut tables);
            }
        }
        flush_block(&mut block, &mut tables);

        log::debug!(
            "Detected {} table(s) on page {}",
            tables.len() - before,
            page_idx + 1
        );
    }

    tables
}

/// Turns the accumulated block into a table if it has a header and at
/// least one body line, then clears it.
fn flush_block(block: &mut Vec<Vec<Cell>>, tables: &mut Vec<Table>) {
    if block.len() >= 2 {
        tables.push(build_table(block));
    }
    block.clear();
}

fn build_table(block: &[Vec<Cell>]) -> Table {
    let Some((header, body)) = block.split_first() else {
        return Table::default();
    };

    let first_header_offset = header.first().map_or(0, |c| c.offset);
    let has_unlabeled_lead = body
        .iter()
        .any(|row| row.first().is_some_and(|c| c.offset < first_header_offset));

    let mut starts = Vec::with_capacity(header.len() + 1);
    let mut labels: Vec<Option<&str>> = Vec::with_capacity(header.len() + 1);

    if has_unlabeled_lead {
        starts.push(0);
        labels.push(None);
    }
    for cell in header {
        starts.push(cell.offset);
        labels.push(Some(cell.text.as_str()));
    }

    let columns = column_names(&labels);

    let rows = body
        .iter()
        .map(|line| {
            let mut slots: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
            for cell in line {
                slots[nearest_column(&starts, cell.offset)].push(&cell.text);
            }

            columns
                .iter()
                .zip(slots)
                .filter(|(_, parts)| !parts.is_empty())
                .map(|(name, parts)| (name.clone(), parts.join(" ")))
                .collect::<Row>()
        })
        .collect();

    Table::new(columns, rows)
}

/// Names columns from their header labels. Blank labels become
/// `Unnamed: <position>`; repeated labels get a `.N` suffix.
fn column_names(labels: &[Option<&str>]) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();

    labels
        .iter()
        .enumerate()
        .map(|(position, label)| {
            let base = label.map_or_else(|| unnamed_column(position), str::to_string);
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

/// Index of the column start closest to `offset`; ties go to the left.
fn nearest_column(starts: &[usize], offset: usize) -> usize {
    starts
        .iter()
        .enumerate()
        .min_by_key(|(_, start)| start.abs_diff(offset))
        .map_or(0, |(idx, _)| idx)
}

/// Splits a line into cells separated by a tab or two or more spaces.
fn split_cells(line: &str) -> Vec<Cell> {
    let chars: Vec<char> = line.chars().collect();
    let mut cells = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        while i < chars.len() {
            let c = chars[i];
            let separates = match c {
                ' ' => chars.get(i + 1).is_some_and(|next| next.is_whitespace()),
                c => c.is_whitespace(),
            };
            if separates {
                break;
            }
            i += 1;
            if !c.is_whitespace() {
                end = i;
            }
        }

        cells.push(Cell {
            offset: start,
            text: chars[start..end].iter().collect(),
        });
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(lines: &[&str]) -> Vec<String> {
        vec![lines.join("\n")]
    }

    #[test]
    fn splits_on_wide_gaps_and_tabs() {
        let cells = split_cells("Reference Range   0.7 - 1.3\tmg/dL");
        let texts: Vec<&str> = cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Reference Range", "0.7 - 1.3", "mg/dL"]);
        assert_eq!(cells[1].offset, 18);
    }

    #[test]
    fn detects_table_with_unlabeled_leading_column() {
        let pages = page(&[
            "Patient Name : Jane Doe",
            "",
            "              Result    Units",
            "Creatinine    1.2       mg/dL",
            "Urea          30        mg/dL",
        ]);

        let tables = detect(&pages);
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        assert_eq!(table.columns(), ["Unnamed: 0", "Result", "Units"]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0]["Unnamed: 0"], "Creatinine");
        assert_eq!(table.rows()[0]["Result"], "1.2");
        assert_eq!(table.rows()[1]["Unnamed: 0"], "Urea");
        assert_eq!(table.rows()[1]["Units"], "mg/dL");
    }

    #[test]
    fn labeled_leading_column_keeps_its_name() {
        let pages = page(&[
            "Test          Result    Units",
            "Creatinine    1.2       mg/dL",
        ]);

        let tables = detect(&pages);
        assert_eq!(tables[0].columns(), ["Test", "Result", "Units"]);
        assert!(!tables[0].has_column("Unnamed: 0"));
    }

    #[test]
    fn empty_cells_are_absent_from_rows() {
        let pages = page(&[
            "              Result    Units",
            "Creatinine    1.2       mg/dL",
            "Comment                 mg/dL",
        ]);

        let table = &detect(&pages)[0];
        assert!(!table.rows()[1].contains_key("Result"));
        assert_eq!(table.rows()[1]["Unnamed: 0"], "Comment");
    }

    #[test]
    fn single_cell_lines_split_tables() {
        let pages = page(&[
            "              Result    Units",
            "Creatinine    1.2       mg/dL",
            "Lipid profile",
            "              Result    Units",
            "HDL           45        mg/dL",
        ]);

        assert_eq!(detect(&pages).len(), 2);
    }

    #[test]
    fn tables_are_collected_across_pages_in_order() {
        let pages = vec![
            "No tabular content here".to_string(),
            "          Result    Units\nSodium    140       mmol/L".to_string(),
            "          Result    Units\nPotassium  4.1      mmol/L".to_string(),
        ];

        let tables = detect(&pages);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows()[0]["Unnamed: 0"], "Sodium");
    }

    #[test]
    fn lone_header_is_not_a_table() {
        assert!(detect(&page(&["Result    Units", "", "Done"])).is_empty());
    }

    #[test]
    fn duplicate_header_labels_are_suffixed() {
        let names = column_names(&[None, Some("Result"), Some("Result")]);
        assert_eq!(names, vec!["Unnamed: 0", "Result", "Result.1"]);
    }
}
