//! Test-result mapping from a detected table.

use serde_json::{Map, Value};

use crate::ExtractionError;
use crate::text_table::{Row, Table};

/// Column holding each test's result value.
pub const RESULT_COLUMN: &str = "Result";

/// Unlabeled leading column holding each test's label.
pub const INDEX_COLUMN: &str = "Unnamed: 0";

/// Test label → result value, in first-seen order.
pub type ResultMap = Map<String, Value>;

/// Builds the test-label → result mapping from `table`.
///
/// Rows without a result are dropped first. The table must then have the
/// unlabeled index column in its schema, and rows without a label are
/// dropped. A label seen twice keeps its first position but takes the
/// later row's result.
///
/// # Errors
///
/// Returns [`ExtractionError::MissingColumn`] if the schema lacks the
/// `Result` column or the unlabeled index column.
pub fn extract(table: &Table) -> Result<ResultMap, ExtractionError> {
    if !table.has_column(RESULT_COLUMN) {
        return Err(ExtractionError::MissingColumn(RESULT_COLUMN.to_string()));
    }

    let with_result: Vec<&Row> = table
        .rows()
        .iter()
        .filter(|row| cell(row, RESULT_COLUMN).is_some())
        .collect();

    if !table.has_column(INDEX_COLUMN) {
        return Err(ExtractionError::MissingColumn(INDEX_COLUMN.to_string()));
    }

    let mut results = ResultMap::new();

    for row in with_result {
        let (Some(label), Some(result)) = (cell(row, INDEX_COLUMN), cell(row, RESULT_COLUMN))
        else {
            continue;
        };
        results.insert(label.to_string(), Value::String(result.to_string()));
    }

    log::debug!(
        "Mapped {} test result(s) from {} table row(s)",
        results.len(),
        table.rows().len()
    );

    Ok(results)
}

/// Returns the trimmed cell value, treating blank cells as absent.
fn cell<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn maps_labels_to_results() {
        let table = Table::new(
            columns(&["Unnamed: 0", "Result", "Units"]),
            vec![
                row(&[("Unnamed: 0", "Creatinine"), ("Result", "1.2"), ("Units", "mg/dL")]),
                row(&[("Unnamed: 0", "Urea"), ("Result", "30")]),
            ],
        );

        let results = extract(&table).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results["Creatinine"], "1.2");
        assert_eq!(results["Urea"], "30");
    }

    #[test]
    fn drops_rows_with_empty_result_or_label() {
        let table = Table::new(
            columns(&["Unnamed: 0", "Result"]),
            vec![
                row(&[("Unnamed: 0", "Creatinine"), ("Result", "1.2")]),
                row(&[("Unnamed: 0", "Comment")]),
                row(&[("Unnamed: 0", "Blank"), ("Result", "   ")]),
                row(&[("Result", "99")]),
            ],
        );

        let results = extract(&table).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results["Creatinine"], "1.2");
    }

    #[test]
    fn later_duplicate_wins_in_first_position() {
        let table = Table::new(
            columns(&["Unnamed: 0", "Result"]),
            vec![
                row(&[("Unnamed: 0", "Creatinine"), ("Result", "1.2")]),
                row(&[("Unnamed: 0", "Urea"), ("Result", "30")]),
                row(&[("Unnamed: 0", "Creatinine"), ("Result", "1.4")]),
            ],
        );

        let results = extract(&table).unwrap();
        let keys: Vec<&String> = results.keys().collect();
        assert_eq!(keys, ["Creatinine", "Urea"]);
        assert_eq!(results["Creatinine"], "1.4");
    }

    #[test]
    fn missing_index_column_fails_even_with_no_rows() {
        let table = Table::new(columns(&["Test", "Result"]), Vec::new());

        let err = extract(&table).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingColumn(ref c) if c == INDEX_COLUMN));
    }

    #[test]
    fn missing_index_column_fails_even_when_every_row_lacks_a_result() {
        let table = Table::new(
            columns(&["Test", "Result"]),
            vec![row(&[("Test", "Creatinine")])],
        );

        assert!(matches!(
            extract(&table),
            Err(ExtractionError::MissingColumn(ref c)) if c == INDEX_COLUMN
        ));
    }

    #[test]
    fn missing_result_column_fails() {
        let table = Table::new(
            columns(&["Unnamed: 0", "Value"]),
            vec![row(&[("Unnamed: 0", "Creatinine"), ("Value", "1.2")])],
        );

        assert!(matches!(
            extract(&table),
            Err(ExtractionError::MissingColumn(ref c)) if c == RESULT_COLUMN
        ));
    }

    #[test]
    fn index_column_present_but_all_labels_empty_yields_empty_map() {
        let table = Table::new(
            columns(&["Unnamed: 0", "Result"]),
            vec![row(&[("Result", "1.2")])],
        );

        assert!(extract(&table).unwrap().is_empty());
    }
}
