#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types shared by the extraction pipeline, the database layer and
//! the API server.
//!
//! A [`PatientRecord`] is deliberately schema-less: besides the three
//! reserved patient fields it carries whatever test labels the lab report
//! table contained. A [`BmiRecord`] is a fixed five-field submission.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record key holding the patient's name.
pub const PATIENT_NAME_KEY: &str = "patient-name";
/// Record key holding the patient's age.
pub const PATIENT_AGE_KEY: &str = "patient-age";
/// Record key holding the report's preliminary test date/time.
pub const TEST_DATE_TIME_KEY: &str = "test-date-time";
/// Key under which the storage identifier is exposed in API documents.
pub const ID_KEY: &str = "_id";
/// Test label for the creatinine result.
pub const CREATININE_KEY: &str = "Creatinine";

/// The patient fields every [`PatientRecord`] starts with.
pub const RESERVED_KEYS: [&str; 3] = [PATIENT_NAME_KEY, PATIENT_AGE_KEY, TEST_DATE_TIME_KEY];

/// Placeholder used when no patient name could be extracted.
pub const NAME_NOT_FOUND: &str = "Name not found";
/// Placeholder used when no patient age could be extracted.
pub const AGE_NOT_FOUND: &str = "Age not found";
/// Placeholder used when no test date/time could be extracted.
pub const DATE_TIME_NOT_FOUND: &str = "Date/Time not found";
/// Output of [`PatientRecord::format_results`] when there are no results.
pub const NO_RESULTS: &str = "No results available";
/// Placeholder for a reserved field missing from a stored record.
pub const NOT_AVAILABLE: &str = "N/A";

/// Returns `true` for keys that are never rendered as test results.
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    key == ID_KEY || RESERVED_KEYS.contains(&key)
}

/// Renders a JSON value for display. Strings are rendered without quotes.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A normalized lab report: patient fields followed by test results, in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientRecord(Map<String, Value>);

impl PatientRecord {
    /// Wraps an already-normalized map.
    #[must_use]
    pub const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a reserved field rendered for display, or `"N/A"` when the
    /// stored record lacks it.
    #[must_use]
    pub fn field_or_na(&self, key: &str) -> String {
        self.get(key)
            .map_or_else(|| NOT_AVAILABLE.to_string(), display_value)
    }

    /// Iterates over every entry in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Iterates over the test-result entries, skipping reserved keys.
    pub fn results(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(k, _)| !is_reserved_key(k))
    }

    /// Number of entries, reserved fields included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Formats the test results as a single `"key: value, key: value"`
    /// string.
    #[must_use]
    pub fn format_results(&self) -> String {
        let rendered: Vec<String> = self
            .results()
            .map(|(k, v)| format!("{k}: {}", display_value(v)))
            .collect();

        if rendered.is_empty() {
            NO_RESULTS.to_string()
        } else {
            rendered.join(", ")
        }
    }

    /// Consumes the record, returning the underlying map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// A single body-mass-index submission.
///
/// Values are kept exactly as the client sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmiRecord {
    pub age: Value,
    pub weight: Value,
    pub height: Value,
    pub bmi: Value,
    pub timestamp: Value,
}

/// A record together with its storage-assigned identifier.
///
/// Identifiers increase monotonically with insertion, so the record with
/// the greatest `id` is the latest one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord<T> {
    /// Storage-assigned identifier.
    pub id: i64,
    /// The record as it was inserted.
    pub record: T,
}

impl<T> StoredRecord<T> {
    /// Returns the identifier in the string form used by the API.
    #[must_use]
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> PatientRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn format_results_skips_reserved_fields_and_id() {
        let rec = record(json!({
            "_id": "1",
            "patient-name": "Jane Doe",
            "patient-age": "45",
            "test-date-time": "05-MAR-24 10:15:00 AM",
            "Creatinine": "1.2",
        }));
        assert_eq!(rec.format_results(), "Creatinine: 1.2");
    }

    #[test]
    fn format_results_returns_sentinel_when_only_reserved() {
        let rec = record(json!({
            "patient-name": "Jane Doe",
            "patient-age": "45",
            "test-date-time": "Date/Time not found",
        }));
        assert_eq!(rec.format_results(), NO_RESULTS);
    }

    #[test]
    fn format_results_keeps_insertion_order() {
        let rec = record(json!({
            "patient-name": "Jane Doe",
            "Urea": "30",
            "Creatinine": "1.2",
            "Albumin": 4.1,
        }));
        assert_eq!(rec.format_results(), "Urea: 30, Creatinine: 1.2, Albumin: 4.1");
    }

    #[test]
    fn missing_reserved_field_renders_na() {
        let rec = record(json!({ "Creatinine": "1.2" }));
        assert_eq!(rec.field_or_na(PATIENT_NAME_KEY), NOT_AVAILABLE);
    }

    #[test]
    fn reserved_key_detection() {
        assert!(is_reserved_key("patient-name"));
        assert!(is_reserved_key("_id"));
        assert!(!is_reserved_key("Creatinine"));
    }

    #[test]
    fn bmi_record_round_trips_through_json() {
        let bmi: BmiRecord = serde_json::from_value(json!({
            "age": 30,
            "weight": 70,
            "height": 170,
            "bmi": 24.2,
            "timestamp": "2024-01-01T00:00:00",
        }))
        .unwrap();
        assert_eq!(bmi.age, json!(30));
        assert_eq!(bmi.timestamp, json!("2024-01-01T00:00:00"));
    }
}
