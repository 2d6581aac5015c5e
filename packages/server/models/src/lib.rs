#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the nephro coach server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the stored record types so the API contract (string `_id`s,
//! summary shapes, message bodies) can evolve independently.

use nephro_coach_report_models::{
    BmiRecord, ID_KEY, PATIENT_AGE_KEY, PATIENT_NAME_KEY, PatientRecord, StoredRecord,
    TEST_DATE_TIME_KEY,
};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Response message after a BMI record is stored.
pub const BMI_SAVED_MESSAGE: &str = "BMI record saved";
/// 404 message when there is no BMI record.
pub const NO_BMI_RECORD_MESSAGE: &str = "No BMI record found";
/// 404 message when the latest BMI record carries no age.
pub const NO_AGE_RECORD_MESSAGE: &str = "No age record found";
/// 404 error when the latest patient record carries no creatinine result.
pub const NO_CREATININE_MESSAGE: &str = "No creatinine data found";
/// 404 message when no patient record has been stored.
pub const NO_PATIENT_HISTORY_MESSAGE: &str = "No patient history found";
/// 404 message when there is no latest patient record.
pub const NO_LATEST_PATIENT_MESSAGE: &str = "No latest patient found";

/// Rejected request input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One or more required BMI fields were missing or empty.
    #[error("All fields are required")]
    MissingFields(Vec<&'static str>),

    /// The upload had no `file` part.
    #[error("No file part named '{0}' in the request")]
    MissingFile(&'static str),

    /// The uploaded file part had no filename.
    #[error("Uploaded file has no filename")]
    MissingFilename,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `true` when the server is answering.
    pub healthy: bool,
    /// Server crate version.
    pub version: String,
}

/// A `{"message": ...}` body, used for successes and for "not found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An `{"error": ...}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of `POST /save-bmi`.
///
/// Every field is optional at the parsing stage so a missing field is
/// reported as a validation error rather than a JSON error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaveBmiRequest {
    pub age: Option<Value>,
    pub weight: Option<Value>,
    pub height: Option<Value>,
    pub bmi: Option<Value>,
    pub timestamp: Option<Value>,
}

impl SaveBmiRequest {
    /// Checks that every field is present and non-empty and builds the
    /// record to store.
    ///
    /// Missing, `null`, `false`, zero, empty strings, empty arrays and
    /// empty objects all count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] naming every missing
    /// field.
    pub fn into_record(self) -> Result<BmiRecord, ValidationError> {
        let missing: Vec<&'static str> = [
            ("age", &self.age),
            ("weight", &self.weight),
            ("height", &self.height),
            ("bmi", &self.bmi),
            ("timestamp", &self.timestamp),
        ]
        .into_iter()
        .filter(|(_, value)| !value.as_ref().is_some_and(is_present))
        .map(|(name, _)| name)
        .collect();

        match (self.age, self.weight, self.height, self.bmi, self.timestamp) {
            (Some(age), Some(weight), Some(height), Some(bmi), Some(timestamp))
                if missing.is_empty() =>
            {
                Ok(BmiRecord {
                    age,
                    weight,
                    height,
                    bmi,
                    timestamp,
                })
            }
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }
}

/// Returns `true` if `value` counts as provided.
#[must_use]
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Response of `POST /save-bmi`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSaveBmi {
    pub message: String,
    #[serde(rename = "_id")]
    pub id: String,
}

/// A stored record as returned by the API: its own fields plus `_id`.
///
/// `_id` is written into the record's own map, so a record field that is
/// itself named `_id` is replaced rather than emitted twice.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDocument<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(rename = "_id")]
    pub id: String,
}

impl<T: Serialize> Serialize for ApiDocument<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match serde_json::to_value(&self.record).map_err(S::Error::custom)? {
            Value::Object(mut map) => {
                map.insert(ID_KEY.to_string(), Value::String(self.id.clone()));
                map.serialize(serializer)
            }
            other => Err(S::Error::custom(format!(
                "stored record must serialize to an object, got {other}"
            ))),
        }
    }
}

impl<T> From<StoredRecord<T>> for ApiDocument<T> {
    fn from(stored: StoredRecord<T>) -> Self {
        Self {
            id: stored.id_string(),
            record: stored.record,
        }
    }
}

/// A stored BMI record as returned by the API.
pub type ApiBmiRecord = ApiDocument<BmiRecord>;

/// A stored patient record as returned by the API.
pub type ApiPatientRecord = ApiDocument<PatientRecord>;

/// One entry of the patient history: the reserved fields plus all test
/// results formatted into one string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPatientSummary {
    #[serde(rename = "patient-name")]
    pub patient_name: String,
    #[serde(rename = "patient-age")]
    pub patient_age: String,
    #[serde(rename = "test-date-time")]
    pub test_date_time: String,
    /// Formatted test results, see [`PatientRecord::format_results`].
    pub result: String,
}

impl From<&PatientRecord> for ApiPatientSummary {
    fn from(record: &PatientRecord) -> Self {
        Self {
            patient_name: record.field_or_na(PATIENT_NAME_KEY),
            patient_age: record.field_or_na(PATIENT_AGE_KEY),
            test_date_time: record.field_or_na(TEST_DATE_TIME_KEY),
            result: record.format_results(),
        }
    }
}

/// Response of `GET /latest-age`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLatestAge {
    pub age: Value,
}

/// Response of `GET /latest-creatinine`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLatestCreatinine {
    pub creatinine: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> SaveBmiRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn complete_request_builds_record() {
        let record = request(json!({
            "age": 30,
            "weight": 70,
            "height": 170,
            "bmi": 24.2,
            "timestamp": "2024-01-01T00:00:00",
        }))
        .into_record()
        .unwrap();

        assert_eq!(record.bmi, json!(24.2));
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = request(json!({
            "age": 30,
            "weight": 70,
            "height": 170,
            "timestamp": "2024-01-01T00:00:00",
        }))
        .into_record()
        .unwrap_err();

        assert_eq!(err, ValidationError::MissingFields(vec!["bmi"]));
        assert_eq!(err.to_string(), "All fields are required");
    }

    #[test]
    fn empty_values_count_as_missing() {
        let err = request(json!({
            "age": 0,
            "weight": null,
            "height": 170,
            "bmi": 24.2,
            "timestamp": "",
        }))
        .into_record()
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["age", "weight", "timestamp"])
        );
    }

    #[test]
    fn presence_follows_truthiness() {
        assert!(is_present(&json!("30")));
        assert!(is_present(&json!(0.5)));
        assert!(is_present(&json!(true)));
        assert!(!is_present(&json!(0)));
        assert!(!is_present(&json!(0.0)));
        assert!(!is_present(&json!([])));
        assert!(!is_present(&json!({})));
    }

    #[test]
    fn document_serializes_record_fields_with_string_id() {
        let record: PatientRecord = serde_json::from_value(json!({
            "patient-name": "Jane Doe",
            "Creatinine": "1.2",
        }))
        .unwrap();

        let doc = ApiPatientRecord::from(StoredRecord { id: 7, record });
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["_id"], "7");
        assert_eq!(value["patient-name"], "Jane Doe");
        assert_eq!(value["Creatinine"], "1.2");
    }

    #[test]
    fn document_id_replaces_record_field_named_id() {
        let record: PatientRecord = serde_json::from_value(json!({
            "patient-name": "Jane Doe",
            "_id": "from the table",
            "Creatinine": "1.2",
        }))
        .unwrap();

        let doc = ApiPatientRecord::from(StoredRecord { id: 3, record });
        let text = serde_json::to_string(&doc).unwrap();

        assert_eq!(text.matches("\"_id\"").count(), 1);
        assert_eq!(
            text,
            r#"{"patient-name":"Jane Doe","_id":"3","Creatinine":"1.2"}"#
        );
    }

    #[test]
    fn summary_uses_na_for_missing_reserved_fields() {
        let record: PatientRecord = serde_json::from_value(json!({
            "patient-name": "Jane Doe",
            "Creatinine": "1.2",
        }))
        .unwrap();

        let summary = ApiPatientSummary::from(&record);
        assert_eq!(summary.patient_name, "Jane Doe");
        assert_eq!(summary.patient_age, "N/A");
        assert_eq!(summary.test_date_time, "N/A");
        assert_eq!(summary.result, "Creatinine: 1.2");
    }
}
