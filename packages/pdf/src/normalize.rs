//! Merges extracted patient fields and test results into one record.

use nephro_coach_report_models::{
    PATIENT_AGE_KEY, PATIENT_NAME_KEY, PatientRecord, RESERVED_KEYS, TEST_DATE_TIME_KEY,
};
use serde_json::{Map, Value};

use crate::fields::PatientFields;
use crate::results::ResultMap;

/// Builds the flat record: the three patient fields first, then every
/// test result in order.
///
/// A test label equal to a reserved field name replaces that field's value
/// in place. This is logged but not prevented.
#[must_use]
pub fn normalize(fields: PatientFields, results: ResultMap) -> PatientRecord {
    let mut map = Map::with_capacity(RESERVED_KEYS.len() + results.len());
    map.insert(PATIENT_NAME_KEY.to_string(), Value::String(fields.name));
    map.insert(PATIENT_AGE_KEY.to_string(), Value::String(fields.age));
    map.insert(
        TEST_DATE_TIME_KEY.to_string(),
        Value::String(fields.test_date_time),
    );

    for (label, value) in results {
        if RESERVED_KEYS.contains(&label.as_str()) {
            log::warn!("Test label '{label}' overwrites the reserved patient field of the same name");
        }
        map.insert(label, value);
    }

    PatientRecord::from_map(map)
}
