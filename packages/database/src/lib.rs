#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Persistence for patient lab records and BMI submissions.
//!
//! Records are stored as JSON documents in an embedded `SQLite` database
//! through `switchy_database`. Each collection is its own table with an
//! autoincrementing `id`, which doubles as the insertion order: "latest"
//! always means the greatest `id`.

pub mod db;
pub mod queries;

use strum_macros::{Display, IntoStaticStr};

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database file could not be opened.
    #[error("Failed to open database: {0}")]
    Open(String),

    /// An I/O operation failed (e.g., creating the database directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be serialized or deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// A stored record collection. The `snake_case` name is the table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    /// Normalized lab report records.
    PatientRecords,
    /// BMI calculation submissions.
    BmiRecords,
}

impl Collection {
    /// Every collection, in schema creation order.
    pub const ALL: &[Self] = &[Self::PatientRecords, Self::BmiRecords];

    /// Table backing this collection.
    #[must_use]
    pub fn table(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_snake_case() {
        assert_eq!(Collection::PatientRecords.table(), "patient_records");
        assert_eq!(Collection::BmiRecords.table(), "bmi_records");
        assert_eq!(Collection::BmiRecords.to_string(), "bmi_records");
    }
}
