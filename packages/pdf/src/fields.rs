//! Patient field extraction from the first page of a lab report.
//!
//! Each field has exactly one case-insensitive pattern. The first match in
//! the page text wins; a field with no match gets its "not found"
//! placeholder and extraction carries on with the next field.

use std::sync::LazyLock;

use nephro_coach_report_models::{AGE_NOT_FOUND, DATE_TIME_NOT_FOUND, NAME_NOT_FOUND};
use regex::Regex;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Patient Name|Name|Patient)\s*:\s*(.*)").expect("valid regex")
});

static AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(Age|AGE)\s*:\s*(\d+)").expect("valid regex"));

static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Preliminary date/time\s*:\s*(\d{2}-[A-Z]{3}-\d{2} \d{2}:\d{2}:\d{2} [APM]{2})",
    )
    .expect("valid regex")
});

/// Patient metadata pulled from the report text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFields {
    /// Patient name, or [`NAME_NOT_FOUND`].
    pub name: String,
    /// Patient age as written on the report, or [`AGE_NOT_FOUND`].
    pub age: String,
    /// Preliminary test date/time, or [`DATE_TIME_NOT_FOUND`].
    pub test_date_time: String,
}

/// Extracts the patient name, age and test date/time from `text`.
#[must_use]
pub fn extract(text: &str) -> PatientFields {
    let fields = PatientFields {
        name: capture(&NAME_RE, text, 2).unwrap_or_else(|| NAME_NOT_FOUND.to_string()),
        age: capture(&AGE_RE, text, 2).unwrap_or_else(|| AGE_NOT_FOUND.to_string()),
        test_date_time: capture(&DATE_TIME_RE, text, 1)
            .unwrap_or_else(|| DATE_TIME_NOT_FOUND.to_string()),
    };

    log::debug!(
        "Extracted patient fields: name={:?} age={:?} test_date_time={:?}",
        fields.name,
        fields.age,
        fields.test_date_time
    );

    fields
}

/// Returns the trimmed text of `group` in the first match of `re`.
fn capture(re: &Regex, text: &str, group: usize) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str().trim().to_string())
}
