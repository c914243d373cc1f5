//! Scraping test counts out of the build tool's generated report.
use crate::errors::ReportParseError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Test counts found in a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCounts {
    /// Number of tests that ran.
    pub total: i64,
    /// Number of tests that passed.
    pub passed: i64,
}

#[allow(clippy::expect_used)]
/// Extract test counts from the text of a report.
///
/// The first counter holds the total number of tests, the second the number of failed
/// tests. Any further counters (ignored tests, duration, ...) are not used.
///
/// # Errors
/// Errors if either counter is missing or does not hold a number.
pub fn parse_counts(report: &str) -> Result<TestCounts, ReportParseError> {
    lazy_static! {
        static ref COUNTER: Regex = Regex::new(r#"<div class="counter">([^<]*)</div>"#)
            .expect("Failed to compile regex!?!");
    }
    let mut counters = COUNTER
        .captures_iter(report)
        .filter_map(|captures| captures.get(1))
        .map(|value| value.as_str().trim());
    let total = parse_counter(counters.next().ok_or(ReportParseError::MissingCounter("total"))?)?;
    let failed = parse_counter(counters.next().ok_or(ReportParseError::MissingCounter("failed"))?)?;
    Ok(TestCounts {
        total,
        passed: total.saturating_sub(failed).max(0),
    })
}

/// Read the report at `path` and extract its test counts.
///
/// # Errors
/// Errors if the report cannot be read or does not contain both counters.
pub fn scrape(path: &Path) -> Result<TestCounts, ReportParseError> {
    let report = fs::read_to_string(path).map_err(|source| ReportParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_counts(&report)
}

/// Parse one counter value.
fn parse_counter(value: &str) -> Result<i64, ReportParseError> {
    value
        .parse::<i64>()
        .ok()
        .filter(|count| *count >= 0)
        .ok_or_else(|| ReportParseError::InvalidCounter {
            value: value.to_owned(),
        })
}
