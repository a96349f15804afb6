//! Maps browser failures onto the fixed [`ErrorKind`] taxonomy.
//!
//! Matching relies on the controller's error text and will drift if the
//! browser changes its wording.

use crate::browser::BrowserFailure;
use crate::error::{ErrorKind, ExtractionError};

const TIMEOUT_MARKERS: &[&str] = &["net::ERR_TIMED_OUT"];
const DNS_MARKERS: &[&str] = &["net::ERR_NAME_NOT_RESOLVED"];
const REFUSED_MARKERS: &[&str] = &["net::ERR_CONNECTION_REFUSED"];
const ENVIRONMENT_MARKERS: &[&str] = &[
    "libnss3.so",
    "shared libraries",
    "could not auto detect a chrome executable",
];

/// Picks the kind for a failure; the first matching rule wins.
pub fn classify_failure(failure: &BrowserFailure) -> ErrorKind {
    if failure.is_timeout() {
        return ErrorKind::Timeout;
    }

    let message = failure.to_string();
    let lower = message.to_ascii_lowercase();
    let matches = |markers: &[&str]| {
        markers
            .iter()
            .any(|marker| lower.contains(&marker.to_ascii_lowercase()))
    };

    if matches(TIMEOUT_MARKERS) {
        ErrorKind::Timeout
    } else if matches(DNS_MARKERS) {
        ErrorKind::DnsFailure
    } else if matches(REFUSED_MARKERS) {
        ErrorKind::ConnectionRefused
    } else if matches(ENVIRONMENT_MARKERS) {
        ErrorKind::EnvironmentFault
    } else {
        ErrorKind::ExtractionFailed
    }
}

/// Builds the reported error for a failed extraction of `url`.
pub fn classify(failure: &BrowserFailure, url: &str) -> ExtractionError {
    let kind = classify_failure(failure);
    let err = ExtractionError::new(kind, url);
    match kind {
        ErrorKind::ExtractionFailed | ErrorKind::EnvironmentFault | ErrorKind::Timeout => {
            err.with_detail(failure.to_string())
        }
        _ => err,
    }
}
