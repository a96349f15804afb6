//! Target URL validation and the typed extraction request.

use url::Url;

use crate::error::{ErrorKind, ExtractionError};

/// A request whose target has already been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// The target as supplied by the caller, echoed back in results.
    pub raw: String,
    /// Normalized absolute URL used for navigation.
    pub url: Url,
}

impl ExtractionRequest {
    /// Builds a request from an optional query value.
    ///
    /// A missing or blank value is `MissingUrl`; anything that does not parse
    /// as an absolute URL is `InvalidUrl`.
    pub fn parse(raw: Option<&str>) -> Result<Self, ExtractionError> {
        let raw = match raw {
            Some(value) if !value.trim().is_empty() => value,
            _ => return Err(ExtractionError::missing_url()),
        };
        let url = validate_url(raw)?;
        Ok(Self {
            raw: raw.to_string(),
            url,
        })
    }
}

/// Parses a candidate string as an absolute URL.
pub fn validate_url(candidate: &str) -> Result<Url, ExtractionError> {
    Url::parse(candidate.trim()).map_err(|e| {
        ExtractionError::new(ErrorKind::InvalidUrl, candidate).with_detail(e.to_string())
    })
}
