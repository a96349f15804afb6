use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process-level failures: configuration, IO and server startup.
#[derive(Debug, Error)]
pub enum PtsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, PtsError>;

impl PtsError {
    pub fn to_payload(&self) -> ErrorPayload {
        let hint = match self {
            PtsError::Io(_) => "Check file paths/permissions.",
            PtsError::Toml(_) => "Fix the TOML syntax; see `[server]` and `[browser]` keys.",
            PtsError::Serialization(_) => "Re-run with --verbose for details.",
            PtsError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("port") {
                    "Use a port between 1 and 65535 (PORT env or --port)."
                } else if lower.contains("timeout") {
                    "Use a positive navigation timeout, e.g. navigation_timeout = \"20s\"."
                } else if lower.contains("user agent") {
                    "Set browser.user_agent to a non-empty string."
                } else {
                    "Check flags/paths and the config file."
                }
            }
            PtsError::Server(_) => "Check that the address is free and reachable.",
        };
        ErrorPayload {
            error: self.to_string(),
            kind: None,
            url: None,
            details: None,
            hint: Some(hint.to_string()),
        }
    }
}

/// Fixed taxonomy of extraction failures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingUrl,
    InvalidUrl,
    Timeout,
    DnsFailure,
    ConnectionRefused,
    EnvironmentFault,
    ExtractionFailed,
}

impl ErrorKind {
    /// HTTP status reported for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::MissingUrl | ErrorKind::InvalidUrl => 400,
            ErrorKind::Timeout => 408,
            ErrorKind::DnsFailure => 404,
            ErrorKind::ConnectionRefused => 503,
            ErrorKind::EnvironmentFault | ErrorKind::ExtractionFailed => 500,
        }
    }

    /// User-facing message.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::MissingUrl => "URL parameter is required",
            ErrorKind::InvalidUrl => "Invalid URL format",
            ErrorKind::Timeout => "Timeout: page could not be loaded within the navigation limit",
            ErrorKind::DnsFailure => "URL could not be reached (DNS error)",
            ErrorKind::ConnectionRefused => "Connection refused by server",
            ErrorKind::EnvironmentFault => {
                "Browser configuration error - the hosting environment is missing dependencies"
            }
            ErrorKind::ExtractionFailed => "An error occurred while scraping",
        }
    }

    fn hint(self) -> Option<&'static str> {
        match self {
            ErrorKind::MissingUrl => Some("Example: /scrape?url=https://example.com"),
            ErrorKind::InvalidUrl => Some("Include the scheme, e.g. https://example.com."),
            ErrorKind::EnvironmentFault => Some(
                "Install Chromium and its shared libraries, or try a container/local deployment.",
            ),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A failed extraction, reported once and never retried.
#[derive(Debug, Clone)]
pub struct ExtractionError {
    pub kind: ErrorKind,
    pub url: String,
    pub detail: Option<String>,
}

impl ExtractionError {
    pub fn new(kind: ErrorKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn missing_url() -> Self {
        Self::new(ErrorKind::MissingUrl, "")
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.kind.message().to_string(),
            kind: Some(self.kind),
            url: (!self.url.is_empty()).then(|| self.url.clone()),
            details: self.detail.clone(),
            hint: self.kind.hint().map(str::to_string),
        }
    }
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ExtractionError {}

/// JSON error body shared by the HTTP layer and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
