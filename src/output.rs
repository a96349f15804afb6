use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Environment;

/// Successful extraction, serialized once and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub url: String,
    pub text: String,
    pub timestamp: String,
}

impl ExtractionResult {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            timestamp: now_rfc3339(),
        }
    }
}

/// ISO-8601 UTC timestamp with millisecond precision.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Static description returned by the info endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub message: String,
    pub environment: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
    pub usage: BTreeMap<String, String>,
    pub timestamp: String,
}

impl ServiceInfo {
    pub fn new(environment: Environment) -> Self {
        let endpoints = BTreeMap::from([
            (
                "scrape".to_string(),
                "GET /scrape?url=<url-to-scrape>".to_string(),
            ),
            ("api".to_string(), "GET /api?url=<url-to-scrape>".to_string()),
        ]);
        let usage = BTreeMap::from([
            ("healthCheck".to_string(), "GET /".to_string()),
            (
                "scraping".to_string(),
                "GET /scrape?url=https://example.com".to_string(),
            ),
        ]);
        Self {
            message: "Page text scraper API is running".to_string(),
            environment: environment.description().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints,
            usage,
            timestamp: now_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_three_fields() {
        let result = ExtractionResult::new("https://example.com", "Hello");
        let json = serde_json::to_value(&result).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["url"], "https://example.com");
        assert_eq!(obj["text"], "Hello");
        assert!(obj["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn timestamp_parses_as_rfc3339() {
        let ts = now_rfc3339();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn service_info_lists_scrape_endpoint() {
        let info = ServiceInfo::new(Environment::Local);
        assert!(info.endpoints["scrape"].starts_with("GET /scrape?url="));
        assert_eq!(info.environment, "Local");
    }
}
