//! Page Text Scraper (PTS) Library
//!
//! Renders a web page in headless Chromium, extracts its visible text and
//! exposes the operation over HTTP.
//!
//! # Module Overview
//!
//! - [`browser`] - Browser controller seam, Chromium backend and sessions
//! - [`extractor`] - End-to-end extraction with guaranteed session release
//! - [`classify`] - Failure classification into [`ErrorKind`]
//! - [`normalize`] - Whitespace normalization
//! - [`server`] - Axum router and server lifecycle
//! - [`config`] - Configuration file and environment support
//! - [`output`] - JSON response schemas
//!
//! # Example
//!
//! ```no_run
//! use pts_lib::{Config, PageTextExtractor};
//!
//! # async fn example() -> Result<(), pts_lib::ExtractionError> {
//! let config = Config::default();
//! let extractor = PageTextExtractor::chromium(&config.browser);
//! let result = extractor.extract_raw(Some("https://example.com")).await?;
//! println!("{}", result.text);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod classify;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod server;
pub mod target;
pub mod viewport;

pub use browser::{
    BrowserController, BrowserFailure, ChromiumController, LaunchProfile, SessionManager,
    DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_USER_AGENT, NO_TEXT_SENTINEL,
};
pub use classify::{classify, classify_failure};
pub use config::{BrowserSettings, Config, Environment, LogFormat, ServerSettings};
pub use error::{ErrorKind, ErrorPayload, ExtractionError, PtsError, Result};
pub use extractor::PageTextExtractor;
pub use normalize::normalize_text;
pub use output::{ExtractionResult, ServiceInfo};
pub use target::{validate_url, ExtractionRequest};
pub use viewport::Viewport;
