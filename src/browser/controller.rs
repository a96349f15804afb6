//! Collaborator seam for the headless browser.
//!
//! The extractor only talks to these traits; [`super::chromium`] provides the
//! production implementation and tests substitute their own.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::Viewport;

/// Failure raised by the browser controller.
#[derive(Debug, Error)]
pub enum BrowserFailure {
    #[error("TimeoutError: Navigation timeout of {} ms exceeded", .0.as_millis())]
    Timeout(Duration),

    #[error("Failed to launch the browser process: {0}")]
    Launch(String),

    #[error("{0}")]
    Navigation(String),

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

impl BrowserFailure {
    /// Whether the failure is a typed timeout rather than a message match.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            BrowserFailure::Timeout(_) | BrowserFailure::Cdp(chromiumoxide::error::CdpError::Timeout)
        )
    }
}

/// Navigation milestone to wait for before `goto` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// The initial document has been parsed.
    DomContentLoaded,
    /// The `load` event fired (all subresources fetched).
    Load,
}

/// Launch configuration, built once at process start.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchProfile {
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub args: Vec<String>,
    pub viewport: Viewport,
    pub user_agent: String,
    pub navigation_timeout: Duration,
}

/// Launches isolated browser sessions.
#[async_trait]
pub trait BrowserController: Send + Sync {
    async fn launch(&self, profile: &LaunchProfile)
        -> Result<Box<dyn BrowserSession>, BrowserFailure>;
}

/// One running browser instance.
#[async_trait]
pub trait BrowserSession: Send {
    async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>, BrowserFailure>;

    /// Terminates the instance. Called exactly once per launched session.
    async fn close(&mut self) -> Result<(), BrowserFailure>;
}

/// A tab inside a [`BrowserSession`].
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn set_user_agent(&self, user_agent: &str) -> Result<(), BrowserFailure>;

    async fn goto(&self, url: &Url, wait_until: WaitUntil) -> Result<(), BrowserFailure>;

    /// Evaluates a script expression in the page and returns its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserFailure>;
}
