//! Headless browser automation for rendered text extraction.
//!
//! # Module Structure
//!
//! - [`controller`] - Collaborator traits and launch profile
//! - [`chromium`] - Chromium implementation over the DevTools protocol
//! - [`session`] - Per-request sessions with guaranteed release
//! - [`script`] - In-page extraction script
//!
//! # Example
//!
//! ```no_run
//! use pts_lib::browser::{ChromiumController, SessionManager};
//! use pts_lib::Config;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), pts_lib::browser::BrowserFailure> {
//! let profile = Config::default().browser.launch_profile();
//! let sessions = SessionManager::new(Arc::new(ChromiumController::new()), profile);
//! let guard = sessions.acquire().await?;
//! guard.release().await;
//! # Ok(())
//! # }
//! ```

pub mod chromium;
pub mod controller;
mod script;
pub mod session;

pub use chromium::ChromiumController;
pub use controller::{
    BrowserController, BrowserFailure, BrowserPage, BrowserSession, LaunchProfile, WaitUntil,
};
pub(crate) use script::text_extraction_script;
pub use script::NO_TEXT_SENTINEL;
pub use session::{SessionGuard, SessionManager, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_USER_AGENT};
