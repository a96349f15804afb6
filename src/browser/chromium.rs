//! Chromium-backed controller using the DevTools protocol.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use url::Url;

use super::controller::{
    BrowserController, BrowserFailure, BrowserPage, BrowserSession, LaunchProfile, WaitUntil,
};

/// Launches a fresh local Chromium per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumController;

impl ChromiumController {
    pub fn new() -> Self {
        Self
    }
}

fn browser_config(profile: &LaunchProfile) -> Result<BrowserConfig, BrowserFailure> {
    let mut builder = BrowserConfig::builder()
        .args(profile.args.clone())
        .request_timeout(profile.navigation_timeout)
        .window_size(profile.viewport.width, profile.viewport.height);
    if !profile.headless {
        builder = builder.with_head();
    }
    if let Some(path) = &profile.executable {
        builder = builder.chrome_executable(path);
    }
    builder.build().map_err(BrowserFailure::Launch)
}

/// Polls the CDP event stream until the connection closes. Per-message
/// errors (e.g. events this client cannot decode) are logged and skipped.
async fn drive_handler<S, E>(mut events: S)
where
    S: Stream<Item = Result<(), E>> + Unpin,
    E: std::fmt::Display,
{
    while let Some(event) = events.next().await {
        if let Err(err) = event {
            tracing::debug!(error = %err, "browser handler event failed");
        }
    }
    tracing::debug!("browser handler stopped");
}

#[async_trait]
impl BrowserController for ChromiumController {
    async fn launch(
        &self,
        profile: &LaunchProfile,
    ) -> Result<Box<dyn BrowserSession>, BrowserFailure> {
        let config = browser_config(profile)?;
        let (browser, handler) = Browser::launch(config).await?;

        let handler_task = tokio::spawn(drive_handler(handler));

        Ok(Box::new(ChromiumSession {
            browser,
            handler_task,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>, BrowserFailure> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&mut self) -> Result<(), BrowserFailure> {
        let closed = self.browser.close().await;
        // Reap the child even when the close command failed.
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed.map(|_| ()).map_err(BrowserFailure::from)
    }
}

struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn set_user_agent(&self, user_agent: &str) -> Result<(), BrowserFailure> {
        self.page
            .set_user_agent(SetUserAgentOverrideParams::new(user_agent))
            .await?;
        Ok(())
    }

    async fn goto(&self, url: &Url, wait_until: WaitUntil) -> Result<(), BrowserFailure> {
        let mut dom_ready = self
            .page
            .event_listener::<EventDomContentEventFired>()
            .await?;

        let response = self.page.execute(NavigateParams::new(url.as_str())).await?;
        if let Some(error_text) = response.result.error_text.as_deref() {
            return Err(BrowserFailure::Navigation(format!("{error_text} at {url}")));
        }

        match wait_until {
            WaitUntil::DomContentLoaded => {
                dom_ready.next().await;
            }
            WaitUntil::Load => {
                self.page.wait_for_navigation().await?;
            }
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserFailure> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(BrowserFailure::Evaluation)?;
        let result = self.page.evaluate_expression(params).await?;
        result
            .into_value::<serde_json::Value>()
            .map_err(|e| BrowserFailure::Evaluation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use std::time::Duration;

    fn profile() -> LaunchProfile {
        LaunchProfile {
            executable: Some("/opt/chrome/chrome".into()),
            headless: true,
            args: vec!["--no-sandbox".to_string()],
            viewport: Viewport {
                width: 800,
                height: 600,
            },
            user_agent: "test-agent".to_string(),
            navigation_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn handler_keeps_draining_after_event_errors() {
        let seen = std::sync::atomic::AtomicUsize::new(0);
        let events = futures::stream::iter(vec![
            Err("unknown CDP event"),
            Ok(()),
            Err("malformed message"),
            Ok(()),
        ])
        .inspect(|_| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        drive_handler(events).await;
        assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 4);
    }

    #[test]
    fn builds_config_with_explicit_executable() {
        assert!(browser_config(&profile()).is_ok());
    }

    #[test]
    fn headful_profile_still_builds() {
        let profile = LaunchProfile {
            headless: false,
            ..profile()
        };
        assert!(browser_config(&profile).is_ok());
    }
}
