//! Per-request browser sessions with guaranteed release.
//!
//! A [`SessionGuard`] owns one launched browser. Callers release it through
//! [`SessionGuard::release`]; a guard dropped without release (for example
//! when the request future is cancelled) closes the browser on a background
//! task instead.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

use super::controller::{
    BrowserController, BrowserFailure, BrowserPage, BrowserSession, LaunchProfile, WaitUntil,
};

/// Default bound on page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Default identifying client signature.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Hands out one browser session per extraction.
#[derive(Clone)]
pub struct SessionManager {
    controller: Arc<dyn BrowserController>,
    profile: LaunchProfile,
}

impl SessionManager {
    pub fn new(controller: Arc<dyn BrowserController>, profile: LaunchProfile) -> Self {
        Self {
            controller,
            profile,
        }
    }

    pub fn profile(&self) -> &LaunchProfile {
        &self.profile
    }

    /// Launches a fresh session.
    pub async fn acquire(&self) -> Result<SessionGuard, BrowserFailure> {
        let start = Instant::now();
        let session = self.controller.launch(&self.profile).await?;
        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "browser session launched"
        );
        Ok(SessionGuard {
            session: Some(session),
            user_agent: self.profile.user_agent.clone(),
            navigation_timeout: self.profile.navigation_timeout,
        })
    }
}

/// Exclusive handle on a launched browser.
pub struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
    user_agent: String,
    navigation_timeout: Duration,
}

impl SessionGuard {
    /// Opens a tab configured with the profile's user agent.
    pub async fn open_page(&mut self) -> Result<Box<dyn BrowserPage>, BrowserFailure> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| BrowserFailure::Launch("session already released".to_string()))?;
        let page = session.new_page().await?;
        page.set_user_agent(&self.user_agent).await?;
        Ok(page)
    }

    /// Navigates until the DOM is parsed, bounded by the navigation timeout.
    ///
    /// The returned future does not borrow the guard.
    pub fn navigate<'a>(
        &self,
        page: &'a dyn BrowserPage,
        url: &'a Url,
    ) -> impl Future<Output = Result<(), BrowserFailure>> + Send + 'a {
        let bound = self.navigation_timeout;
        async move {
            match timeout(bound, page.goto(url, WaitUntil::DomContentLoaded)).await {
                Ok(result) => result,
                Err(_) => Err(BrowserFailure::Timeout(bound)),
            }
        }
    }

    /// Closes the browser. Failures are logged, never returned.
    pub async fn release(mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(err) = session.close().await {
                tracing::warn!(error = %err, "failed to close browser session");
            } else {
                tracing::debug!("browser session closed");
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = session.close().await {
                        tracing::warn!(error = %err, "failed to close abandoned browser session");
                    }
                });
            }
            Err(_) => {
                tracing::warn!("browser session dropped outside a runtime; it was not closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        launched: AtomicUsize,
        closed: AtomicUsize,
    }

    struct CountingController {
        counters: Arc<Counters>,
        nav_delay: Duration,
    }

    struct CountingSession {
        counters: Arc<Counters>,
        nav_delay: Duration,
    }

    struct SlowPage {
        delay: Duration,
    }

    #[async_trait]
    impl BrowserController for CountingController {
        async fn launch(
            &self,
            _profile: &LaunchProfile,
        ) -> Result<Box<dyn BrowserSession>, BrowserFailure> {
            self.counters.launched.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingSession {
                counters: Arc::clone(&self.counters),
                nav_delay: self.nav_delay,
            }))
        }
    }

    #[async_trait]
    impl BrowserSession for CountingSession {
        async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>, BrowserFailure> {
            Ok(Box::new(SlowPage {
                delay: self.nav_delay,
            }))
        }

        async fn close(&mut self) -> Result<(), BrowserFailure> {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl BrowserPage for SlowPage {
        async fn set_user_agent(&self, _user_agent: &str) -> Result<(), BrowserFailure> {
            Ok(())
        }

        async fn goto(&self, _url: &Url, _wait_until: WaitUntil) -> Result<(), BrowserFailure> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        async fn evaluate(&self, _script: &str) -> Result<serde_json::Value, BrowserFailure> {
            Ok(serde_json::Value::String(String::new()))
        }
    }

    fn manager(nav_delay: Duration, nav_timeout: Duration) -> (SessionManager, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let controller = CountingController {
            counters: Arc::clone(&counters),
            nav_delay,
        };
        let profile = LaunchProfile {
            executable: None,
            headless: true,
            args: Vec::new(),
            viewport: Viewport::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout: nav_timeout,
        };
        (SessionManager::new(Arc::new(controller), profile), counters)
    }

    #[tokio::test]
    async fn release_closes_exactly_once() {
        let (manager, counters) = manager(Duration::ZERO, Duration::from_secs(1));
        let guard = manager.acquire().await.unwrap();
        guard.release().await;
        assert_eq!(counters.launched.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn navigation_timeout_is_typed() {
        let (manager, counters) = manager(Duration::from_secs(10), Duration::from_millis(20));
        let mut guard = manager.acquire().await.unwrap();
        let page = guard.open_page().await.unwrap();
        let url = Url::parse("https://example.com").unwrap();

        let err = guard.navigate(page.as_ref(), &url).await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");

        guard.release().await;
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropped_guard_still_closes_session() {
        let (manager, counters) = manager(Duration::ZERO, Duration::from_secs(1));
        let guard = manager.acquire().await.unwrap();
        drop(guard);

        for _ in 0..50 {
            if counters.closed.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }
}
