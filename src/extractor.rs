//! End-to-end page text extraction.
//!
//! One call launches one browser session, renders the target, pulls the
//! visible text and releases the session on every exit path.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::browser::{
    text_extraction_script, BrowserFailure, ChromiumController, SessionGuard, SessionManager,
};
use crate::classify::classify;
use crate::config::BrowserSettings;
use crate::error::{ErrorKind, ExtractionError};
use crate::normalize::normalize_text;
use crate::output::ExtractionResult;
use crate::target::ExtractionRequest;

/// Extracts normalized visible text from rendered pages.
#[derive(Clone)]
pub struct PageTextExtractor {
    sessions: SessionManager,
}

impl PageTextExtractor {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    /// Production extractor launching local Chromium per request.
    pub fn chromium(settings: &BrowserSettings) -> Self {
        Self::new(SessionManager::new(
            Arc::new(ChromiumController::new()),
            settings.launch_profile(),
        ))
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Validates `raw` and extracts its text.
    pub async fn extract_raw(&self, raw: Option<&str>) -> Result<ExtractionResult, ExtractionError> {
        let request = ExtractionRequest::parse(raw)?;
        self.extract(&request).await
    }

    /// Renders the request's target and returns its normalized text.
    ///
    /// The session is released before this returns, whether rendering
    /// succeeded, failed or panicked.
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractionError> {
        let start = Instant::now();
        tracing::info!(url = %request.raw, "extracting page text");

        let mut guard = self.sessions.acquire().await.map_err(|failure| {
            tracing::error!(url = %request.raw, error = %failure, "browser launch failed");
            classify(&failure, &request.raw)
        })?;

        let outcome = AssertUnwindSafe(render_text(&mut guard, &request.url))
            .catch_unwind()
            .await;
        guard.release().await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(raw_text)) => {
                let text = normalize_text(&raw_text);
                tracing::info!(
                    url = %request.raw,
                    chars = text.chars().count(),
                    elapsed_ms,
                    "extraction finished"
                );
                Ok(ExtractionResult::new(request.raw.clone(), text))
            }
            Ok(Err(failure)) => {
                let err = classify(&failure, &request.raw);
                tracing::error!(
                    url = %request.raw,
                    kind = ?err.kind,
                    error = %failure,
                    elapsed_ms,
                    "extraction failed"
                );
                Err(err)
            }
            Err(_) => {
                tracing::error!(url = %request.raw, elapsed_ms, "extraction panicked");
                Err(ExtractionError::new(ErrorKind::ExtractionFailed, request.raw.clone())
                    .with_detail("extraction task panicked"))
            }
        }
    }
}

async fn render_text(guard: &mut SessionGuard, url: &Url) -> Result<String, BrowserFailure> {
    let page = guard.open_page().await?;
    guard.navigate(page.as_ref(), url).await?;
    tracing::debug!(%url, "DOM content loaded");

    match page.evaluate(&text_extraction_script()).await? {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(BrowserFailure::Evaluation(format!(
            "expected text from page, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{
        BrowserController, BrowserPage, BrowserSession, LaunchProfile, WaitUntil,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone)]
    enum Behavior {
        Text(&'static str),
        NavError(&'static str),
        Hang,
        Panic,
        LaunchError(&'static str),
    }

    #[derive(Default)]
    struct Counters {
        launched: AtomicUsize,
        closed: AtomicUsize,
    }

    struct FakeController {
        behavior: Behavior,
        counters: Arc<Counters>,
    }

    struct FakeSession {
        behavior: Behavior,
        counters: Arc<Counters>,
    }

    struct FakePage {
        behavior: Behavior,
    }

    #[async_trait]
    impl BrowserController for FakeController {
        async fn launch(
            &self,
            _profile: &LaunchProfile,
        ) -> Result<Box<dyn BrowserSession>, BrowserFailure> {
            if let Behavior::LaunchError(msg) = self.behavior {
                return Err(BrowserFailure::Launch(msg.to_string()));
            }
            self.counters.launched.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeSession {
                behavior: self.behavior.clone(),
                counters: Arc::clone(&self.counters),
            }))
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>, BrowserFailure> {
            Ok(Box::new(FakePage {
                behavior: self.behavior.clone(),
            }))
        }

        async fn close(&mut self) -> Result<(), BrowserFailure> {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl BrowserPage for FakePage {
        async fn set_user_agent(&self, _user_agent: &str) -> Result<(), BrowserFailure> {
            Ok(())
        }

        async fn goto(&self, url: &Url, _wait_until: WaitUntil) -> Result<(), BrowserFailure> {
            match self.behavior {
                Behavior::NavError(code) => Err(BrowserFailure::Navigation(format!("{code} at {url}"))),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        async fn evaluate(&self, _script: &str) -> Result<serde_json::Value, BrowserFailure> {
            match self.behavior {
                Behavior::Text(text) => Ok(serde_json::Value::String(text.to_string())),
                Behavior::Panic => panic!("renderer crashed"),
                _ => Ok(serde_json::Value::Null),
            }
        }
    }

    fn extractor(behavior: Behavior) -> (PageTextExtractor, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let controller = FakeController {
            behavior,
            counters: Arc::clone(&counters),
        };
        let mut profile = BrowserSettings::default().launch_profile();
        profile.navigation_timeout = Duration::from_millis(50);
        let sessions = SessionManager::new(Arc::new(controller), profile);
        (PageTextExtractor::new(sessions), counters)
    }

    fn assert_released(counters: &Counters) {
        assert_eq!(
            counters.launched.load(Ordering::SeqCst),
            counters.closed.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn returns_normalized_text_with_raw_url() {
        let (extractor, counters) = extractor(Behavior::Text("  Hello \t world\n\n\nbye  "));
        let result = extractor
            .extract_raw(Some("https://Example.com"))
            .await
            .unwrap();

        assert_eq!(result.url, "https://Example.com");
        assert_eq!(result.text, "Hello world\nbye");
        assert_released(&counters);
    }

    #[tokio::test]
    async fn empty_main_yields_empty_text() {
        let (extractor, _) = extractor(Behavior::Text("   \n  "));
        let result = extractor.extract_raw(Some("https://example.com")).await.unwrap();
        assert_eq!(result.text, "");
    }

    #[tokio::test]
    async fn missing_document_passes_sentinel_through() {
        let (extractor, _) = extractor(Behavior::Text(crate::browser::NO_TEXT_SENTINEL));
        let result = extractor.extract_raw(Some("https://example.com")).await.unwrap();
        assert_eq!(result.text, "No text found");
    }

    #[tokio::test]
    async fn indented_inner_text_is_flattened_per_line() {
        let (extractor, _) = extractor(Behavior::Text(
            "Welcome\n\n    Latest news\r\n\t\tStory one\n  \u{a0}Story two  \n",
        ));
        let result = extractor.extract_raw(Some("https://example.com")).await.unwrap();
        assert_eq!(result.text, "Welcome\nLatest news\nStory one\nStory two");
    }

    #[tokio::test]
    async fn invalid_url_never_launches() {
        let (extractor, counters) = extractor(Behavior::Text("unused"));
        let err = extractor.extract_raw(Some("not-a-url")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidUrl);
        assert_eq!(counters.launched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dns_failure_is_classified_and_released() {
        let (extractor, counters) = extractor(Behavior::NavError("net::ERR_NAME_NOT_RESOLVED"));
        let err = extractor
            .extract_raw(Some("https://nope.invalid"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DnsFailure);
        assert_eq!(err.url, "https://nope.invalid");
        assert_released(&counters);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_navigation_times_out_and_releases() {
        let (extractor, counters) = extractor(Behavior::Hang);
        let err = extractor
            .extract_raw(Some("https://slow.example"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panic_during_render_is_extraction_failure() {
        let (extractor, counters) = extractor(Behavior::Panic);
        let err = extractor
            .extract_raw(Some("https://example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExtractionFailed);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn launch_failure_is_environment_fault() {
        let (extractor, counters) = extractor(Behavior::LaunchError(
            "error while loading shared libraries: libnss3.so",
        ));
        let err = extractor
            .extract_raw(Some("https://example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::EnvironmentFault);
        assert_eq!(counters.launched.load(Ordering::SeqCst), 0);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 0);
    }
}
