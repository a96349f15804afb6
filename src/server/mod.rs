//! HTTP surface over the page text extractor.
//!
//! Routes:
//! - `GET /` service description
//! - `GET /scrape?url=` extract text from `url`
//! - `GET /api[?url=]` scrape when `url` is given, otherwise describe
//!
//! Every route answers a bare `OPTIONS` with `200`; CORS allows any origin.

pub mod handlers;

use axum::http::{header::CONTENT_TYPE, Method};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Environment, ServerSettings};
use crate::error::{PtsError, Result};
use crate::extractor::PageTextExtractor;

/// Shared state for handlers.
pub struct AppState {
    pub extractor: PageTextExtractor,
    pub environment: Environment,
}

impl AppState {
    pub fn new(extractor: PageTextExtractor, environment: Environment) -> Self {
        Self {
            extractor,
            environment,
        }
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Builds the router with CORS and request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::info).options(handlers::preflight))
        .route(
            "/scrape",
            get(handlers::scrape).options(handlers::preflight),
        )
        .route("/api", get(handlers::api).options(handlers::preflight))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// A server running on a background task.
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The receiver is gone only if the server already stopped.
            let _ = tx.send(());
        }
        self.task
            .await
            .map_err(|e| PtsError::Server(format!("server task failed: {e}")))
    }

    /// Runs until `signal` resolves, then shuts down gracefully.
    pub async fn run_until<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        signal.await;
        tracing::info!("shutdown signal received, draining in-flight requests");
        self.shutdown().await
    }
}

/// Binds `settings.addr()` and serves the router on a background task.
pub async fn start_server(settings: &ServerSettings, state: Arc<AppState>) -> Result<RunningServer> {
    let addr = settings.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| PtsError::Server(format!("failed to bind to {addr}: {e}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| PtsError::Server(format!("failed to read local address: {e}")))?;

    tracing::info!(
        addr = %local_addr,
        environment = state.environment.description(),
        "HTTP server starting"
    );

    let router = build_router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = serve.await {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok(RunningServer {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{
        BrowserController, BrowserFailure, BrowserSession, LaunchProfile, SessionManager,
    };
    use crate::config::BrowserSettings;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct NoBrowser;

    #[async_trait]
    impl BrowserController for NoBrowser {
        async fn launch(
            &self,
            _profile: &LaunchProfile,
        ) -> std::result::Result<Box<dyn BrowserSession>, BrowserFailure> {
            Err(BrowserFailure::Launch(
                "Could not auto detect a chrome executable".to_string(),
            ))
        }
    }

    fn state() -> Arc<AppState> {
        let sessions = SessionManager::new(
            Arc::new(NoBrowser),
            BrowserSettings::default().launch_profile(),
        );
        Arc::new(AppState::new(
            PageTextExtractor::new(sessions),
            Environment::Local,
        ))
    }

    #[tokio::test]
    async fn root_returns_service_info() {
        let resp = build_router(state())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn launch_failure_is_500() {
        let resp = build_router(state())
            .oneshot(
                Request::builder()
                    .uri("/scrape?url=https://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let resp = build_router(state())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn start_server_binds_and_shuts_down() {
        let settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let server = start_server(&settings, state()).await.unwrap();
        assert_ne!(server.local_addr().port(), 0);
        server.shutdown().await.unwrap();
    }
}
