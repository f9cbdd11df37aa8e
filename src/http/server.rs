//! Review backend server setup.
//!
//! # Responsibilities
//! - Create the Axum router for `/fetchModels`, `/query`, `/query_stream`
//!   and the `/api` report routes
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Rate limit the query and submission routes per client IP
//! - Bind to the listener and shut down gracefully

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{AppConfig, ModelConfig};
use crate::http::handlers;
use crate::http::request::RequestIdLayer;
use crate::review::{LlmClient, UpstreamError};
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::storage::ReportStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Models offered to clients, in config order.
    pub models: Arc<Vec<ModelConfig>>,
    pub llm: LlmClient,
    pub store: ReportStore,
}

/// HTTP server for the review backend.
pub struct ReviewServer {
    router: Router,
}

impl ReviewServer {
    pub fn new(config: &AppConfig, store: ReportStore) -> Result<Self, UpstreamError> {
        let models: Vec<ModelConfig> = config.available_models().cloned().collect();
        if models.len() < config.models.len() {
            tracing::warn!(
                configured = config.models.len(),
                available = models.len(),
                "Models without api_key or base_url are not offered"
            );
        }

        let llm = LlmClient::new(Duration::from_secs(config.server.upstream_timeout_secs))?;
        let state = AppState {
            models: Arc::new(models),
            llm,
            store,
        };

        let router = Self::build_router(config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let query_limiter = Arc::new(RateLimiter::new(&config.limits));
        let submit_limiter = Arc::new(RateLimiter::submissions(&config.limits));

        let queries = Router::new()
            .route("/query", post(handlers::query))
            .route("/query_stream", post(handlers::query_stream))
            .route_layer(middleware::from_fn_with_state(query_limiter, rate_limit_middleware));

        let submissions = Router::new()
            .route("/api/submit-final-report", post(handlers::submit_report))
            .route_layer(middleware::from_fn_with_state(submit_limiter, rate_limit_middleware));

        Router::new()
            .route("/fetchModels", get(handlers::fetch_models))
            .route("/api/reports", get(handlers::list_reports))
            .route("/api/get-timestamps", get(handlers::report_timestamps))
            .route("/api/get-report-details", get(handlers::report_details))
            .merge(queries)
            .merge(submissions)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.server.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until Ctrl+C or a message on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Review backend starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("Review backend stopped");
        Ok(())
    }
}

async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                // Fall back to the broadcast alone
                let _ = shutdown.recv().await;
            }
        }
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
