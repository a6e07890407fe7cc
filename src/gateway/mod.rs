//! HTTP gateway
//!
//! `GET /` describes the service, `POST /api/` answers questions.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::config::{Config, MAX_UPLOAD_BYTES};
use crate::intake::FileStorage;
use crate::llm::CompletionBackend;
use crate::solver::Solver;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub solver: Solver,
    pub storage: Arc<FileStorage>,
}

impl AppState {
    pub fn new(backend: Arc<dyn CompletionBackend>, storage: FileStorage) -> Self {
        Self {
            solver: Solver::new(backend),
            storage: Arc::new(storage),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/", post(handlers::ask))
        .route("/api", post(handlers::ask))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config, backend: Arc<dyn CompletionBackend>) -> Result<()> {
    let storage = FileStorage::new(&config.upload_dir)?;
    tracing::info!(upload_dir = %storage.base_dir().display(), "Upload storage ready");
    let app = build_router(AppState::new(backend, storage));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
