//! HTTP surface of the answering service.
//!
//! `POST /process` answers a question (or serves a cached report), `GET /`
//! serves a cached report as plain text and `GET /healthz` reports liveness.

mod routes;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use ltipp_core::{AppError, AppResult};
use ltipp_knowledge::{AnswerPipeline, ReportCache};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnswerPipeline>,
    pub reports: Arc<ReportCache>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(routes::cached_report))
        .route("/process", post(routes::process))
        .route("/healthz", get(routes::healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `bind` and serve until Ctrl-C.
pub async fn serve(state: AppState, bind: &str) -> AppResult<()> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
