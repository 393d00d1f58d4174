//! HTTP surface.
//!
//! - `GET /api/gpu-data`: merged comparison (JSON array), fetched per request
//! - `GET /api/gpu-demand`: raw source-A feed, passed through
//! - `GET /health`
//!
//! Upstream failures answer `500` with the plain-text body
//! `Failed to fetch GPU data`. Under the `degrade` policy a single failed feed
//! still yields `200` with whatever the other feed supports.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};

use crate::app::pipeline;
use crate::config::Config;
use crate::data::{FeedClient, salad};
use crate::error::AppError;

pub const FETCH_FAILED: &str = "Failed to fetch GPU data";

/// Build the router; every request reads the shared config.
pub fn router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/api/gpu-data", get(gpu_data))
        .route("/api/gpu-demand", get(gpu_demand))
        .route("/health", get(health))
        .with_state(config)
}

/// Run the server until Ctrl-C.
pub fn run(config: Config) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::upstream(format!("Failed to start async runtime: {e}")))?;
    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> Result<(), AppError> {
    let bind = config.bind;
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::usage(format!("Failed to bind {bind}: {e}")))?;

    tracing::info!(%bind, policy = ?config.policy, "serving GPU data");
    eprintln!("Listening on http://{bind} (GET /api/gpu-data, /api/gpu-demand, /health)");

    axum::serve(listener, router(Arc::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::upstream(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn gpu_data(State(config): State<Arc<Config>>) -> Response {
    let result = tokio::task::spawn_blocking(move || pipeline::run_compare(&config)).await;
    match result {
        Ok(Ok(run)) => Json(run.merged).into_response(),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "gpu-data request failed");
            fetch_failed()
        }
        Err(err) => {
            tracing::error!(error = %err, "gpu-data worker panicked");
            fetch_failed()
        }
    }
}

async fn gpu_demand(State(config): State<Arc<Config>>) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        let client = FeedClient::new(config.timeout)?;
        salad::fetch_raw(&client, &config.salad).map_err(AppError::from)
    })
    .await;
    match result {
        Ok(Ok(body)) => Json(body).into_response(),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "gpu-demand request failed");
            fetch_failed()
        }
        Err(err) => {
            tracing::error!(error = %err, "gpu-demand worker panicked");
            fetch_failed()
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn fetch_failed() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED).into_response()
}
