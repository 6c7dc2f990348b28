//! HTTP surface: metrics and export endpoints for both data sources.

use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_derive::Deserialize;
use tokio::sync::watch;

use crate::error::Error;
use crate::exporter::{ApexExporter, FusionExporter};

const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub apex: Arc<ApexExporter>,
    pub fusion: Arc<FusionExporter>,
}

#[derive(Deserialize, Debug)]
struct ApexQuery {
    target: String,
    auth_module: String,
}

#[derive(Deserialize, Debug)]
struct FusionMetricsQuery {
    fusion_apex_id: String,
    data_max_age: i64,
}

#[derive(Deserialize, Debug)]
struct FusionExportQuery {
    fusion_apex_id: String,
}

/// Failure of a single request, rendered as plain text.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Error::Config(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Client(_) => StatusCode::BAD_GATEWAY,
        };
        (status, format!("{}\n", error_chain(&self.0))).into_response()
    }
}

/// `outer: inner: innermost`
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::temporary("/health") }))
        .route("/health", get(health_handler))
        .route("/metrics/apex", get(apex_metrics_handler))
        .route("/metrics/fusion", get(fusion_metrics_handler))
        .route("/export/apex", get(apex_export_handler))
        .route("/export/fusion", get(fusion_export_handler))
        .with_state(state)
}

async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

fn metrics_response(body: String) -> Response {
    (StatusCode::OK, [("content-type", METRICS_CONTENT_TYPE)], body).into_response()
}

async fn apex_metrics_handler(
    State(state): State<AppState>,
    Query(query): Query<ApexQuery>,
) -> Result<Response, ApiError> {
    let body = state
        .apex
        .metrics(&query.target, &query.auth_module)
        .await?;
    Ok(metrics_response(body))
}

async fn fusion_metrics_handler(
    State(state): State<AppState>,
    Query(query): Query<FusionMetricsQuery>,
) -> Result<Response, ApiError> {
    let body = state
        .fusion
        .metrics(&query.fusion_apex_id, query.data_max_age)
        .await?;
    Ok(metrics_response(body))
}

async fn apex_export_handler(
    State(state): State<AppState>,
    Query(query): Query<ApexQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let export = state
        .apex
        .export(&query.target, &query.auth_module)
        .await?;
    Ok(Json(export))
}

async fn fusion_export_handler(
    State(state): State<AppState>,
    Query(query): Query<FusionExportQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let export = state.fusion.export(&query.fusion_apex_id).await?;
    Ok(Json(export))
}

/// HTTP server for the exporter.
pub struct HttpServer {
    state: AppState,
    listen_addr: SocketAddr,
}

impl HttpServer {
    pub fn new(state: AppState, listen_addr: SocketAddr) -> Self {
        Self { state, listen_addr }
    }

    /// Runs until the shutdown signal flips to `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let router = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;
        tracing::info!("HTTP server listening on {}", self.listen_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while shutdown.changed().await.is_ok() {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                tracing::info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
