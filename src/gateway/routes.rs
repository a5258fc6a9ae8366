//! Router and handlers.

use crate::artifact::TranscriptStore;
use crate::core::{ConfigError, Domain};
use crate::gateway::response::{ApiError, ApiResult, ScanRequest, ScanResponse};
use crate::manager::ScanOrchestrator;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{
        header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    orchestrator: Arc<ScanOrchestrator>,
}

impl AppState {
    /// Wraps an orchestrator.
    pub fn new(orchestrator: Arc<ScanOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Returns the orchestrator.
    pub fn orchestrator(&self) -> &Arc<ScanOrchestrator> {
        &self.orchestrator
    }
}

/// Builds the API router with CORS restricted to `allowed_origins`.
pub fn router(state: AppState, allowed_origins: &[String]) -> Result<Router, ConfigError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| ConfigError::new(format!("invalid CORS origin {origin:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    Ok(Router::new()
        .route("/api/scan", post(start_scan))
        .route("/api/scan/{domain}", get(scan_status).delete(cancel_scan))
        .route("/api/scan/{domain}/file", get(download_transcript))
        .route("/api/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn start_scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> ApiResult<Json<ScanResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected scan request body");
        ApiError::bad_request("Invalid request body")
    })?;

    let domain = Domain::parse(&request.domain).map_err(|e| {
        tracing::debug!(domain = %request.domain, error = %e, "Rejected scan request domain");
        ApiError::bad_request("Invalid domain format")
    })?;

    let response = ScanResponse::started(domain.as_str());
    let handle = state.orchestrator.start_scan(domain);
    tracing::info!(scan_id = %handle.id, domain = %handle.domain, "Scan accepted");

    Ok(Json(response))
}

async fn scan_status(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Json<ScanResponse> {
    Json(ScanResponse::from(state.orchestrator.status(&domain)))
}

async fn cancel_scan(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> ApiResult<Json<ScanResponse>> {
    match state.orchestrator.cancel(&domain) {
        0 => Err(ApiError::not_found(format!("No scan in progress for {domain}"))),
        count => Ok(Json(ScanResponse::cancelled(&domain, count))),
    }
}

async fn download_transcript(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> ApiResult<Response> {
    let file_name = TranscriptStore::file_name(&domain)?;
    let file = state.orchestrator.transcripts().open(&domain).await?;

    let body = Body::from_stream(ReaderStream::new(file));
    let headers = [
        (CONTENT_TYPE, "text/plain".to_string()),
        (CONTENT_DISPOSITION, format!("attachment; filename={file_name}")),
    ];

    Ok((headers, body).into_response())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let report = state.orchestrator.health_report().await;
    let status = if report.all_available() { "ok" } else { "degraded" };
    Json(json!({
        "status": status,
        "tools": report.tools,
    }))
}
