//! HTTP surface: one submission endpoint plus liveness responses.
//!
//! The router is a thin adapter; all behavior lives in
//! [`crate::pipeline::SubmissionPipeline`]. Non-POST requests on the
//! submission route get the informational response instead of a 405 so
//! health-check probes pass.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::error;

use crate::error::Error;
use crate::pipeline::SubmissionPipeline;
use crate::request::RawPostcardRequest;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SubmissionPipeline>,
}

/// Build the Axum router for the postcard service.
pub fn routes(pipeline: Arc<SubmissionPipeline>) -> Router {
    let state = AppState { pipeline };

    Router::new()
        // Non-POST methods fall through to the informational response so
        // health probes never see a 405
        .route("/api/postcards", post(submit).fallback(info))
        .route("/healthz", get(info))
        .with_state(state)
}

async fn info(State(state): State<AppState>) -> impl IntoResponse {
    let quota = state.pipeline.quota().snapshot();
    Json(json!({
        "service": "cartero",
        "status": "ok",
        "sent": quota.sent,
        "remaining": quota.remaining(),
        "max": quota.max,
    }))
}

async fn submit(
    State(state): State<AppState>,
    Json(raw): Json<RawPostcardRequest>,
) -> Response {
    match state.pipeline.submit(&raw).await {
        Ok(outcome) => Json(json!({
            "success": true,
            "sent": outcome.quota.sent,
            "remaining": outcome.quota.remaining(),
            "providerId": outcome.provider_id,
            "raw": outcome.raw,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Internal faults get logged for operators and a generic message
        // for the caller; never the detail, which could name credentials
        let body = match &self {
            Error::Internal(_) | Error::Config(_) | Error::Artifact(_) => {
                error!(error = %self, "Internal failure during submission");
                json!({ "success": false, "error": "Internal error" })
            }
            Error::Provider(p) => json!({
                "success": false,
                "error": "Provider error",
                "details": p.to_string(),
            }),
            other => json!({ "success": false, "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
