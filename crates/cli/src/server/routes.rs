//! Request handlers and error mapping.

use super::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use ltipp_core::AppError;
use serde::{Deserialize, Serialize};

/// Request `type` that asks for a cached report instead of an answer.
pub const REPORT_KIND: &str = "report";

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub async fn process(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected malformed request");
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    if request.kind == REPORT_KIND {
        let report = state.reports.random_report().await.map_err(error_response)?;
        return Ok(Json(ProcessResponse { answer: report }));
    }

    let result = state
        .pipeline
        .answer(&request.prompt)
        .await
        .map_err(error_response)?;

    Ok(Json(ProcessResponse {
        answer: result.answer,
    }))
}

pub async fn cached_report(State(state): State<AppState>) -> Result<String, ApiError> {
    state.reports.random_report().await.map_err(error_response)
}

pub async fn healthz() -> &'static str {
    "ok"
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// Client mistakes are 400, upstream service failures 502, the rest 500.
fn error_response(err: AppError) -> ApiError {
    let status = match &err {
        AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        e if e.is_transport() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), error = %err, "Request failed");
    } else {
        tracing::warn!(status = status.as_u16(), error = %err, "Request rejected");
    }

    api_error(status, err.to_string())
}
