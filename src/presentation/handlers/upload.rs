use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::domain::TranscriptionResult;
use crate::presentation::handlers::error::{
    error_response, lifecycle_error_response, parse_job_id,
};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResultRequest {
    #[serde(default)]
    pub transcription_id: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// Attaches a transcription produced elsewhere to an existing job.
#[tracing::instrument(skip(state, payload))]
pub async fn upload_result_handler(
    State(state): State<AppState>,
    payload: Result<Json<UploadResultRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid upload body");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON format");
        }
    };

    if request.transcription_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "transcriptionId is required");
    }
    let Some(raw_result) = request.result.filter(|r| !r.is_null()) else {
        return error_response(StatusCode::BAD_REQUEST, "result is required");
    };

    let id = match parse_job_id(&request.transcription_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let result: TranscriptionResult = match serde_json::from_value(raw_result) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid transcription result format");
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid transcription result format",
            );
        }
    };

    match state.lifecycle.ingest_external_result(id, result).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}
