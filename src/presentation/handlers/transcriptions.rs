use std::collections::HashMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use serde::Deserialize;

use crate::domain::{JobId, JobParams, JobPatch, JobSource};
use crate::presentation::handlers::error::{
    error_response, lifecycle_error_response, parse_job_id,
};
use crate::presentation::state::AppState;

#[tracing::instrument(skip(state))]
pub async fn list_transcriptions_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.lifecycle.list().await {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn get_transcription_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_job_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.lifecycle.get(id).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}

struct UploadedFile {
    file_name: String,
    data: Bytes,
}

/// Creates a job from a multipart form carrying either a `file` or a
/// `sourceUrl`.
#[tracing::instrument(skip(state, multipart))]
pub async fn create_transcription_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut file: Option<UploadedFile> = None;
    let mut fields: HashMap<String, String> = HashMap::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {}", e),
                );
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            match field.bytes().await {
                Ok(data) => {
                    tracing::debug!(filename = %file_name, bytes = data.len(), "File data received");
                    file = Some(UploadedFile { file_name, data });
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read file bytes");
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read file: {}", e),
                    );
                }
            }
        } else {
            match field.text().await {
                Ok(value) => {
                    fields.insert(name, value);
                }
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read field {}: {}", name, e),
                    );
                }
            }
        }
    }

    let source_url = fields.get("sourceUrl").map(String::as_str).unwrap_or_default();
    let source = if !source_url.is_empty() {
        JobSource::Url(source_url.to_string())
    } else if let Some(file) = file {
        JobSource::Upload {
            file_name: file.file_name,
            data: file.data,
        }
    } else {
        tracing::warn!("Create request with neither file nor sourceUrl");
        return error_response(
            StatusCode::BAD_REQUEST,
            "Either file or sourceUrl is required",
        );
    };

    let field = |key: &str| fields.get(key).map(String::as_str);
    let params = JobParams::from_raw(
        field("language").unwrap_or_default(),
        field("modelSize").unwrap_or_default(),
        field("device").unwrap_or_default(),
        field("beam_size").filter(|b| !b.is_empty()),
        field("initial_prompt"),
        field("hotwords"),
    );

    match state.lifecycle.create(source, params).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}

#[derive(Deserialize)]
pub struct PatchTranscriptionRequest {
    pub id: JobId,
    #[serde(flatten)]
    pub patch: JobPatch,
}

#[tracing::instrument(skip(state, payload))]
pub async fn patch_transcription_handler(
    State(state): State<AppState>,
    payload: Result<Json<PatchTranscriptionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid patch body");
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON format: {}", e.body_text()),
            );
        }
    };

    match state.lifecycle.update(request.id, request.patch).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_transcription_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_job_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.lifecycle.delete(id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}
