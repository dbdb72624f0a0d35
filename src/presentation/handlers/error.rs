use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::LifecycleError;
use crate::domain::JobId;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

pub fn status_for(error: &LifecycleError) -> StatusCode {
    match error {
        LifecycleError::Validation(_)
        | LifecycleError::MissingField(_)
        | LifecycleError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
        LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
        LifecycleError::NotModified(_) => StatusCode::NOT_MODIFIED,
        LifecycleError::InvalidFormat(_)
        | LifecycleError::Storage(_)
        | LifecycleError::Media(_)
        | LifecycleError::RenameRollbackFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        LifecycleError::Translation(_) => StatusCode::BAD_GATEWAY,
        LifecycleError::Queue(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn lifecycle_error_response(error: LifecycleError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "Request failed");
    } else {
        tracing::warn!(error = %error, "Request rejected");
    }
    error_response(status, error.to_string())
}

pub fn parse_job_id(raw: &str) -> Result<JobId, Response> {
    JobId::parse(raw).map_err(|_| {
        error_response(StatusCode::BAD_REQUEST, format!("Invalid job ID: {}", raw))
    })
}
