use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::presentation::handlers::error::{lifecycle_error_response, parse_job_id};
use crate::presentation::state::AppState;

#[tracing::instrument(skip(state))]
pub async fn translate_handler(
    State(state): State<AppState>,
    Path((id, target)): Path<(String, String)>,
) -> impl IntoResponse {
    let id = match parse_job_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.lifecycle.translate(id, &target).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}
