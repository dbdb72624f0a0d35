use std::collections::HashMap;

use axum::extract::{Form, FromRequest, Multipart, Path, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::presentation::handlers::error::{
    error_response, lifecycle_error_response, parse_job_id,
};
use crate::presentation::state::AppState;

/// Renames the human part of a job's media file. Accepts `newFileName` as
/// either a urlencoded or a multipart form field.
#[tracing::instrument(skip(state, request))]
pub async fn rename_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Response {
    let id = match parse_job_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let new_file_name = match read_new_file_name(request).await {
        Ok(name) => name,
        Err(response) => return response,
    };

    match state.lifecycle.rename(id, &new_file_name).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(e) => lifecycle_error_response(e),
    }
}

async fn read_new_file_name(request: Request) -> Result<String, Response> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, format!("Failed to read multipart: {}", e))
        })? {
            if field.name() == Some("newFileName") {
                return field.text().await.map_err(|e| {
                    error_response(StatusCode::BAD_REQUEST, format!("Failed to read field: {}", e))
                });
            }
        }
        Ok(String::new())
    } else {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(fields.get("newFileName").cloned().unwrap_or_default())
    }
}
