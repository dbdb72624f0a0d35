use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::services::ServiceState;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

/// Reports whether transcriptions can currently be served.
#[tracing::instrument(skip(state))]
pub async fn service_status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.health_prober.service_status().await;
    let code = match status.status {
        ServiceState::Ok => StatusCode::OK,
        ServiceState::Error => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(status))
}
