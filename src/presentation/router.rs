use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    create_transcription_handler, delete_transcription_handler, get_transcription_handler,
    health_handler, list_transcriptions_handler, patch_transcription_handler, rename_handler,
    service_status_handler, transcriptions_ws_handler, translate_handler, upload_result_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let media_dir = ServeDir::new(&state.settings.storage.upload_dir);
    let body_limit = state.settings.storage.max_upload_size_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/status", get(service_status_handler))
        .route(
            "/api/transcriptions",
            get(list_transcriptions_handler)
                .post(create_transcription_handler)
                .patch(patch_transcription_handler),
        )
        .route(
            "/api/transcriptions/{id}",
            get(get_transcription_handler).delete(delete_transcription_handler),
        )
        .route("/api/rename/{id}", post(rename_handler))
        .route("/api/translate/{id}/{target}", get(translate_handler))
        .route("/api/upload", post(upload_result_handler))
        .route("/ws/transcriptions", get(transcriptions_ws_handler))
        .nest_service("/api/video", media_dir)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
