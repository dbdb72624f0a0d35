use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::middleware;
use axum::routing::get;
use tower::ServiceExt;

use listenbox::infrastructure::observability::{
    REQUEST_ID_HEADER, RequestId, TracingConfig, request_id_middleware, sanitize_for_log,
};
use listenbox::presentation::config::{Environment, LoggingSettings};

fn app() -> Router {
    Router::new()
        .route(
            "/",
            get(|request: Request<Body>| async move {
                request
                    .extensions()
                    .get::<RequestId>()
                    .map(|id| id.0.clone())
                    .unwrap_or_default()
            }),
        )
        .layer(middleware::from_fn(request_id_middleware))
}

#[tokio::test]
async fn given_incoming_request_id_when_handled_then_id_is_propagated() {
    let request = Request::builder()
        .uri("/")
        .header(REQUEST_ID_HEADER, "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"abc-123");
}

#[tokio::test]
async fn given_no_request_id_when_handled_then_one_is_generated() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = app().oneshot(request).await.unwrap();

    let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn given_oversized_request_id_when_handled_then_it_is_replaced() {
    let request = Request::builder()
        .uri("/")
        .header(REQUEST_ID_HEADER, "x".repeat(500))
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[test]
fn given_long_prompt_when_sanitizing_then_truncated_with_total_length() {
    let prompt = "é".repeat(150);

    let sanitized = sanitize_for_log(&prompt);

    assert!(sanitized.starts_with(&"é".repeat(100)));
    assert!(sanitized.ends_with("... (150 chars total)"));
}

#[test]
fn given_secret_when_sanitizing_then_value_is_redacted() {
    assert_eq!(
        sanitize_for_log("use api_key=abc123 please"),
        "use api_key=[REDACTED] please"
    );
    assert_eq!(sanitize_for_log("   "), "[EMPTY]");
}

#[test]
fn given_logging_settings_when_building_tracing_config_then_values_carry_over() {
    let logging = LoggingSettings {
        level: "warn".into(),
        crate_level: "trace".into(),
        enable_json: true,
    };

    let config = TracingConfig::from_settings(Environment::Prod, &logging);

    assert_eq!(config.environment, Environment::Prod);
    assert!(config.json_format);
    assert_eq!(
        config.default_directive(),
        "warn,listenbox=trace,tower_http=trace"
    );
}

#[test]
fn given_environment_names_when_parsing_then_aliases_resolve() {
    assert_eq!("PRODUCTION".parse::<Environment>(), Ok(Environment::Prod));
    assert_eq!("".parse::<Environment>(), Ok(Environment::Local));
    assert_eq!("test".parse::<Environment>(), Ok(Environment::Test));
    assert!("staging".parse::<Environment>().is_err());
    assert_eq!(Environment::Prod.settings_file(), "appsettings.prod");
}
