//! Router-level integration tests.
//!
//! These use a lazy connection pool, so they exercise everything that runs
//! before the first database query: routing, extractors, validation, and
//! the secret gate on the internal endpoint. Flows that need real rows are
//! covered against a PostgreSQL instance (TEST_DATABASE_URL) separately.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use domain::services::MockWhatsAppSender;
use family_visits_api::{app::create_app, config::Config};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let config = Config::load_for_test(&[]).expect("test config");
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    create_app(config, pool, Arc::new(MockWhatsAppSender::new()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_liveness() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_verification_ping() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/whatsapp/webhook")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_rejects_missing_fields() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/whatsapp/webhook")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("MessageSid=SM123"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_requires_session_token() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/visits")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"date":"2025-03-09","time_of_day":"morning"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "unauthenticated");
}

#[tokio::test]
async fn test_garbage_bearer_token_rejected() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/profiles/me")
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_magic_token_requires_secret() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/internal/store-magic-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"phone":"+15551234567","token":"abc123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_magic_token_rejects_wrong_secret() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/internal/store-magic-token")
                .header(header::CONTENT_TYPE, "application/json")
                .header("X-Internal-Secret", "wrong-secret")
                .body(Body::from(
                    r#"{"phone":"+15551234567","token":"abc123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
