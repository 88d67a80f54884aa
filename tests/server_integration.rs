//! HTTP integration tests
//!
//! Drives the full router (routes, extractors, handlers) request by request
//! without binding a socket.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::helpers::create_test_settings;
use messenger_remote::server::create_app;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ping_reports_version() {
    let app = create_app(create_test_settings(0));

    let response = app
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_login_mints_token_and_reports_in_progress() {
    let app = create_app(create_test_settings(0));

    let request = Request::builder()
        .method("POST")
        .uri("/api/messenger/login")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"username":"user@example.com","password":"hunter2"}"#,
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let token: Uuid = json["token"].as_str().unwrap().parse().unwrap();
    assert!(!token.is_nil());
    assert_eq!(json["status"], "InProgress");
}

#[tokio::test]
async fn test_login_rejects_empty_credentials() {
    let app = create_app(create_test_settings(0));

    let request = Request::builder()
        .method("POST")
        .uri("/api/messenger/login")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"username":"","password":""}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid parameters");
}

#[tokio::test]
async fn test_status_unknown_token_is_not_found() {
    let app = create_app(create_test_settings(0));

    let uri = format!("/api/messenger/{}/status", Uuid::new_v4());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["status"], "NotFound");
    assert_eq!(json["token"], Uuid::nil().to_string());
}

#[tokio::test]
async fn test_keep_alive_unknown_token_is_not_found() {
    let app = create_app(create_test_settings(0));

    let uri = format!("/api/messenger/{}/keepAlive", Uuid::new_v4());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["status"], "NotFound");
}

#[tokio::test]
async fn test_send_unknown_token_is_not_found() {
    let app = create_app(create_test_settings(0));

    let uri = format!(
        "/api/messenger/{}/send?to=Alice&message=hello",
        Uuid::new_v4()
    );
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["status"], "NotFound");
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let app = create_app(create_test_settings(0));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/messenger/not-a-uuid/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_confirm_login_unknown_token_is_not_found() {
    let app = create_app(create_test_settings(0));

    let uri = format!("/api/messenger/{}/confirmLogin", Uuid::new_v4());
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(r#"{"code":"123456"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["status"], "NotFound");
}
