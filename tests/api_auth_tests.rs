// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session gate and CORS tests.
//!
//! These tests verify that:
//! 1. Per-user routes reject requests without a signed identity cookie
//! 2. Per-user routes accept requests with one
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use morning_dashboard::models::TokenBundle;
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_per_user_routes_without_cookie() {
    let (app, _) = common::create_test_app();

    for request in [
        common::get("/keywords", None),
        common::post_json("/keywords", None, json!({"keyword": "AI"})),
        common::delete("/keywords?id=1", None),
        common::get("/todos?date=today", None),
        common::post_json("/todos", None, json!({"text": "x", "target_date": "2026-10-18"})),
        common::delete("/todos?id=1", None),
    ] {
        let uri = request.uri().to_string();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(
            common::body_json(response).await,
            json!({"error": "not_authenticated"}),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_unsigned_identity_cookie_is_rejected() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::get("/keywords", Some("g_user_email=victim@x.com")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_cookies_are_rejected() {
    let (app, _) = common::create_test_app();

    for cookie in [
        "g_user_email=",
        "g_user_email=%%%; g_tokens=not-base64",
        "g_tokens=eyJhY2Nlc3NfdG9rZW4iOiJ4In0",
        "unrelated=1",
    ] {
        let response = app
            .clone()
            .oneshot(common::get("/todos", Some(cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "cookie {cookie:?}");
    }
}

#[tokio::test]
async fn test_tokens_without_identity_is_not_a_session() {
    let (app, state) = common::create_test_app();
    let cookie = common::session_cookie(&state, &TokenBundle::new("access"), None);

    let response = app
        .oneshot(common::get("/keywords", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_per_user_route_with_session() {
    let (app, state) = common::create_test_app();
    let cookie = common::login_cookie(&state, "a@x.com");

    let response = app
        .oneshot(common::get("/keywords", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await, json!({"keywords": []}));
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(common::get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["build_id"].is_string());
}

#[tokio::test]
async fn test_cors_preflight_from_app_origin() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/keywords")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_foreign_origin() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/keywords")
                .header(header::ORIGIN, "https://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
