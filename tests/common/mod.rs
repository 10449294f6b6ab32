// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::{to_bytes, Body};
use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing;
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use morning_dashboard::config::{Config, GoogleEndpoints};
use morning_dashboard::models::TokenBundle;
use morning_dashboard::routes::create_router;
use morning_dashboard::AppState;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Create a test app backed by a fresh in-memory SQLite store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::new(config, reqwest::Client::new()).expect("test config should be valid"),
    );
    (create_router(state.clone()), state)
}

/// `Cookie` header value carrying a signed session for `email`.
#[allow(dead_code)]
pub fn session_cookie(state: &AppState, bundle: &TokenBundle, email: Option<&str>) -> String {
    let jar = state
        .sessions
        .set_session(state.sessions.jar(&HeaderMap::new()), bundle, email);
    cookie_header(&set_cookies(&jar.into_response()))
}

/// Signed session for `email` with a throwaway access token.
#[allow(dead_code)]
pub fn login_cookie(state: &AppState, email: &str) -> String {
    session_cookie(state, &TokenBundle::new("test-access-token"), Some(email))
}

/// All `Set-Cookie` lines of a response.
#[allow(dead_code)]
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Fold `Set-Cookie` lines into a request `Cookie` header value.
#[allow(dead_code)]
pub fn cookie_header(set_cookies: &[String]) -> String {
    set_cookies
        .iter()
        .map(|c| c.split(';').next().unwrap().to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read back the session a response wrote.
#[allow(dead_code)]
pub fn written_session(state: &AppState, response: &Response) -> (Option<TokenBundle>, Option<String>) {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        cookie_header(&set_cookies(response)).parse().unwrap(),
    );
    let jar = state.sessions.jar(&headers);
    (state.sessions.read_tokens(&jar), state.sessions.read_identity(&jar))
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[allow(dead_code)]
pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Identity token with an `email` claim, shaped like a real provider's.
#[allow(dead_code)]
pub fn id_token_for(email: &str) -> String {
    #[derive(Serialize)]
    struct Claims<'a> {
        iss: &'a str,
        sub: &'a str,
        email: &'a str,
        email_verified: bool,
        exp: u64,
    }

    encode(
        &Header::default(),
        &Claims {
            iss: "https://accounts.google.com",
            sub: "110169484474386276334",
            email,
            email_verified: true,
            exp: 4_102_444_800,
        },
        &EncodingKey::from_secret(b"mock-provider-key"),
    )
    .unwrap()
}

/// Local stand-in for Google's token, userinfo and Calendar endpoints.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockGoogle {
    pub token_status: StatusCode,
    pub token_body: Value,
    /// `None` makes userinfo answer 401.
    pub userinfo_email: Option<String>,
    pub events: Value,
    pub token_forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub calendar_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

#[allow(dead_code)]
impl MockGoogle {
    pub fn new(token_body: Value) -> Self {
        Self {
            token_status: StatusCode::OK,
            token_body,
            userinfo_email: None,
            events: json!({ "items": [] }),
            token_forms: Arc::default(),
            calendar_queries: Arc::default(),
        }
    }

    /// Serve on an ephemeral localhost port; returns endpoints pointing at it.
    pub async fn spawn(&self) -> GoogleEndpoints {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = Router::new()
            .route("/token", routing::post(mock_token))
            .route("/userinfo", routing::get(mock_userinfo))
            .route("/calendar/v3/calendars/primary/events", routing::get(mock_events))
            .with_state(Arc::new(self.clone()));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        GoogleEndpoints {
            auth_url: format!("http://{addr}/auth"),
            token_url: format!("http://{addr}/token"),
            userinfo_url: format!("http://{addr}/userinfo"),
            calendar_api_url: format!("http://{addr}/calendar/v3"),
        }
    }
}

async fn mock_token(
    State(mock): State<Arc<MockGoogle>>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    mock.token_forms.lock().unwrap().push(form);
    (mock.token_status, Json(mock.token_body.clone()))
}

async fn mock_userinfo(State(mock): State<Arc<MockGoogle>>, headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));

    match (&mock.userinfo_email, authorized) {
        (Some(email), true) => Json(json!({ "id": "1", "email": email })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_token" }))).into_response(),
    }
}

async fn mock_events(
    State(mock): State<Arc<MockGoogle>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    mock.calendar_queries.lock().unwrap().push(query);
    Json(mock.events.clone())
}
