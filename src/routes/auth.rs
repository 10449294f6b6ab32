// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth login, callback and logout routes.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::services::OAuthError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/start", get(auth_start))
        .route("/auth/callback", get(auth_callback))
        .route("/auth/logout", post(logout))
}

/// Value of the `calendarAuth` flag on failed callbacks.
#[derive(Debug, Clone, Copy)]
enum CallbackFailure {
    Missing,
    Failed,
}

impl CallbackFailure {
    fn as_str(self) -> &'static str {
        match self {
            CallbackFailure::Missing => "missing",
            CallbackFailure::Failed => "failed",
        }
    }
}

fn app_root(state: &AppState) -> String {
    format!("{}/", state.config.app_url)
}

fn failure_redirect(state: &AppState, failure: CallbackFailure) -> Redirect {
    Redirect::temporary(&format!(
        "{}?calendarAuth={}",
        app_root(state),
        failure.as_str()
    ))
}

/// Start OAuth flow - redirect to the consent screen, or straight home when
/// the session already holds a token bundle.
async fn auth_start(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Redirect> {
    let jar = state.sessions.jar(&headers);
    if state.sessions.read_tokens(&jar).is_some() {
        tracing::debug!("Session already has tokens, skipping consent");
        return Ok(Redirect::temporary(&app_root(&state)));
    }

    let auth_url = state.oauth.build_authorization_url().map_err(|e| match e {
        OAuthError::Config(config) => AppError::Configuration(config),
        other => AppError::Internal(other.into()),
    })?;

    tracing::info!("Starting OAuth flow, redirecting to Google");
    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange the code, resolve the email and write the
/// session cookies in one response.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        if let Some(error) = params.error {
            tracing::warn!(error = %error, "OAuth error from Google");
        }
        return failure_redirect(&state, CallbackFailure::Missing).into_response();
    };

    let fresh = match state.oauth.exchange_code(&code).await {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::error!(error = %e, "Authorization code exchange failed");
            return failure_redirect(&state, CallbackFailure::Failed).into_response();
        }
    };

    // Identity comes from the fresh bundle only; the merged one may still
    // carry an identity token from an earlier login.
    let email = state.identity.resolve_email(&fresh).await;
    match &email {
        Some(email) => tracing::info!(email = %email, "OAuth successful"),
        None => tracing::warn!("OAuth successful but no email could be resolved"),
    }

    let jar = state.sessions.jar(&headers);
    let merged = fresh.merged_over(state.sessions.read_tokens(&jar));
    let jar = state.sessions.set_session(jar, &merged, email.as_deref());

    (jar, Redirect::temporary(&app_root(&state))).into_response()
}

/// Logout - expire both session cookies.
async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (state.sessions.clear_session(), Redirect::to(&app_root(&state)))
}
