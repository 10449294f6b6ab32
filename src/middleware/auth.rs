// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::error::AppError;
use crate::models::Owner;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Require a signed identity cookie and expose it as an [`Owner`] extension.
///
/// Data handlers only ever see the owner inserted here; no request parameter
/// can name a different one.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = state.sessions.jar(request.headers());
    let owner = state
        .sessions
        .read_identity(&jar)
        .and_then(Owner::new)
        .ok_or(AppError::NotAuthenticated)?;

    request.extensions_mut().insert(owner);

    Ok(next.run(request).await)
}
