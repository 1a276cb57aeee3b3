//! services/api/src/web/middleware.rs
//!
//! Optional shared-secret check for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::web::{error::HttpError, state::AppState};

/// Middleware that enforces `Authorization: Bearer <API_TOKEN>` when a token is
/// configured. Without a configured token every request passes.
pub async fn require_api_token(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let Some(expected) = state.config.api_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            warn!("Rejected request to {} without a bearer token", req.uri().path());
            HttpError::Unauthorized
        })?;

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(next.run(req).await)
    } else {
        warn!("Rejected request to {} with a wrong token", req.uri().path());
        Err(HttpError::Unauthorized)
    }
}
