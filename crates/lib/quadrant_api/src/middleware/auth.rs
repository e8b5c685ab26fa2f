//! Authentication filter and authority guards.
//!
//! The filter runs on every request and only establishes identity: it
//! resolves the bearer token, verifies it, consults the denylist and, when
//! all of that passes, publishes a [`Principal`] into request extensions.
//! It always continues the chain. Authorization decisions live in the
//! guards, evaluated after the filter.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::info;

use quadrant_core::models::auth::Principal;

use crate::AppState;
use crate::error::AppError;

/// Extract the bearer token from the `Authorization` header.
fn resolve_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Per-request authentication filter.
///
/// Withholds the principal on any token failure or denylist hit and
/// never short-circuits the response itself.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = resolve_token(request.headers())
        && state.tokens.validate_token(token)
    {
        if state.registry.get(token).is_some() {
            info!("denylisted access token presented");
        } else {
            match state.tokens.get_authentication(token) {
                Ok(principal) => {
                    request.extensions_mut().insert(principal);
                }
                Err(e) => info!(error = %e, "bearer token yielded no principal"),
            }
        }
    }
    next.run(request).await
}

/// Guard: the filter must have published a principal.
pub async fn require_principal(request: Request, next: Next) -> Result<Response, AppError> {
    if request.extensions().get::<Principal>().is_none() {
        return Err(AppError::Forbidden("authentication required".into()));
    }
    Ok(next.run(request).await)
}

/// Guard: the published principal must hold `authority`.
pub async fn require_authority(
    authority: &'static str,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match request.extensions().get::<Principal>() {
        Some(principal) if principal.has_authority(authority) => Ok(next.run(request).await),
        _ => Err(AppError::Forbidden(format!("authority {authority} required"))),
    }
}
