//! Authentication request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use quadrant_core::models::auth::{Principal, TokenPair};

use crate::AppState;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub access_token: String,
}

/// `POST /auth/signup`: create a new account.
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> AppResult<(StatusCode, &'static str)> {
    state
        .credentials
        .sign_up(&body.firstname, &body.lastname, &body.username, &body.password)
        .await?;
    Ok((StatusCode::CREATED, "You have successfully signed up"))
}

/// `POST /auth/login`: exchange username/password for a token pair.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.credentials.login(&body.username, &body.password).await?;
    Ok(Json(pair))
}

/// `POST /auth/refresh`: exchange a refresh token for a new pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state
        .credentials
        .refresh(&body.access_token, &body.refresh_token)
        .await?;
    Ok(Json(pair))
}

/// `POST /auth/logout`: revoke the refresh binding and denylist the access
/// token. Idempotent.
pub async fn logout_handler(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> AppResult<&'static str> {
    state.credentials.logout(&body.access_token).await?;
    Ok("You have successfully logged out")
}

/// `GET /auth/authority`: elevate the current user to `ADMIN`.
pub async fn authority_handler(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> AppResult<&'static str> {
    let Extension(principal) =
        principal.ok_or_else(|| AppError::Forbidden("No authentication information.".into()))?;
    state.credentials.elevate_to_admin(&principal).await?;
    Ok("Role ADMIN added to user")
}
