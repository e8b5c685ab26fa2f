//! User administration handlers. Admin-only routes.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use quadrant_core::models::auth::{Role, User};

use crate::AppState;
use crate::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct SaveUserRequest {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// `POST /users/save`: create or replace a user record.
pub async fn save_user_handler(
    State(state): State<AppState>,
    Json(body): Json<SaveUserRequest>,
) -> AppResult<Json<User>> {
    let user = state
        .users
        .save_user(
            &body.firstname,
            &body.lastname,
            &body.username,
            &body.password,
            body.role.unwrap_or(Role::User),
        )
        .await?;
    Ok(Json(user))
}

/// `GET /users/all`: list every user.
pub async fn list_users_handler(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.users.list_all_users().await?;
    Ok(Json(users))
}

/// `DELETE /users/delete/{id}`: remove a user by id.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<&'static str> {
    state.users.delete_user(id).await?;
    Ok("User deleted")
}
