//! # quadrant_api
//!
//! HTTP API library for Quadrant: router, authentication filter, authority
//! guards, credential service and handlers.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::middleware::Next;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};

use quadrant_core::auth::jwt::TokenProvider;
use quadrant_core::auth::password::PasswordHasher;
use quadrant_core::auth::repository::UserRepository;
use quadrant_core::clock::Clock;
use quadrant_core::registry::TokenRegistry;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::handlers::{auth, endpoints, users};
use crate::middleware::auth::{authenticate, require_authority, require_principal};
use crate::services::auth::CredentialService;
use crate::services::users::UserService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Credential lifecycle orchestration.
    pub credentials: CredentialService,
    /// Admin-facing user management.
    pub users: UserService,
    /// Token signer/verifier.
    pub tokens: Arc<TokenProvider>,
    /// Refresh/denylist registry (read-only for the filter).
    pub registry: TokenRegistry,
}

impl AppState {
    /// Wire the services from their injected collaborators.
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        config: &ApiConfig,
    ) -> Self {
        let tokens = Arc::new(TokenProvider::new(
            &config.jwt_secret,
            config.access_token_duration_millis,
            config.refresh_token_duration_millis,
            clock.clone(),
        ));
        let registry = TokenRegistry::new(clock);
        Self {
            credentials: CredentialService::new(
                user_repository.clone(),
                password_hasher.clone(),
                tokens.clone(),
                registry.clone(),
            ),
            users: UserService::new(user_repository, password_hasher),
            tokens,
            registry,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `quadrant_core::migrate::migrate()` which owns the
/// migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    quadrant_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
///
/// Route partitions: signup/login/refresh are public; logout and elevation
/// require an authenticated principal; `/endpoints/*` require the matching
/// authority; `/users/*` are restricted to `ADMIN`. The authentication
/// filter itself runs on every route and never rejects.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/refresh", post(auth::refresh_handler));

    let session = Router::new()
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/authority", get(auth::authority_handler))
        .layer(axum::middleware::from_fn(require_principal));

    let user_endpoints = Router::new()
        .route("/endpoints/user", get(endpoints::ordinary_users_only))
        .layer(axum::middleware::from_fn(|request: Request, next: Next| {
            require_authority("USER", request, next)
        }));

    let admin_endpoints = Router::new()
        .route("/endpoints/admin", get(endpoints::admin_users_only))
        .layer(axum::middleware::from_fn(|request: Request, next: Next| {
            require_authority("ADMIN", request, next)
        }));

    let user_admin = Router::new()
        .route("/users/save", post(users::save_user_handler))
        .route("/users/all", get(users::list_users_handler))
        .route("/users/delete/{id}", delete(users::delete_user_handler))
        .layer(axum::middleware::from_fn(|request: Request, next: Next| {
            require_authority("ADMIN", request, next)
        }));

    Router::new()
        .merge(public)
        .merge(session)
        .merge(user_endpoints)
        .merge(admin_endpoints)
        .merge(user_admin)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            authenticate,
        ))
        .layer(cors)
        .with_state(state)
}
