//! Credential service: signup/login/refresh/logout orchestration.
//!
//! Owns all writes to the registry. The refresh binding for a user lives
//! under `RT:<username>` and is overwritten on every issuance (last write
//! wins across concurrent logins); denylisted access tokens are keyed by
//! the token string itself.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::info;

use quadrant_core::auth::jwt::TokenProvider;
use quadrant_core::auth::password::PasswordHasher;
use quadrant_core::auth::repository::UserRepository;
use quadrant_core::models::auth::{Principal, Role, TokenPair, User};
use quadrant_core::registry::TokenRegistry;

use crate::error::{AppError, AppResult};

const REFRESH_KEY_PREFIX: &str = "RT:";
const DENYLIST_VALUE: &str = "logout";

fn refresh_key(username: &str) -> String {
    format!("{REFRESH_KEY_PREFIX}{username}")
}

/// Constant-time string equality, so registry lookups cannot become a
/// timing oracle for refresh tokens.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Orchestrates the credential lifecycle over its injected collaborators.
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenProvider>,
    registry: TokenRegistry,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordHasher>,
        tokens: Arc<TokenProvider>,
        registry: TokenRegistry,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
            registry,
        }
    }

    /// Create a new account with `Role::User`.
    pub async fn sign_up(
        &self,
        first_name: &str,
        last_name: &str,
        username: &str,
        password: &str,
    ) -> AppResult<()> {
        if username.is_empty() {
            return Err(AppError::Validation("username must not be empty".into()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("password must not be empty".into()));
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Validation("The username already exists.".into()));
        }

        let password_hash = self.passwords.hash(password)?;
        self.users
            .save(User {
                id: 0,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                username: username.to_string(),
                password_hash,
                role: Role::User,
            })
            .await?;

        info!(username, "user signed up");
        Ok(())
    }

    /// Verify credentials, mint a pair and store the refresh binding.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::Credentials("Username not found".into()))?;

        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(AppError::Credentials("Invalid credentials".into()));
        }

        let authorities = vec![user.role.authority().to_string()];
        let pair = self.tokens.generate_token(&user.username, &authorities)?;
        self.registry.put(
            &refresh_key(&user.username),
            &pair.refresh_token,
            pair.refresh_token_expiration_millis,
        );

        info!(username, "login succeeded");
        Ok(pair)
    }

    /// Exchange a valid refresh token (plus the paired access token, which
    /// may already be expired) for a fresh pair.
    pub async fn refresh(&self, access_token: &str, refresh_token: &str) -> AppResult<TokenPair> {
        if !self.tokens.validate_token(refresh_token) {
            return Err(AppError::Validation("Refresh token is invalid".into()));
        }

        // The subject comes from the access token; expiry is tolerated.
        let principal = self.tokens.get_authentication(access_token)?;

        let key = refresh_key(&principal.name);
        let stored = self
            .registry
            .get(&key)
            .ok_or_else(|| AppError::Validation("Invalid request".into()))?;
        if !constant_time_eq(&stored, refresh_token) {
            return Err(AppError::Validation(
                "The refresh token information does not match.".into(),
            ));
        }

        let pair = self
            .tokens
            .generate_token(&principal.name, &principal.authorities)?;
        self.registry.put(
            &key,
            &pair.refresh_token,
            pair.refresh_token_expiration_millis,
        );

        info!(username = %principal.name, "token pair refreshed");
        Ok(pair)
    }

    /// Drop the refresh binding and denylist the access token for the rest
    /// of its lifetime. Idempotent.
    pub async fn logout(&self, access_token: &str) -> AppResult<()> {
        if !self.tokens.validate_token(access_token) {
            return Err(AppError::Validation("Invalid Request".into()));
        }

        let principal = self.tokens.get_authentication(access_token)?;
        let key = refresh_key(&principal.name);
        if self.registry.get(&key).is_some() {
            self.registry.delete(&key);
        }

        // An already-expired token must not be denylisted.
        let remaining = self.tokens.get_expiration(access_token)?;
        if remaining > 0 {
            self.registry.put(access_token, DENYLIST_VALUE, remaining);
        }

        info!(username = %principal.name, "logged out");
        Ok(())
    }

    /// Elevate the user named by the published principal to `ADMIN`.
    ///
    /// Tokens minted before elevation keep their original authorities.
    pub async fn elevate_to_admin(&self, principal: &Principal) -> AppResult<()> {
        let mut user = self
            .users
            .find_by_username(&principal.name)
            .await?
            .ok_or_else(|| AppError::NotFound("No authentication information.".into()))?;

        user.role = Role::Admin;
        let username = user.username.clone();
        self.users.save(user).await?;

        info!(username, "role ADMIN granted");
        Ok(())
    }
}
