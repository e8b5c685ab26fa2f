//! Authentication domain models.
//!
//! These are internal domain models; wire DTOs with their own field naming
//! live next to the HTTP handlers.

use serde::{Deserialize, Serialize};

/// Capability label held by a user. A user holds exactly one role; the
/// authority string derived from it (`USER` / `ADMIN`) is the capability
/// embedded in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    /// The authority string carried in token claims.
    pub fn authority(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Parse the persisted authority string back into a role.
    pub fn from_authority(s: &str) -> Option<Role> {
        match s {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Domain user as persisted in the `users` table.
///
/// The password hash is never serialized out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

/// Authenticated identity published into the per-request context by the
/// authentication filter. Carries no credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub name: String,
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

/// JWT claims. Access tokens carry `sub` and `auth`; refresh tokens carry
/// only issuer and the issuance/expiry pair. Timestamps are epoch millis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, always the constant service issuer.
    pub iss: String,
    /// Subject username (absent on refresh tokens).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at (unix epoch millis).
    pub iat: i64,
    /// Expiry (unix epoch millis).
    pub exp: i64,
    /// Comma-joined authority strings (absent on refresh tokens).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

/// Immutable token pair returned by issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Always `"Bearer"`.
    pub grant_type: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Refresh token lifetime as a millisecond count (not an epoch).
    pub refresh_token_expiration_millis: i64,
}
