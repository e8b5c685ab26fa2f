//! Authentication building blocks.
//!
//! Token signing and verification, password hashing and the user repository
//! abstraction shared by the HTTP layer and the server binary.

pub mod jwt;
pub mod password;
pub mod repository;

use thiserror::Error;

/// Failure kinds surfaced by token verification.
///
/// Verification that fails on expiry alone still lets callers read the
/// claims through [`jwt::TokenProvider::parse_claims`]; the refresh and
/// logout flows depend on recovering the subject from an expired access
/// token whose MAC is intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("empty token")]
    Empty,

    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    BadSignature,

    #[error("expired token")]
    Expired,

    #[error("unsupported token algorithm")]
    Unsupported,

    #[error("token carries no authority claim")]
    NoAuthorityClaim,
}

/// Infrastructure failures surfaced by the core collaborators.
///
/// Domain refusals (bad credentials, validation, missing users) are the
/// HTTP layer's taxonomy; core only reports what its backends broke on.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
