//! # quadrant_core
//!
//! Core credential-lifecycle logic for Quadrant: token signing and
//! verification, the refresh/revocation registry, password hashing and the
//! user repository abstraction.

pub mod auth;
pub mod clock;
pub mod migrate;
pub mod models;
pub mod registry;
pub mod testutil;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
