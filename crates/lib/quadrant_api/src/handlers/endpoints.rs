//! Capability-gated demo endpoints.

/// `GET /endpoints/user`: requires authority `USER`.
pub async fn ordinary_users_only() -> &'static str {
    "Ordinary users only"
}

/// `GET /endpoints/admin`: requires authority `ADMIN`.
pub async fn admin_users_only() -> &'static str {
    "Admin users only"
}
