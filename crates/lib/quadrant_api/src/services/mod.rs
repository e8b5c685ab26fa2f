//! Service layer.

pub mod auth;
pub mod users;
