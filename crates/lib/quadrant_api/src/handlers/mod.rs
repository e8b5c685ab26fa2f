//! Request handlers.

pub mod auth;
pub mod endpoints;
pub mod users;
