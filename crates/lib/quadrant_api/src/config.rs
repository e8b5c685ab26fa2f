//! API server configuration.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use tracing::warn;

/// Default access token lifetime: 30 minutes.
const DEFAULT_ACCESS_TOKEN_DURATION_MS: i64 = 30 * 60 * 1_000;

/// Default refresh token lifetime: 7 days.
const DEFAULT_REFRESH_TOKEN_DURATION_MS: i64 = 7 * 24 * 60 * 60 * 1_000;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC-SHA256 signing secret.
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime in milliseconds.
    pub access_token_duration_millis: i64,
    /// Refresh token lifetime in milliseconds.
    pub refresh_token_duration_millis: i64,
}

impl ApiConfig {
    /// Reads configuration from environment variables with defaults.
    ///
    /// | Variable                             | Default                            |
    /// |--------------------------------------|------------------------------------|
    /// | `BIND_ADDR`                          | `127.0.0.1:8080`                   |
    /// | `DATABASE_URL`                       | `postgres://localhost:5432/quadrant` |
    /// | `QUADRANT_JWT_SECRET`                | generated per process, with warning |
    /// | `QUADRANT_ACCESS_TOKEN_DURATION_MS`  | `1800000` (30 min)                 |
    /// | `QUADRANT_REFRESH_TOKEN_DURATION_MS` | `604800000` (7 days)               |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/quadrant".into()),
            jwt_secret: resolve_jwt_secret(),
            access_token_duration_millis: duration_from_env(
                "QUADRANT_ACCESS_TOKEN_DURATION_MS",
                DEFAULT_ACCESS_TOKEN_DURATION_MS,
            ),
            refresh_token_duration_millis: duration_from_env(
                "QUADRANT_REFRESH_TOKEN_DURATION_MS",
                DEFAULT_REFRESH_TOKEN_DURATION_MS,
            ),
        }
    }
}

fn duration_from_env(var: &str, default: i64) -> i64 {
    match std::env::var(var) {
        Ok(raw) => match raw.parse::<i64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                warn!(var, value = %raw, "ignoring invalid duration, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Resolve the signing secret: `QUADRANT_JWT_SECRET` (base64url or raw),
/// otherwise a random 256-bit key generated for this process.
///
/// A configured secret always wins. Under a generated key, issued tokens do
/// not outlive the process.
fn resolve_jwt_secret() -> Vec<u8> {
    if let Ok(secret) = std::env::var("QUADRANT_JWT_SECRET")
        && !secret.is_empty()
    {
        if let Ok(bytes) = URL_SAFE_NO_PAD.decode(&secret)
            && bytes.len() >= 32
        {
            return bytes;
        }
        return secret.into_bytes();
    }
    warn!("no QUADRANT_JWT_SECRET configured; using an ephemeral signing key, tokens will not survive a restart");
    let mut key = vec![0u8; 32];
    rand::rng().fill_bytes(&mut key);
    key
}
