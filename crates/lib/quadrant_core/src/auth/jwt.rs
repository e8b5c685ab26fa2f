//! JWT token generation and verification.
//!
//! [`TokenProvider`] owns the HS256 key material for the process lifetime
//! and mints access/refresh pairs as compact three-segment tokens. All
//! expiry arithmetic goes through the injected [`Clock`]; the library's own
//! exp validation is disabled because claims use epoch milliseconds and
//! because expired claims must remain readable for refresh and logout.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::info;

use super::{AuthError, TokenError};
use crate::clock::Clock;
use crate::models::auth::{Claims, Principal, TokenPair};

/// Constant issuer embedded in every signed token.
pub const ISSUER: &str = "quadrant";

/// Grant type reported with every issued pair.
const BEARER_TYPE: &str = "Bearer";

/// Signs and verifies token pairs for a fixed issuer and key.
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_duration_millis: i64,
    refresh_token_duration_millis: i64,
    clock: Arc<dyn Clock>,
}

impl TokenProvider {
    pub fn new(
        secret: &[u8],
        access_token_duration_millis: i64,
        refresh_token_duration_millis: i64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_token_duration_millis,
            refresh_token_duration_millis,
            clock,
        }
    }

    /// Mint an access/refresh pair for `username` holding `authorities`.
    ///
    /// The access token carries `sub` and the comma-joined `auth` claim;
    /// the refresh token carries only issuer and the issuance/expiry pair.
    pub fn generate_token(
        &self,
        username: &str,
        authorities: &[String],
    ) -> Result<TokenPair, AuthError> {
        let now = self.clock.now_millis();

        let access_claims = Claims {
            iss: ISSUER.to_string(),
            sub: Some(username.to_string()),
            iat: now,
            exp: now + self.access_token_duration_millis,
            auth: Some(authorities.join(",")),
        };
        let refresh_claims = Claims {
            iss: ISSUER.to_string(),
            sub: None,
            iat: now,
            exp: now + self.refresh_token_duration_millis,
            auth: None,
        };

        let access_token = encode(&Header::default(), &access_claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))?;

        Ok(TokenPair {
            grant_type: BEARER_TYPE.to_string(),
            access_token,
            refresh_token,
            refresh_token_expiration_millis: self.refresh_token_duration_millis,
        })
    }

    /// Decode and verify structure, signature, algorithm and issuer.
    ///
    /// Does **not** check expiry: a token past its `exp` still yields its
    /// claims here as long as the MAC verifies.
    pub fn parse_claims(&self, token: &str) -> Result<Claims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Empty);
        }
        decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::Unsupported
                }
                _ => TokenError::Malformed,
            })
    }

    /// Full verification including expiry against the injected clock.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.parse_claims(token)?;
        if self.clock.now_millis() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Extract the authenticated principal from an access token.
    ///
    /// Tolerates expiry so that logout and refresh can still identify the
    /// subject; requires a non-empty `auth` claim.
    pub fn get_authentication(&self, access_token: &str) -> Result<Principal, TokenError> {
        let claims = self.parse_claims(access_token)?;
        let auth = claims
            .auth
            .filter(|a| !a.is_empty())
            .ok_or(TokenError::NoAuthorityClaim)?;
        let name = claims.sub.ok_or(TokenError::Malformed)?;
        let authorities = auth.split(',').map(str::to_string).collect();
        Ok(Principal { name, authorities })
    }

    /// `true` only when the token fully verifies. All failure kinds are
    /// logged at info and swallowed; this never surfaces an error.
    pub fn validate_token(&self, token: &str) -> bool {
        match self.verify(token) {
            Ok(_) => true,
            Err(e) => {
                info!(error = %e, "token rejected");
                false
            }
        }
    }

    /// Remaining lifetime of a token in milliseconds: `exp - now`.
    ///
    /// Negative once the token has expired; callers must not denylist a
    /// token with a non-positive remainder.
    pub fn get_expiration(&self, token: &str) -> Result<i64, TokenError> {
        let claims = self.parse_claims(token)?;
        Ok(claims.exp - self.clock.now_millis())
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is epoch millis and checked against the injected clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_issuer(&[ISSUER]);
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ManualClock;

    const ACCESS_MS: i64 = 1_000;
    const REFRESH_MS: i64 = 10_000;

    fn provider_at(start: i64) -> (TokenProvider, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        let provider = TokenProvider::new(b"test-secret", ACCESS_MS, REFRESH_MS, clock.clone());
        (provider, clock)
    }

    #[test]
    fn round_trip_preserves_claims() {
        let (provider, _clock) = provider_at(1_000_000);
        let pair = provider
            .generate_token("alice", &["USER".to_string()])
            .unwrap();

        assert_eq!(pair.grant_type, "Bearer");
        assert_eq!(pair.refresh_token_expiration_millis, REFRESH_MS);

        let claims = provider.verify(&pair.access_token).unwrap();
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.sub.as_deref(), Some("alice"));
        assert_eq!(claims.auth.as_deref(), Some("USER"));
        assert_eq!(claims.iat, 1_000_000);
        assert_eq!(claims.exp, 1_000_000 + ACCESS_MS);
    }

    #[test]
    fn refresh_token_carries_no_subject_or_authorities() {
        let (provider, _clock) = provider_at(0);
        let pair = provider
            .generate_token("alice", &["USER".to_string()])
            .unwrap();

        let claims = provider.verify(&pair.refresh_token).unwrap();
        assert_eq!(claims.sub, None);
        assert_eq!(claims.auth, None);
        assert_eq!(claims.exp, REFRESH_MS);
    }

    #[test]
    fn authentication_reconstructs_authority_set() {
        let (provider, _clock) = provider_at(0);
        let pair = provider
            .generate_token("bob", &["USER".to_string(), "ADMIN".to_string()])
            .unwrap();

        let principal = provider.get_authentication(&pair.access_token).unwrap();
        assert_eq!(principal.name, "bob");
        assert_eq!(principal.authorities, vec!["USER", "ADMIN"]);
        assert!(principal.has_authority("ADMIN"));
        assert!(!principal.has_authority("ROOT"));
    }

    #[test]
    fn authentication_rejects_tokens_without_authorities() {
        let (provider, _clock) = provider_at(0);
        let pair = provider
            .generate_token("bob", &["USER".to_string()])
            .unwrap();

        // The refresh token has no auth claim.
        assert_eq!(
            provider.get_authentication(&pair.refresh_token),
            Err(TokenError::NoAuthorityClaim)
        );
    }

    #[test]
    fn authentication_tolerates_expiry() {
        let (provider, clock) = provider_at(0);
        let pair = provider
            .generate_token("carol", &["USER".to_string()])
            .unwrap();

        clock.advance(ACCESS_MS + 1);
        assert!(!provider.validate_token(&pair.access_token));

        let principal = provider.get_authentication(&pair.access_token).unwrap();
        assert_eq!(principal.name, "carol");
    }

    #[test]
    fn validation_window_is_half_open() {
        let (provider, clock) = provider_at(0);
        let pair = provider
            .generate_token("dave", &["USER".to_string()])
            .unwrap();

        assert!(provider.validate_token(&pair.access_token));
        clock.set(ACCESS_MS - 1);
        assert!(provider.validate_token(&pair.access_token));
        // now == exp is already expired.
        clock.set(ACCESS_MS);
        assert!(!provider.validate_token(&pair.access_token));
    }

    #[test]
    fn tampered_tokens_fail_validation() {
        let (provider, _clock) = provider_at(0);
        let pair = provider
            .generate_token("erin", &["USER".to_string()])
            .unwrap();

        // Flip one character in every segment in turn.
        for idx in [1, pair.access_token.len() / 2, pair.access_token.len() - 1] {
            let mut bytes = pair.access_token.clone().into_bytes();
            bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(!provider.validate_token(&tampered), "index {idx}");
        }
    }

    #[test]
    fn wrong_key_fails_with_bad_signature() {
        let (provider, clock) = provider_at(0);
        let other = TokenProvider::new(b"other-secret", ACCESS_MS, REFRESH_MS, clock);
        let pair = other.generate_token("mallory", &["USER".to_string()]).unwrap();

        assert_eq!(
            provider.parse_claims(&pair.access_token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn foreign_issuer_is_invalid() {
        // A structurally valid token signed with our key but a different iss.
        let clock: Arc<ManualClock> = Arc::new(ManualClock::new(0));
        let claims = Claims {
            iss: "someone-else".to_string(),
            sub: Some("alice".to_string()),
            iat: 0,
            exp: ACCESS_MS,
            auth: Some("USER".to_string()),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let provider = TokenProvider::new(b"test-secret", ACCESS_MS, REFRESH_MS, clock);
        assert_eq!(provider.parse_claims(&token), Err(TokenError::Malformed));
        assert!(!provider.validate_token(&token));
    }

    #[test]
    fn malformed_and_empty_inputs() {
        let (provider, _clock) = provider_at(0);
        assert_eq!(provider.parse_claims(""), Err(TokenError::Empty));
        assert_eq!(provider.parse_claims("   "), Err(TokenError::Empty));
        assert_eq!(
            provider.parse_claims("not-a-token"),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            provider.parse_claims("a.b.c"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn expiration_goes_negative_after_expiry() {
        let (provider, clock) = provider_at(0);
        let pair = provider
            .generate_token("frank", &["USER".to_string()])
            .unwrap();

        assert_eq!(provider.get_expiration(&pair.access_token).unwrap(), ACCESS_MS);
        clock.set(ACCESS_MS + 500);
        assert_eq!(provider.get_expiration(&pair.access_token).unwrap(), -500);
    }
}
