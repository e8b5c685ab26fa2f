//! Password hashing via bcrypt.

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Injected password-hashing collaborator.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Production hasher (bcrypt, cost 10).
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptHasher;

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        bcrypt::verify(password, hash)
            .map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = BcryptHasher;
        let hash = hasher.hash("p@ss").unwrap();
        assert_ne!(hash, "p@ss");
        assert!(hasher.verify("p@ss", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }
}
