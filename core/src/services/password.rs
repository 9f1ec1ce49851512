//! Password hashing primitives.
//!
//! Thin wrapper over bcrypt so no other module touches the hashing
//! library directly and raw passwords never reach an entity.

use crate::errors::DomainError;

/// Hash a raw password with bcrypt's default cost.
pub fn hash_password(password: &str) -> Result<String, DomainError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| DomainError::Internal {
        message: format!("Failed to hash password: {}", e),
    })
}

/// Verify a raw password against a stored bcrypt hash.
///
/// A malformed stored hash is an internal error, not a mismatch; the
/// two must not be conflated or corrupt rows would read as bad logins.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, DomainError> {
    bcrypt::verify(password, password_hash).map_err(|e| DomainError::Internal {
        message: format!("Failed to verify password: {}", e),
    })
}

/// Hash an opaque token value for at-rest storage (SHA-256 hex).
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash).unwrap());
        assert!(!verify_password("hunter3!", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_token_is_deterministic_hex() {
        let h1 = hash_token("refresh-value");
        let h2 = hash_token("refresh-value");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, hash_token("other-value"));
    }
}
