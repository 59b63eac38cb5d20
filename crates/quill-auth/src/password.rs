//! Password hashing helpers.
//!
//! Thin wrappers over bcrypt so the rest of the crate never touches the
//! hashing library directly. The default cost is used; each hash carries
//! its own salt.

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

/// Hashes a plaintext password with a fresh salt.
///
/// # Errors
///
/// Returns [`BcryptError`] if hashing fails.
pub fn hash_password(plaintext: &str) -> Result<String, BcryptError> {
    hash(plaintext, DEFAULT_COST)
}

/// Checks a plaintext password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns [`BcryptError`] if the stored hash is malformed.
pub fn verify_password(plaintext: &str, password_hash: &str) -> Result<bool, BcryptError> {
    verify(plaintext, password_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hashed = hash_password("hunter2").expect("hashing should succeed");
        assert_ne!(hashed, "hunter2", "plaintext must never be stored");
        assert!(verify_password("hunter2", &hashed).expect("verify should succeed"));
        assert!(!verify_password("wrong", &hashed).expect("verify should succeed"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("hunter2").expect("hashing should succeed");
        let b = hash_password("hunter2").expect("hashing should succeed");
        assert_ne!(a, b, "each hash should carry its own salt");
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("hunter2", "not-a-bcrypt-hash").is_err());
    }
}
