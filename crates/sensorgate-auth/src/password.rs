//! Password hashing and verification.
//!
//! Argon2id PHC strings. Verification is a pure comparison against the
//! stored hash; callers treat it as an opaque yes/no capability.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::error::AuthError;

/// Hashes a plaintext password into a PHC string.
///
/// # Errors
/// Returns an error if salt generation or hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AuthError::upstream(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::upstream(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::upstream(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Verifies a plaintext password against a stored PHC hash.
///
/// Returns `false` for an unparseable hash rather than erroring, so a
/// damaged stored verifier behaves like a wrong password.
#[must_use]
pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "password123"));
        assert!(!verify_password(&hash, "password124"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("password123").unwrap();
        let b = hash_password("password123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unparseable_hash_rejects() {
        assert!(!verify_password("not-a-phc-string", "password123"));
        assert!(!verify_password("", "password123"));
    }
}
