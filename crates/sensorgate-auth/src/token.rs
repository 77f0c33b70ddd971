//! Session token generation and validation.
//!
//! Credentials are self-contained HS256 JWTs signed with a process-wide
//! secret. A token carries the subject id, username, and the sensor value
//! captured at login; validity is bounded by `exp`.
//!
//! ## Example
//!
//! ```ignore
//! let service = TokenService::new("secret", Duration::from_secs(3600));
//! let issued = service.issue(42, "alice", 21.5)?;
//! let claims = service.decode(&issued.0)?;
//! assert_eq!(claims.sub, 42);
//! ```

use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding failure.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    Decoding {
        /// Description of the decoding failure.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,
}

impl TokenError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Decoding` error.
    #[must_use]
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::decoding(err.to_string()),
        }
    }
}

// ============================================================================
// Session Claims
// ============================================================================

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject: the user's durable-store id.
    pub sub: i64,

    /// Username at the time of login.
    pub username: String,

    /// Sensor value submitted with the login request. Per-token data, never
    /// cached with the profile.
    pub sensor_value: f64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    /// Creates claims expiring `ttl` from now.
    #[must_use]
    pub fn new(sub: i64, username: impl Into<String>, sensor_value: f64, ttl: Duration) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub,
            username: username.into(),
            sensor_value,
            iat: now,
            exp: now + ttl.as_secs() as i64,
        }
    }
}

// ============================================================================
// Token Service
// ============================================================================

/// Service for signing and verifying session tokens.
///
/// Thread-safe (`Send + Sync`); share it across tasks behind an `Arc`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Creates a new token service from the process-wide signing secret.
    #[must_use]
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Returns the configured token validity window.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a signed token for the given subject.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn issue(
        &self,
        sub: i64,
        username: &str,
        sensor_value: f64,
    ) -> Result<(String, SessionClaims), TokenError> {
        let claims = SessionClaims::new(sub, username, sensor_value, self.ttl);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::encoding(e.to_string()))?;
        Ok((token, claims))
    }

    /// Decodes and validates a token, checking signature and expiry.
    ///
    /// # Errors
    /// Returns an error if the signature is invalid, the token has expired,
    /// or the payload cannot be parsed.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn test_issue_and_decode() {
        let service = service();
        let (token, claims) = service.issue(7, "testuser", 23.4).unwrap();
        assert!(!token.is_empty());
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.exp, claims.iat + 3600);

        let decoded = service.decode(&token).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.username, "testuser");
        assert_eq!(decoded.sensor_value, 23.4);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service();
        // Claims that expired an hour ago, signed with the real key.
        let mut claims = SessionClaims::new(7, "testuser", 1.0, Duration::from_secs(0));
        claims.iat -= 7200;
        claims.exp -= 3600;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let result = service.decode(&token);
        assert!(matches!(result.unwrap_err(), TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = TokenService::new("secret-a", Duration::from_secs(3600));
        let verifier = TokenService::new("secret-b", Duration::from_secs(3600));

        let (token, _) = signer.issue(7, "testuser", 1.0).unwrap();
        let result = verifier.decode(&token);
        assert!(matches!(result.unwrap_err(), TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let service = service();
        let (token, _) = service.issue(7, "testuser", 1.0).unwrap();

        // Flip a character inside the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(service.decode(&tampered).is_err());
    }

    #[test]
    fn test_garbage_token_is_decoding_error() {
        let service = service();
        let result = service.decode("not-a-jwt");
        assert!(matches!(result.unwrap_err(), TokenError::Decoding { .. }));
    }
}
