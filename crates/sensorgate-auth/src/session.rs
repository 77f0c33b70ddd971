//! Fast-store session tier: trait, record types, keys, and TTLs.
//!
//! The fast store is an optional cache layer toggled once per process
//! lifetime. When configured, it holds two kinds of records per subject:
//!
//! - a **session record** (`session:{id}`) proving that a token is the most
//!   recently issued one for that subject, expiring with the token;
//! - a **profile cache entry** (`profile:{id}`) holding a synthesized
//!   profile with its own, shorter expiry.
//!
//! Everything in the fast store can be reconstructed from the durable store
//! except the session record, which is a revocation signal layered on top
//! of the self-sufficient signed token.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;

/// Session record lifetime, equal to token validity.
pub const SESSION_TTL: Duration = Duration::from_secs(3600);

/// Profile cache entry lifetime, independent of (and shorter than)
/// session lifetime.
pub const PROFILE_TTL: Duration = Duration::from_secs(300);

/// Cache key for a subject's session record.
#[must_use]
pub fn session_key(user_id: i64) -> String {
    format!("session:{user_id}")
}

/// Cache key for a subject's profile cache entry.
#[must_use]
pub fn profile_key(user_id: i64) -> String {
    format!("profile:{user_id}")
}

// =============================================================================
// Session Store Trait
// =============================================================================

/// Get/set-with-TTL over string keys against the fast store.
///
/// Implementations are safe for concurrent use; per-key write atomicity is
/// the store's contract and gives last-login-wins without extra
/// coordination. Store failures are on the critical path and propagate.
///
/// The tier's *disabled* mode is represented by the absence of a store
/// (`Option<Arc<dyn SessionStore>>` is `None`); core logic branches on that
/// before any fast-store call.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the raw value for a key, or `None` if absent/expired.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn fetch(&self, key: &str) -> AuthResult<Option<String>>;

    /// Store a value under a key with the given expiry, overwriting any
    /// prior value.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable or rejects the write.
    async fn store(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()>;
}

// =============================================================================
// Record Types
// =============================================================================

/// Fast-store proof that a token is the most recent one for a subject.
///
/// At most one live record exists per subject id; a later login overwrites
/// an earlier one. Its absence, when the tier is enabled, invalidates an
/// otherwise well-signed token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    /// The exact token minted at login.
    pub token: String,

    /// When the login happened.
    #[serde(with = "time::serde::rfc3339")]
    pub logged_in_at: OffsetDateTime,

    /// Sensor value submitted with the login.
    pub sensor_value: f64,
}

impl SessionRecord {
    /// Creates a record for a freshly minted token.
    #[must_use]
    pub fn new(token: impl Into<String>, sensor_value: f64) -> Self {
        Self {
            token: token.into(),
            logged_in_at: OffsetDateTime::now_utc(),
            sensor_value,
        }
    }
}

/// Fast-store copy of a synthesized profile.
///
/// Written lazily on the first protected read after a cache miss; never
/// written at login and never proactively invalidated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedProfile {
    /// Subject id.
    pub id: i64,
    /// Username from the durable store.
    pub username: String,
    /// Derived email address.
    pub email: String,
    /// Fixed default role.
    pub role: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_per_subject() {
        assert_eq!(session_key(42), "session:42");
        assert_eq!(profile_key(42), "profile:42");
        assert_ne!(session_key(1), session_key(2));
    }

    #[test]
    fn test_session_record_round_trip() {
        let record = SessionRecord::new("tok-abc", 21.5);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"token\":\"tok-abc\""));
        assert!(json.contains("logged_in_at"));

        let parsed: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_session_record_rejects_foreign_shape() {
        // A profile entry must not parse as a session record.
        let profile = CachedProfile {
            id: 1,
            username: "testuser".to_string(),
            email: "testuser@example.com".to_string(),
            role: "user".to_string(),
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(serde_json::from_str::<SessionRecord>(&json).is_err());
    }

    #[test]
    fn test_ttls_are_decoupled() {
        assert!(PROFILE_TTL < SESSION_TTL);
        assert_eq!(SESSION_TTL.as_secs(), 3600);
        assert_eq!(PROFILE_TTL.as_secs(), 300);
    }
}
