//! Durable store trait.
//!
//! Defines the interface the core uses against the relational backing
//! store. The PostgreSQL implementation lives in `sensorgate-postgres`.

use async_trait::async_trait;

use crate::AuthResult;

// =============================================================================
// User Record
// =============================================================================

/// An identity record from the durable store.
///
/// Created at bootstrap or registration; immutable within this crate's
/// scope. Username uniqueness is enforced by the store.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Durable-store primary key.
    pub id: i64,
    /// Unique username.
    pub username: String,
    /// Opaque password verifier (PHC string).
    pub password_hash: String,
}

// =============================================================================
// User Store Trait
// =============================================================================

/// Storage operations against the durable store.
///
/// Implementations must use parameterized queries only; injection safety is
/// part of this contract. All operations are safe for concurrent use.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find an identity record by username.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable or the query fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>>;

    /// Find an identity record by id.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable or the query fails.
    async fn find_by_id(&self, id: i64) -> AuthResult<Option<UserRecord>>;

    /// Append a sensor reading to the audit log.
    ///
    /// Append-only; readings are never read back by this core.
    ///
    /// # Errors
    /// Returns an error if the insert fails. Callers on the login path
    /// treat this as best-effort and must not fail the request.
    async fn insert_reading(&self, user_id: i64, label: &str, value: f64) -> AuthResult<()>;
}
