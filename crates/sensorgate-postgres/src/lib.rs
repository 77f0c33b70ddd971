//! PostgreSQL durable-store backend for Sensorgate.
//!
//! Provides persistent storage for:
//!
//! - identity records (`users` table: id, unique username, password verifier)
//! - the append-only sensor reading audit log (`sensor_readings` table)
//!
//! The [`PostgresUserStore`] implements the `UserStore` seam from
//! `sensorgate-auth` using parameterized queries only.
//!
//! # Example
//!
//! ```ignore
//! use sensorgate_postgres::{PostgresConfig, PostgresUserStore, create_pool, ensure_schema};
//!
//! let pool = create_pool(&config).await?;
//! ensure_schema(&pool).await?;
//! let users = PostgresUserStore::new(Arc::new(pool));
//! ```

pub mod pool;
pub mod schema;
pub mod user_store;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use pool::{PostgresConfig, create_pool, test_connection};
pub use schema::{ensure_schema, seed_user};
pub use user_store::PostgresUserStore;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during durable-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// Resource already exists (conflict).
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl StorageError {
    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Result type for durable-store operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::conflict("username 'testuser' already exists");
        assert_eq!(
            err.to_string(),
            "Conflict: username 'testuser' already exists"
        );
        assert!(err.is_conflict());
    }
}
