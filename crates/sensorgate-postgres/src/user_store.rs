//! PostgreSQL implementation of the durable-store trait.
//!
//! Identity lookups use parameterized queries against the `users` table;
//! sensor readings are appended to `sensor_readings`. Database failures
//! surface as upstream errors at the trait boundary so callers never see
//! driver detail.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use sensorgate_auth::{AuthError, AuthResult, UserRecord, UserStore};

use crate::{PgPool, StorageResult};

/// Durable store backed by PostgreSQL.
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    /// Create a new store with a shared connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn fetch_by_username(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        let row: Option<(i64, String, String)> = query_as(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(record_from_tuple))
    }

    async fn fetch_by_id(&self, id: i64) -> StorageResult<Option<UserRecord>> {
        let row: Option<(i64, String, String)> = query_as(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(record_from_tuple))
    }

    async fn append_reading(&self, user_id: i64, label: &str, value: f64) -> StorageResult<()> {
        query(
            r#"
            INSERT INTO sensor_readings (user_id, reading_type, reading_value)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(label)
        .bind(value)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}

/// Create from database tuple.
fn record_from_tuple(row: (i64, String, String)) -> UserRecord {
    UserRecord {
        id: row.0,
        username: row.1,
        password_hash: row.2,
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        self.fetch_by_username(username)
            .await
            .map_err(|e| AuthError::upstream(e.to_string()))
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<UserRecord>> {
        self.fetch_by_id(id)
            .await
            .map_err(|e| AuthError::upstream(e.to_string()))
    }

    async fn insert_reading(&self, user_id: i64, label: &str, value: f64) -> AuthResult<()> {
        self.append_reading(user_id, label, value)
            .await
            .map_err(|e| AuthError::upstream(e.to_string()))
    }
}
