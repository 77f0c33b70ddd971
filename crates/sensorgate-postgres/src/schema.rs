//! Schema bootstrap for the durable store.
//!
//! Creates the `users` and `sensor_readings` tables on startup if they do
//! not already exist, and optionally seeds a development account. Both
//! statements are idempotent so restarts are safe.

use sqlx_core::query::query;
use tracing::{debug, info, instrument};

use crate::{PgPool, StorageResult};

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id              BIGSERIAL PRIMARY KEY,
    username        TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_SENSOR_READINGS: &str = r#"
CREATE TABLE IF NOT EXISTS sensor_readings (
    id              BIGSERIAL PRIMARY KEY,
    user_id         BIGINT NOT NULL REFERENCES users(id),
    reading_type    TEXT NOT NULL,
    reading_value   DOUBLE PRECISION NOT NULL,
    recorded_at     TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Creates the required tables if they do not exist.
///
/// # Errors
///
/// Returns an error if a DDL statement fails.
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> StorageResult<()> {
    query(CREATE_USERS).execute(pool).await?;
    query(CREATE_SENSOR_READINGS).execute(pool).await?;

    debug!("Database schema ensured");

    Ok(())
}

/// Inserts a user account unless the username is already taken.
///
/// Returns `true` if the account was created, `false` if it already
/// existed. The password verifier must already be hashed.
///
/// # Errors
///
/// Returns an error if the insert fails.
#[instrument(skip(pool, password_hash), fields(username = %username))]
pub async fn seed_user(pool: &PgPool, username: &str, password_hash: &str) -> StorageResult<bool> {
    let result = query(
        r#"
        INSERT INTO users (username, password_hash)
        VALUES ($1, $2)
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .execute(pool)
    .await?;

    let created = result.rows_affected() > 0;
    if created {
        info!(username = %username, "Seed user created");
    } else {
        debug!(username = %username, "Seed user already present");
    }

    Ok(created)
}
