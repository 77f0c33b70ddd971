//! Startup wiring: durable store, fast store, and core services.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use sensorgate_auth::{AuthState, LoginService, ProfileResolver, TokenService, UserStore};
use sensorgate_postgres::{PostgresUserStore, create_pool, ensure_schema, seed_user, test_connection};

use crate::cache::create_session_store;
use crate::config::AppConfig;
use crate::server::AppState;

/// Connects the backing stores and assembles the application state.
///
/// Order matters: the schema must exist before the seed account insert,
/// and both happen before the server accepts traffic.
///
/// # Errors
///
/// Returns an error if the database is unreachable or bootstrap DDL
/// fails. A missing Redis never fails startup; the session tier degrades
/// instead (see [`create_session_store`]).
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = create_pool(&config.postgres)
        .await
        .context("failed to connect to PostgreSQL")?;

    test_connection(&pool)
        .await
        .context("database connection test failed")?;

    ensure_schema(&pool)
        .await
        .context("failed to ensure database schema")?;

    if config.bootstrap.seed_user {
        let hash = sensorgate_auth::password::hash_password(&config.bootstrap.password)
            .context("failed to hash seed password")?;
        seed_user(&pool, &config.bootstrap.username, &hash)
            .await
            .context("failed to seed user")?;
    }

    let sessions = create_session_store(&config.redis).await;

    let tokens = Arc::new(TokenService::new(
        &config.auth.secret,
        Duration::from_secs(config.auth.token_ttl_secs),
    ));
    let users: Arc<dyn UserStore> = Arc::new(PostgresUserStore::new(Arc::new(pool)));

    Ok(AppState {
        auth: AuthState::new(tokens.clone(), sessions.clone()),
        login: Arc::new(LoginService::new(tokens, users.clone(), sessions.clone())),
        profiles: Arc::new(ProfileResolver::new(users, sessions)),
    })
}
