//! Fast-store backends for the session tier.
//!
//! ## Modes
//!
//! - **Disabled**: no store at all; verification accepts tokens on
//!   signature and expiry alone and profile reads always hit the database.
//! - **Memory (DashMap)**: single-instance, in-process store with lazy TTL
//!   eviction. Also the fallback when Redis is configured but unreachable.
//! - **Redis (deadpool)**: shared store for multi-instance deployments,
//!   using `GET` and `SET EX`.
//!
//! ## Graceful Degradation
//!
//! If Redis is enabled but the pool cannot be created or the first
//! connection fails, the server starts anyway on the memory backend.
//! Failures after startup are not masked: the stores are on the
//! verification critical path, so errors propagate to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use sensorgate_auth::{AuthError, AuthResult, SessionStore};

use crate::config::RedisConfig;

// =============================================================================
// Memory Backend
// =============================================================================

/// A cached entry with TTL support.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: String,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    /// Create a new cached entry.
    #[must_use]
    pub fn new(data: String, ttl: Duration) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// In-process fast store over a concurrent map.
///
/// Expired entries are dropped lazily on read. Per-key atomicity comes
/// from the map itself, so a later write for the same key cleanly
/// replaces an earlier one.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, CachedEntry>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_expired()).count()
    }

    /// Returns `true` if the store holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn fetch(&self, key: &str) -> AuthResult<Option<String>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.data.clone()));
            }
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        self.entries
            .insert(key.to_string(), CachedEntry::new(value.to_string(), ttl));
        Ok(())
    }
}

// =============================================================================
// Redis Backend
// =============================================================================

/// Redis-backed fast store using a deadpool connection pool.
pub struct RedisSessionStore {
    pool: Pool,
}

impl RedisSessionStore {
    /// Creates a store over an existing pool.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn fetch(&self, key: &str) -> AuthResult<Option<String>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthError::upstream(format!("redis connection: {e}")))?;

        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| AuthError::upstream(format!("redis GET {key}: {e}")))?;

        Ok(value)
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthError::upstream(format!("redis connection: {e}")))?;

        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(|e| AuthError::upstream(format!("redis SET {key}: {e}")))?;

        tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "fast-store set");
        Ok(())
    }
}

// =============================================================================
// Backend Selection
// =============================================================================

/// Creates the fast-store session tier from configuration.
///
/// Returns `None` when the tier is disabled. When Redis is enabled but
/// unreachable at startup, falls back to the memory backend so the server
/// can still run.
pub async fn create_session_store(config: &RedisConfig) -> Option<Arc<dyn SessionStore>> {
    if !config.enabled {
        tracing::info!("fast-store session tier disabled");
        return None;
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    if let Some(ref mut pool_config) = redis_config.pool {
        pool_config.max_size = config.pool_size;
        pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
    }

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create Redis pool. Falling back to memory store.");
            return Some(Arc::new(MemorySessionStore::new()));
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("Connected to Redis successfully");
            Some(Arc::new(RedisSessionStore::new(pool)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to connect to Redis. Falling back to memory store.");
            Some(Arc::new(MemorySessionStore::new()))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        store
            .store("session:1", "payload", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            store.fetch("session:1").await.unwrap().as_deref(),
            Some("payload")
        );
        assert_eq!(store.fetch("session:2").await.unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemorySessionStore::new();
        store
            .store("session:1", "first", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .store("session:1", "second", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            store.fetch("session:1").await.unwrap().as_deref(),
            Some("second")
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_expires_entries() {
        let store = MemorySessionStore::new();
        store
            .store("session:1", "payload", Duration::from_millis(0))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(store.fetch("session:1").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_tier_yields_no_store() {
        let config = RedisConfig {
            enabled: false,
            ..RedisConfig::default()
        };
        assert!(create_session_store(&config).await.is_none());
    }
}
