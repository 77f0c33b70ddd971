//! Application configuration.
//!
//! Settings come from an optional TOML file with environment-variable
//! overrides for deployment knobs. All sections have serde defaults so an
//! empty file (or no file at all) yields a runnable development
//! configuration.
//!
//! Environment overrides:
//!
//! | Variable            | Setting              |
//! |---------------------|----------------------|
//! | `SENSORGATE_HOST`   | `server.host`        |
//! | `SENSORGATE_PORT`   | `server.port`        |
//! | `DATABASE_URL`      | `postgres.url`       |
//! | `REDIS_URL`         | `redis.url`          |
//! | `USE_REDIS_SESSION` | `redis.enabled`      |
//! | `JWT_SECRET`        | `auth.secret`        |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use sensorgate_postgres::PostgresConfig;

// =============================================================================
// Sections
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Redis configuration for the optional fast-store session tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Enable the fast-store tier. When disabled, tokens are accepted on
    /// signature and expiry alone and profile reads always hit the
    /// database.
    pub enabled: bool,
    /// Redis connection URL (e.g., "redis://localhost:6379").
    pub url: String,
    /// Connection pool size.
    pub pool_size: usize,
    /// Connection timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "redis://localhost:6379".to_string(),
            pool_size: 8,
            timeout_ms: 2000,
        }
    }
}

/// Token signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared signing secret. Must be overridden outside development.
    pub secret: String,
    /// Token validity in seconds.
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: "change-me".to_string(),
            token_ttl_secs: 3600,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (overridden by `RUST_LOG` when set).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Bootstrap configuration (initial development account).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Create the seed account at startup if absent.
    pub seed_user: bool,
    /// Seed account username.
    pub username: String,
    /// Seed account password.
    pub password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            seed_user: true,
            username: "testuser".to_string(),
            password: "password123".to_string(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Durable store settings.
    pub postgres: PostgresConfig,
    /// Fast-store session tier settings.
    pub redis: RedisConfig,
    /// Token signing settings.
    pub auth: AuthConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Bootstrap settings.
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.host.parse::<IpAddr>().is_err() {
            return Err(format!("server.host is not a valid address: {}", self.server.host));
        }
        if self.auth.secret.is_empty() {
            return Err("auth.secret must not be empty".into());
        }
        if self.auth.token_ttl_secs == 0 {
            return Err("auth.token_ttl_secs must be > 0".into());
        }
        if self.postgres.url.is_empty() {
            return Err("postgres.url must not be empty".into());
        }
        if self.redis.enabled && self.redis.url.is_empty() {
            return Err("redis.url must not be empty when redis.enabled".into());
        }
        if self.bootstrap.seed_user && self.bootstrap.username.is_empty() {
            return Err("bootstrap.username must not be empty".into());
        }
        Ok(())
    }

    /// Resolved bind address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        let ip = self
            .server
            .host
            .parse::<IpAddr>()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.server.port)
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Loads configuration from an optional TOML file, then applies
/// environment overrides.
///
/// A missing file is not an error; defaults are used.
///
/// # Errors
///
/// Returns a message if the file exists but cannot be read or parsed, or
/// if an environment override has an invalid value.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
    let mut config = match path {
        Some(p) if Path::new(p).exists() => {
            let raw = std::fs::read_to_string(p)
                .map_err(|e| format!("failed to read config file {p}: {e}"))?;
            toml::from_str(&raw).map_err(|e| format!("failed to parse config file {p}: {e}"))?
        }
        _ => AppConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<(), String> {
    if let Ok(host) = std::env::var("SENSORGATE_HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("SENSORGATE_PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| format!("SENSORGATE_PORT is not a valid port: {port}"))?;
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.postgres.url = url;
    }
    if let Ok(url) = std::env::var("REDIS_URL") {
        config.redis.url = url;
    }
    if let Ok(flag) = std::env::var("USE_REDIS_SESSION") {
        config.redis.enabled = parse_bool(&flag)
            .ok_or_else(|| format!("USE_REDIS_SESSION is not a valid boolean: {flag}"))?;
    }
    if let Ok(secret) = std::env::var("JWT_SECRET") {
        config.auth.secret = secret;
    }
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
