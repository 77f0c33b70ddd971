//! Sensorgate HTTP server.
//!
//! Wires the core auth services to axum routes, the PostgreSQL durable
//! store, and the optional Redis fast-store session tier.

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use bootstrap::build_state;
pub use cache::{CachedEntry, MemorySessionStore, RedisSessionStore, create_session_store};
pub use config::{AppConfig, AuthConfig, BootstrapConfig, LoggingConfig, RedisConfig, ServerConfig, load_config};
pub use observability::{init_tracing, init_tracing_with_level};
pub use server::{AppState, SensorgateServer, build_app};
