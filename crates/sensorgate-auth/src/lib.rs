//! Authentication and session core for Sensorgate.
//!
//! This crate owns the protocol logic of the gateway:
//!
//! - issuing signed session credentials at login ([`login::LoginService`])
//! - verifying bearer credentials on protected requests
//!   ([`middleware::BearerAuth`])
//! - resolving user profiles through the cache-aside read path
//!   ([`profile::ProfileResolver`])
//!
//! Storage is abstracted behind two seams: [`store::UserStore`] (the durable
//! relational store) and [`session::SessionStore`] (the optional TTL-capable
//! fast store). Backends live in `sensorgate-postgres` and the server crate.

pub mod error;
pub mod login;
pub mod middleware;
pub mod password;
pub mod profile;
pub mod session;
pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::AuthError;
pub use login::{IssuedCredential, LoginService};
pub use middleware::{AuthState, BearerAuth, VerifiedSession};
pub use profile::{ProfileResolver, ProfileResponse, ProfileSource};
pub use session::{
    CachedProfile, PROFILE_TTL, SESSION_TTL, SessionRecord, SessionStore, profile_key, session_key,
};
pub use store::{UserRecord, UserStore};
pub use token::{SessionClaims, TokenService};

/// Result type used throughout the auth crate.
pub type AuthResult<T> = Result<T, AuthError>;
