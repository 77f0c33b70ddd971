//! Request authentication middleware.
//!
//! Provides the [`BearerAuth`] axum extractor that verifies a session
//! credential before a protected handler runs, plus the HTTP response
//! mapping for [`crate::AuthError`].

pub mod auth;
pub mod error;

pub use auth::{AuthState, BearerAuth, VerifiedSession};
