//! Bearer credential verification extractor.
//!
//! This module provides the axum extractor that validates bearer tokens on
//! protected routes and attaches the verified claims to the handler.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use sensorgate_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected(BearerAuth(session): BearerAuth) -> String {
//!     format!("Hello, {}!", session.claims.username)
//! }
//!
//! let app = Router::new()
//!     .route("/api/protected-data", get(protected))
//!     .with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::session::{SessionRecord, SessionStore, session_key};
use crate::token::{SessionClaims, TokenService};

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer credential verification.
///
/// Include this in your application state and expose it to the
/// [`BearerAuth`] extractor via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Token service for signature and expiry validation.
    pub tokens: Arc<TokenService>,

    /// Fast-store session tier; `None` when the tier is disabled, in which
    /// case verification accepts tokens on signature and expiry alone.
    pub sessions: Option<Arc<dyn SessionStore>>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(tokens: Arc<TokenService>, sessions: Option<Arc<dyn SessionStore>>) -> Self {
        Self { tokens, sessions }
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// A verified session attached to a protected request.
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    /// Claims extracted from the validated token.
    pub claims: SessionClaims,
    /// The exact token string that was presented.
    pub token: String,
}

/// Axum extractor that validates bearer credentials.
///
/// Verification is a linear fallible chain with early exit:
/// 1. Extract the `Authorization: Bearer <token>` header
/// 2. Validate signature and expiry
/// 3. If the session tier is enabled, cross-check the stored session
///    record: it must exist, parse, and hold this exact token (only the
///    most recent login's token is valid per subject)
///
/// # Errors
///
/// Returns `AuthError` (which implements `IntoResponse`) for each failure
/// kind; see [`crate::error::AuthError`] for the mapping.
#[derive(Debug)]
pub struct BearerAuth(pub VerifiedSession);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingCredential)?;

        // Any scheme other than Bearer is a malformed credential (401), not
        // an invalid token (403); 403s are reserved for material that was
        // actually checked against the signing key or the session record.
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedCredential)?;

        let claims = auth_state.tokens.decode(token).map_err(|e| {
            tracing::debug!(error = %e, "credential rejected");
            AuthError::invalid_token(e.to_string())
        })?;

        if let Some(store) = &auth_state.sessions {
            let raw = store
                .fetch(&session_key(claims.sub))
                .await?
                .ok_or(AuthError::SessionNotFound)?;

            let record: SessionRecord = serde_json::from_str(&raw).map_err(|e| {
                tracing::warn!(sub = claims.sub, error = %e, "session record unparseable");
                AuthError::corrupt_session(e.to_string())
            })?;

            if record.token != token {
                tracing::debug!(sub = claims.sub, "presented token superseded by later login");
                return Err(AuthError::SessionMismatch);
            }
        }

        tracing::debug!(username = %claims.username, "credential verified");
        Ok(BearerAuth(VerifiedSession {
            claims,
            token: token.to_string(),
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================
