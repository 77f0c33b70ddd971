//! Credential issuing: the login flow.
//!
//! Verifies identity against the durable store, mints a signed session
//! token, records the session in the fast store when that tier is enabled,
//! and appends the submitted sensor reading to the audit log (best-effort).

use std::sync::Arc;

use crate::error::AuthError;
use crate::password::verify_password;
use crate::session::{SESSION_TTL, SessionRecord, SessionStore, session_key};
use crate::store::UserStore;
use crate::token::{SessionClaims, TokenService};
use crate::AuthResult;

/// Audit-log label for the reading captured at login.
const READING_LABEL: &str = "sensor_value";

/// A freshly minted credential. Ownership transfers to the caller; the
/// issuer keeps no copy beyond the optional session record.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// The signed session token.
    pub token: String,
    /// The claims embedded in the token.
    pub claims: SessionClaims,
}

/// Issues session credentials from verified identity claims.
pub struct LoginService {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
    sessions: Option<Arc<dyn SessionStore>>,
}

impl LoginService {
    /// Creates a new login service.
    ///
    /// `sessions` is `None` when the fast-store tier is disabled; the
    /// session-record write is skipped entirely in that mode.
    #[must_use]
    pub fn new(
        tokens: Arc<TokenService>,
        users: Arc<dyn UserStore>,
        sessions: Option<Arc<dyn SessionStore>>,
    ) -> Self {
        Self {
            tokens,
            users,
            sessions,
        }
    }

    /// Authenticates a user and mints a session credential.
    ///
    /// On success this has up to two side effects: one fast-store write
    /// (when the tier is enabled, overwriting any prior session record for
    /// the subject) and one best-effort audit-log insert.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` with a fixed generic message for an unknown
    /// username or a wrong password; the two are indistinguishable to the
    /// caller. Store failures other than the audit insert propagate.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        sensor_value: f64,
    ) -> AuthResult<IssuedCredential> {
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::debug!("login rejected: unknown username");
            return Err(AuthError::bad_credentials());
        };

        if !verify_password(&user.password_hash, password) {
            tracing::debug!(username = %user.username, "login rejected: password mismatch");
            return Err(AuthError::bad_credentials());
        }

        let (token, claims) = self
            .tokens
            .issue(user.id, &user.username, sensor_value)
            .map_err(|e| AuthError::upstream(e.to_string()))?;

        if let Some(store) = &self.sessions {
            let record = SessionRecord::new(token.clone(), sensor_value);
            let raw =
                serde_json::to_string(&record).map_err(|e| AuthError::upstream(e.to_string()))?;
            store.store(&session_key(user.id), &raw, SESSION_TTL).await?;
            tracing::debug!(username = %user.username, "session record stored");
        }

        // Audit append is best-effort: never fail a successful login over it.
        if let Err(e) = self
            .users
            .insert_reading(user.id, READING_LABEL, sensor_value)
            .await
        {
            tracing::warn!(username = %user.username, error = %e, "failed to record sensor reading");
        }

        tracing::info!(username = %user.username, "login succeeded");
        Ok(IssuedCredential { token, claims })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testutil::{MemorySessionStore, MemoryUserStore};

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new("test-secret", Duration::from_secs(3600)))
    }

    #[tokio::test]
    async fn test_login_mints_decodable_token() {
        let users = Arc::new(MemoryUserStore::with_user(1, "testuser", "password123"));
        let tokens = tokens();
        let service = LoginService::new(tokens.clone(), users, None);

        let issued = service.login("testuser", "password123", 21.5).await.unwrap();
        let claims = tokens.decode(&issued.token).unwrap();
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.username, "testuser");
        assert_eq!(claims.sensor_value, 21.5);
        assert_eq!(issued.claims, claims);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let users = Arc::new(MemoryUserStore::with_user(1, "testuser", "password123"));
        let service = LoginService::new(tokens(), users, None);

        let unknown = service.login("ghost", "whatever", 1.0).await.unwrap_err();
        let wrong = service.login("testuser", "nope", 1.0).await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, AuthError::Unauthorized { .. }));
        assert!(matches!(wrong, AuthError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_session_record_written_when_tier_enabled() {
        let users = Arc::new(MemoryUserStore::with_user(1, "testuser", "password123"));
        let sessions = Arc::new(MemorySessionStore::new());
        let service = LoginService::new(tokens(), users, Some(sessions.clone()));

        let issued = service.login("testuser", "password123", 3.0).await.unwrap();

        let raw = sessions.fetch(&session_key(1)).await.unwrap().unwrap();
        let record: SessionRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(record.token, issued.token);
        assert_eq!(record.sensor_value, 3.0);
    }

    #[tokio::test]
    async fn test_no_session_write_when_tier_disabled() {
        let users = Arc::new(MemoryUserStore::with_user(1, "testuser", "password123"));
        let service = LoginService::new(tokens(), users, None);

        service.login("testuser", "password123", 3.0).await.unwrap();
        // Nothing to assert against a store; the absence of an error is the
        // contract (the write is skipped, not attempted and ignored).
    }

    #[tokio::test]
    async fn test_second_login_overwrites_session_record() {
        let users = Arc::new(MemoryUserStore::with_user(1, "testuser", "password123"));
        let sessions = Arc::new(MemorySessionStore::new());
        let service = LoginService::new(tokens(), users, Some(sessions.clone()));

        let first = service.login("testuser", "password123", 1.0).await.unwrap();
        let second = service.login("testuser", "password123", 2.0).await.unwrap();

        assert_eq!(sessions.len(), 1);
        let raw = sessions.fetch(&session_key(1)).await.unwrap().unwrap();
        let record: SessionRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(record.token, second.token);
        assert_ne!(record.token, first.token);
    }

    #[tokio::test]
    async fn test_reading_appended_on_success() {
        let users = Arc::new(MemoryUserStore::with_user(1, "testuser", "password123"));
        let service = LoginService::new(tokens(), users.clone(), None);

        service.login("testuser", "password123", 9.25).await.unwrap();
        let readings = users.readings();
        assert_eq!(readings, vec![(1, "sensor_value".to_string(), 9.25)]);
    }

    #[tokio::test]
    async fn test_reading_failure_does_not_fail_login() {
        let users = Arc::new(
            MemoryUserStore::with_user(1, "testuser", "password123").failing_readings(),
        );
        let service = LoginService::new(tokens(), users, None);

        // The audit insert fails internally; the login must still succeed.
        let issued = service.login("testuser", "password123", 1.0).await.unwrap();
        assert!(!issued.token.is_empty());
    }

    #[tokio::test]
    async fn test_failed_login_appends_no_reading() {
        let users = Arc::new(MemoryUserStore::with_user(1, "testuser", "password123"));
        let service = LoginService::new(tokens(), users.clone(), None);

        service.login("testuser", "wrong", 1.0).await.unwrap_err();
        assert!(users.readings().is_empty());
    }
}
