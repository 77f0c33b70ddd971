//! Cache-aside profile resolution for protected reads.
//!
//! Read path: fast store first when the tier is enabled, durable store on
//! miss, repopulating the cache with a short, session-independent TTL. The
//! token's sensor value is per-token data: it is merged into the response
//! fresh on every call and never written to the cache.

use std::sync::Arc;

use serde::Serialize;

use crate::error::AuthError;
use crate::session::{CachedProfile, PROFILE_TTL, SessionStore, profile_key};
use crate::store::UserStore;
use crate::token::SessionClaims;
use crate::AuthResult;

/// Domain suffix for derived email addresses.
const EMAIL_DOMAIN: &str = "example.com";

/// Fixed default role attached to synthesized profiles.
const DEFAULT_ROLE: &str = "user";

// =============================================================================
// Response Types
// =============================================================================

/// Where the resolved profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    /// Served from the fast store.
    Cache,
    /// Served from the durable store (and cached if the tier is enabled).
    Database,
}

impl ProfileSource {
    /// Returns the label used in responses and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Database => "database",
        }
    }
}

/// Profile payload returned to the caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileData {
    /// Subject id.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Derived email address.
    pub email: String,
    /// Role label.
    pub role: String,
    /// Sensor value from the verified token claims, attached fresh on every
    /// resolution.
    pub sensor_value_from_token: f64,
}

/// Full protected-read response body.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    /// Human-readable greeting.
    pub message: String,
    /// Attribution of where the profile fields came from.
    pub source: ProfileSource,
    /// The merged profile.
    pub data: ProfileData,
}

// =============================================================================
// Profile Resolver
// =============================================================================

/// Resolves profiles for verified subjects via the cache-aside read path.
pub struct ProfileResolver {
    users: Arc<dyn UserStore>,
    sessions: Option<Arc<dyn SessionStore>>,
}

impl ProfileResolver {
    /// Creates a new resolver. `sessions` is `None` when the fast-store
    /// tier is disabled; the durable store is then the sole source.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, sessions: Option<Arc<dyn SessionStore>>) -> Self {
        Self { users, sessions }
    }

    /// Resolves the profile for the subject of the given verified claims.
    ///
    /// # Errors
    ///
    /// Returns `ProfileNotFound` if the identity referenced by a still-valid
    /// token no longer exists in the durable store. Store failures
    /// propagate as `Upstream`.
    pub async fn resolve(&self, claims: &SessionClaims) -> AuthResult<ProfileResponse> {
        let mut cached: Option<CachedProfile> = None;

        if let Some(store) = &self.sessions {
            if let Some(raw) = store.fetch(&profile_key(claims.sub)).await? {
                match serde_json::from_str::<CachedProfile>(&raw) {
                    Ok(profile) => {
                        tracing::debug!(username = %claims.username, "profile cache hit");
                        cached = Some(profile);
                    }
                    Err(e) => {
                        // An unparseable entry is treated as a miss and
                        // overwritten by the repopulation below.
                        tracing::warn!(
                            username = %claims.username,
                            error = %e,
                            "discarding unparseable profile cache entry"
                        );
                    }
                }
            }
        }

        let (profile, source) = match cached {
            Some(profile) => (profile, ProfileSource::Cache),
            None => {
                tracing::debug!(username = %claims.username, "profile cache miss, querying durable store");
                let Some(user) = self.users.find_by_id(claims.sub).await? else {
                    tracing::warn!(sub = claims.sub, "profile subject no longer exists");
                    return Err(AuthError::ProfileNotFound);
                };

                let profile = CachedProfile {
                    id: user.id,
                    username: user.username.clone(),
                    email: format!("{}@{EMAIL_DOMAIN}", user.username),
                    role: DEFAULT_ROLE.to_string(),
                };

                if let Some(store) = &self.sessions {
                    let raw = serde_json::to_string(&profile)
                        .map_err(|e| AuthError::upstream(e.to_string()))?;
                    store
                        .store(&profile_key(claims.sub), &raw, PROFILE_TTL)
                        .await?;
                    tracing::debug!(username = %claims.username, "profile cache entry written");
                }

                (profile, ProfileSource::Database)
            }
        };

        Ok(ProfileResponse {
            message: format!("Hello, {}! Here is your protected data.", claims.username),
            source,
            data: ProfileData {
                id: profile.id,
                username: profile.username,
                email: profile.email,
                role: profile.role,
                sensor_value_from_token: claims.sensor_value,
            },
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
