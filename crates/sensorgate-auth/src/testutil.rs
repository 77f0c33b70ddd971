//! In-memory store implementations for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::password::hash_password;
use crate::session::SessionStore;
use crate::store::{UserRecord, UserStore};
use crate::AuthResult;

/// In-memory `UserStore` with a recorded audit log.
pub(crate) struct MemoryUserStore {
    users: Mutex<HashMap<i64, UserRecord>>,
    readings: Mutex<Vec<(i64, String, f64)>>,
    fail_readings: bool,
}

impl MemoryUserStore {
    pub(crate) fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            readings: Mutex::new(Vec::new()),
            fail_readings: false,
        }
    }

    /// Store seeded with one user; the password is hashed for real so the
    /// login path exercises actual verification.
    pub(crate) fn with_user(id: i64, username: &str, password: &str) -> Self {
        let store = Self::new();
        store.insert_user(id, username, password);
        store
    }

    pub(crate) fn insert_user(&self, id: i64, username: &str, password: &str) {
        let record = UserRecord {
            id,
            username: username.to_string(),
            password_hash: hash_password(password).unwrap(),
        };
        self.users.lock().unwrap().insert(id, record);
    }

    pub(crate) fn remove_user(&self, id: i64) {
        self.users.lock().unwrap().remove(&id);
    }

    pub(crate) fn failing_readings(mut self) -> Self {
        self.fail_readings = true;
        self
    }

    pub(crate) fn readings(&self) -> Vec<(i64, String, f64)> {
        self.readings.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<UserRecord>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn insert_reading(&self, user_id: i64, label: &str, value: f64) -> AuthResult<()> {
        if self.fail_readings {
            return Err(AuthError::upstream("reading log unavailable"));
        }
        self.readings
            .lock()
            .unwrap()
            .push((user_id, label.to_string(), value));
        Ok(())
    }
}

/// In-memory `SessionStore`. TTLs are recorded but not enforced; tests that
/// need expiry drive it through [`MemorySessionStore::remove`].
pub(crate) struct MemorySessionStore {
    entries: Mutex<HashMap<String, (String, Duration)>>,
}

impl MemorySessionStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub(crate) fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    pub(crate) fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Duration::ZERO));
    }

    pub(crate) fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn fetch(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(value, _)| value.clone()))
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }
}
