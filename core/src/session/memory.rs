//! In-process session store.

use super::{SessionError, SessionFuture, SessionId, SessionStore};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Default idle lifetime of a session.
pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
struct Entry {
    values: HashMap<String, Value>,
    expires_at: Instant,
}

/// Session store backed by a mutex-guarded map.
///
/// Sessions expire after `lifetime` without access; every read or write
/// slides the expiry forward. Expired sessions are dropped lazily on access
/// and by [`MemorySessionStore::purge_expired`].
///
/// Data does not survive a restart and is not shared between processes. Use
/// the Redis store when running more than one server.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Entry>>>,
    lifetime: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_LIFETIME)
    }
}

impl MemorySessionStore {
    /// Create an empty store whose sessions live for `lifetime` when idle.
    #[must_use]
    pub fn new(lifetime: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            lifetime,
        }
    }

    /// Drop every expired session and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn purge_expired(&self) -> Result<usize, SessionError> {
        let now = Instant::now();
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        Ok(before - sessions.len())
    }

    /// Number of live sessions (for tests and diagnostics).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn session_count(&self) -> Result<usize, SessionError> {
        let now = Instant::now();
        Ok(self
            .lock()?
            .values()
            .filter(|entry| entry.expires_at > now)
            .count())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, Entry>>, SessionError> {
        self.sessions
            .lock()
            .map_err(|_| SessionError::Backend("Mutex lock failed".to_string()))
    }

    /// Run `f` against the live values of `id`, creating the session when
    /// `create` is set. Expired sessions are treated as absent.
    fn with_entry<T>(
        &self,
        id: SessionId,
        create: bool,
        f: impl FnOnce(Option<&mut HashMap<String, Value>>) -> T,
    ) -> Result<T, SessionError> {
        let now = Instant::now();
        let mut sessions = self.lock()?;

        if sessions.get(&id).is_some_and(|entry| entry.expires_at <= now) {
            sessions.remove(&id);
        }

        if create {
            sessions.entry(id).or_insert_with(|| Entry {
                values: HashMap::new(),
                expires_at: now,
            });
        }

        let entry = sessions.get_mut(&id).map(|entry| {
            entry.expires_at = now + self.lifetime;
            &mut entry.values
        });
        Ok(f(entry))
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, id: SessionId, key: &str, value: Value) -> SessionFuture<'_, ()> {
        let result = self.with_entry(id, true, |values| {
            if let Some(values) = values {
                values.insert(key.to_string(), value);
            }
        });
        Box::pin(async move { result })
    }

    fn get(&self, id: SessionId, key: &str) -> SessionFuture<'_, Option<Value>> {
        let result = self.with_entry(id, false, |values| {
            values.and_then(|values| values.get(key).cloned())
        });
        Box::pin(async move { result })
    }

    fn take(&self, id: SessionId, key: &str) -> SessionFuture<'_, Option<Value>> {
        let result = self.with_entry(id, false, |values| {
            values.and_then(|values| values.remove(key))
        });
        Box::pin(async move { result })
    }

    fn remove(&self, id: SessionId, key: &str) -> SessionFuture<'_, ()> {
        let result = self.with_entry(id, false, |values| {
            if let Some(values) = values {
                values.remove(key);
            }
        });
        Box::pin(async move { result })
    }

    fn exists(&self, id: SessionId, key: &str) -> SessionFuture<'_, bool> {
        let result = self.with_entry(id, false, |values| {
            values.is_some_and(|values| values.contains_key(key))
        });
        Box::pin(async move { result })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_get_take() {
        let store = MemorySessionStore::default();
        let id = SessionId::new();

        store.put(id, "reservation", json!({"first_name": "John"})).await.unwrap();
        assert!(store.exists(id, "reservation").await.unwrap());
        assert_eq!(
            store.get(id, "reservation").await.unwrap(),
            Some(json!({"first_name": "John"}))
        );

        let taken = store.take(id, "reservation").await.unwrap();
        assert!(taken.is_some());
        assert_eq!(store.take(id, "reservation").await.unwrap(), None);
        assert!(!store.exists(id, "reservation").await.unwrap());
    }

    #[tokio::test]
    async fn reads_do_not_create_sessions() {
        let store = MemorySessionStore::default();
        let id = SessionId::new();

        assert_eq!(store.get(id, "anything").await.unwrap(), None);
        store.remove(id, "anything").await.unwrap();
        assert_eq!(store.session_count().unwrap(), 0);

        store.put(id, "anything", json!(true)).await.unwrap();
        assert_eq!(store.session_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = MemorySessionStore::new(Duration::from_millis(20));
        let id = SessionId::new();

        store.put(id, "flash", json!("hi")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get(id, "flash").await.unwrap(), None);
        assert_eq!(store.session_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn purge_drops_only_expired_sessions() {
        let store = MemorySessionStore::new(Duration::from_millis(20));
        let stale = SessionId::new();
        store.put(stale, "k", json!(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let fresh = SessionId::new();
        store.put(fresh, "k", json!(2)).await.unwrap();

        assert_eq!(store.purge_expired().unwrap(), 1);
        assert_eq!(store.get(fresh, "k").await.unwrap(), Some(json!(2)));
    }
}
