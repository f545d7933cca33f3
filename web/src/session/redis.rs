//! Redis-based session store implementation.
//!
//! # Architecture
//!
//! Each session is one Redis hash:
//! - **Key**: `session:{session_id}`
//! - **Fields**: session keys, values are JSON text
//! - **TTL**: the session lifetime, refreshed on every access (sliding window)
//!
//! `take` reads and deletes the field inside a `MULTI`/`EXEC` pipeline, so
//! concurrent takes of the same key have at most one winner.
//!
//! # Example
//!
//! ```no_run
//! use bookings_web::session::RedisSessionStore;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379", Duration::from_secs(86_400)).await?;
//! # Ok(())
//! # }
//! ```

use bookings_core::session::{SessionError, SessionFuture, SessionId, SessionStore};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde_json::Value;
use std::time::Duration;

/// Redis-backed [`SessionStore`] with sliding expiration.
///
/// Cloning is cheap; clones share the connection manager.
#[derive(Clone)]
pub struct RedisSessionStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
    /// Idle lifetime in whole seconds.
    ttl_seconds: i64,
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Connect to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    /// * `lifetime` - how long an idle session survives
    ///
    /// # Errors
    ///
    /// Returns error if connection to Redis fails.
    pub async fn new(redis_url: &str, lifetime: Duration) -> Result<Self, SessionError> {
        let client = Client::open(redis_url)
            .map_err(|e| backend(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            backend(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self {
            conn_manager,
            ttl_seconds: i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX),
        })
    }

    /// Get the Redis key for a session.
    fn session_key(id: SessionId) -> String {
        format!("session:{id}")
    }

    /// Push the session's expiry forward if it exists.
    async fn touch(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = self.conn_manager.clone();
        let _: bool = conn
            .expire(key, self.ttl_seconds)
            .await
            .map_err(|e| backend(format!("Failed to refresh session TTL: {e}")))?;
        Ok(())
    }
}

impl SessionStore for RedisSessionStore {
    fn put(&self, id: SessionId, key: &str, value: Value) -> SessionFuture<'_, ()> {
        let field = key.to_string();
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let session_key = Self::session_key(id);

            let _: () = redis::pipe()
                .atomic()
                .hset(&session_key, &field, value.to_string())
                .ignore()
                .expire(&session_key, self.ttl_seconds)
                .ignore()
                .query_async(&mut conn)
                .await
                .map_err(|e| backend(format!("Failed to write session value: {e}")))?;

            tracing::debug!(session_id = %id, key = %field, "Stored session value in Redis");
            Ok(())
        })
    }

    fn get(&self, id: SessionId, key: &str) -> SessionFuture<'_, Option<Value>> {
        let field = key.to_string();
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let session_key = Self::session_key(id);

            let raw: Option<String> = conn
                .hget(&session_key, &field)
                .await
                .map_err(|e| backend(format!("Failed to read session value: {e}")))?;

            self.touch(&session_key).await?;
            raw.map(|raw| parse(&field, &raw)).transpose()
        })
    }

    fn take(&self, id: SessionId, key: &str) -> SessionFuture<'_, Option<Value>> {
        let field = key.to_string();
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let session_key = Self::session_key(id);

            let (raw, _removed): (Option<String>, i64) = redis::pipe()
                .atomic()
                .hget(&session_key, &field)
                .hdel(&session_key, &field)
                .query_async(&mut conn)
                .await
                .map_err(|e| backend(format!("Failed to take session value: {e}")))?;

            self.touch(&session_key).await?;
            raw.map(|raw| parse(&field, &raw)).transpose()
        })
    }

    fn remove(&self, id: SessionId, key: &str) -> SessionFuture<'_, ()> {
        let field = key.to_string();
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let session_key = Self::session_key(id);

            let _: i64 = conn
                .hdel(&session_key, &field)
                .await
                .map_err(|e| backend(format!("Failed to remove session value: {e}")))?;
            Ok(())
        })
    }

    fn exists(&self, id: SessionId, key: &str) -> SessionFuture<'_, bool> {
        let field = key.to_string();
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let session_key = Self::session_key(id);

            conn.hexists(&session_key, &field)
                .await
                .map_err(|e| backend(format!("Failed to check session value: {e}")))
        })
    }
}

fn backend(message: String) -> SessionError {
    SessionError::Backend(message)
}

fn parse(key: &str, raw: &str) -> Result<Value, SessionError> {
    serde_json::from_str(raw).map_err(|e| SessionError::Malformed {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Note: These tests require a running Redis instance
    // Run with: docker run -d -p 6379:6379 redis:7-alpine

    async fn store() -> RedisSessionStore {
        #[allow(clippy::unwrap_used)]
        RedisSessionStore::new("redis://127.0.0.1:6379", Duration::from_secs(60))
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)]
    async fn test_redis_session_lifecycle() {
        let store = store().await;
        let id = SessionId::new();

        store.put(id, "reservation", json!({"first_name": "John"})).await.unwrap();
        assert!(store.exists(id, "reservation").await.unwrap());
        assert_eq!(
            store.get(id, "reservation").await.unwrap(),
            Some(json!({"first_name": "John"}))
        );

        store.remove(id, "reservation").await.unwrap();
        assert!(!store.exists(id, "reservation").await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)]
    async fn test_take_has_single_winner() {
        let store = store().await;
        let id = SessionId::new();
        store.put(id, "reservation", json!(1)).await.unwrap();

        let (a, b) = tokio::join!(store.take(id, "reservation"), store.take(id, "reservation"));
        let winners = [a.unwrap(), b.unwrap()].into_iter().flatten().count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)]
    async fn test_session_has_ttl() {
        let store = store().await;
        let id = SessionId::new();
        store.put(id, "flash", json!("hi")).await.unwrap();

        let mut conn = store.conn_manager.clone();
        let ttl: i64 = conn.ttl(RedisSessionStore::session_key(id)).await.unwrap();
        assert!(ttl > 0 && ttl <= 60);
    }
}
