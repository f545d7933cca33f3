//! Per-visitor session storage.
//!
//! A [`SessionStore`] is a key-value store partitioned by [`SessionId`]. The
//! HTTP layer resolves the visitor's cookie to a `SessionId` and hands each
//! request a [`Session`], a typed handle bound to that one visitor.
//!
//! Values are stored as JSON so that any backend (memory, Redis) can hold
//! them. Reading a value back into the wrong type is a
//! [`SessionError::Malformed`] and is treated as an unexpected failure by
//! callers.
//!
//! # Example
//!
//! ```
//! use bookings_core::session::{MemorySessionStore, Session, SessionId};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), bookings_core::session::SessionError> {
//! let store = Arc::new(MemorySessionStore::default());
//! let session = Session::new(SessionId::new(), store);
//!
//! session.put("flash", "Reservation saved").await?;
//! let flash: Option<String> = session.pop("flash").await?;
//! assert_eq!(flash.as_deref(), Some("Reservation saved"));
//! assert!(!session.exists("flash").await?);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::{DEFAULT_SESSION_LIFETIME, MemorySessionStore};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Key holding the staged reservation between submission and summary.
pub const RESERVATION_KEY: &str = "reservation";

/// Key holding a human-readable failure message for the next page.
pub const ERROR_KEY: &str = "error";

/// Key holding a one-shot success message.
pub const FLASH_KEY: &str = "flash";

/// Key holding a one-shot warning.
pub const WARNING_KEY: &str = "warning";

/// Key whose presence marks the visitor as logged in.
pub const USER_ID_KEY: &str = "user_id";

/// Boxed future returned by [`SessionStore`] methods.
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SessionError>> + Send + 'a>>;

/// Errors from session storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The backing store could not be reached or refused the operation.
    #[error("Session backend error: {0}")]
    Backend(String),

    /// A stored value could not be encoded or decoded.
    #[error("Malformed session value for '{key}': {reason}")]
    Malformed {
        /// Session key being read or written.
        key: String,
        /// Serializer message.
        reason: String,
    },
}

/// Opaque identifier of one visitor's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier previously handed out in a cookie.
    ///
    /// Returns `None` for anything that is not a UUID.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key-value storage scoped to a session.
///
/// Implementations must be safe to share across request tasks. `take` must
/// be atomic: when two callers race on the same key, at most one of them
/// receives the value.
pub trait SessionStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` if the store is unreachable.
    fn put(&self, id: SessionId, key: &str, value: Value) -> SessionFuture<'_, ()>;

    /// Read the value under `key` without removing it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` if the store is unreachable.
    fn get(&self, id: SessionId, key: &str) -> SessionFuture<'_, Option<Value>>;

    /// Read and remove the value under `key` in one step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` if the store is unreachable.
    fn take(&self, id: SessionId, key: &str) -> SessionFuture<'_, Option<Value>>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` if the store is unreachable.
    fn remove(&self, id: SessionId, key: &str) -> SessionFuture<'_, ()>;

    /// Whether `key` currently holds a value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` if the store is unreachable.
    fn exists(&self, id: SessionId, key: &str) -> SessionFuture<'_, bool>;
}

/// A visitor's session for the duration of one request.
///
/// Cheap to clone; all clones address the same stored data.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Session {
    /// Bind `id` to `store`.
    #[must_use]
    pub fn new(id: SessionId, store: Arc<dyn SessionStore>) -> Self {
        Self { id, store }
    }

    /// The session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// - `Malformed`: `value` cannot be represented as JSON
    /// - `Backend`: the store rejected the write
    pub async fn put<T>(&self, key: &str, value: &T) -> Result<(), SessionError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(|e| malformed(key, &e))?;
        self.store.put(self.id, key, value).await
    }

    /// Read the value under `key`.
    ///
    /// # Errors
    ///
    /// - `Malformed`: the stored value does not decode as `T`
    /// - `Backend`: the store is unreachable
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, SessionError>
    where
        T: DeserializeOwned,
    {
        let value = self.store.get(self.id, key).await?;
        decode(key, value)
    }

    /// Read the value under `key` and remove it atomically.
    ///
    /// The entry is gone even when decoding fails.
    ///
    /// # Errors
    ///
    /// - `Malformed`: the stored value does not decode as `T`
    /// - `Backend`: the store is unreachable
    pub async fn pop<T>(&self, key: &str) -> Result<Option<T>, SessionError>
    where
        T: DeserializeOwned,
    {
        let value = self.store.take(self.id, key).await?;
        decode(key, value)
    }

    /// Remove the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` if the store is unreachable.
    pub async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.store.remove(self.id, key).await
    }

    /// Whether `key` currently holds a value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` if the store is unreachable.
    pub async fn exists(&self, key: &str) -> Result<bool, SessionError> {
        self.store.exists(self.id, key).await
    }

    /// Whether the visitor is logged in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Backend` if the store is unreachable.
    pub async fn is_authenticated(&self) -> Result<bool, SessionError> {
        self.exists(USER_ID_KEY).await
    }
}

fn malformed(key: &str, error: &serde_json::Error) -> SessionError {
    SessionError::Malformed {
        key: key.to_string(),
        reason: error.to_string(),
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Option<Value>) -> Result<Option<T>, SessionError> {
    value
        .map(|value| serde_json::from_value(value).map_err(|e| malformed(key, &e)))
        .transpose()
}
