//! Session helpers for tests.

use bookings_core::session::{
    MemorySessionStore, Session, SessionError, SessionFuture, SessionId, SessionStore,
};
use serde_json::Value;
use std::sync::Arc;

/// A fresh session backed by its own in-memory store.
#[must_use]
pub fn memory_session() -> Session {
    Session::new(SessionId::new(), Arc::new(MemorySessionStore::default()))
}

/// Session store whose every operation fails with a backend error.
///
/// Stands in for an unreachable Redis.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSessionStore;

impl UnavailableSessionStore {
    fn fail<T: Send + 'static>() -> SessionFuture<'static, T> {
        Box::pin(async { Err(SessionError::Backend("session store unavailable".to_string())) })
    }
}

impl SessionStore for UnavailableSessionStore {
    fn put(&self, _id: SessionId, _key: &str, _value: Value) -> SessionFuture<'_, ()> {
        Self::fail()
    }

    fn get(&self, _id: SessionId, _key: &str) -> SessionFuture<'_, Option<Value>> {
        Self::fail()
    }

    fn take(&self, _id: SessionId, _key: &str) -> SessionFuture<'_, Option<Value>> {
        Self::fail()
    }

    fn remove(&self, _id: SessionId, _key: &str) -> SessionFuture<'_, ()> {
        Self::fail()
    }

    fn exists(&self, _id: SessionId, _key: &str) -> SessionFuture<'_, bool> {
        Self::fail()
    }
}
