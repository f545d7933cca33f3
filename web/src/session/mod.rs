//! HTTP side of sessions: the cookie layer and the Redis store.
//!
//! Handlers receive the visitor's session as `Extension<Session>`.

mod layer;
mod redis;

pub use layer::{CookieConfig, DEFAULT_COOKIE_NAME, SessionLayer, SessionMiddleware};
pub use redis::RedisSessionStore;
