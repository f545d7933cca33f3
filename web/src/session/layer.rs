//! Cookie-backed session middleware.
//!
//! # Flow
//!
//! 1. **Read** the session cookie (or generate a new [`SessionId`])
//! 2. **Insert** a [`Session`] into request extensions for handlers
//! 3. **Set** the cookie on the response when the session is new

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};
use bookings_core::session::{DEFAULT_SESSION_LIFETIME, Session, SessionId, SessionStore};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Layer, Service};

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "bookings_session";

/// Attributes of the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Cookie name.
    pub name: String,
    /// `Max-Age` of the cookie; should match the store's lifetime.
    pub lifetime: Duration,
    /// Add the `Secure` attribute (HTTPS only).
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            lifetime: DEFAULT_SESSION_LIFETIME,
            secure: false,
        }
    }
}

impl CookieConfig {
    /// `Set-Cookie` value binding the client to `id`.
    fn set_cookie(&self, id: SessionId) -> Option<HeaderValue> {
        let mut cookie = format!(
            "{}={id}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name,
            self.lifetime.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }

    /// Session id carried by the request's cookies, if any is valid.
    fn session_id(&self, headers: &HeaderMap) -> Option<SessionId> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .and_then(|(_, value)| SessionId::parse(value))
    }
}

/// Layer attaching a [`Session`] to every request.
///
/// # Example
///
/// ```ignore
/// use bookings_web::session::{CookieConfig, SessionLayer};
/// use bookings_core::session::MemorySessionStore;
///
/// let app = Router::new()
///     .route("/", get(home))
///     .layer(SessionLayer::new(Arc::new(MemorySessionStore::default()), CookieConfig::default()));
/// ```
#[derive(Clone)]
pub struct SessionLayer {
    store: Arc<dyn SessionStore>,
    config: Arc<CookieConfig>,
}

impl SessionLayer {
    /// Create a layer storing sessions in `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, config: CookieConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

impl std::fmt::Debug for SessionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLayer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

/// Middleware service created by [`SessionLayer`].
#[derive(Clone)]
pub struct SessionMiddleware<S> {
    inner: S,
    store: Arc<dyn SessionStore>,
    config: Arc<CookieConfig>,
}

impl<S> std::fmt::Debug for SessionMiddleware<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMiddleware")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S> Service<Request> for SessionMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let existing = self.config.session_id(req.headers());
        let id = existing.unwrap_or_default();

        req.extensions_mut()
            .insert(Session::new(id, Arc::clone(&self.store)));

        let set_cookie = existing.is_none().then(|| self.config.set_cookie(id)).flatten();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.await?;

            if let Some(cookie) = set_cookie {
                tracing::debug!(session_id = %id, "Started new session");
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }

            Ok(response)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, routing::get};
    use bookings_core::session::MemorySessionStore;
    use tower::ServiceExt;

    fn app(config: CookieConfig) -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(session): Extension<Session>| async move {
                    session.id().to_string()
                }),
            )
            .layer(SessionLayer::new(Arc::new(MemorySessionStore::default()), config))
    }

    #[tokio::test]
    async fn test_new_session_sets_cookie() {
        let response = app(CookieConfig::default())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("Set-Cookie header should be present")
            .to_str()
            .unwrap();

        assert!(cookie.starts_with("bookings_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_existing_session_is_reused() {
        let id = SessionId::new();
        let response = app(CookieConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::COOKIE, format!("theme=dark; bookings_session={id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, id.to_string());
    }

    #[tokio::test]
    async fn test_invalid_cookie_starts_new_session() {
        let response = app(CookieConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::COOKIE, "bookings_session=not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_some());
    }

    #[tokio::test]
    async fn test_secure_cookie_in_production() {
        let config = CookieConfig {
            name: "sid".to_string(),
            lifetime: Duration::from_secs(60),
            secure: true,
        };
        let response = app(config)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("sid="));
        assert!(cookie.contains("Max-Age=60"));
        assert!(cookie.ends_with("; Secure"));
    }
}
