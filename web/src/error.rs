//! Error type for web handlers.
//!
//! Recoverable workflow failures never get here: handlers turn them into a
//! redirect with a session message. What remains is a server fault, which is
//! logged in full and answered with a generic page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookings_core::{SessionError, WorkflowError};
use std::fmt;

use crate::render::RenderError;

/// Application error type for web handlers.
///
/// Implements `IntoResponse`, so handlers can return `Result<_, AppError>`
/// and use `?` on anything that converts into it.
///
/// # Examples
///
/// ```ignore
/// async fn handler(Extension(session): Extension<Session>) -> Result<Html<String>, AppError> {
///     let data = TemplateData::for_session(&session).await?;
///     Ok(Html(state.renderer.render(Page::Home, &data)?))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::INTERNAL_SERVER_ERROR.to_string(),
        )
    }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(status = %self.status, error = ?source, "Internal server error");
            } else {
                tracing::error!(status = %self.status, message = %self.message, "Internal server error");
            }
        }

        (self.status, self.message).into_response()
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        Self::internal().with_source(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        Self::internal().with_source(err)
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        Self::internal().with_source(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal().with_source(err)
    }
}
