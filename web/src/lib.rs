//! HTTP surface of the Bookings site.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at the router
//! 2. **Session layer** resolves the cookie to a `Session`
//! 3. **Handler** reads the submitted fields
//! 4. **Workflow** validates, persists and stages the reservation
//! 5. **Map result** to a page, a redirect or an error
//!
//! # Example
//!
//! ```ignore
//! use bookings_web::{AppState, build_router};
//! use bookings_web::render::HandlebarsRenderer;
//! use bookings_web::session::{CookieConfig, SessionLayer};
//!
//! let state = AppState::new(ReservationWorkflow::new(repo), Arc::new(HandlebarsRenderer::new()?));
//! let app = build_router(state, SessionLayer::new(store, CookieConfig::default()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod session;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use router::build_router;
pub use state::AppState;
