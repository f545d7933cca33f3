//! # Bookings Testing
//!
//! Test doubles and fixtures for the Bookings crates.
//!
//! This crate provides:
//! - [`InMemoryRepository`]: a [`DatabaseRepo`](bookings_core::DatabaseRepo)
//!   with failure injection
//! - [`UnavailableSessionStore`]: a session store that always fails
//! - [`fixtures`]: canned submissions and reservations
//!
//! ## Example
//!
//! ```ignore
//! use bookings_testing::{InMemoryRepository, fixtures, memory_session};
//! use bookings_core::{ReservationWorkflow, SubmitOutcome};
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_reservation_flow() {
//!     let repo = Arc::new(InMemoryRepository::new());
//!     let workflow = ReservationWorkflow::new(repo.clone());
//!     let session = memory_session();
//!
//!     let outcome = workflow.submit(&session, fixtures::valid_submission()).await.unwrap();
//!     assert!(matches!(outcome, SubmitOutcome::Confirmed { .. }));
//!     assert_eq!(repo.len(), 1);
//! }
//! ```

pub mod fixtures;
pub mod repository;
pub mod session;

pub use repository::InMemoryRepository;
pub use session::{UnavailableSessionStore, memory_session};
