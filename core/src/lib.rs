//! # Bookings Core
//!
//! Domain layer of the Bookings reservation site.
//!
//! This crate holds everything the HTTP layer needs to take a reservation
//! request from a submitted form to a stored row and a one-time summary:
//!
//! - [`forms`]: accumulating field validation over submitted form values
//! - [`model`]: the reservation record and its identifiers
//! - [`repository`]: the persistence contract ([`DatabaseRepo`])
//! - [`session`]: per-visitor key-value storage and the in-memory store
//! - [`workflow`]: the submit / persist / stage / summarize state machine
//!
//! No I/O happens here apart from what the injected [`DatabaseRepo`] and
//! [`SessionStore`] implementations do.
//!
//! ## Example
//!
//! ```ignore
//! use bookings_core::{FormValues, ReservationWorkflow, SubmitOutcome};
//!
//! let workflow = ReservationWorkflow::new(repo);
//! let values = FormValues::parse(body)?;
//!
//! match workflow.submit(&session, values).await? {
//!     SubmitOutcome::Confirmed { .. } => redirect("/reservation-summary"),
//!     SubmitOutcome::Rejected { form, reservation } => render(form, reservation),
//! }
//! ```

pub mod error;
pub mod forms;
pub mod model;
pub mod repository;
pub mod session;
pub mod workflow;

pub use error::{Result, WorkflowError};
pub use forms::{Form, FormErrors, FormValues};
pub use model::{Reservation, ReservationId, RoomId};
pub use repository::{DatabaseRepo, PersistenceError};
pub use session::{Session, SessionError, SessionId, SessionStore};
pub use workflow::{ReservationWorkflow, SubmitOutcome};
