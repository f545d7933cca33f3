//! Persistence contract for reservations.
//!
//! The workflow only knows whether an insert succeeded. Connection pooling,
//! SQL and schema live behind [`DatabaseRepo`] in the backend crates.
//!
//! # Implementations
//!
//! - `PostgresRepo` (in `bookings-postgres`): production backend
//! - `InMemoryRepository` (in `bookings-testing`): test double with failure injection
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` so the repository can be shared as
//! `Arc<dyn DatabaseRepo>` between the workflow and the HTTP layer.

use crate::model::{Reservation, ReservationId, RoomId};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Upper bound a backend allows a single insert to take.
pub const DEFAULT_INSERT_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors reported by a repository backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The backend did not finish within its timeout; nothing was stored.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The reservation references a room the backend does not know.
    #[error("Room {0} does not exist")]
    UnknownRoom(RoomId),

    /// Connection or query failure.
    #[error("Database error: {0}")]
    Database(String),
}

/// Storage capabilities the reservation workflow depends on.
pub trait DatabaseRepo: Send + Sync {
    /// Liveness probe. `true` when the backend can serve requests.
    fn ping(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// Durably store a validated reservation and return its new identifier.
    ///
    /// The insert is atomic: either the whole row is stored or nothing is.
    ///
    /// # Errors
    ///
    /// - `Timeout`: the backend's time bound elapsed, the row was rolled back
    /// - `UnknownRoom`: `room_id` does not reference an existing room
    /// - `Database`: connection or query failure
    fn insert_reservation<'a>(
        &'a self,
        reservation: &'a Reservation,
    ) -> Pin<Box<dyn Future<Output = Result<ReservationId, PersistenceError>> + Send + 'a>>;
}
