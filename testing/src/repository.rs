//! In-memory reservation repository.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use bookings_core::model::{Reservation, ReservationId, RoomId};
use bookings_core::repository::{DEFAULT_INSERT_TIMEOUT, DatabaseRepo, PersistenceError};
use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Debug)]
struct State {
    rooms: BTreeSet<RoomId>,
    reservations: Vec<Reservation>,
    next_id: i64,
    failure: Option<PersistenceError>,
    delay: Option<Duration>,
    healthy: bool,
}

/// Repository double that keeps reservations in a `Vec`.
///
/// Knows rooms 1 and 2 by default, matching the seeded database. Failures
/// can be injected to exercise the error paths of the workflow:
///
/// - [`fail_with`](Self::fail_with): every insert returns the given error
/// - [`delay_inserts`](Self::delay_inserts): inserts sleep first, and are cut
///   off by the insert timeout like a slow database
/// - [`set_healthy`](Self::set_healthy): controls what `ping` reports
///
/// # Example
///
/// ```
/// use bookings_testing::InMemoryRepository;
/// use bookings_core::repository::DatabaseRepo;
///
/// # async fn example() {
/// let repo = InMemoryRepository::new();
/// let reservation = bookings_testing::fixtures::reservation();
///
/// let id = repo.insert_reservation(&reservation).await.unwrap();
/// assert_eq!(repo.reservations()[0].id, Some(id));
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryRepository {
    state: Arc<RwLock<State>>,
    insert_timeout: Duration,
}

impl InMemoryRepository {
    /// Create an empty repository knowing rooms 1 and 2.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rooms([RoomId::new(1), RoomId::new(2)])
    }

    /// Create an empty repository knowing exactly `rooms`.
    #[must_use]
    pub fn with_rooms(rooms: impl IntoIterator<Item = RoomId>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                rooms: rooms.into_iter().collect(),
                reservations: Vec::new(),
                next_id: 1,
                failure: None,
                delay: None,
                healthy: true,
            })),
            insert_timeout: DEFAULT_INSERT_TIMEOUT,
        }
    }

    /// Bound each insert by `timeout` instead of the default three seconds.
    #[must_use]
    pub const fn with_insert_timeout(mut self, timeout: Duration) -> Self {
        self.insert_timeout = timeout;
        self
    }

    /// Make every following insert fail with `error`.
    pub fn fail_with(&self, error: PersistenceError) {
        self.state.write().unwrap().failure = Some(error);
    }

    /// Make every following insert sleep for `delay` before storing.
    pub fn delay_inserts(&self, delay: Duration) {
        self.state.write().unwrap().delay = Some(delay);
    }

    /// Clear injected failures and delays.
    pub fn recover(&self) {
        let mut state = self.state.write().unwrap();
        state.failure = None;
        state.delay = None;
    }

    /// Set the value `ping` reports.
    pub fn set_healthy(&self, healthy: bool) {
        self.state.write().unwrap().healthy = healthy;
    }

    /// Every stored reservation, in insertion order.
    #[must_use]
    pub fn reservations(&self) -> Vec<Reservation> {
        self.state.read().unwrap().reservations.clone()
    }

    /// Number of stored reservations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().unwrap().reservations.len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().unwrap().reservations.is_empty()
    }

    fn store(&self, reservation: &Reservation) -> Result<ReservationId, PersistenceError> {
        let mut state = self.state.write().unwrap();

        if let Some(error) = state.failure.clone() {
            return Err(error);
        }
        if !state.rooms.contains(&reservation.room_id) {
            return Err(PersistenceError::UnknownRoom(reservation.room_id));
        }

        let id = ReservationId::new(state.next_id);
        state.next_id += 1;
        state.reservations.push(reservation.clone().with_id(id));
        Ok(id)
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseRepo for InMemoryRepository {
    fn ping(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move { self.state.read().unwrap().healthy })
    }

    fn insert_reservation<'a>(
        &'a self,
        reservation: &'a Reservation,
    ) -> Pin<Box<dyn Future<Output = Result<ReservationId, PersistenceError>> + Send + 'a>> {
        Box::pin(async move {
            let delay = self.state.read().unwrap().delay;
            let insert = async {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                self.store(reservation)
            };

            tokio::time::timeout(self.insert_timeout, insert)
                .await
                .unwrap_or_else(|_| {
                    tracing::warn!(timeout = ?self.insert_timeout, "In-memory insert timed out");
                    Err(PersistenceError::Timeout(self.insert_timeout))
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_reservation(&fixtures::reservation()).await.unwrap();
        let second = repo.insert_reservation(&fixtures::reservation()).await.unwrap();

        assert_eq!(first, ReservationId::new(1));
        assert_eq!(second, ReservationId::new(2));
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn rejects_unknown_room() {
        let repo = InMemoryRepository::new();
        let mut reservation = fixtures::reservation();
        reservation.room_id = RoomId::new(100);

        let err = repo.insert_reservation(&reservation).await.unwrap_err();
        assert_eq!(err, PersistenceError::UnknownRoom(RoomId::new(100)));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn slow_insert_times_out_without_storing() {
        let repo = InMemoryRepository::new().with_insert_timeout(Duration::from_millis(10));
        repo.delay_inserts(Duration::from_millis(200));

        let err = repo.insert_reservation(&fixtures::reservation()).await.unwrap_err();
        assert_eq!(err, PersistenceError::Timeout(Duration::from_millis(10)));
        assert!(repo.is_empty());

        repo.recover();
        assert!(repo.insert_reservation(&fixtures::reservation()).await.is_ok());
    }

    #[tokio::test]
    async fn ping_follows_health_flag() {
        let repo = InMemoryRepository::new();
        assert!(repo.ping().await);
        repo.set_healthy(false);
        assert!(!repo.ping().await);
    }
}
