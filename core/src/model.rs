//! Domain types for rooms and reservations.
//!
//! A [`Reservation`] starts life as a transient candidate built from a form
//! submission. It has no identity until the repository stores it and hands
//! back a [`ReservationId`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date layout used by the reservation form (`2050-01-01`).
pub const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Identifier of a bookable room.
///
/// # Examples
///
/// ```
/// use bookings_core::model::RoomId;
///
/// let id: RoomId = "1".parse().unwrap();
/// assert_eq!(id.get(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(i32);

impl RoomId {
    /// Wrap a raw room number.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw room number.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RoomId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Backend-assigned identifier of a persisted reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(i64);

impl ReservationId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reservation request, either a draft or a persisted row.
///
/// String fields hold the values exactly as the visitor typed them so that a
/// rejected form can be echoed back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// `None` until the repository has stored the reservation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ReservationId>,
    /// Guest first name.
    pub first_name: String,
    /// Guest last name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone, may be empty.
    pub phone: String,
    /// Room being reserved.
    pub room_id: RoomId,
    /// Arrival date.
    pub start_date: NaiveDate,
    /// Departure date.
    pub end_date: NaiveDate,
}

impl Reservation {
    /// Whether the repository has assigned an identifier.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Copy of this reservation carrying the given identifier.
    #[must_use]
    pub fn with_id(mut self, id: ReservationId) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn room_id_parses_integers_only() {
        assert_eq!("42".parse::<RoomId>().unwrap(), RoomId::new(42));
        assert!("invalid".parse::<RoomId>().is_err());
        assert!("".parse::<RoomId>().is_err());
    }

    #[test]
    fn draft_serializes_without_id() {
        let reservation = Reservation {
            first_name: "John".to_string(),
            start_date: NaiveDate::from_ymd_opt(2050, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2050, 1, 2).unwrap(),
            room_id: RoomId::new(1),
            ..Reservation::default()
        };

        let json = serde_json::to_value(&reservation).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["room_id"], 1);
        assert_eq!(json["start_date"], "2050-01-01");

        let persisted = reservation.with_id(ReservationId::new(7));
        assert!(persisted.is_persisted());
        let json = serde_json::to_value(&persisted).unwrap();
        assert_eq!(json["id"], 7);
    }
}
