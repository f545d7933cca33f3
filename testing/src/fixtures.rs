//! Canned submissions and reservations.
//!
//! All fixtures describe the same guest so tests can compare a stored
//! reservation against the submission that produced it.

#![allow(clippy::missing_panics_doc)]

use bookings_core::forms::FormValues;
use bookings_core::model::{Reservation, RoomId};
use chrono::NaiveDate;

/// Form fields of a submission that passes validation for room 1.
pub const VALID_SUBMISSION: [(&str, &str); 7] = [
    ("first_name", "John"),
    ("last_name", "Smith"),
    ("email", "john@smith.com"),
    ("phone", "555-555-5555"),
    ("room_id", "1"),
    ("start_date", "2050-01-01"),
    ("end_date", "2050-01-02"),
];

/// A submission that passes validation.
#[must_use]
pub fn valid_submission() -> FormValues {
    submission_with(&[])
}

/// [`VALID_SUBMISSION`] with some fields replaced or added.
#[must_use]
pub fn submission_with(overrides: &[(&str, &str)]) -> FormValues {
    let mut values = FormValues::new();
    for (key, value) in VALID_SUBMISSION {
        let value = overrides
            .iter()
            .find(|(k, _)| *k == key)
            .map_or(value, |(_, v)| *v);
        values.add(key, value);
    }
    for (key, value) in overrides {
        if !VALID_SUBMISSION.iter().any(|(k, _)| k == key) {
            values.add(*key, *value);
        }
    }
    values
}

/// [`VALID_SUBMISSION`] with `field` left out.
#[must_use]
pub fn submission_without(field: &str) -> FormValues {
    FormValues::from_pairs(VALID_SUBMISSION.into_iter().filter(|(key, _)| *key != field))
}

/// Encode `values` as an `application/x-www-form-urlencoded` body.
#[must_use]
pub fn urlencoded(values: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(values).unwrap_or_default()
}

/// The unpersisted reservation [`VALID_SUBMISSION`] describes.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn reservation() -> Reservation {
    Reservation {
        id: None,
        first_name: "John".to_string(),
        last_name: "Smith".to_string(),
        email: "john@smith.com".to_string(),
        phone: "555-555-5555".to_string(),
        room_id: RoomId::new(1),
        start_date: NaiveDate::from_ymd_opt(2050, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2050, 1, 2).unwrap(),
    }
}
