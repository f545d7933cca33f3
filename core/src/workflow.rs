//! The draft-reservation state machine.
//!
//! ```text
//!  Empty ──submit──▶ Submitted ──validate──▶ Validated
//!                        │                      │
//!                  MalformedInput        ┌──────┴──────┐
//!                                        ▼             ▼
//!                                    Rejected      Persisted ──stage──▶ Staged
//!                                  (re-render)        │                   │
//!                                               PersistenceError   take_summary
//!                                                                         ▼
//!                                                              SummaryShown → Cleared
//! ```
//!
//! Ordering guarantees:
//!
//! - validation always finishes before the repository or the session is touched;
//! - a reservation is staged only after the repository has stored it, so a
//!   failed insert never leaves a session entry behind;
//! - the insert runs in its own task and completes (or rolls back) even when
//!   the request that started it is dropped;
//! - the staged entry is read with an atomic take, so the summary is shown at
//!   most once even under concurrent requests.

use crate::error::{Result, WorkflowError};
use crate::forms::{Form, FormValues};
use crate::model::{DATE_LAYOUT, Reservation, ReservationId, RoomId};
use crate::repository::DatabaseRepo;
use crate::session::{ERROR_KEY, RESERVATION_KEY, Session};
use chrono::NaiveDate;
use metrics::counter;
use std::sync::Arc;

/// Minimum length of a guest's first name.
pub const FIRST_NAME_MIN_LENGTH: usize = 3;

/// Result of a submission that passed parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed. Nothing was stored or staged.
    Rejected {
        /// The submission with every recorded error.
        form: Form,
        /// The candidate exactly as typed, for echoing back.
        reservation: Reservation,
    },
    /// Stored by the repository and staged for the summary view.
    Confirmed {
        /// The persisted reservation, carrying its new identifier.
        reservation: Reservation,
    },
}

/// Coordinates validation, persistence and session staging.
///
/// Holds no per-request state; share one instance across all requests.
#[derive(Clone)]
pub struct ReservationWorkflow {
    repo: Arc<dyn DatabaseRepo>,
}

impl std::fmt::Debug for ReservationWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationWorkflow").finish_non_exhaustive()
    }
}

impl ReservationWorkflow {
    /// Create a workflow persisting through `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn DatabaseRepo>) -> Self {
        Self { repo }
    }

    /// The repository reservations are stored in.
    #[must_use]
    pub const fn repository(&self) -> &Arc<dyn DatabaseRepo> {
        &self.repo
    }

    /// Build a candidate from the fields the workflow recognizes.
    ///
    /// Unknown fields are ignored. Text fields are copied verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::MalformedInput`] if `room_id`, `start_date`
    /// or `end_date` is missing or does not parse.
    pub fn candidate(values: &FormValues) -> Result<Reservation> {
        let room_id = required_field(values, "room_id")?
            .parse::<RoomId>()
            .map_err(|e| malformed("room_id", &e))?;
        let start_date = parse_date(values, "start_date")?;
        let end_date = parse_date(values, "end_date")?;

        let text = |field: &str| values.get(field).unwrap_or_default().to_string();

        Ok(Reservation {
            id: None,
            first_name: text("first_name"),
            last_name: text("last_name"),
            email: text("email"),
            phone: text("phone"),
            room_id,
            start_date,
            end_date,
        })
    }

    /// Run the reservation rule set over a submission.
    #[must_use]
    pub fn validate(values: FormValues) -> Form {
        let mut form = Form::new(values);
        form.required(&["first_name", "last_name", "email"]);
        form.min_length("first_name", FIRST_NAME_MIN_LENGTH);
        form.is_email("email");
        form
    }

    /// Process a submitted reservation form.
    ///
    /// # Errors
    ///
    /// - `MalformedInput`: room id or dates unusable; nothing was touched
    /// - `Persistence`: the repository failed; nothing was staged
    /// - `Session`: staging failed after the reservation was stored
    /// - `Unexpected`: the persistence task did not complete
    pub async fn submit(&self, session: &Session, values: FormValues) -> Result<SubmitOutcome> {
        counter!("reservations_submitted_total").increment(1);

        let reservation = Self::candidate(&values).inspect_err(|e| {
            counter!("reservations_failed_total", "reason" => "malformed").increment(1);
            tracing::info!(error = %e, "Reservation submission could not be parsed");
        })?;

        let form = Self::validate(values);
        if !form.valid() {
            counter!("reservations_rejected_total").increment(1);
            tracing::info!(
                fields = ?form.errors().iter().map(|(field, _)| field).collect::<Vec<_>>(),
                "Reservation rejected by validation"
            );
            return Ok(SubmitOutcome::Rejected { form, reservation });
        }

        let id = self.persist(reservation.clone()).await.inspect_err(|e| {
            counter!("reservations_failed_total", "reason" => "persistence").increment(1);
            tracing::error!(error = %e, room_id = %reservation.room_id, "Failed to persist reservation");
        })?;

        let reservation = reservation.with_id(id);
        session.put(RESERVATION_KEY, &reservation).await?;

        counter!("reservations_persisted_total").increment(1);
        tracing::info!(
            reservation_id = %id,
            room_id = %reservation.room_id,
            session_id = %session.id(),
            "Reservation persisted and staged"
        );

        Ok(SubmitOutcome::Confirmed { reservation })
    }

    /// Take the staged reservation for the summary view.
    ///
    /// The entry is removed in the same step, so a second call (or a
    /// concurrent one) finds nothing.
    ///
    /// # Errors
    ///
    /// - `SessionStateMissing`: nothing staged, or already consumed
    /// - `Session`: the store failed or held an undecodable value
    pub async fn take_summary(session: &Session) -> Result<Reservation> {
        let reservation = session
            .pop::<Reservation>(RESERVATION_KEY)
            .await?
            .ok_or(WorkflowError::SessionStateMissing)?;

        counter!("reservation_summaries_shown_total").increment(1);
        Ok(reservation)
    }

    /// Leave a message about `error` for the next page the visitor sees.
    ///
    /// # Errors
    ///
    /// Returns `Session` if the message cannot be stored.
    pub async fn report(session: &Session, error: &WorkflowError) -> Result<()> {
        tracing::warn!(error = %error, session_id = %session.id(), "Redirecting after workflow failure");
        session.put(ERROR_KEY, &error.user_message()).await?;
        Ok(())
    }

    async fn persist(&self, reservation: Reservation) -> Result<ReservationId> {
        let repo = Arc::clone(&self.repo);
        let task = tokio::spawn(async move { repo.insert_reservation(&reservation).await });

        match task.await {
            Ok(inserted) => Ok(inserted?),
            Err(e) => Err(WorkflowError::Unexpected(format!(
                "Persistence task failed: {e}"
            ))),
        }
    }
}

fn required_field<'a>(values: &'a FormValues, field: &'static str) -> Result<&'a str> {
    values.get(field).ok_or_else(|| WorkflowError::MalformedInput {
        field,
        reason: "field is missing".to_string(),
    })
}

fn parse_date(values: &FormValues, field: &'static str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(required_field(values, field)?, DATE_LAYOUT)
        .map_err(|e| malformed(field, &e))
}

fn malformed(field: &'static str, error: &impl std::fmt::Display) -> WorkflowError {
    WorkflowError::MalformedInput {
        field,
        reason: error.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::forms::{BLANK_FIELD, INVALID_EMAIL, min_length_message};

    fn submission(overrides: &[(&str, &str)]) -> FormValues {
        let mut pairs = vec![
            ("first_name", "John"),
            ("last_name", "Smith"),
            ("email", "john@smith.com"),
            ("phone", "555-555-5555"),
            ("room_id", "1"),
            ("start_date", "2050-01-01"),
            ("end_date", "2050-01-02"),
        ];
        for &(key, value) in overrides {
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                Some(pair) => pair.1 = value,
                None => pairs.push((key, value)),
            }
        }
        FormValues::from_pairs(pairs)
    }

    #[test]
    fn candidate_copies_recognized_fields() {
        let values = submission(&[("unexpected", "ignored"), ("first_name", " John ")]);
        let reservation = ReservationWorkflow::candidate(&values).unwrap();

        assert_eq!(reservation.id, None);
        assert_eq!(reservation.first_name, " John ");
        assert_eq!(reservation.room_id, RoomId::new(1));
        assert_eq!(reservation.start_date, NaiveDate::from_ymd_opt(2050, 1, 1).unwrap());
        assert_eq!(reservation.end_date, NaiveDate::from_ymd_opt(2050, 1, 2).unwrap());
    }

    #[test]
    fn candidate_rejects_unparsable_structure() {
        for (field, value) in [("room_id", "invalid"), ("start_date", "invalid"), ("end_date", "2050-13-01")] {
            let err = ReservationWorkflow::candidate(&submission(&[(field, value)])).unwrap_err();
            assert!(
                matches!(err, WorkflowError::MalformedInput { field: f, .. } if f == field),
                "{field}: {err:?}"
            );
        }

        let err = ReservationWorkflow::candidate(&FormValues::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedInput { field: "room_id", .. }));
    }

    #[test]
    fn candidate_does_not_check_date_order() {
        let values = submission(&[("start_date", "2050-02-01"), ("end_date", "2050-01-01")]);
        assert!(ReservationWorkflow::candidate(&values).is_ok());
    }

    #[test]
    fn validate_accepts_complete_submission() {
        assert!(ReservationWorkflow::validate(submission(&[])).valid());
    }

    #[test]
    fn validate_reports_every_missing_field() {
        let form = ReservationWorkflow::validate(FormValues::new());

        assert_eq!(form.errors().messages("first_name"), [BLANK_FIELD, BLANK_FIELD]);
        assert_eq!(form.errors().get("last_name"), Some(BLANK_FIELD));
        assert_eq!(form.errors().get("email"), Some(BLANK_FIELD));
        assert_eq!(form.errors().len(), 3);
    }

    #[test]
    fn validate_checks_name_length_and_email() {
        let form = ReservationWorkflow::validate(submission(&[("first_name", "J"), ("email", "john")]));

        assert_eq!(
            form.errors().get("first_name"),
            Some(min_length_message(FIRST_NAME_MIN_LENGTH).as_str())
        );
        assert_eq!(form.errors().get("email"), Some(INVALID_EMAIL));
        assert!(form.errors().messages("last_name").is_empty());

        let form = ReservationWorkflow::validate(submission(&[("first_name", "Joe")]));
        assert!(form.valid());
    }
}
