//! Reservation workflow against the in-memory backends.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use bookings_core::model::RoomId;
use bookings_core::repository::PersistenceError;
use bookings_core::session::{ERROR_KEY, RESERVATION_KEY, Session, SessionId};
use bookings_core::{Reservation, ReservationWorkflow, SubmitOutcome, WorkflowError};
use bookings_testing::{InMemoryRepository, UnavailableSessionStore, fixtures, memory_session};
use std::sync::Arc;
use std::time::Duration;

fn workflow() -> (Arc<InMemoryRepository>, ReservationWorkflow) {
    let repo = Arc::new(InMemoryRepository::new());
    let workflow = ReservationWorkflow::new(repo.clone());
    (repo, workflow)
}

#[tokio::test]
async fn rejected_submission_touches_nothing() {
    let (repo, workflow) = workflow();
    let session = memory_session();

    let outcome = workflow
        .submit(&session, fixtures::submission_with(&[("first_name", "J")]))
        .await
        .unwrap();

    let SubmitOutcome::Rejected { form, reservation } = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(
        form.errors().get("first_name"),
        Some("This field must be at least 3 characters long")
    );
    // the typed values come back for re-rendering
    assert_eq!(reservation.first_name, "J");
    assert_eq!(form.get("email"), "john@smith.com");

    assert!(repo.is_empty());
    assert!(!session.exists(RESERVATION_KEY).await.unwrap());
}

#[tokio::test]
async fn missing_required_fields_are_all_reported() {
    let (repo, workflow) = workflow();
    let session = memory_session();

    let values = fixtures::submission_with(&[("first_name", ""), ("last_name", " "), ("email", "")]);
    let SubmitOutcome::Rejected { form, .. } = workflow.submit(&session, values).await.unwrap() else {
        panic!("expected rejection");
    };

    for field in ["first_name", "last_name", "email"] {
        assert_eq!(form.errors().get(field), Some("This field cannot be blank"), "{field}");
    }
    assert!(repo.is_empty());
}

#[tokio::test]
async fn confirmed_submission_persists_then_stages() {
    let (repo, workflow) = workflow();
    let session = memory_session();

    let outcome = workflow.submit(&session, fixtures::valid_submission()).await.unwrap();
    let SubmitOutcome::Confirmed { reservation } = outcome else {
        panic!("expected confirmation, got {outcome:?}");
    };

    assert!(reservation.is_persisted());
    assert_eq!(repo.reservations(), vec![reservation.clone()]);

    let staged: Option<Reservation> = session.get(RESERVATION_KEY).await.unwrap();
    assert_eq!(staged, Some(reservation));
}

#[tokio::test]
async fn summary_is_consumed_once() {
    let (_repo, workflow) = workflow();
    let session = memory_session();
    workflow.submit(&session, fixtures::valid_submission()).await.unwrap();

    let shown = ReservationWorkflow::take_summary(&session).await.unwrap();
    assert_eq!(shown.first_name, "John");

    let err = ReservationWorkflow::take_summary(&session).await.unwrap_err();
    assert_eq!(err, WorkflowError::SessionStateMissing);
}

#[tokio::test]
async fn summary_without_submission_is_missing() {
    let err = ReservationWorkflow::take_summary(&memory_session()).await.unwrap_err();
    assert_eq!(err, WorkflowError::SessionStateMissing);
}

#[tokio::test]
async fn persistence_failure_stages_nothing() {
    let (repo, workflow) = workflow();
    let session = memory_session();
    repo.fail_with(PersistenceError::Database("connection reset".to_string()));

    let err = workflow.submit(&session, fixtures::valid_submission()).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Persistence(PersistenceError::Database(_))));
    assert!(err.is_recoverable());
    assert!(!session.exists(RESERVATION_KEY).await.unwrap());
}

#[tokio::test]
async fn unknown_room_fails_persistence() {
    let (repo, workflow) = workflow();
    let session = memory_session();

    let err = workflow
        .submit(&session, fixtures::submission_with(&[("room_id", "100")]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        WorkflowError::Persistence(PersistenceError::UnknownRoom(RoomId::new(100)))
    );
    assert!(repo.is_empty());
}

#[tokio::test]
async fn slow_backend_times_out() {
    let repo = Arc::new(InMemoryRepository::new().with_insert_timeout(Duration::from_millis(20)));
    repo.delay_inserts(Duration::from_millis(500));
    let workflow = ReservationWorkflow::new(repo.clone());
    let session = memory_session();

    let err = workflow.submit(&session, fixtures::valid_submission()).await.unwrap_err();

    assert_eq!(
        err,
        WorkflowError::Persistence(PersistenceError::Timeout(Duration::from_millis(20)))
    );
    assert!(repo.is_empty());
    assert!(!session.exists(RESERVATION_KEY).await.unwrap());
}

#[tokio::test]
async fn malformed_input_touches_nothing() {
    let (repo, workflow) = workflow();
    let session = memory_session();

    for values in [
        fixtures::submission_with(&[("room_id", "invalid")]),
        fixtures::submission_with(&[("start_date", "01/01/2050")]),
        fixtures::submission_with(&[("end_date", "invalid")]),
        fixtures::submission_without("room_id"),
    ] {
        let err = workflow.submit(&session, values).await.unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedInput { .. }), "{err:?}");
    }

    assert!(repo.is_empty());
    assert!(!session.exists(RESERVATION_KEY).await.unwrap());
}

#[tokio::test]
async fn report_leaves_message_for_next_page() {
    let session = memory_session();
    let err = WorkflowError::SessionStateMissing;

    ReservationWorkflow::report(&session, &err).await.unwrap();

    let message: Option<String> = session.pop(ERROR_KEY).await.unwrap();
    assert_eq!(message.as_deref(), Some("Cannot get reservation from session"));
}

#[tokio::test]
async fn staging_failure_is_not_recoverable() {
    let (repo, workflow) = workflow();
    let session = Session::new(SessionId::new(), Arc::new(UnavailableSessionStore));

    let err = workflow.submit(&session, fixtures::valid_submission()).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Session(_)));
    assert!(!err.is_recoverable());
    // the row is already durable when staging fails
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn concurrent_summaries_have_one_winner() {
    let (_repo, workflow) = workflow();
    let session = memory_session();
    workflow.submit(&session, fixtures::valid_submission()).await.unwrap();

    let attempts = (0..8).map(|_| {
        let session = session.clone();
        tokio::spawn(async move { ReservationWorkflow::take_summary(&session).await })
    });
    let results = futures::future::join_all(attempts).await;

    let winners = results
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(Result::is_ok)
        .count();
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn insert_completes_when_request_is_dropped() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.delay_inserts(Duration::from_millis(50));
    let workflow = ReservationWorkflow::new(repo.clone());
    let session = memory_session();

    // Drop the submission future while the insert is still sleeping.
    let submit = workflow.submit(&session, fixtures::valid_submission());
    let _ = tokio::time::timeout(Duration::from_millis(10), submit).await;

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(repo.len(), 1);
    // nothing was staged because the handler never resumed
    assert!(!session.exists(RESERVATION_KEY).await.unwrap());
}
