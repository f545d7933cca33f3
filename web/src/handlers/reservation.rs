//! Reservation form and summary.
//!
//! | Outcome                         | Response                              |
//! |---------------------------------|---------------------------------------|
//! | stored and staged               | 303 → `/reservation-summary`          |
//! | validation failed               | 200, form re-rendered with errors     |
//! | malformed input, store failure  | 307 → `/`, message in session         |
//! | summary shown                   | 200, staged reservation consumed      |
//! | summary with nothing staged     | 307 → `/`, message in session         |
//! | session or unexpected failure   | 500                                   |
//!
//! The summary takes the staged reservation out of the session before the
//! page is rendered. A render failure after that point answers 500 and the
//! reservation is not shown again; the stored row is unaffected.

use super::render;
use crate::error::AppError;
use crate::render::{Page, TemplateData};
use crate::state::AppState;
use axum::{
    Extension,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use bookings_core::forms::{Form, FormValues};
use bookings_core::session::RESERVATION_KEY;
use bookings_core::{ReservationWorkflow, Session, SubmitOutcome, WorkflowError};

/// Where a confirmed reservation is shown.
pub const SUMMARY_PATH: &str = "/reservation-summary";

/// `GET /make-reservation`: an empty form.
pub async fn make_reservation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    let data = TemplateData::for_session(&session)
        .await?
        .with_form(&Form::new(FormValues::new()));

    Ok(render(&state, Page::MakeReservation, &data)?.into_response())
}

/// `POST /make-reservation`
pub async fn post_make_reservation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    body: Bytes,
) -> Result<Response, AppError> {
    let values = match FormValues::parse(&body) {
        Ok(values) => values,
        Err(e) => {
            let err = WorkflowError::MalformedInput {
                field: "form",
                reason: e.to_string(),
            };
            return recover(&session, err).await;
        }
    };

    match state.workflow.submit(&session, values).await {
        Ok(SubmitOutcome::Confirmed { .. }) => Ok(Redirect::to(SUMMARY_PATH).into_response()),
        Ok(SubmitOutcome::Rejected { form, reservation }) => {
            let data = TemplateData::for_session(&session)
                .await?
                .with_form(&form)
                .with(RESERVATION_KEY, &reservation);
            Ok(render(&state, Page::MakeReservation, &data)?.into_response())
        }
        Err(e) => recover(&session, e).await,
    }
}

/// `GET /reservation-summary`: show the staged reservation once.
pub async fn reservation_summary(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    match ReservationWorkflow::take_summary(&session).await {
        Ok(reservation) => {
            let data = TemplateData::for_session(&session)
                .await?
                .with(RESERVATION_KEY, &reservation);
            Ok(render(&state, Page::ReservationSummary, &data)?.into_response())
        }
        Err(e) => recover(&session, e).await,
    }
}

/// Redirect home with a message for recoverable errors; fail otherwise.
async fn recover(session: &Session, err: WorkflowError) -> Result<Response, AppError> {
    if !err.is_recoverable() {
        return Err(err.into());
    }

    ReservationWorkflow::report(session, &err).await?;
    Ok(Redirect::temporary("/").into_response())
}
