//! Failures of the reservation workflow.
//!
//! Validation failures are not errors: they come back as
//! [`SubmitOutcome::Rejected`](crate::workflow::SubmitOutcome::Rejected) and
//! are shown on the re-rendered form. Everything here is either recovered by
//! redirecting with a session message ([`WorkflowError::is_recoverable`]) or
//! is an unexpected fault.

use crate::repository::PersistenceError;
use crate::session::SessionError;
use thiserror::Error;

/// Result type alias for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Ways a reservation request can fail outside field validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A structurally required field could not be parsed.
    #[error("Malformed input for '{field}': {reason}")]
    MalformedInput {
        /// Offending form field.
        field: &'static str,
        /// Parser message.
        reason: String,
    },

    /// The summary was requested but nothing is staged in the session.
    #[error("No reservation staged in session")]
    SessionStateMissing,

    /// The repository refused or timed out.
    #[error("Failed to persist reservation: {0}")]
    Persistence(#[from] PersistenceError),

    /// The session store failed or held an undecodable value.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Anything else, e.g. the persistence task panicked.
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl WorkflowError {
    /// Whether the visitor should be redirected with a message rather than
    /// shown a server error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. } | Self::SessionStateMissing | Self::Persistence(_)
        )
    }

    /// Message shown to the visitor on the page they are redirected to.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedInput { field, .. } => match *field {
                "room_id" => "Invalid room id".to_string(),
                "start_date" => "Can't parse start date".to_string(),
                "end_date" => "Can't parse end date".to_string(),
                _ => "Can't parse form".to_string(),
            },
            Self::SessionStateMissing => "Cannot get reservation from session".to_string(),
            Self::Persistence(PersistenceError::UnknownRoom(_)) => "Can't find room".to_string(),
            Self::Persistence(_) => "Can't insert reservation into database".to_string(),
            Self::Session(_) | Self::Unexpected(_) => "Something went wrong".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoomId;
    use std::time::Duration;

    #[test]
    fn recoverable_errors() {
        assert!(WorkflowError::SessionStateMissing.is_recoverable());
        assert!(
            WorkflowError::Persistence(PersistenceError::Timeout(Duration::from_secs(3)))
                .is_recoverable()
        );
        assert!(
            !WorkflowError::Session(SessionError::Backend("down".to_string())).is_recoverable()
        );
        assert!(!WorkflowError::Unexpected("panic".to_string()).is_recoverable());
    }

    #[test]
    fn user_messages_hide_internals() {
        let err = WorkflowError::Persistence(PersistenceError::Database(
            "relation \"reservations\" does not exist".to_string(),
        ));
        assert_eq!(err.user_message(), "Can't insert reservation into database");

        let err = WorkflowError::Persistence(PersistenceError::UnknownRoom(RoomId::new(100)));
        assert_eq!(err.user_message(), "Can't find room");

        let err = WorkflowError::MalformedInput {
            field: "start_date",
            reason: "input contains invalid characters".to_string(),
        };
        assert_eq!(err.user_message(), "Can't parse start date");
    }
}
