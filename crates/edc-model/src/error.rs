use thiserror::Error;

use crate::ids::AppointmentId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid visit code: {0:?}")]
    InvalidVisitCode(String),
    #[error("invalid subject identifier: {0:?}")]
    InvalidSubjectIdentifier(String),
    #[error("unknown appointment status: {0}")]
    UnknownStatus(String),
    #[error("timeline has no appointments")]
    EmptyTimeline,
    #[error("duplicate appointment id {0} in timeline")]
    DuplicateAppointment(AppointmentId),
    #[error("appointment {appointment} belongs to {found}, expected {expected}")]
    SubjectMismatch {
        appointment: AppointmentId,
        expected: String,
        found: String,
    },
    #[error("appointment {0} has a window whose lower bound is after its upper bound")]
    InvertedWindow(AppointmentId),
}

pub type Result<T> = std::result::Result<T, ModelError>;
