//! Data model for next-appointment capture on a trial CRF.

pub mod appointment;
pub mod error;
pub mod ids;
pub mod schedule;
pub mod schema;
pub mod submission;
pub mod timeline;

pub use appointment::{Appointment, AppointmentStatus, AppointmentWindow};
pub use error::{ModelError, Result};
pub use ids::{AppointmentId, SubjectIdentifier, VisitCode};
pub use schedule::VisitScheduleEntry;
pub use schema::{
    ConstraintViolation, FIELD_SPECS, FieldError, FieldKind, FieldSpec, HealthFacility,
    InfoSource, NextAppointmentCrf, NextAppointmentFields, NextAppointmentRecord,
    check_constraints, field_names, field_spec,
};
pub use submission::{SubjectVisit, SuggestedAppointment, SuggestedVisit};
pub use timeline::Timeline;
