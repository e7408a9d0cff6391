//! The cleaned next-appointment submission handed to the validator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{AppointmentId, SubjectIdentifier, VisitCode};
use crate::schedule::VisitScheduleEntry;
use crate::schema::{InfoSource, NextAppointmentRecord};

/// The visit report the CRF is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectVisit {
    pub subject_identifier: SubjectIdentifier,
    pub visit_schedule_name: String,
    pub schedule_name: String,
    pub appointment: AppointmentId,
    pub visit_code: VisitCode,
}

/// Value of the `visitschedule` field: a schedule row, or a bare visit code.
///
/// Serialized untagged, so a JSON string is a code and an object is a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestedVisit {
    Code(VisitCode),
    Schedule(VisitScheduleEntry),
}

impl SuggestedVisit {
    pub fn visit_code(&self) -> &VisitCode {
        match self {
            SuggestedVisit::Code(code) => code,
            SuggestedVisit::Schedule(entry) => &entry.visit_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAppointment {
    pub appt_date: Option<NaiveDate>,
    pub info_source: Option<InfoSource>,
    pub suggested_visit: Option<SuggestedVisit>,
    pub subject_visit: SubjectVisit,
}

impl SuggestedAppointment {
    pub fn new(subject_visit: SubjectVisit) -> Self {
        Self {
            appt_date: None,
            info_source: None,
            suggested_visit: None,
            subject_visit,
        }
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.appt_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_visit(mut self, visit: SuggestedVisit) -> Self {
        self.suggested_visit = Some(visit);
        self
    }

    /// Build a submission from any record carrying the next-appointment fields.
    ///
    /// Only `visitschedule` supplies the suggested visit. `best_visit_code`
    /// is filled in by the EDC and is never checked against the date.
    pub fn from_record<R: NextAppointmentRecord + ?Sized>(record: &R) -> Self {
        let fields = record.next_appointment();
        Self {
            appt_date: fields.appt_date,
            info_source: fields.info_source.clone(),
            suggested_visit: fields.visitschedule.clone(),
            subject_visit: record.subject_visit().clone(),
        }
    }

    pub fn suggested_visit_code(&self) -> Option<&VisitCode> {
        self.suggested_visit.as_ref().map(SuggestedVisit::visit_code)
    }
}
