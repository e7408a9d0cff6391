//! Suggested next-appointment validation.
//!
//! A suggested date is checked, in order, against:
//!
//! 1. the next appointment, if a report for it was already filed: the date must
//!    match it exactly and must not fall after it;
//! 2. the appointment windows, via [`AppointmentLookup`]: the date must resolve
//!    to an appointment and that appointment must not be the current one;
//! 3. the suggested visit code, if any: it must match the resolved appointment.
//!
//! The first failing check wins. A submission without a date is always valid.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use edc_model::{Appointment, SuggestedAppointment, VisitCode};
use tracing::{debug, info_span};

use crate::error::{SuggestionIssue, ValidationError};
use crate::format::DateFormatter;
use crate::lookup::{AppointmentLookup, AppointmentTimeline, LookupQuery};

/// The instant used to look up a suggested date: 23:59:59 UTC on that date,
/// so that a window closing on the same day still matches.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(END_OF_DAY).and_utc()
}

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Validates a [`SuggestedAppointment`] against borrowed collaborators.
///
/// Holds no state of its own, so validating the same submission twice gives
/// the same result.
pub struct SuggestionValidator<'a, T: ?Sized, L: ?Sized, F: ?Sized> {
    timeline: &'a T,
    lookup: &'a L,
    formatter: &'a F,
}

impl<'a, T, L, F> SuggestionValidator<'a, T, L, F>
where
    T: AppointmentTimeline + ?Sized,
    L: AppointmentLookup + ?Sized,
    F: DateFormatter + ?Sized,
{
    pub fn new(timeline: &'a T, lookup: &'a L, formatter: &'a F) -> Self {
        Self {
            timeline,
            lookup,
            formatter,
        }
    }

    pub fn validate(&self, submission: &SuggestedAppointment) -> Result<(), ValidationError> {
        self.resolve(submission).map(|_| ())
    }

    /// Validate and return the appointment the suggested date resolved to.
    ///
    /// `Ok(None)` means no date was suggested.
    pub fn resolve(
        &self,
        submission: &SuggestedAppointment,
    ) -> Result<Option<Appointment>, ValidationError> {
        let Some(suggested_date) = submission.appt_date else {
            debug!("no suggested date, nothing to validate");
            return Ok(None);
        };
        let span = info_span!(
            "validate_suggestion",
            visit_code = %submission.subject_visit.visit_code,
            appointment = %submission.subject_visit.appointment,
        );
        let _guard = span.enter();

        self.check_future_appointments(submission, suggested_date)?;
        let appointment = self.resolve_suggested_date(submission, suggested_date)?;
        self.check_visit_code(submission, suggested_date, &appointment)?;

        debug!(resolved = %appointment.visit_code, "suggestion accepted");
        Ok(Some(appointment))
    }

    fn fail(&self, issue: SuggestionIssue) -> ValidationError {
        let error = ValidationError::new(issue, self.formatter);
        debug!(field = %error.field, category = error.category().label(), "suggestion rejected");
        error
    }

    fn check_future_appointments(
        &self,
        submission: &SuggestedAppointment,
        suggested_date: NaiveDate,
    ) -> Result<(), ValidationError> {
        let Some(next) = self
            .timeline
            .next_appointment(submission.subject_visit.appointment)
        else {
            return Ok(());
        };
        if !next.has_report() {
            return Ok(());
        }
        let next_date = self.formatter.to_local_date(next.appt_datetime);

        if let Some(issue) = conflict_issue(suggested_date, next_date, &next.visit_code) {
            return Err(self.fail(issue));
        }
        if let Some(issue) = ordering_issue(suggested_date, next_date, &next.visit_code) {
            return Err(self.fail(issue));
        }
        Ok(())
    }

    fn resolve_suggested_date(
        &self,
        submission: &SuggestedAppointment,
        suggested_date: NaiveDate,
    ) -> Result<Appointment, ValidationError> {
        let subject_visit = &submission.subject_visit;
        let query = LookupQuery {
            subject_identifier: &subject_visit.subject_identifier,
            visit_schedule_name: &subject_visit.visit_schedule_name,
            schedule_name: &subject_visit.schedule_name,
        };
        let found = self
            .lookup
            .appointment_by_datetime(end_of_day(suggested_date), &query, false)
            .map_err(|error| {
                self.fail(SuggestionIssue::WindowGap {
                    message: error.to_string(),
                })
            })?;

        match found {
            None => Err(self.fail(SuggestionIssue::OutsideFollowup)),
            Some(appointment) if appointment.id == subject_visit.appointment => {
                Err(self.fail(SuggestionIssue::WithinCurrentWindow))
            }
            Some(appointment) => Ok(appointment),
        }
    }

    fn check_visit_code(
        &self,
        submission: &SuggestedAppointment,
        suggested_date: NaiveDate,
        appointment: &Appointment,
    ) -> Result<(), ValidationError> {
        match submission.suggested_visit_code() {
            Some(code) if *code != appointment.visit_code => {
                Err(self.fail(SuggestionIssue::CodeMismatch {
                    expected: appointment.visit_code.clone(),
                    suggested_date,
                }))
            }
            _ => Ok(()),
        }
    }
}

/// The date must equal the date of the next appointment that already has a report.
fn conflict_issue(
    suggested_date: NaiveDate,
    next_date: NaiveDate,
    next_code: &VisitCode,
) -> Option<SuggestionIssue> {
    (suggested_date != next_date).then(|| SuggestionIssue::Conflict {
        expected: next_date,
        visit_code: next_code.clone(),
    })
}

/// The date must not be after the next appointment that already has a report.
fn ordering_issue(
    suggested_date: NaiveDate,
    next_date: NaiveDate,
    next_code: &VisitCode,
) -> Option<SuggestionIssue> {
    (suggested_date > next_date).then(|| SuggestionIssue::Ordering {
        boundary: next_date,
        visit_code: next_code.clone(),
    })
}
