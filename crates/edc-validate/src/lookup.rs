//! Collaborators the validator reads from: the appointment timeline and the
//! appointment-by-datetime lookup.

use chrono::{DateTime, Utc};
use edc_model::{Appointment, AppointmentId, SubjectIdentifier, Timeline};

use crate::error::WindowPeriodError;

/// Gives access to a participant's appointments and their chronological successors.
pub trait AppointmentTimeline {
    fn appointment(&self, id: AppointmentId) -> Option<&Appointment>;

    /// The next scheduled appointment after `id`, if any.
    fn next_appointment(&self, id: AppointmentId) -> Option<&Appointment>;
}

impl AppointmentTimeline for Timeline {
    fn appointment(&self, id: AppointmentId) -> Option<&Appointment> {
        self.get(id)
    }

    fn next_appointment(&self, id: AppointmentId) -> Option<&Appointment> {
        self.next(id)
    }
}

/// Which participant and schedule to search.
#[derive(Debug, Clone, Copy)]
pub struct LookupQuery<'a> {
    pub subject_identifier: &'a SubjectIdentifier,
    pub visit_schedule_name: &'a str,
    pub schedule_name: &'a str,
}

/// Finds the appointment whose window period contains a datetime.
pub trait AppointmentLookup {
    /// Returns `Ok(None)` if `at` is beyond every window.
    ///
    /// When `at` falls between two windows, implementations raise a
    /// [`WindowPeriodError`] if `raise_if_in_gap` is set and otherwise
    /// return the appointment following the gap.
    fn appointment_by_datetime(
        &self,
        at: DateTime<Utc>,
        query: &LookupQuery<'_>,
        raise_if_in_gap: bool,
    ) -> Result<Option<Appointment>, WindowPeriodError>;
}

/// Lookup over the pre-computed windows stored on a [`Timeline`].
///
/// Only scheduled (sequence 0) appointments are considered. A datetime before
/// the first window is always an error.
#[derive(Debug, Clone, Copy)]
pub struct WindowedLookup<'a> {
    timeline: &'a Timeline,
}

impl<'a> WindowedLookup<'a> {
    pub fn new(timeline: &'a Timeline) -> Self {
        Self { timeline }
    }
}

impl AppointmentLookup for WindowedLookup<'_> {
    fn appointment_by_datetime(
        &self,
        at: DateTime<Utc>,
        query: &LookupQuery<'_>,
        raise_if_in_gap: bool,
    ) -> Result<Option<Appointment>, WindowPeriodError> {
        if self.timeline.subject_identifier() != query.subject_identifier {
            return Ok(None);
        }
        let scheduled: Vec<&Appointment> = self
            .timeline
            .scheduled(query.visit_schedule_name, query.schedule_name)
            .collect();

        if let Some(found) = scheduled.iter().find(|a| a.window.contains(at)) {
            return Ok(Some((*found).clone()));
        }

        let Some(first) = scheduled.first() else {
            return Ok(None);
        };
        if at < first.window.lower {
            return Err(WindowPeriodError::BeforeFirstWindow {
                at,
                visit_code: first.visit_code.clone(),
                lower: first.window.lower,
            });
        }

        // `at` is past the first lower bound and inside no window, so any
        // following window makes this a gap.
        let Some(index) = scheduled.iter().position(|a| a.window.lower > at) else {
            return Ok(None);
        };
        let next = scheduled[index];
        if raise_if_in_gap {
            let previous = scheduled[index - 1];
            return Err(WindowPeriodError::InGap {
                at,
                previous: previous.visit_code.clone(),
                previous_upper: previous.window.upper,
                next: next.visit_code.clone(),
                next_lower: next.window.lower,
            });
        }
        Ok(Some(next.clone()))
    }
}
