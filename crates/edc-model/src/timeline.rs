//! A participant's ordered sequence of appointments.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::appointment::Appointment;
use crate::ids::{AppointmentId, SubjectIdentifier};
use crate::{ModelError, Result};

/// Appointments for one participant, ordered by scheduled datetime.
///
/// Ties on the datetime are broken by timepoint and then by visit code
/// sequence so that unscheduled visits follow their parent visit.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    subject_identifier: SubjectIdentifier,
    appointments: Vec<Appointment>,
}

impl Timeline {
    pub fn new(mut appointments: Vec<Appointment>) -> Result<Self> {
        let Some(first) = appointments.first() else {
            return Err(ModelError::EmptyTimeline);
        };
        let subject_identifier = first.subject_identifier.clone();

        let mut seen = BTreeSet::new();
        for appointment in &appointments {
            if !seen.insert(appointment.id) {
                return Err(ModelError::DuplicateAppointment(appointment.id));
            }
            if appointment.subject_identifier != subject_identifier {
                return Err(ModelError::SubjectMismatch {
                    appointment: appointment.id,
                    expected: subject_identifier.to_string(),
                    found: appointment.subject_identifier.to_string(),
                });
            }
            if appointment.window.is_inverted() {
                return Err(ModelError::InvertedWindow(appointment.id));
            }
        }

        appointments.sort_by(|left, right| {
            left.appt_datetime
                .cmp(&right.appt_datetime)
                .then(left.timepoint.cmp(&right.timepoint))
                .then(left.visit_code_sequence.cmp(&right.visit_code_sequence))
        });

        Ok(Self {
            subject_identifier,
            appointments,
        })
    }

    pub fn subject_identifier(&self) -> &SubjectIdentifier {
        &self.subject_identifier
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|appointment| appointment.id == id)
    }

    fn position(&self, id: AppointmentId) -> Option<usize> {
        self.appointments
            .iter()
            .position(|appointment| appointment.id == id)
    }

    /// Scheduled (sequence 0) appointments on the given visit schedule and schedule.
    pub fn scheduled<'a>(
        &'a self,
        visit_schedule_name: &'a str,
        schedule_name: &'a str,
    ) -> impl Iterator<Item = &'a Appointment> + 'a {
        self.appointments.iter().filter(move |appointment| {
            appointment.is_scheduled()
                && appointment.visit_schedule_name == visit_schedule_name
                && appointment.schedule_name == schedule_name
        })
    }

    /// The next scheduled appointment after `id` on the same schedule.
    ///
    /// Returns `None` for the last appointment or an unknown id.
    pub fn next(&self, id: AppointmentId) -> Option<&Appointment> {
        let position = self.position(id)?;
        let current = &self.appointments[position];
        self.appointments[position + 1..]
            .iter()
            .find(|candidate| candidate.is_scheduled() && candidate.same_schedule(current))
    }

    /// New scheduled appointments strictly between `current` and `target`.
    ///
    /// These are the appointments that become not required once a later
    /// visit is selected as the next appointment. Empty when `target` does
    /// not come after `current`.
    pub fn interim_appointments(
        &self,
        current: AppointmentId,
        target: AppointmentId,
    ) -> Vec<&Appointment> {
        let (Some(start), Some(end)) = (self.position(current), self.position(target)) else {
            return Vec::new();
        };
        if end <= start {
            return Vec::new();
        }
        let anchor = &self.appointments[start];
        self.appointments[start + 1..end]
            .iter()
            .filter(|candidate| {
                candidate.is_scheduled()
                    && candidate.same_schedule(anchor)
                    && !candidate.has_report()
                    && candidate.status != crate::AppointmentStatus::Skipped
            })
            .collect()
    }
}
