//! Scheduled appointments on a participant's timeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ModelError;
use crate::ids::{AppointmentId, SubjectIdentifier, VisitCode};

/// Appointment status.
///
/// Only `New` and `Skipped` mean no visit report has been filed yet; every
/// other status indicates the visit was at least started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Not yet started.
    New,
    /// Visit report is being captured.
    InProgress,
    /// Visit report started but CRFs are outstanding.
    Incomplete,
    /// Visit report and CRFs are complete.
    Complete,
    Cancelled,
    /// Flagged as not required.
    Skipped,
}

impl AppointmentStatus {
    /// Returns the stored value, e.g. `in_progress`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::New => "new",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Incomplete => "incomplete",
            AppointmentStatus::Complete => "complete",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Skipped => "skipped",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::New => "New",
            AppointmentStatus::InProgress => "In Progress",
            AppointmentStatus::Incomplete => "Incomplete",
            AppointmentStatus::Complete => "Done",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Skipped => "Skipped",
        }
    }

    /// Returns true if a visit report has been filed for this appointment.
    pub fn has_report(&self) -> bool {
        !matches!(self, AppointmentStatus::New | AppointmentStatus::Skipped)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(AppointmentStatus::New),
            "in_progress" | "in progress" => Ok(AppointmentStatus::InProgress),
            "incomplete" => Ok(AppointmentStatus::Incomplete),
            "complete" | "done" => Ok(AppointmentStatus::Complete),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "skipped" => Ok(AppointmentStatus::Skipped),
            _ => Err(ModelError::UnknownStatus(s.to_string())),
        }
    }
}

/// Window period computed by the scheduling layer, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentWindow {
    pub lower: DateTime<Utc>,
    pub upper: DateTime<Utc>,
}

impl AppointmentWindow {
    pub fn new(lower: DateTime<Utc>, upper: DateTime<Utc>) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.lower <= at && at <= self.upper
    }

    pub fn is_inverted(&self) -> bool {
        self.lower > self.upper
    }
}

/// A scheduled entry on a participant's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub subject_identifier: SubjectIdentifier,
    pub visit_schedule_name: String,
    pub schedule_name: String,
    pub visit_code: VisitCode,
    /// 0 for the scheduled visit; unscheduled visits count up from 1.
    #[serde(default)]
    pub visit_code_sequence: u32,
    pub timepoint: u32,
    pub appt_datetime: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub window: AppointmentWindow,
}

impl Appointment {
    pub fn is_scheduled(&self) -> bool {
        self.visit_code_sequence == 0
    }

    pub fn has_report(&self) -> bool {
        self.status.has_report()
    }

    /// Returns true if both appointments sit on the same visit schedule and schedule.
    pub fn same_schedule(&self, other: &Appointment) -> bool {
        self.visit_schedule_name == other.visit_schedule_name
            && self.schedule_name == other.schedule_name
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn only_new_and_skipped_have_no_report() {
        assert!(!AppointmentStatus::New.has_report());
        assert!(!AppointmentStatus::Skipped.has_report());
        assert!(AppointmentStatus::InProgress.has_report());
        assert!(AppointmentStatus::Incomplete.has_report());
        assert!(AppointmentStatus::Complete.has_report());
        assert!(AppointmentStatus::Cancelled.has_report());
    }

    #[test]
    fn status_from_str() {
        assert_eq!(
            "IN_PROGRESS".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::InProgress
        );
        assert_eq!(
            "done".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Complete
        );
        assert_eq!(
            "missed".parse::<AppointmentStatus>(),
            Err(ModelError::UnknownStatus("missed".to_string()))
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let lower = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let upper = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        let window = AppointmentWindow::new(lower, upper);
        assert!(window.contains(lower));
        assert!(window.contains(upper));
        assert!(!window.contains(upper + chrono::Duration::seconds(1)));
    }
}
