//! Validation failures for suggested next appointments.
//!
//! Every failure is scoped to a single form field and carries the message
//! shown to the user next to that field.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use edc_model::VisitCode;
use serde::Serialize;
use thiserror::Error;

use crate::format::DateFormatter;

/// Form field a validation failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ApptDate,
    #[serde(rename = "visitschedule")]
    VisitSchedule,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ApptDate => "appt_date",
            Field::VisitSchedule => "visitschedule",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Disagrees with an already filed future report.
    Conflict,
    /// Falls after an already filed future report.
    Ordering,
    /// Resolves to no appointment, or to the current one.
    OutOfRange,
    /// Window-period error raised by the appointment lookup.
    WindowGap,
    /// Suggested visit code disagrees with the date.
    CodeMismatch,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Conflict => "Conflict",
            Category::Ordering => "Ordering",
            Category::OutOfRange => "Out of range",
            Category::WindowGap => "Window period",
            Category::CodeMismatch => "Code mismatch",
        }
    }
}

/// What is wrong with the suggestion; each variant carries only its needed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionIssue {
    /// The next appointment already has a report and the date differs from it.
    Conflict {
        expected: NaiveDate,
        visit_code: VisitCode,
    },
    /// The date is after an appointment that already has a report.
    Ordering {
        boundary: NaiveDate,
        visit_code: VisitCode,
    },
    OutsideFollowup,
    WithinCurrentWindow,
    /// Lookup failure, message kept verbatim.
    WindowGap { message: String },
    CodeMismatch {
        expected: VisitCode,
        suggested_date: NaiveDate,
    },
}

impl SuggestionIssue {
    pub fn field(&self) -> Field {
        match self {
            SuggestionIssue::CodeMismatch { .. } => Field::VisitSchedule,
            _ => Field::ApptDate,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            SuggestionIssue::Conflict { .. } => Category::Conflict,
            SuggestionIssue::Ordering { .. } => Category::Ordering,
            SuggestionIssue::OutsideFollowup | SuggestionIssue::WithinCurrentWindow => {
                Category::OutOfRange
            }
            SuggestionIssue::WindowGap { .. } => Category::WindowGap,
            SuggestionIssue::CodeMismatch { .. } => Category::CodeMismatch,
        }
    }

    /// User-facing message, with dates in the deployment's short date format.
    pub fn format_message<F: DateFormatter + ?Sized>(&self, formatter: &F) -> String {
        match self {
            SuggestionIssue::Conflict {
                expected,
                visit_code,
            } => format!(
                "Invalid. Next visit report already submitted. Expected `{}`. See `{}`.",
                formatter.format_date(*expected),
                visit_code
            ),
            SuggestionIssue::Ordering {
                boundary,
                visit_code,
            } => format!(
                "Invalid. Expected a date before appointment `{}` on {}.",
                visit_code,
                formatter.format_date(*boundary)
            ),
            SuggestionIssue::OutsideFollowup => {
                "Invalid. Must be within the followup period.".to_string()
            }
            SuggestionIssue::WithinCurrentWindow => {
                "Invalid. Cannot be within window period of current appointment.".to_string()
            }
            SuggestionIssue::WindowGap { message } => message.clone(),
            SuggestionIssue::CodeMismatch {
                expected,
                suggested_date,
            } => format!(
                "Expected {} using {} from above.",
                expected,
                formatter.format_date(*suggested_date)
            ),
        }
    }
}

/// A rejected suggestion, keyed by form field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: Field,
    pub issue: SuggestionIssue,
    pub message: String,
}

impl ValidationError {
    pub fn new<F: DateFormatter + ?Sized>(issue: SuggestionIssue, formatter: &F) -> Self {
        Self {
            field: issue.field(),
            message: issue.format_message(formatter),
            issue,
        }
    }

    pub fn category(&self) -> Category {
        self.issue.category()
    }
}

/// Raised by an appointment lookup when a datetime cannot be placed in a window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowPeriodError {
    #[error(
        "Invalid. Date falls in a gap between the window periods of visit `{previous}` \
         and visit `{next}`. Expected a date on or before {previous_upper} or on or after \
         {next_lower}. Got {at}."
    )]
    InGap {
        at: DateTime<Utc>,
        previous: VisitCode,
        previous_upper: DateTime<Utc>,
        next: VisitCode,
        next_lower: DateTime<Utc>,
    },
    #[error(
        "Invalid. Date falls before the window period of the first visit `{visit_code}`. \
         Expected a date on or after {lower}. Got {at}."
    )]
    BeforeFirstWindow {
        at: DateTime<Utc>,
        visit_code: VisitCode,
        lower: DateTime<Utc>,
    },
    /// Raised by lookups backed by other scheduling services.
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid short date format {format:?}: {message}")]
    InvalidDateFormat { format: String, message: String },

    #[error("invalid UTC offset: {minutes} minutes")]
    InvalidUtcOffset { minutes: i32 },
}
