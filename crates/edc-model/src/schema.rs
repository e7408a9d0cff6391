//! Next-appointment CRF fields and their storage constraints.
//!
//! [`NextAppointmentFields`] is a fragment that concrete CRF records embed;
//! [`NextAppointmentRecord`] gives generic code access to it. The structural
//! checks in [`check_constraints`] mirror what the storage layer enforces and
//! know nothing about the participant's timeline.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::submission::{SubjectVisit, SuggestedVisit};

pub const VERBOSE_NAME: &str = "Next Appointment";
pub const VERBOSE_NAME_PLURAL: &str = "Next Appointments";

const BEST_VISIT_CODE_HELP: &str = "Click SAVE to let the EDC suggest. Once selected, interim \
                                    appointments will be flagged as not required/missed.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthFacility {
    pub id: u64,
    pub name: String,
}

/// Entry from the information-source list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoSource {
    pub name: String,
    pub display_name: String,
}

/// Fields captured about the participant's next appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAppointmentFields {
    #[serde(default)]
    pub health_facility: Option<HealthFacility>,
    #[serde(default)]
    pub appt_date: Option<NaiveDate>,
    #[serde(default)]
    pub info_source: Option<InfoSource>,
    #[serde(default)]
    pub best_visit_code: Option<String>,
    /// Schedule row picked on the form, or a bare visit code.
    #[serde(default)]
    pub visitschedule: Option<SuggestedVisit>,
}

/// Implemented by every CRF record that embeds [`NextAppointmentFields`].
pub trait NextAppointmentRecord {
    fn subject_visit(&self) -> &SubjectVisit;
    fn next_appointment(&self) -> &NextAppointmentFields;
}

/// Standalone next-appointment CRF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAppointmentCrf {
    pub subject_visit: SubjectVisit,
    pub report_datetime: DateTime<Utc>,
    #[serde(flatten)]
    pub next_appointment: NextAppointmentFields,
}

impl NextAppointmentRecord for NextAppointmentCrf {
    fn subject_visit(&self) -> &SubjectVisit {
        &self.subject_visit
    }

    fn next_appointment(&self) -> &NextAppointmentFields {
        &self.next_appointment
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Date,
    Char,
    /// Reference to another entity, by name.
    ForeignKey(&'static str),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Date => f.write_str("date"),
            FieldKind::Char => f.write_str("char"),
            FieldKind::ForeignKey(target) => write!(f, "fk({target})"),
        }
    }
}

/// Declaration of one persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub verbose_name: &'static str,
    pub help_text: Option<&'static str>,
    pub kind: FieldKind,
    /// Storage allows NULL.
    pub null: bool,
    /// Forms accept an empty value.
    pub blank: bool,
    pub max_length: Option<usize>,
}

pub const FIELD_SPECS: [FieldSpec; 5] = [
    FieldSpec {
        name: "health_facility",
        verbose_name: "Health facility",
        help_text: None,
        kind: FieldKind::ForeignKey("health_facility"),
        null: true,
        blank: true,
        max_length: None,
    },
    FieldSpec {
        name: "appt_date",
        verbose_name: "Next scheduled routine/facility appointment",
        help_text: Some("Should fall on an Integrated clinic day"),
        kind: FieldKind::Date,
        null: true,
        blank: false,
        max_length: None,
    },
    FieldSpec {
        name: "info_source",
        verbose_name: "What is the source of this appointment date",
        help_text: None,
        kind: FieldKind::ForeignKey("info_sources"),
        null: true,
        blank: false,
        max_length: Some(15),
    },
    FieldSpec {
        name: "best_visit_code",
        verbose_name: "Which study visit code is closest to this appointment date",
        help_text: Some(BEST_VISIT_CODE_HELP),
        kind: FieldKind::Char,
        null: true,
        blank: false,
        max_length: Some(15),
    },
    FieldSpec {
        name: "visitschedule",
        verbose_name: "Which study visit code is closest to this appointment date",
        help_text: Some(BEST_VISIT_CODE_HELP),
        kind: FieldKind::ForeignKey("visit_schedule"),
        null: true,
        blank: false,
        max_length: Some(15),
    },
];

pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELD_SPECS.iter().find(|spec| spec.name == name)
}

/// Names of all declared fields, in declaration order.
pub fn field_names() -> Vec<&'static str> {
    FIELD_SPECS.iter().map(|spec| spec.name).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintViolation {
    Required,
    TooLong { max: usize, actual: usize },
}

/// A structural problem with one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub violation: ConstraintViolation,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.violation {
            ConstraintViolation::Required => f.write_str("This field is required."),
            ConstraintViolation::TooLong { max, actual } => write!(
                f,
                "Ensure this value has at most {max} characters (it has {actual})."
            ),
        }
    }
}

enum FieldValue<'a> {
    Empty,
    Present,
    Text(&'a str),
}

fn field_value<'a>(fields: &'a NextAppointmentFields, name: &str) -> FieldValue<'a> {
    let present = match name {
        "health_facility" => fields.health_facility.is_some(),
        "appt_date" => fields.appt_date.is_some(),
        "info_source" => fields.info_source.is_some(),
        "visitschedule" => fields.visitschedule.is_some(),
        "best_visit_code" => {
            return match fields.best_visit_code.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => FieldValue::Text(text),
                _ => FieldValue::Empty,
            };
        }
        _ => false,
    };
    if present {
        FieldValue::Present
    } else {
        FieldValue::Empty
    }
}

/// Check the fields shown on a form against their declarations.
///
/// Only fields listed in `form_fields` are checked, so a form that leaves out
/// one of the fragment's fields is not forced to fill it in. Unknown names
/// are ignored.
pub fn check_constraints(fields: &NextAppointmentFields, form_fields: &[&str]) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for spec in FIELD_SPECS.iter().filter(|spec| form_fields.contains(&spec.name)) {
        match field_value(fields, spec.name) {
            FieldValue::Empty if !spec.blank => errors.push(FieldError {
                field: spec.name,
                violation: ConstraintViolation::Required,
            }),
            FieldValue::Text(text) if spec.kind == FieldKind::Char => {
                let actual = text.chars().count();
                if let Some(max) = spec.max_length
                    && actual > max
                {
                    errors.push(FieldError {
                        field: spec.name,
                        violation: ConstraintViolation::TooLong { max, actual },
                    });
                }
            }
            _ => {}
        }
    }
    errors
}
