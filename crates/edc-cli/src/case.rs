//! Case files: one participant timeline plus one submitted next-appointment CRF.
//!
//! ```json
//! {
//!   "appointments": [ ... ],
//!   "visit_schedule": [ ... ],
//!   "crf": { "subject_visit": { ... }, "report_datetime": "...", "appt_date": "..." },
//!   "form_fields": ["appt_date", "info_source", "visitschedule"]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use edc_model::{
    Appointment, NextAppointmentCrf, SubjectIdentifier, SuggestedAppointment, SuggestedVisit,
    Timeline, VisitCode, VisitScheduleEntry, check_constraints, field_names,
};
use edc_validate::{
    AppointmentTimeline, ShortDateFormatter, SuggestionValidator, ValidationError,
    ValidatorSettings, WindowedLookup,
};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::logging::redact_value;

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

#[derive(Debug, Clone, Deserialize)]
pub struct CaseFile {
    pub appointments: Vec<Appointment>,
    /// Choices offered for `visitschedule`. Empty means any entry is accepted.
    #[serde(default)]
    pub visit_schedule: Vec<VisitScheduleEntry>,
    pub crf: NextAppointmentCrf,
    /// Fields shown on the form. Defaults to every declared field.
    #[serde(default)]
    pub form_fields: Option<Vec<String>>,
}

impl CaseFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
    }

    fn form_fields(&self) -> Vec<&str> {
        match &self.form_fields {
            Some(fields) => fields.iter().map(String::as_str).collect(),
            None => field_names(),
        }
    }
}

/// Structural problem reported before business rules run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// Form errors stopped the case before the validator ran.
    NotValidated,
    /// `resolved` is `None` when no date was suggested.
    Accepted { resolved: Option<Appointment> },
    Rejected(ValidationError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub subject_identifier: SubjectIdentifier,
    pub current_visit: VisitCode,
    pub suggested_date: Option<NaiveDate>,
    pub suggested_visit: Option<VisitCode>,
    pub date_format: String,
    pub form_errors: Vec<FormError>,
    pub outcome: Outcome,
    /// New appointments between the current and the resolved one.
    pub interim: Vec<Appointment>,
}

impl CaseReport {
    pub fn accepted(&self) -> bool {
        self.form_errors.is_empty() && matches!(self.outcome, Outcome::Accepted { .. })
    }
}

pub fn evaluate(case: &CaseFile, settings: &ValidatorSettings) -> Result<CaseReport> {
    let timeline = Timeline::new(case.appointments.clone()).context("build appointment timeline")?;
    let formatter = ShortDateFormatter::from_settings(settings).context("apply settings")?;
    let submission = SuggestedAppointment::from_record(&case.crf);
    let subject_visit = &submission.subject_visit;
    if timeline.appointment(subject_visit.appointment).is_none() {
        bail!(
            "appointment {} of the submitted visit is not in the timeline",
            subject_visit.appointment
        );
    }

    let span = info_span!(
        "case",
        subject = redact_value(subject_visit.subject_identifier.as_str()),
        visit_code = %subject_visit.visit_code,
    );
    let _guard = span.enter();

    let form_errors = form_errors(case);
    let outcome = if form_errors.is_empty() {
        let lookup = WindowedLookup::new(&timeline);
        match SuggestionValidator::new(&timeline, &lookup, &formatter).resolve(&submission) {
            Ok(resolved) => Outcome::Accepted { resolved },
            Err(error) => Outcome::Rejected(error),
        }
    } else {
        warn!(count = form_errors.len(), "form errors, business rules not run");
        Outcome::NotValidated
    };

    let interim = match &outcome {
        Outcome::Accepted {
            resolved: Some(resolved),
        } => timeline
            .interim_appointments(subject_visit.appointment, resolved.id)
            .into_iter()
            .cloned()
            .collect(),
        _ => Vec::new(),
    };

    let report = CaseReport {
        subject_identifier: subject_visit.subject_identifier.clone(),
        current_visit: subject_visit.visit_code.clone(),
        suggested_date: submission.appt_date,
        suggested_visit: submission.suggested_visit_code().cloned(),
        date_format: formatter.php_format().to_string(),
        form_errors,
        outcome,
        interim,
    };
    info!(
        accepted = report.accepted(),
        interim = report.interim.len(),
        "case evaluated"
    );
    Ok(report)
}

fn form_errors(case: &CaseFile) -> Vec<FormError> {
    let form_fields = case.form_fields();
    let fields = &case.crf.next_appointment;
    let mut errors: Vec<FormError> = check_constraints(fields, &form_fields)
        .into_iter()
        .map(|error| FormError {
            field: error.field.to_string(),
            message: error.to_string(),
        })
        .collect();

    if form_fields.contains(&"visitschedule")
        && let Some(visit) = &fields.visitschedule
        && !case.visit_schedule.is_empty()
        && !case
            .visit_schedule
            .iter()
            .any(|choice| choice.active && is_choice(visit, choice))
    {
        errors.push(FormError {
            field: "visitschedule".to_string(),
            message: INVALID_CHOICE.to_string(),
        });
    }
    errors
}

/// A row matches by id; a bare code matches the row with that code.
fn is_choice(visit: &SuggestedVisit, choice: &VisitScheduleEntry) -> bool {
    match visit {
        SuggestedVisit::Schedule(entry) => entry.id == choice.id,
        SuggestedVisit::Code(code) => *code == choice.visit_code,
    }
}
