//! Tests for suggested next-appointment validation.

use std::cell::RefCell;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use edc_model::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentWindow, SubjectIdentifier,
    SubjectVisit, SuggestedAppointment, SuggestedVisit, Timeline, VisitCode, VisitScheduleEntry,
};
use edc_validate::{
    AppointmentLookup, Category, Field, LookupQuery, ShortDateFormatter, SuggestionIssue,
    SuggestionValidator, WindowPeriodError, WindowedLookup,
};
use proptest::prelude::*;

const SUBJECT: &str = "101-0001";

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn appointment(
    id: u64,
    code: &str,
    appt_datetime: DateTime<Utc>,
    window: (DateTime<Utc>, DateTime<Utc>),
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        id: AppointmentId::new(id),
        subject_identifier: SubjectIdentifier::new(SUBJECT).unwrap(),
        visit_schedule_name: "visit_schedule".to_string(),
        schedule_name: "schedule".to_string(),
        visit_code: VisitCode::new(code).unwrap(),
        visit_code_sequence: 0,
        timepoint: id as u32,
        appt_datetime,
        status,
        window: AppointmentWindow::new(window.0, window.1),
    }
}

/// 1000 (done) on Jan 1, 2000 on Feb 1, 3000 on Mar 1, with a gap between
/// the 2000 and 3000 windows.
fn timeline(status_2000: AppointmentStatus, status_3000: AppointmentStatus) -> Timeline {
    Timeline::new(vec![
        appointment(
            1,
            "1000",
            utc(2024, 1, 1, 9, 0, 0),
            (utc(2024, 1, 1, 0, 0, 0), utc(2024, 1, 3, 23, 59, 59)),
            AppointmentStatus::Complete,
        ),
        appointment(
            2,
            "2000",
            utc(2024, 2, 1, 9, 0, 0),
            (utc(2024, 1, 25, 0, 0, 0), utc(2024, 2, 8, 23, 59, 59)),
            status_2000,
        ),
        appointment(
            3,
            "3000",
            utc(2024, 3, 1, 9, 0, 0),
            (utc(2024, 2, 22, 0, 0, 0), utc(2024, 3, 8, 23, 59, 59)),
            status_3000,
        ),
    ])
    .unwrap()
}

fn subject_visit(appointment: u64, code: &str) -> SubjectVisit {
    SubjectVisit {
        subject_identifier: SubjectIdentifier::new(SUBJECT).unwrap(),
        visit_schedule_name: "visit_schedule".to_string(),
        schedule_name: "schedule".to_string(),
        appointment: AppointmentId::new(appointment),
        visit_code: VisitCode::new(code).unwrap(),
    }
}

fn at_1000() -> SuggestedAppointment {
    SuggestedAppointment::new(subject_visit(1, "1000"))
}

fn code(value: &str) -> SuggestedVisit {
    SuggestedVisit::Code(VisitCode::new(value).unwrap())
}

fn schedule_entry(value: &str) -> SuggestedVisit {
    SuggestedVisit::Schedule(VisitScheduleEntry {
        id: 1,
        visit_schedule_name: "visit_schedule".to_string(),
        schedule_name: "schedule".to_string(),
        visit_code: VisitCode::new(value).unwrap(),
        visit_title: String::new(),
        timepoint: 0,
        active: true,
    })
}

fn validate(
    timeline: &Timeline,
    submission: &SuggestedAppointment,
) -> Result<Option<Appointment>, edc_validate::ValidationError> {
    let lookup = WindowedLookup::new(timeline);
    let formatter = ShortDateFormatter::default();
    SuggestionValidator::new(timeline, &lookup, &formatter).resolve(submission)
}

#[test]
fn missing_date_is_always_valid() {
    let timeline = timeline(AppointmentStatus::Complete, AppointmentStatus::Complete);
    let submission = at_1000().with_visit(code("9999"));
    assert_eq!(validate(&timeline, &submission), Ok(None));
}

#[test]
fn date_in_next_window_without_code_is_accepted() {
    let timeline = timeline(AppointmentStatus::New, AppointmentStatus::New);
    let submission = at_1000().with_date(date(2024, 2, 2));
    let resolved = validate(&timeline, &submission).unwrap().unwrap();
    assert_eq!(resolved.visit_code.as_str(), "2000");
}

#[test]
fn skipped_next_appointment_allows_any_date() {
    let timeline = timeline(AppointmentStatus::Skipped, AppointmentStatus::New);
    let submission = at_1000().with_date(date(2024, 3, 1));
    let resolved = validate(&timeline, &submission).unwrap().unwrap();
    assert_eq!(resolved.visit_code.as_str(), "3000");
}

#[test]
fn filed_next_appointment_requires_its_date() {
    let timeline = timeline(AppointmentStatus::Complete, AppointmentStatus::New);
    let submission = at_1000().with_date(date(2024, 2, 2));
    let err = validate(&timeline, &submission).unwrap_err();
    assert_eq!(err.field, Field::ApptDate);
    assert_eq!(err.category(), Category::Conflict);
    assert_eq!(
        err.issue,
        SuggestionIssue::Conflict {
            expected: date(2024, 2, 1),
            visit_code: VisitCode::new("2000").unwrap(),
        }
    );
    insta::assert_snapshot!(
        err.message,
        @"Invalid. Next visit report already submitted. Expected `02/01/2024`. See `2000`."
    );
}

#[test]
fn later_date_than_filed_report_reports_conflict_first() {
    let timeline = timeline(AppointmentStatus::InProgress, AppointmentStatus::New);
    let submission = at_1000().with_date(date(2024, 3, 1));
    let err = validate(&timeline, &submission).unwrap_err();
    assert_eq!(err.category(), Category::Conflict);
}

#[test]
fn filed_next_appointment_date_is_accepted() {
    let timeline = timeline(AppointmentStatus::Incomplete, AppointmentStatus::New);
    let submission = at_1000()
        .with_date(date(2024, 2, 1))
        .with_visit(schedule_entry("2000"));
    let resolved = validate(&timeline, &submission).unwrap().unwrap();
    assert_eq!(resolved.id, AppointmentId::new(2));
}

#[test]
fn filed_next_appointment_is_compared_in_local_time() {
    let mut appointments = timeline(AppointmentStatus::Complete, AppointmentStatus::New)
        .appointments()
        .to_vec();
    appointments[1].appt_datetime = utc(2024, 2, 1, 22, 30, 0);
    let timeline = Timeline::new(appointments).unwrap();
    let lookup = WindowedLookup::new(&timeline);
    let formatter =
        ShortDateFormatter::new("d/m/Y", FixedOffset::east_opt(3 * 3600).unwrap()).unwrap();
    let validator = SuggestionValidator::new(&timeline, &lookup, &formatter);

    assert!(validator.validate(&at_1000().with_date(date(2024, 2, 2))).is_ok());

    let err = validator
        .validate(&at_1000().with_date(date(2024, 2, 1)))
        .unwrap_err();
    insta::assert_snapshot!(
        err.message,
        @"Invalid. Next visit report already submitted. Expected `02/02/2024`. See `2000`."
    );
}

#[test]
fn date_within_current_window_is_rejected() {
    let timeline = timeline(AppointmentStatus::New, AppointmentStatus::New);
    let submission = at_1000().with_date(date(2024, 1, 2));
    let err = validate(&timeline, &submission).unwrap_err();
    assert_eq!(err.issue, SuggestionIssue::WithinCurrentWindow);
    assert_eq!(err.category(), Category::OutOfRange);
    insta::assert_snapshot!(
        err.to_string(),
        @"appt_date: Invalid. Cannot be within window period of current appointment."
    );
}

#[test]
fn last_appointment_has_no_next_to_conflict_with() {
    let timeline = timeline(AppointmentStatus::Complete, AppointmentStatus::InProgress);
    let submission = SuggestedAppointment::new(subject_visit(3, "3000")).with_date(date(2024, 3, 5));
    let err = validate(&timeline, &submission).unwrap_err();
    assert_eq!(err.issue, SuggestionIssue::WithinCurrentWindow);
}

#[test]
fn date_after_followup_is_rejected() {
    let timeline = timeline(AppointmentStatus::New, AppointmentStatus::New);
    let submission = at_1000().with_date(date(2024, 4, 30));
    let err = validate(&timeline, &submission).unwrap_err();
    assert_eq!(err.issue, SuggestionIssue::OutsideFollowup);
    insta::assert_snapshot!(err.message, @"Invalid. Must be within the followup period.");
}

#[test]
fn date_in_gap_resolves_to_following_visit() {
    let timeline = timeline(AppointmentStatus::New, AppointmentStatus::New);
    let submission = at_1000().with_date(date(2024, 2, 15));
    let resolved = validate(&timeline, &submission).unwrap().unwrap();
    assert_eq!(resolved.visit_code.as_str(), "3000");

    let submission = submission.with_visit(code("2000"));
    let err = validate(&timeline, &submission).unwrap_err();
    assert_eq!(err.field, Field::VisitSchedule);
    insta::assert_snapshot!(err.message, @"Expected 3000 using 02/15/2024 from above.");
}

#[test]
fn matching_visit_code_is_accepted() {
    let timeline = timeline(AppointmentStatus::New, AppointmentStatus::New);
    let submission = at_1000()
        .with_date(date(2024, 2, 2))
        .with_visit(code("2000"));
    assert!(validate(&timeline, &submission).is_ok());
}

#[test]
fn mismatched_visit_code_names_resolved_code_and_date() {
    let timeline = timeline(AppointmentStatus::New, AppointmentStatus::New);
    let submission = at_1000()
        .with_date(date(2024, 2, 2))
        .with_visit(schedule_entry("3000"));
    let err = validate(&timeline, &submission).unwrap_err();
    assert_eq!(err.field, Field::VisitSchedule);
    assert_eq!(
        err.issue,
        SuggestionIssue::CodeMismatch {
            expected: VisitCode::new("2000").unwrap(),
            suggested_date: date(2024, 2, 2),
        }
    );
    insta::assert_snapshot!(
        err.to_string(),
        @"visitschedule: Expected 2000 using 02/02/2024 from above."
    );
}

#[test]
fn date_before_first_window_propagates_lookup_message() {
    let timeline = timeline(AppointmentStatus::New, AppointmentStatus::New);
    let submission = at_1000().with_date(date(2023, 12, 25));
    let err = validate(&timeline, &submission).unwrap_err();
    assert_eq!(err.category(), Category::WindowGap);
    insta::assert_snapshot!(
        err.message,
        @"Invalid. Date falls before the window period of the first visit `1000`. Expected a date on or after 2024-01-01 00:00:00 UTC. Got 2023-12-25 23:59:59 UTC."
    );
}

struct FailingLookup(&'static str);

impl AppointmentLookup for FailingLookup {
    fn appointment_by_datetime(
        &self,
        _at: DateTime<Utc>,
        _query: &LookupQuery<'_>,
        _raise_if_in_gap: bool,
    ) -> Result<Option<Appointment>, WindowPeriodError> {
        Err(WindowPeriodError::Other(self.0.to_string()))
    }
}

#[test]
fn window_period_error_message_is_kept_verbatim() {
    let timeline = timeline(AppointmentStatus::New, AppointmentStatus::New);
    let lookup = FailingLookup("Datetime falls outside of the window period for visit 2000.");
    let formatter = ShortDateFormatter::default();
    let validator = SuggestionValidator::new(&timeline, &lookup, &formatter);
    let err = validator
        .validate(&at_1000().with_date(date(2024, 2, 2)))
        .unwrap_err();
    assert_eq!(err.field, Field::ApptDate);
    assert_eq!(
        err.issue,
        SuggestionIssue::WindowGap {
            message: "Datetime falls outside of the window period for visit 2000.".to_string()
        }
    );
    assert_eq!(
        err.message,
        "Datetime falls outside of the window period for visit 2000."
    );
}

#[derive(Default)]
struct RecordingLookup {
    calls: RefCell<Vec<(DateTime<Utc>, String, String, String, bool)>>,
}

impl AppointmentLookup for RecordingLookup {
    fn appointment_by_datetime(
        &self,
        at: DateTime<Utc>,
        query: &LookupQuery<'_>,
        raise_if_in_gap: bool,
    ) -> Result<Option<Appointment>, WindowPeriodError> {
        self.calls.borrow_mut().push((
            at,
            query.subject_identifier.to_string(),
            query.visit_schedule_name.to_string(),
            query.schedule_name.to_string(),
            raise_if_in_gap,
        ));
        Ok(None)
    }
}

#[test]
fn lookup_uses_end_of_day_and_tolerates_gaps() {
    let timeline = timeline(AppointmentStatus::New, AppointmentStatus::New);
    let lookup = RecordingLookup::default();
    let formatter = ShortDateFormatter::default();
    let validator = SuggestionValidator::new(&timeline, &lookup, &formatter);
    let _ = validator.validate(&at_1000().with_date(date(2024, 2, 2)));

    let calls = lookup.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (at, subject, visit_schedule, schedule, raise_if_in_gap) = &calls[0];
    assert_eq!(*at, utc(2024, 2, 2, 23, 59, 59));
    assert_eq!(subject, SUBJECT);
    assert_eq!(visit_schedule, "visit_schedule");
    assert_eq!(schedule, "schedule");
    assert!(!raise_if_in_gap);
}

#[test]
fn conflict_is_reported_before_lookup_runs() {
    let timeline = timeline(AppointmentStatus::Complete, AppointmentStatus::New);
    let lookup = RecordingLookup::default();
    let formatter = ShortDateFormatter::default();
    let validator = SuggestionValidator::new(&timeline, &lookup, &formatter);
    let err = validator
        .validate(&at_1000().with_date(date(2024, 2, 5)))
        .unwrap_err();
    assert_eq!(err.category(), Category::Conflict);
    assert!(lookup.calls.borrow().is_empty());
}

fn status_strategy() -> impl Strategy<Value = AppointmentStatus> {
    prop_oneof![
        Just(AppointmentStatus::New),
        Just(AppointmentStatus::InProgress),
        Just(AppointmentStatus::Incomplete),
        Just(AppointmentStatus::Complete),
        Just(AppointmentStatus::Cancelled),
        Just(AppointmentStatus::Skipped),
    ]
}

fn visit_strategy() -> impl Strategy<Value = Option<SuggestedVisit>> {
    prop_oneof![
        Just(None),
        Just(Some(code("1000"))),
        Just(Some(code("2000"))),
        Just(Some(schedule_entry("3000"))),
    ]
}

proptest! {
    #[test]
    fn no_date_never_fails(
        status_2000 in status_strategy(),
        status_3000 in status_strategy(),
        visit in visit_strategy(),
    ) {
        let timeline = timeline(status_2000, status_3000);
        let mut submission = at_1000();
        submission.suggested_visit = visit;
        prop_assert_eq!(validate(&timeline, &submission), Ok(None));
    }

    #[test]
    fn validation_is_repeatable(
        status_2000 in status_strategy(),
        status_3000 in status_strategy(),
        visit in visit_strategy(),
        offset_days in 0i64..130,
    ) {
        let timeline = timeline(status_2000, status_3000);
        let mut submission = at_1000().with_date(date(2023, 12, 20) + Duration::days(offset_days));
        submission.suggested_visit = visit;
        let first = validate(&timeline, &submission);
        let second = validate(&timeline, &submission);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn open_next_appointment_never_conflicts(
        open_status in prop_oneof![Just(AppointmentStatus::New), Just(AppointmentStatus::Skipped)],
        offset_days in 0i64..130,
    ) {
        let timeline = timeline(open_status, AppointmentStatus::New);
        let submission = at_1000().with_date(date(2023, 12, 20) + Duration::days(offset_days));
        if let Err(err) = validate(&timeline, &submission) {
            prop_assert_ne!(err.category(), Category::Conflict);
            prop_assert_ne!(err.category(), Category::Ordering);
        }
    }
}
