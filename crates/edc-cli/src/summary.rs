use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use edc_cli::case::{CaseReport, Outcome};
use edc_cli::routes::{Route, RouteTarget};
use edc_model::{Appointment, FieldSpec};

pub fn print_case_report(report: &CaseReport) {
    println!("Participant: {}", report.subject_identifier);
    println!("Current visit: {}", report.current_visit);

    let mut table = Table::new();
    table.set_header(vec![header_cell("Check"), header_cell("Result")]);
    apply_summary_table_style(&mut table);
    table.add_row(vec![
        Cell::new("Suggested date"),
        optional_cell(report.suggested_date.map(|date| date.to_string())),
    ]);
    table.add_row(vec![
        Cell::new("Suggested visit"),
        optional_cell(report.suggested_visit.as_ref().map(ToString::to_string)),
    ]);
    table.add_row(vec![Cell::new("Date format"), dim_cell(&report.date_format)]);
    table.add_row(vec![Cell::new("Form"), form_cell(report.form_errors.len())]);
    table.add_row(vec![Cell::new("Outcome"), outcome_cell(&report.outcome)]);
    println!("{table}");

    print_problems(report);
    if !report.interim.is_empty() {
        println!("Interim appointments that become not required:");
        println!("{}", appointments_table(&report.interim));
    }
}

fn print_problems(report: &CaseReport) {
    let mut rows: Vec<(String, String, &str)> = report
        .form_errors
        .iter()
        .map(|error| (error.field.clone(), error.message.clone(), "form"))
        .collect();
    if let Outcome::Rejected(error) = &report.outcome {
        rows.push((
            error.field.to_string(),
            error.message.clone(),
            error.category().label(),
        ));
    }
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Category"),
        header_cell("Message"),
    ]);
    apply_summary_table_style(&mut table);
    for (field, message, category) in rows {
        table.add_row(vec![
            Cell::new(field).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(category).fg(Color::Red),
            Cell::new(message),
        ]);
    }
    println!("{table}");
}

fn appointments_table(appointments: &[Appointment]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Visit"),
        header_cell("Timepoint"),
        header_cell("Appointment"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    for appointment in appointments {
        table.add_row(vec![
            Cell::new(&appointment.visit_code),
            Cell::new(appointment.timepoint),
            Cell::new(appointment.appt_datetime.format("%Y-%m-%d %H:%M")),
            Cell::new(appointment.status.label()),
        ]);
    }
    table
}

pub fn fields_table(specs: &[FieldSpec]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Kind"),
        header_cell("Required"),
        header_cell("Max length"),
        header_cell("Help"),
    ]);
    apply_table_style(&mut table);
    for spec in specs {
        table.add_row(vec![
            Cell::new(spec.name).fg(Color::Blue),
            Cell::new(spec.verbose_name),
            Cell::new(spec.kind),
            if spec.blank {
                dim_cell("no")
            } else {
                Cell::new("yes").add_attribute(Attribute::Bold)
            },
            optional_cell(spec.max_length.map(|max| max.to_string())),
            optional_cell(spec.help_text.map(str::to_string)),
        ]);
    }
    table
}

pub fn routes_table(routes: &[Route]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Path"),
        header_cell("Name"),
        header_cell("Target"),
    ]);
    apply_table_style(&mut table);
    for route in routes {
        let path = if route.path.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", route.path)
        };
        let RouteTarget::Redirect(to) = route.target;
        table.add_row(vec![
            Cell::new(path),
            Cell::new(route.qualified_name()),
            Cell::new(format!("redirect {to}")),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn outcome_cell(outcome: &Outcome) -> Cell {
    match outcome {
        Outcome::Accepted { resolved: Some(appointment) } => {
            Cell::new(format!("ACCEPTED ({})", appointment.visit_code))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        }
        Outcome::Accepted { resolved: None } => Cell::new("ACCEPTED (no date)").fg(Color::Green),
        Outcome::Rejected(_) => Cell::new("REJECTED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Outcome::NotValidated => dim_cell("not run"),
    }
}

fn form_cell(errors: usize) -> Cell {
    if errors == 0 {
        Cell::new("ok").fg(Color::Green)
    } else {
        Cell::new(format!("{errors} error(s)"))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<String>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
