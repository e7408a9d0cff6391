use std::path::Path;

use anyhow::{Context, Result};
use edc_cli::case::{CaseFile, evaluate};
use edc_cli::routes::{RouteTarget, resolve, url_patterns};
use edc_cli::settings::load_settings;
use edc_model::FIELD_SPECS;
use tracing::{info, info_span};

use crate::cli::{RoutesArgs, ValidateArgs};
use crate::summary::{fields_table, print_case_report, routes_table};

/// Returns whether the suggestion was accepted.
pub fn run_validate(args: &ValidateArgs, config: Option<&Path>) -> Result<bool> {
    let span = info_span!("validate", case = %args.case.display());
    let _guard = span.enter();

    let settings = load_settings(config)?;
    let case = CaseFile::load(&args.case)?;
    let report = evaluate(&case, &settings)
        .with_context(|| format!("evaluate {}", args.case.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{json}");
    } else {
        print_case_report(&report);
    }
    Ok(report.accepted())
}

pub fn run_fields() {
    println!("{}", fields_table(&FIELD_SPECS));
}

/// Returns false when `--resolve` names a path with no route.
pub fn run_routes(args: &RoutesArgs) -> bool {
    let Some(path) = &args.resolve else {
        println!("{}", routes_table(url_patterns()));
        return true;
    };
    match resolve(path) {
        Some(route) => {
            let RouteTarget::Redirect(to) = route.target;
            info!(path = %path, name = route.name, "route resolved");
            println!("{} -> redirect {to}", route.qualified_name());
            true
        }
        None => {
            eprintln!("no route matches {path:?}");
            false
        }
    }
}
