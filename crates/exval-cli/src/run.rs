//! # Check and List Subcommands
//!
//! `exval check` runs every selected check to completion before reporting,
//! so one run shows every diverging example. Configuration errors abort the
//! run instead: a misconfigured check cannot produce a meaningful result.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use exval_core::Document;
use exval_schema::validate_file;

use crate::checks::{load_checks, CheckSpec, ProjectLayout};
use crate::report::{CheckReport, OutputFormat, RunReport};

/// Arguments for the `exval check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Run only the checks for this example (repeatable).
    #[arg(long = "only", value_name = "EXAMPLE")]
    pub only: Vec<String>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `exval list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when every check matched its expectation, 70 otherwise.
pub fn run_check(args: &CheckArgs, config: Option<&Path>, root: &Path) -> Result<u8> {
    let checks = load_checks(config, root)?;
    let selected = select(&checks, &args.only)?;
    let report = execute(&selected, &ProjectLayout::new(root))?;

    let mut stdout = std::io::stdout().lock();
    report
        .render(args.format, &mut stdout)
        .context("failed to write report")?;

    Ok(report.exit_code())
}

/// Execute the list subcommand.
pub fn run_list(_args: &ListArgs, config: Option<&Path>, root: &Path) -> Result<u8> {
    let checks = load_checks(config, root)?;
    for check in &checks {
        println!("{}", describe(check));
    }
    Ok(0)
}

/// Run `checks` in order and collect their outcomes.
pub fn execute(checks: &[CheckSpec], layout: &ProjectLayout) -> Result<RunReport> {
    let mut reports = Vec::with_capacity(checks.len());
    for check in checks {
        let report = run_one(check, layout)
            .with_context(|| format!("check '{}' is misconfigured", describe(check)))?;
        tracing::info!(
            example = %check.example,
            errors = report.errors.len(),
            matched = report.matched,
            "check finished"
        );
        reports.push(report);
    }
    Ok(RunReport::new(reports))
}

fn run_one(check: &CheckSpec, layout: &ProjectLayout) -> Result<CheckReport> {
    let instance = Document::load(layout.example_file(&check.example))?;
    let errors = validate_file(
        &layout.schema_file(&check.schema),
        &check.schema_path,
        &instance,
        check.example_path.as_deref(),
    )?;
    Ok(CheckReport::new(check, errors))
}

/// The checks whose example is named in `only`, or all when `only` is empty.
fn select(checks: &[CheckSpec], only: &[String]) -> Result<Vec<CheckSpec>> {
    if only.is_empty() {
        return Ok(checks.to_vec());
    }
    if let Some(unknown) = only
        .iter()
        .find(|name| !checks.iter().any(|c| &c.example == *name))
    {
        bail!("no configured check for example '{unknown}'");
    }
    Ok(checks
        .iter()
        .filter(|c| only.contains(&c.example))
        .cloned()
        .collect())
}

fn describe(check: &CheckSpec) -> String {
    format!(
        "{} [{}] -> {} [{}]{}",
        check.example,
        check.example_path.as_deref().unwrap_or("$"),
        check.schema,
        check.schema_path,
        if check.expected_valid {
            ""
        } else {
            " (expected invalid)"
        }
    )
}
