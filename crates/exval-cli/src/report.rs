//! # Run Reports
//!
//! Per-check outcomes and their rendering. Text output is meant for people
//! reading CI logs; JSON output carries the same data for tooling.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use exval_schema::ValidationError;

use crate::checks::CheckSpec;

/// Exit status when every check matched its expectation.
pub const EXIT_OK: u8 = 0;

/// Exit status when any check diverged from its expectation (`EX_SOFTWARE`).
pub const EXIT_MISMATCH: u8 = 70;

/// Output format of `exval check`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub example: String,
    pub schema: String,
    pub expected_valid: bool,
    /// Whether the outcome agrees with `expected_valid`.
    pub matched: bool,
    pub errors: Vec<ValidationError>,
}

impl CheckReport {
    pub fn new(check: &CheckSpec, errors: Vec<ValidationError>) -> Self {
        Self {
            example: check.example.clone(),
            schema: check.schema.clone(),
            expected_valid: check.expected_valid,
            matched: errors.is_empty() == check.expected_valid,
            errors,
        }
    }

    fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        match (self.expected_valid, self.errors.len()) {
            (true, 0) => writeln!(out, "{}: No errors found.", self.example),
            (true, count) => {
                writeln!(out, "{}: {count} errors found", self.example)?;
                for error in &self.errors {
                    writeln!(out, "  * {}: {}", error.json_path, error.message)?;
                }
                Ok(())
            }
            (false, 0) => writeln!(out, "{}: Incorrectly found no errors.", self.example),
            (false, count) => writeln!(out, "{}: {count} errors found, as expected.", self.example),
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub checks: Vec<CheckReport>,
    pub matched: usize,
    pub total: usize,
}

impl RunReport {
    pub fn new(checks: Vec<CheckReport>) -> Self {
        let matched = checks.iter().filter(|c| c.matched).count();
        let total = checks.len();
        Self {
            checks,
            matched,
            total,
        }
    }

    /// Whether every check matched its expectation.
    pub fn all_matched(&self) -> bool {
        self.matched == self.total
    }

    pub fn exit_code(&self) -> u8 {
        if self.all_matched() {
            EXIT_OK
        } else {
            EXIT_MISMATCH
        }
    }

    /// Write the report in `format`.
    pub fn render(&self, format: OutputFormat, out: &mut impl Write) -> io::Result<()> {
        match format {
            OutputFormat::Text => self.render_text(out),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self).map_err(io::Error::from)?;
                writeln!(out)
            }
        }
    }

    fn render_text(&self, out: &mut impl Write) -> io::Result<()> {
        for check in &self.checks {
            check.write_text(out)?;
        }
        writeln!(
            out,
            "{}/{} checks matched expectations.",
            self.matched, self.total
        )
    }
}
