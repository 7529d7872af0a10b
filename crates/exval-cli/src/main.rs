//! # exval CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Logs go to stderr; stdout carries only the report.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exval_cli::checks::ProjectLayout;
use exval_cli::run::{run_check, run_list, CheckArgs, ListArgs};

/// Validate JSON examples against fragments of their JSON Schemas.
///
/// Each check selects one value of an example document and one subschema of
/// a schema document with JSONPath queries, validates the former against the
/// latter, and compares the outcome with the expected one.
#[derive(Parser, Debug)]
#[command(name = "exval", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML manifest listing the checks to run, replacing the built-in list.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project root containing `schema/` and `examples/`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate every configured example and report the outcomes.
    Check(CheckArgs),

    /// Print the configured checks.
    List(ListArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = cli.root.clone().unwrap_or_else(|| {
        resolve_project_root().unwrap_or_else(|| {
            tracing::warn!("Could not locate project root; using current directory");
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        })
    });

    tracing::debug!(root = %root.display(), "resolved project root");

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Check(args) => run_check(args, config, &root),
        Commands::List(args) => run_list(args, config, &root),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Walk up from the current directory to the first directory holding both
/// `schema/` and `examples/`.
fn resolve_project_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .find(|dir| ProjectLayout::is_project_root(dir))
        .map(PathBuf::from)
}
