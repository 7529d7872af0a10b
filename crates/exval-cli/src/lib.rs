//! # exval-cli: Example Validation Runner
//!
//! Provides the `exval` command-line interface, which keeps a project's
//! illustrative JSON examples in sync with its JSON Schemas.
//!
//! ## Subcommands
//!
//! - `exval check`: Validate every configured example against its schema
//!   fragment and report the outcome of each check.
//! - `exval list`: Print the configured checks.
//!
//! ## Exit Status
//!
//! `check` exits 0 when every check matched its expectation and 70
//! (`EX_SOFTWARE`) when any did not. A misconfigured check (unreadable
//! file, ambiguous path, malformed schema) aborts the run with exit 1.
//!
//! ```bash
//! exval check
//! exval check --only PartialExample_TimePeriod --format json
//! exval --config checks.yaml list
//! ```

pub mod checks;
pub mod report;
pub mod run;

use std::path::{Path, PathBuf};

/// Resolve a path that may be relative to the project root.
///
/// If the path is absolute, returns it as-is. If relative and the file
/// exists relative to `root`, uses that. Otherwise returns the path
/// relative to the current directory.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let root_relative = root.join(path);
    if root_relative.exists() {
        root_relative
    } else {
        path.to_path_buf()
    }
}
