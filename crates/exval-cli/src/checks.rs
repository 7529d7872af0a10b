//! # Check Configuration
//!
//! The list of (example, schema) pairs to validate. The built-in list covers
//! the GeoZone examples; a YAML manifest passed with `--config` replaces it.
//!
//! ```yaml
//! checks:
//!   - example: PartialExample_TimePeriod
//!     schema: Schema_GeoZoneTimePeriod
//!   - example: Example_GeoZone_2_Layers
//!     example_path: "$.features[0]"
//!     schema: Schema_GeoZones
//!     schema_path: "$['$defs'].GeoZone"
//!     expected_valid: false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Directory under the project root holding example documents.
pub const EXAMPLES_DIR: &str = "examples";

/// Directory under the project root holding schema documents.
pub const SCHEMA_DIR: &str = "schema";

/// (example file, example path, schema file, schema path), all expected valid.
const BUILTIN_CHECKS: &[(&str, &str, &str, &str)] = &[
    ("Example_GeoZone_2_Layers", "$", "Schema_GeoZones", "$"),
    ("PartialExample_featureGeoJSON", "$", "Schema_GeoZones", "$"),
    ("PartialExample_GeoZoneProperties", "$", "Schema_GeoZoneProperties", "$"),
    ("PartialExample_TimePeriod", "$", "Schema_GeoZoneTimePeriod", "$"),
    ("PartialExample_ZoneAuthority", "$", "Schema_GeoZoneAuthority", "$"),
];

/// One example/schema pairing and its expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSpec {
    /// Example file name under `examples/`, `.json` optional.
    pub example: String,
    /// Query selecting the instance fragment; the whole example when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_path: Option<String>,
    /// Schema file name under `schema/`, `.json` optional.
    pub schema: String,
    /// Query selecting the schema fragment.
    #[serde(default = "root_query")]
    pub schema_path: String,
    /// Whether the example is expected to validate.
    #[serde(default = "expect_valid")]
    pub expected_valid: bool,
}

fn root_query() -> String {
    "$".to_string()
}

fn expect_valid() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    checks: Vec<CheckSpec>,
}

/// The checks run when no manifest is given.
pub fn builtin_checks() -> Vec<CheckSpec> {
    BUILTIN_CHECKS
        .iter()
        .map(|&(example, example_path, schema, schema_path)| CheckSpec {
            example: example.to_string(),
            example_path: Some(example_path.to_string()),
            schema: schema.to_string(),
            schema_path: schema_path.to_string(),
            expected_valid: true,
        })
        .collect()
}

/// Parse a YAML check manifest.
pub fn load_manifest(path: &Path) -> Result<Vec<CheckSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read check manifest: {}", path.display()))?;
    let manifest: Manifest = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse check manifest: {}", path.display()))?;
    if manifest.checks.is_empty() {
        bail!("check manifest declares no checks: {}", path.display());
    }
    tracing::debug!(
        manifest = %path.display(),
        checks = manifest.checks.len(),
        "loaded check manifest"
    );
    Ok(manifest.checks)
}

/// The manifest's checks when `config` is given, the built-in list otherwise.
pub fn load_checks(config: Option<&Path>, root: &Path) -> Result<Vec<CheckSpec>> {
    match config {
        Some(path) => load_manifest(&crate::resolve_path(path, root)),
        None => Ok(builtin_checks()),
    }
}

/// File locations under a project root.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the example document `name`.
    pub fn example_file(&self, name: &str) -> PathBuf {
        self.root.join(EXAMPLES_DIR).join(with_json_suffix(name))
    }

    /// Path of the schema document `name`.
    pub fn schema_file(&self, name: &str) -> PathBuf {
        self.root.join(SCHEMA_DIR).join(with_json_suffix(name))
    }

    /// Whether `dir` has the directories of a project root.
    pub fn is_project_root(dir: &Path) -> bool {
        dir.join(SCHEMA_DIR).is_dir() && dir.join(EXAMPLES_DIR).is_dir()
    }
}

fn with_json_suffix(name: &str) -> String {
    if name.ends_with(".json") {
        name.to_string()
    } else {
        format!("{name}.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_list_covers_geozone_examples() {
        let checks = builtin_checks();
        assert_eq!(checks.len(), 5);
        assert_eq!(checks[0].example, "Example_GeoZone_2_Layers");
        assert_eq!(checks[0].schema, "Schema_GeoZones");
        assert_eq!(checks[4].schema, "Schema_GeoZoneAuthority");
        assert!(checks.iter().all(|c| c.expected_valid));
        assert!(checks
            .iter()
            .all(|c| c.schema_path == "$" && c.example_path.as_deref() == Some("$")));
    }

    #[test]
    fn manifest_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checks.yaml");
        std::fs::write(
            &path,
            "checks:\n  - example: A\n    schema: S\n  - example: B\n    example_path: \"$.x\"\n    schema: S\n    schema_path: \"$.defs.X\"\n    expected_valid: false\n",
        )
        .unwrap();

        let checks = load_manifest(&path).unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].schema_path, "$");
        assert_eq!(checks[0].example_path, None);
        assert!(checks[0].expected_valid);
        assert_eq!(checks[1].example_path.as_deref(), Some("$.x"));
        assert_eq!(checks[1].schema_path, "$.defs.X");
        assert!(!checks[1].expected_valid);
    }

    #[test]
    fn manifest_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checks.yaml");
        std::fs::write(&path, "checks:\n  - example: A\n    schema: S\n    expect: true\n").unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"), "got: {err:#}");
    }

    #[test]
    fn empty_manifest_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checks.yaml");
        std::fs::write(&path, "checks: []\n").unwrap();
        assert!(load_manifest(&path).is_err());
    }

    #[test]
    fn missing_manifest_reports_path() {
        let err = load_manifest(Path::new("/nonexistent/exval/checks.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/exval/checks.yaml"));
    }

    #[test]
    fn layout_appends_json_suffix_once() {
        let layout = ProjectLayout::new("/project");
        assert_eq!(
            layout.example_file("PartialExample_TimePeriod"),
            PathBuf::from("/project/examples/PartialExample_TimePeriod.json")
        );
        assert_eq!(
            layout.schema_file("Schema_GeoZones.json"),
            PathBuf::from("/project/schema/Schema_GeoZones.json")
        );
    }

    #[test]
    fn project_root_needs_both_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("schema")).unwrap();
        assert!(!ProjectLayout::is_project_root(dir.path()));
        std::fs::create_dir(dir.path().join("examples")).unwrap();
        assert!(ProjectLayout::is_project_root(dir.path()));
    }
}
