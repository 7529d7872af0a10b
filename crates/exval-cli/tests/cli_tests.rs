//! Runs the `exval` binary against temporary project layouts.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const GEOZONE_SCHEMA: &str = r##"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "type": "object",
    "required": ["type", "features"],
    "properties": {
        "type": {"const": "FeatureCollection"},
        "features": {"type": "array", "items": {"$ref": "#/$defs/GeoZone"}}
    },
    "$defs": {
        "GeoZone": {
            "type": "object",
            "required": ["identifier"],
            "properties": {"identifier": {"type": "string", "maxLength": 7}}
        }
    }
}"##;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("schema")).unwrap();
    std::fs::create_dir(dir.path().join("examples")).unwrap();
    for (path, body) in files {
        std::fs::write(dir.path().join(path), body).unwrap();
    }
    dir
}

fn exval(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_exval"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

const MANIFEST: &str = "checks:
  - example: Layers
    schema: Schema_GeoZones
  - example: Layers
    example_path: \"$.features[1]\"
    schema: Schema_GeoZones
    schema_path: \"$['$defs'].GeoZone\"
    expected_valid: false
";

const PASSING_MANIFEST: &str = "checks:
  - example: Layers
    example_path: \"$.features[0]\"
    schema: Schema_GeoZones
    schema_path: \"$['$defs'].GeoZone\"
  - example: Layers
    example_path: \"$.features[1]\"
    schema: Schema_GeoZones
    schema_path: \"$['$defs'].GeoZone\"
    expected_valid: false
";

const LAYERS: &str =
    r#"{"type":"FeatureCollection","features":[{"identifier":"Z1"},{"identifier":"TOO-LONG-ID"}]}"#;

#[test]
fn passing_run_exits_zero() {
    let dir = project(&[
        ("schema/Schema_GeoZones.json", GEOZONE_SCHEMA),
        ("examples/Layers.json", LAYERS),
        ("checks.yaml", PASSING_MANIFEST),
    ]);

    let output = exval(dir.path(), &["--config", "checks.yaml", "check"]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        stdout(&output),
        "Layers: No errors found.\n\
         Layers: 1 errors found, as expected.\n\
         2/2 checks matched expectations.\n"
    );
}

#[test]
fn diverging_check_exits_software_error() {
    let dir = project(&[
        ("schema/Schema_GeoZones.json", GEOZONE_SCHEMA),
        ("examples/Layers.json", LAYERS),
        ("checks.yaml", MANIFEST),
    ]);

    let output = exval(dir.path(), &["--config", "checks.yaml", "check"]);
    assert_eq!(output.status.code(), Some(70));
    let text = stdout(&output);
    assert!(text.starts_with("Layers: 1 errors found\n"), "got: {text}");
    assert!(text.contains("  * $['features'][1]['identifier']: "), "got: {text}");
    assert!(text.contains("Layers: 1 errors found, as expected.\n"), "got: {text}");
    assert!(text.ends_with("1/2 checks matched expectations.\n"), "got: {text}");
}

#[test]
fn json_format_and_only_filter() {
    let dir = project(&[
        ("schema/S.json", r#"{"type":"object","required":["x"]}"#),
        ("examples/A.json", "{}"),
        ("examples/B.json", r#"{"x":1}"#),
        (
            "checks.yaml",
            "checks:\n  - example: A\n    schema: S\n  - example: B\n    schema: S\n",
        ),
    ]);

    let output = exval(
        dir.path(),
        &["--config", "checks.yaml", "check", "--only", "B", "--format", "json"],
    );
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total"], 1);
    assert_eq!(report["checks"][0]["example"], "B");
    assert_eq!(report["checks"][0]["errors"], serde_json::json!([]));
}

#[test]
fn configuration_errors_exit_one_without_a_report() {
    let dir = project(&[
        ("schema/S.json", r#"{"type":"object","required":"x"}"#),
        ("examples/A.json", "{}"),
        ("checks.yaml", "checks:\n  - example: A\n    schema: S\n"),
    ]);

    let output = exval(dir.path(), &["--config", "checks.yaml", "check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("not a valid schema"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn builtin_checks_need_geozone_files() {
    let dir = project(&[]);
    let output = exval(dir.path(), &["check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Example_GeoZone_2_Layers"));
}

#[test]
fn list_prints_builtin_checks() {
    let dir = project(&[]);
    let output = exval(dir.path(), &["list"]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 5);
    assert!(text.starts_with("Example_GeoZone_2_Layers [$] -> Schema_GeoZones [$]\n"));
}
