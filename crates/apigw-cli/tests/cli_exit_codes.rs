//! Integration test: run the `apigw` binary and check its exit codes.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture_registry() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir.join("schemas/gateway.schema.json")
}

fn apigw(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_apigw"))
        .args(args)
        .output()
        .expect("failed to run apigw")
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn validate_prints_normalized_entity() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "upstream.json",
        r#"{"type": "chash", "key": "remote_addr", "nodes": {"127.0.0.1:80": 1}}"#,
    );
    let registry = fixture_registry().display().to_string();
    let out = apigw(&[
        "validate",
        "--registry",
        &registry,
        "--kind",
        "upstream",
        "--print-normalized",
        &file,
    ]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("OK"), "{stdout}");
    assert!(stdout.contains(r#""hash_on": "vars""#), "{stdout}");
}

#[test]
fn validate_reports_invalid_entity() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "route.json",
        r#"{"uri": "/", "upstream": {"type": "chash", "hash_on": "header", "nodes": {"a:80": 1}}}"#,
    );
    let registry = fixture_registry().display().to_string();
    let out = apigw(&["validate", "--registry", &registry, "--kind", "route", &file]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("missing key"));
}

#[test]
fn config_file_supplies_registry() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "apigw.yaml",
        &format!("registry: {}\n", fixture_registry().display()),
    );
    let out = apigw(&["--config", &config, "resolve", "main.upstream_hash_vars_schema"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("pattern"));

    let out = apigw(&["--config", &config, "resolve", "plugins.cors"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn operational_errors_exit_two() {
    let out = apigw(&["resolve", "main.route"]);
    assert_eq!(out.status.code(), Some(2));

    let out = apigw(&[
        "--draft",
        "draft7",
        "check",
        "--schema",
        "/no/such/schema.json",
        "/no/such/doc.json",
    ]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn unknown_kind_is_a_usage_error() {
    let out = apigw(&["validate", "--kind", "plugin", "x.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("plugin"));
}
