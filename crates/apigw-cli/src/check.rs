//! # Check Subcommand
//!
//! Structural validation of an arbitrary JSON or YAML document against a
//! standalone schema file. No gateway rules apply.

use std::path::PathBuf;

use anyhow::{Context, Result};
use apigw_schema::{SchemaValidationError, StructuralValidator};
use clap::Args;

use crate::config::CliConfig;
use crate::{load_document, EXIT_INVALID, EXIT_OK};

/// Arguments for the `apigw check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema file (JSON, or YAML by extension).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Document to check.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when the document conforms, 1 when it does not.
pub fn run_check(args: &CheckArgs, config: &CliConfig) -> Result<u8> {
    let validator = StructuralValidator::from_file(&args.schema, &config.validator_options())
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;
    let document = load_document(&args.path)?;

    match validator.validate_value(&document) {
        Ok(()) => {
            println!("OK");
            Ok(EXIT_OK)
        }
        Err(SchemaValidationError::ValidationFailed { violations, .. }) => {
            println!("FAIL: {} ({} violation(s))", args.path.display(), violations.len());
            for violation in violations.violations() {
                println!("  {violation}");
            }
            Ok(EXIT_INVALID)
        }
        Err(e) => Err(e).with_context(|| format!("cannot check {}", args.path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(document: &str) -> (tempfile::TempDir, CheckArgs) {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("limit-count.schema.yaml");
        std::fs::write(
            &schema,
            "type: object\nrequired: [count, time_window]\nproperties:\n  count: {type: integer}\n",
        )
        .unwrap();
        let path = dir.path().join("conf.json");
        std::fs::write(&path, document).unwrap();
        (dir, CheckArgs { schema, path })
    }

    #[test]
    fn conforming_document_exits_zero() {
        let (_dir, args) = setup(r#"{"count": 1, "time_window": 60}"#);
        assert_eq!(run_check(&args, &CliConfig::default()).unwrap(), EXIT_OK);
    }

    #[test]
    fn violations_exit_one() {
        let (_dir, args) = setup(r#"{"count": "x"}"#);
        assert_eq!(run_check(&args, &CliConfig::default()).unwrap(), EXIT_INVALID);
    }

    #[test]
    fn malformed_schema_is_operational() {
        let (dir, mut args) = setup("{}");
        let schema = dir.path().join("broken.json");
        std::fs::write(&schema, "{").unwrap();
        args.schema = schema;
        let err = run_check(&args, &CliConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"), "{err:#}");
    }
}
