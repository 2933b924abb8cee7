//! # Validate Subcommand
//!
//! Runs the full write-path validation on an entity file: structural schema,
//! upstream rules, then plugin schemas, against a registry document.
//!
//! Schema checks run on the file's contents as written, before the entity
//! is decoded. An object that fails any stage exits `1` with the diagnostic. A registry
//! that cannot be loaded, or that lacks a schema the object needs, is an
//! operational error.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use apigw_core::EntityKind;
use apigw_schema::{GatewayValidator, SchemaDocument};
use clap::Args;

use crate::config::CliConfig;
use crate::{load_document, EXIT_INVALID, EXIT_OK};

/// Arguments for the `apigw validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Registry document holding `main.*` and plugin schemas.
    #[arg(long, value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Entity kind: route, service, upstream, consumer or ssl.
    #[arg(long)]
    pub kind: EntityKind,

    /// Print the entity after validation, with defaults filled in.
    #[arg(long)]
    pub print_normalized: bool,

    /// Entity file (JSON, or YAML by extension).
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the entity is valid, 1 when it is not.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    let registry_path = config.registry_path(args.registry.as_deref())?;
    let registry = SchemaDocument::load(&registry_path)
        .with_context(|| format!("failed to load schema registry {}", registry_path.display()))?;
    let validator =
        GatewayValidator::for_kind(Arc::new(registry), args.kind, config.validator_options())
            .with_context(|| format!("failed to build {} validator", args.kind))?;

    tracing::info!(
        kind = %args.kind,
        registry = %registry_path.display(),
        plugins = validator.plugin_names().count(),
        "loaded gateway validator"
    );

    let document = load_document(&args.path)?;

    match validator.validate_document(args.kind, document) {
        Ok(object) => {
            println!("OK");
            if args.print_normalized {
                let normalized = serde_json::to_string_pretty(&object)
                    .context("failed to render normalized entity")?;
                println!("{normalized}");
            }
            Ok(EXIT_OK)
        }
        Err(e) if e.is_object_invalid() => {
            println!("FAIL: {}: {e}", args.path.display());
            Ok(EXIT_INVALID)
        }
        Err(e) => Err(e).with_context(|| format!("cannot validate {}", args.path.display())),
    }
}
