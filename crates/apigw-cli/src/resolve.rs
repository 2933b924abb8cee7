//! # Resolve Subcommand
//!
//! Prints the schema a registry path resolves to, exactly as the validators
//! would receive it. Useful for checking that a plugin schema is where the
//! gateway expects it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use apigw_schema::{SchemaDocument, SchemaRegistry};
use clap::Args;
use serde_json::Value;

use crate::config::CliConfig;
use crate::{EXIT_INVALID, EXIT_OK};

/// Arguments for the `apigw resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Registry document to resolve against.
    #[arg(long, value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Dotted registry path, e.g. `main.route` or `plugins.limit-count`.
    #[arg(value_name = "PATH")]
    pub path: String,
}

/// Execute the resolve subcommand.
///
/// Returns exit code: 0 when the path resolves, 1 when it does not.
pub fn run_resolve(args: &ResolveArgs, config: &CliConfig) -> Result<u8> {
    let registry_path = config.registry_path(args.registry.as_deref())?;
    let registry = SchemaDocument::load(&registry_path)
        .with_context(|| format!("failed to load schema registry {}", registry_path.display()))?;

    match resolve(&registry, &args.path) {
        Some(text) => {
            println!("{text}");
            Ok(EXIT_OK)
        }
        None => {
            println!("NOT FOUND: {}", args.path);
            Ok(EXIT_INVALID)
        }
    }
}

/// Registry text for `path`, pretty-printed when it is JSON.
fn resolve(registry: &dyn SchemaRegistry, path: &str) -> Option<String> {
    let text = registry.get(path).filter(|t| !t.trim().is_empty())?;
    let pretty = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok());
    Some(pretty.unwrap_or(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> SchemaDocument {
        SchemaDocument::from_value(json!({
            "main": {"route": {"type": "object"}, "empty": ""},
            "plugins": {"limit-count": {"type": "object", "required": ["count"]}}
        }))
    }

    #[test]
    fn objects_resolve_to_pretty_json() {
        let text = resolve(&registry(), "plugins.limit-count").unwrap();
        assert!(text.contains('\n'));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["required"], json!(["count"]));
    }

    #[test]
    fn absent_and_empty_paths_do_not_resolve() {
        assert!(resolve(&registry(), "plugins.cors").is_none());
        assert!(resolve(&registry(), "main.empty").is_none());
    }

    #[test]
    fn exit_code_reflects_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("schema.json");
        std::fs::write(&file, registry().root().to_string()).unwrap();
        let config = CliConfig {
            registry: Some(file),
            ..Default::default()
        };
        let found = ResolveArgs {
            registry: None,
            path: "main.route".into(),
        };
        assert_eq!(run_resolve(&found, &config).unwrap(), EXIT_OK);
        let missing = ResolveArgs {
            registry: None,
            path: "main.ssl".into(),
        };
        assert_eq!(run_resolve(&missing, &config).unwrap(), EXIT_INVALID);
    }
}
