//! # apigw-cli: Gateway Configuration Validator CLI
//!
//! Provides the `apigw` command-line interface over the validation pipeline
//! in `apigw-schema`.
//!
//! ## Subcommands
//!
//! - `apigw validate`: Validate an entity file for persistence (structural,
//!   upstream rules, plugin schemas).
//! - `apigw check`: Validate any document against a standalone schema file.
//! - `apigw resolve`: Print the schema a registry path resolves to.
//!
//! ```bash
//! apigw validate --registry schemas/gateway.schema.json --kind route route.yaml
//! apigw check --schema schemas/limit-count.json conf.json
//! apigw resolve --registry schemas/gateway.schema.json plugins.limit-count
//! ```
//!
//! ## Exit Codes
//!
//! `0` valid, `1` invalid, `2` operational error (unreadable files, missing
//! or malformed schemas).

pub mod check;
pub mod config;
pub mod resolve;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

/// The document is valid.
pub const EXIT_OK: u8 = 0;

/// The document is invalid, or the requested path does not exist.
pub const EXIT_INVALID: u8 = 1;

/// The command could not run.
pub const EXIT_ERROR: u8 = 2;

/// Resolve a path that may be relative to `base`.
///
/// If the path is absolute, returns it as-is. If relative and the file
/// exists relative to `base`, uses that. Otherwise returns the path
/// relative to the current directory.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let based = base.join(path);
    if based.exists() {
        based
    } else {
        path.to_path_buf()
    }
}

/// Read a JSON or YAML document (YAML when the extension is `.yaml`/`.yml`).
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_kept() {
        let abs = std::env::temp_dir().join("x.json");
        assert_eq!(resolve_path(&abs, Path::new("/nowhere")), abs);
    }

    #[test]
    fn relative_paths_prefer_existing_base_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("registry.json"), "{}").unwrap();
        assert_eq!(
            resolve_path(Path::new("registry.json"), dir.path()),
            dir.path().join("registry.json")
        );
        assert_eq!(
            resolve_path(Path::new("absent.json"), dir.path()),
            PathBuf::from("absent.json")
        );
    }

    #[test]
    fn documents_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("route.yaml");
        std::fs::write(&yaml, "uri: /hello\nmethods: [GET]\n").unwrap();
        let json = dir.path().join("route.json");
        std::fs::write(&json, r#"{"uri": "/hello", "methods": ["GET"]}"#).unwrap();
        assert_eq!(load_document(&yaml).unwrap(), load_document(&json).unwrap());
    }

    #[test]
    fn unreadable_document_names_the_file() {
        let err = load_document(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }
}
