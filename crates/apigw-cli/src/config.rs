//! # CLI Configuration
//!
//! Optional YAML (or JSON) file passed with `--config`:
//!
//! ```yaml
//! registry: schemas/gateway.schema.json
//! draft: draft7
//! plugin_prefix: plugins
//! ```
//!
//! A relative `registry` is resolved against the config file's directory.
//! Command-line flags override file values.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use apigw_schema::{SchemaDraft, ValidatorOptions};
use serde::Deserialize;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Registry document used by `validate` and `resolve`.
    pub registry: Option<PathBuf>,
    /// Draft every schema is compiled against.
    pub draft: SchemaDraft,
    /// Registry prefix holding plugin schemas.
    pub plugin_prefix: Option<String>,
}

impl CliConfig {
    /// Load a config file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        if let Some(registry) = &config.registry {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.registry = Some(crate::resolve_path(registry, base));
        }
        tracing::debug!(config = %path.display(), ?config, "loaded CLI configuration");
        Ok(config)
    }

    /// Apply a `--draft` flag.
    pub fn with_draft(mut self, draft: Option<SchemaDraft>) -> Self {
        if let Some(draft) = draft {
            self.draft = draft;
        }
        self
    }

    /// The registry to use: the `--registry` flag, else the configured one.
    pub fn registry_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        match (flag, &self.registry) {
            (Some(path), _) => Ok(path.to_path_buf()),
            (None, Some(path)) => Ok(path.clone()),
            (None, None) => bail!("no schema registry given (use --registry or set `registry` in --config)"),
        }
    }

    /// Validator options for the configured draft and plugin prefix.
    pub fn validator_options(&self) -> ValidatorOptions {
        let mut options = ValidatorOptions {
            draft: self.draft,
            ..Default::default()
        };
        if let Some(prefix) = &self.plugin_prefix {
            options.plugin_prefix.clone_from(prefix);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_means_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.validator_options(), ValidatorOptions::default());
    }

    #[test]
    fn file_values_are_read_and_registry_is_resolved() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gateway.schema.json"), "{}").unwrap();
        let path = dir.path().join("apigw.yaml");
        std::fs::write(
            &path,
            "registry: gateway.schema.json\ndraft: draft2020-12\nplugin_prefix: ext.plugins\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.registry, Some(dir.path().join("gateway.schema.json")));
        let options = config.validator_options();
        assert_eq!(options.draft, SchemaDraft::Draft202012);
        assert_eq!(options.plugin_prefix, "ext.plugins");
    }

    #[test]
    fn flags_override_file_values() {
        let config = CliConfig {
            registry: Some(PathBuf::from("from-file.json")),
            ..Default::default()
        }
        .with_draft(Some(SchemaDraft::Draft4));
        assert_eq!(config.draft, SchemaDraft::Draft4);
        assert_eq!(
            config.registry_path(Some(Path::new("flag.json"))).unwrap(),
            PathBuf::from("flag.json")
        );
        assert_eq!(config.registry_path(None).unwrap(), PathBuf::from("from-file.json"));
    }

    #[test]
    fn missing_registry_is_an_error() {
        let err = CliConfig::default().registry_path(None).unwrap_err();
        assert!(err.to_string().contains("--registry"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apigw.yaml");
        std::fs::write(&path, "registy: typo.json\n").unwrap();
        assert!(CliConfig::load(Some(&path)).is_err());
    }
}
