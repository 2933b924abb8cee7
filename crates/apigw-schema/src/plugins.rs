//! # Plugin Schema Dispatch
//!
//! Routes, services and consumers embed a `plugins` map from plugin name to
//! plugin configuration. Each configuration must satisfy the schema stored
//! at `<plugin_prefix>.<name>` in the registry.
//!
//! Plugins are checked in name order and the first failing plugin ends the
//! check. A plugin whose schema the registry does not define is rejected:
//! the gateway cannot accept configuration it cannot validate.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use apigw_core::{ConfigObject, PluginMap};
use serde_json::Value;

use crate::config::ValidatorOptions;
use crate::error::SchemaValidationError;
use crate::registry::{lookup, SchemaRegistry};
use crate::validate::StructuralValidator;

/// Validates embedded plugin configurations against per-plugin schemas.
pub struct PluginDispatcher {
    registry: Arc<dyn SchemaRegistry>,
    options: ValidatorOptions,
    /// Schemas compiled up front, by plugin name.
    compiled: BTreeMap<String, StructuralValidator>,
}

impl fmt::Debug for PluginDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDispatcher")
            .field("plugin_prefix", &self.options.plugin_prefix)
            .field("compiled", &self.compiled.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl PluginDispatcher {
    /// Compile every plugin schema the registry lists under the plugin prefix.
    ///
    /// Plugins the registry cannot enumerate are resolved when first seen
    /// in an object.
    ///
    /// # Errors
    ///
    /// Returns a construction error if a listed plugin schema is malformed.
    pub fn new(
        registry: Arc<dyn SchemaRegistry>,
        options: ValidatorOptions,
    ) -> Result<Self, SchemaValidationError> {
        let head = format!("{}.", options.plugin_prefix);
        let mut compiled = BTreeMap::new();
        for path in registry.names(&options.plugin_prefix) {
            let Some(name) = path.strip_prefix(&head) else {
                continue;
            };
            let name = name.replace("\\.", ".");
            if let Some(validator) =
                StructuralValidator::from_registry_if_present(registry.as_ref(), &path, &options)?
            {
                compiled.insert(name, validator);
            }
        }
        tracing::debug!(plugins = compiled.len(), "compiled plugin schemas");
        Ok(Self {
            registry,
            options,
            compiled,
        })
    }

    /// Names of the plugins whose schemas were compiled up front.
    pub fn compiled_plugins(&self) -> impl Iterator<Item = &str> {
        self.compiled.keys().map(String::as_str)
    }

    /// Check the plugins `object` carries, if its kind carries any.
    pub fn check_object(&self, object: &ConfigObject) -> Result<(), SchemaValidationError> {
        self.check(object.plugins())
    }

    /// Check every entry of a plugin map.
    ///
    /// # Errors
    ///
    /// `SchemaValidationError::SchemaNotFound` for a plugin without a schema,
    /// `SchemaValidationError::ValidationFailed` for a configuration that
    /// violates its schema. Either way only the first failing plugin is
    /// reported.
    pub fn check(&self, plugins: Option<&PluginMap>) -> Result<(), SchemaValidationError> {
        let Some(plugins) = plugins else {
            return Ok(());
        };
        for (name, conf) in plugins {
            self.check_plugin(name, conf)?;
        }
        Ok(())
    }

    fn check_plugin(&self, name: &str, conf: &Value) -> Result<(), SchemaValidationError> {
        tracing::trace!(plugin = %name, "checking plugin configuration");
        if let Some(validator) = self.compiled.get(name) {
            return validator.validate_value(conf);
        }

        let path = self.options.plugin_path(name);
        let text = lookup(self.registry.as_ref(), &path)
            .ok_or_else(|| SchemaValidationError::SchemaNotFound { path: path.clone() })?;
        StructuralValidator::from_text(path, &text, &self.options)?.validate_value(conf)
    }
}
