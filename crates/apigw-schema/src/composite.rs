//! # Gateway Validator
//!
//! The single validation entry point the control plane's write path calls
//! before persisting an object:
//!
//! 1. structural validation against the kind's top-level schema,
//! 2. upstream rules ([`UpstreamRules`]),
//! 3. plugin schemas ([`PluginDispatcher`]).
//!
//! The first failing stage ends validation. Submitted documents go through
//! [`GatewayValidator::validate_document`], so the structural stage sees
//! exactly what the operator sent; the typed object is decoded only after
//! it passes. Every schema any stage can need
//! is resolved from the registry at construction when the registry defines
//! it, so a validation call does no I/O.

use std::sync::Arc;

use apigw_core::{ConfigObject, EntityKind};
use serde_json::Value;

use crate::config::ValidatorOptions;
use crate::error::SchemaValidationError;
use crate::plugins::PluginDispatcher;
use crate::registry::SchemaRegistry;
use crate::rules::UpstreamRules;
use crate::validate::{ConfigValidator, StructuralValidator};

/// Structural, semantic and plugin validation for one top-level schema.
#[derive(Debug)]
pub struct GatewayValidator {
    structural: StructuralValidator,
    rules: UpstreamRules,
    plugins: PluginDispatcher,
}

impl GatewayValidator {
    /// Build a validator for the top-level schema at `schema_path`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoad` if the registry does not
    /// define `schema_path`, and a construction error if that schema, a
    /// hash-key schema or a listed plugin schema is malformed.
    pub fn new(
        registry: Arc<dyn SchemaRegistry>,
        schema_path: &str,
        options: ValidatorOptions,
    ) -> Result<Self, SchemaValidationError> {
        let structural =
            StructuralValidator::from_registry(registry.as_ref(), schema_path, &options)?;
        let rules = UpstreamRules::new(registry.as_ref(), &options)?;
        let plugins = PluginDispatcher::new(registry, options)?;
        tracing::debug!(schema = %schema_path, "gateway validator ready");
        Ok(Self {
            structural,
            rules,
            plugins,
        })
    }

    /// Build a validator for `kind`'s schema (`main.<kind>`).
    pub fn for_kind(
        registry: Arc<dyn SchemaRegistry>,
        kind: EntityKind,
        options: ValidatorOptions,
    ) -> Result<Self, SchemaValidationError> {
        Self::new(registry, &kind.schema_path(), options)
    }

    /// Registry path of the top-level schema.
    pub fn schema_name(&self) -> &str {
        self.structural.name()
    }

    /// Plugins whose schemas were compiled at construction.
    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.plugins.compiled_plugins()
    }

    /// Validate a submitted document for persistence and decode it as `kind`.
    ///
    /// Returns the decoded object with defaults filled in (a `chash`
    /// upstream without `hash_on` gets `hash_on: "vars"`).
    ///
    /// # Errors
    ///
    /// As [`validate`](Self::validate). A document that passes the structural
    /// schema yet cannot be decoded as `kind` is `SchemaValidationError::Engine`.
    pub fn validate_document(
        &self,
        kind: EntityKind,
        document: Value,
    ) -> Result<ConfigObject, SchemaValidationError> {
        tracing::debug!(kind = %kind, schema = %self.schema_name(), "validating document");
        self.structural.validate_value(&document)?;
        let mut object =
            ConfigObject::from_value(kind, document).map_err(|e| SchemaValidationError::Engine {
                schema: self.schema_name().to_string(),
                reason: e.to_string(),
            })?;
        self.rules.check_object(&mut object)?;
        self.plugins.check_object(&object)?;
        Ok(object)
    }

    /// Validate a typed `object` for persistence.
    ///
    /// The structural stage checks the object's serialized form, which
    /// carries every field it was decoded from. Prefer
    /// [`validate_document`](Self::validate_document) for submitted input.
    ///
    /// A `chash` upstream with no `hash_on` gets `hash_on: "vars"` written
    /// into `object`, and keeps it even if a later check fails. Do not
    /// validate the same object from two threads at once.
    ///
    /// # Errors
    ///
    /// The first failing stage's error: `ValidationFailed` (structural, or a
    /// hash key / plugin schema), `Semantic`, `SchemaNotFound`, or `Engine`.
    pub fn validate(&self, object: &mut ConfigObject) -> Result<(), SchemaValidationError> {
        tracing::debug!(kind = %object.kind(), schema = %self.schema_name(), "validating object");
        self.structural.validate(&*object)?;
        self.rules.check_object(object)?;
        self.plugins.check_object(object)
    }
}

impl ConfigValidator for GatewayValidator {
    fn validate_object(&self, object: &mut ConfigObject) -> Result<(), SchemaValidationError> {
        self.validate(object)
    }
}
