//! # Structural Validation
//!
//! A [`StructuralValidator`] is one JSON Schema, compiled once, applied to
//! any number of objects. It knows nothing about gateway semantics; it is
//! both the generic validator for standalone schema files and the first
//! stage of [`GatewayValidator`](crate::GatewayValidator).
//!
//! ## Reporting
//!
//! A failing object yields `SchemaValidationError::ValidationFailed` with
//! every violation in the order the engine produced them. Nothing is
//! dropped or deduplicated.
//!
//! An object that cannot be serialized into a JSON instance is an engine
//! failure (`SchemaValidationError::Engine`), kept distinct from an invalid
//! object.

use std::fmt;
use std::path::Path;

use apigw_core::ConfigObject;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;

use crate::config::ValidatorOptions;
use crate::error::{SchemaValidationError, ValidationViolations, Violation};
use crate::registry::{lookup, read_document, SchemaRegistry};

/// The write path's view of a validator.
///
/// Object-safe so hosts can hold `Box<dyn ConfigValidator>` regardless of
/// which validator a kind uses.
pub trait ConfigValidator: Send + Sync {
    /// Validate `object`, normalizing it in place where the validator
    /// defines a normalization.
    fn validate_object(&self, object: &mut ConfigObject) -> Result<(), SchemaValidationError>;
}

/// A compiled JSON Schema.
pub struct StructuralValidator {
    /// Registry path or file the schema came from.
    name: String,
    validator: Validator,
}

impl fmt::Debug for StructuralValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl StructuralValidator {
    /// Compile a parsed schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidatorBuild` if the schema does not
    /// compile under the configured draft.
    pub fn from_value(
        name: impl Into<String>,
        schema: &Value,
        options: &ValidatorOptions,
    ) -> Result<Self, SchemaValidationError> {
        let name = name.into();
        let validator = options.build_options().build(schema).map_err(|e| {
            SchemaValidationError::ValidatorBuild {
                schema: name.clone(),
                reason: e.to_string(),
            }
        })?;
        tracing::debug!(schema = %name, draft = %options.draft, "compiled schema");
        Ok(Self { name, validator })
    }

    /// Parse and compile schema text.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoad` if the text is not JSON,
    /// `SchemaValidationError::ValidatorBuild` if it does not compile.
    pub fn from_text(
        name: impl Into<String>,
        text: &str,
        options: &ValidatorOptions,
    ) -> Result<Self, SchemaValidationError> {
        let name = name.into();
        let schema: Value =
            serde_json::from_str(text).map_err(|e| SchemaValidationError::SchemaLoad {
                schema: name.clone(),
                reason: format!("invalid JSON: {e}"),
            })?;
        Self::from_value(name, &schema, options)
    }

    /// Load and compile a standalone schema file (JSON, or YAML by extension).
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoad` if the file cannot be read
    /// or parsed, `SchemaValidationError::ValidatorBuild` if it does not compile.
    pub fn from_file(path: &Path, options: &ValidatorOptions) -> Result<Self, SchemaValidationError> {
        let schema = read_document(path)?;
        Self::from_value(path.display().to_string(), &schema, options)
    }

    /// Resolve `path` in the registry and compile it.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoad` if the registry does not
    /// define `path` or its text is not JSON, and
    /// `SchemaValidationError::ValidatorBuild` if it does not compile.
    pub fn from_registry(
        registry: &dyn SchemaRegistry,
        path: &str,
        options: &ValidatorOptions,
    ) -> Result<Self, SchemaValidationError> {
        let text = lookup(registry, path).ok_or_else(|| SchemaValidationError::SchemaLoad {
            schema: path.to_string(),
            reason: "schema not found in registry".to_string(),
        })?;
        Self::from_text(path, &text, options)
    }

    /// Resolve and compile `path` if the registry defines it.
    pub(crate) fn from_registry_if_present(
        registry: &dyn SchemaRegistry,
        path: &str,
        options: &ValidatorOptions,
    ) -> Result<Option<Self>, SchemaValidationError> {
        match lookup(registry, path) {
            Some(text) => Self::from_text(path, &text, options).map(Some),
            None => Ok(None),
        }
    }

    /// Registry path or file the schema came from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every violation of `instance`, in engine order.
    pub fn violations(&self, instance: &Value) -> Vec<Violation> {
        self.validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }

    /// Validate a JSON instance.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` carrying every
    /// violation if the instance does not conform.
    pub fn validate_value(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        if self.validator.is_valid(instance) {
            return Ok(());
        }

        let violations = self.violations(instance);
        tracing::debug!(
            schema = %self.name,
            violations = violations.len(),
            "structural validation failed"
        );
        Err(SchemaValidationError::ValidationFailed {
            schema: self.name.clone(),
            violations: ValidationViolations::new(violations),
        })
    }

    /// Validate any serializable object.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::Engine` if the object cannot be
    /// represented as JSON, otherwise as [`validate_value`](Self::validate_value).
    pub fn validate<T: Serialize + ?Sized>(&self, object: &T) -> Result<(), SchemaValidationError> {
        let instance = serde_json::to_value(object).map_err(|e| SchemaValidationError::Engine {
            schema: self.name.clone(),
            reason: format!("cannot load object into the schema engine: {e}"),
        })?;
        self.validate_value(&instance)
    }
}

impl ConfigValidator for StructuralValidator {
    fn validate_object(&self, object: &mut ConfigObject) -> Result<(), SchemaValidationError> {
        self.validate(&*object)
    }
}
