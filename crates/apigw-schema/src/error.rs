//! # Validation Errors
//!
//! Every failure the pipeline can report, grouped into the classes the
//! write path reacts to differently:
//!
//! | Class | Variants | Meaning |
//! |-------|----------|---------|
//! | Construction | `SchemaLoad`, `ValidatorBuild` | validator could not be built |
//! | Engine | `Engine` | the object could not be evaluated at all |
//! | Structural | `ValidationFailed` | object violates a schema |
//! | Semantic | `Semantic` | a gateway rule failed |
//! | MissingSchema | `SchemaNotFound` | a schema needed mid-validation is absent |
//!
//! Structural failures carry every violation the engine reported, in
//! engine order.

use std::fmt;

use thiserror::Error;

/// Error raised while building a validator or validating an object.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The object did not conform to the schema.
    #[error("schema validation failed against '{schema}':\n{violations}")]
    ValidationFailed {
        /// Registry path or file of the schema.
        schema: String,
        /// Every violation, in the order the engine reported them.
        violations: ValidationViolations,
    },

    /// A gateway rule rejected the object.
    #[error(transparent)]
    Semantic(#[from] SemanticViolation),

    /// A schema referenced during validation does not exist.
    #[error("schema not found, path: {path}")]
    SchemaNotFound {
        /// Registry path that resolved to nothing.
        path: String,
    },

    /// The schema text could not be read, parsed or resolved.
    #[error("schema load error for '{schema}': {reason}")]
    SchemaLoad {
        /// Registry path or file of the schema.
        schema: String,
        /// Why loading failed.
        reason: String,
    },

    /// The schema parsed but did not compile.
    #[error("validator build error for schema '{schema}': {reason}")]
    ValidatorBuild {
        /// Registry path or file of the schema.
        schema: String,
        /// Compiler message.
        reason: String,
    },

    /// The object could not be turned into a JSON instance.
    #[error("schema engine error for '{schema}': {reason}")]
    Engine {
        /// Schema the evaluation was for.
        schema: String,
        /// Underlying failure.
        reason: String,
    },
}

/// Taxonomy bucket of a [`SchemaValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Construction,
    Engine,
    Structural,
    Semantic,
    MissingSchema,
}

impl SchemaValidationError {
    /// The class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ValidationFailed { .. } => ErrorClass::Structural,
            Self::Semantic(_) => ErrorClass::Semantic,
            Self::SchemaNotFound { .. } => ErrorClass::MissingSchema,
            Self::SchemaLoad { .. } | Self::ValidatorBuild { .. } => ErrorClass::Construction,
            Self::Engine { .. } => ErrorClass::Engine,
        }
    }

    /// Whether the operator's object is at fault, as opposed to the
    /// validator's configuration or the engine.
    pub fn is_object_invalid(&self) -> bool {
        matches!(self.class(), ErrorClass::Structural | ErrorClass::Semantic)
    }
}

/// A gateway rule that JSON Schema cannot express.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticViolation {
    /// `pass_host: node` with a node count other than one.
    #[error("only a single node is supported in node pass-host mode (found {found})")]
    SingleNodeRequired {
        /// Node count after normalization.
        found: usize,
    },

    /// `pass_host: rewrite` without `upstream_host`.
    #[error("upstream_host must be set when pass_host is rewrite")]
    UpstreamHostRequired,

    /// `hash_on` outside `consumer`, `vars`, `header`, `cookie`.
    #[error("invalid hash_on type: {0}")]
    InvalidHashOn(String),

    /// `chash` upstream hashing on something other than the consumer with
    /// no `key`.
    #[error("missing key")]
    MissingKey,
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending value; empty for the root.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Engine message.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Ordered violations of one schema, displayed one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
