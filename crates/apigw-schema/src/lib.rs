//! # apigw-schema: Gateway Configuration Validation
//!
//! Validates configuration objects before the control plane persists them
//! and pushes them to the data plane.
//!
//! ## Pipeline
//!
//! ```text
//! GatewayValidator::validate
//!   ├─ structural   object vs. its top-level schema (main.<kind>)
//!   ├─ semantic     upstream rules: pass_host, chash hash_on/key
//!   └─ plugins      each plugin config vs. plugins.<name>
//! ```
//!
//! Each stage short-circuits the rest. Within one schema every violation is
//! reported; across plugins the first failing plugin wins.
//!
//! ## Modules
//!
//! - [`registry`]: the [`SchemaRegistry`] contract and its document and
//!   in-memory implementations.
//! - [`validate`]: [`StructuralValidator`], a compiled JSON Schema.
//! - [`rules`]: semantic upstream rules.
//! - [`plugins`]: per-plugin schema dispatch.
//! - [`composite`]: [`GatewayValidator`], the entry point for the write path.
//!
//! ## Thread Safety
//!
//! Validators are `Send + Sync` and compile their schemas at construction.
//! Validation itself only reads shared state. The one write is the
//! `hash_on` default fill on the caller's object, so a single object must
//! not be validated from two threads at once.

pub mod composite;
pub mod config;
pub mod error;
pub mod plugins;
pub mod registry;
pub mod rules;
pub mod validate;

pub use composite::GatewayValidator;
pub use config::{SchemaDraft, ValidatorOptions};
pub use error::{ErrorClass, SchemaValidationError, SemanticViolation, ValidationViolations, Violation};
pub use plugins::PluginDispatcher;
pub use registry::{MemoryRegistry, SchemaDocument, SchemaRegistry};
pub use validate::{ConfigValidator, StructuralValidator};
