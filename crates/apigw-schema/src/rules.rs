//! # Upstream Rules
//!
//! Gateway invariants on upstream blocks that JSON Schema cannot express.
//! Evaluated once per validation, top to bottom, first failure wins:
//!
//! ```text
//! upstream absent ─────────────────────────────▶ ok
//! pass_host=node, nodes present, count != 1 ───▶ SingleNodeRequired
//! pass_host=rewrite, upstream_host empty ──────▶ UpstreamHostRequired
//! type != chash ───────────────────────────────▶ ok
//! hash_on empty ──▶ set to "vars" (written back to the object)
//! hash_on unknown ─────────────────────────────▶ InvalidHashOn
//! hash_on != consumer, key empty ──────────────▶ MissingKey
//! hash_on = consumer ──────────────────────────▶ ok
//! key vs. vars/header schema ──────────────────▶ ok | ValidationFailed
//! ```
//!
//! Routes and services check their embedded upstream, standalone upstreams
//! check themselves, and every other kind passes untouched.

use apigw_core::upstream::{PASS_HOST_NODE, PASS_HOST_REWRITE};
use apigw_core::{ConfigObject, HashOn, UpstreamDef};
use serde_json::Value;

use crate::config::ValidatorOptions;
use crate::error::{SchemaValidationError, SemanticViolation};
use crate::registry::SchemaRegistry;
use crate::validate::StructuralValidator;

/// Registry path of the key schema for `hash_on: vars`.
pub const HASH_VARS_SCHEMA: &str = "main.upstream_hash_vars_schema";

/// Registry path of the key schema for `hash_on: header` and `cookie`.
pub const HASH_HEADER_SCHEMA: &str = "main.upstream_hash_header_schema";

/// Registry path of the schema `key` must satisfy, if any.
pub fn key_schema_path(hash_on: HashOn) -> Option<&'static str> {
    match hash_on {
        HashOn::Vars => Some(HASH_VARS_SCHEMA),
        HashOn::Header | HashOn::Cookie => Some(HASH_HEADER_SCHEMA),
        HashOn::Consumer => None,
    }
}

/// Semantic rule engine for upstream blocks.
#[derive(Debug)]
pub struct UpstreamRules {
    vars_key: Option<StructuralValidator>,
    header_key: Option<StructuralValidator>,
}

impl UpstreamRules {
    /// Compile the hash-key schemas the registry defines.
    ///
    /// A missing key schema is not an error here; it becomes
    /// `SchemaValidationError::SchemaNotFound` when an upstream needs it.
    ///
    /// # Errors
    ///
    /// Returns a construction error if a defined key schema is malformed.
    pub fn new(
        registry: &dyn SchemaRegistry,
        options: &ValidatorOptions,
    ) -> Result<Self, SchemaValidationError> {
        let vars_key =
            StructuralValidator::from_registry_if_present(registry, HASH_VARS_SCHEMA, options)?;
        let header_key =
            StructuralValidator::from_registry_if_present(registry, HASH_HEADER_SCHEMA, options)?;
        if vars_key.is_none() || header_key.is_none() {
            tracing::warn!(
                vars = vars_key.is_some(),
                header = header_key.is_some(),
                "hash key schemas missing from registry; chash upstreams needing them will be rejected"
            );
        }
        Ok(Self { vars_key, header_key })
    }

    /// Apply the rules to whichever upstream `object` carries.
    pub fn check_object(&self, object: &mut ConfigObject) -> Result<(), SchemaValidationError> {
        match object {
            ConfigObject::Route(route) => self.check_upstream(route.upstream.as_mut()),
            ConfigObject::Service(service) => self.check_upstream(service.upstream.as_mut()),
            ConfigObject::Upstream(upstream) => self.check_upstream(Some(&mut upstream.def)),
            ConfigObject::Consumer(_) | ConfigObject::Ssl(_) => Ok(()),
        }
    }

    /// Apply the rules to one upstream block.
    ///
    /// Fills an empty `hash_on` of a `chash` upstream with `vars`. The fill
    /// stays in place even if a later rule fails.
    pub fn check_upstream(
        &self,
        upstream: Option<&mut UpstreamDef>,
    ) -> Result<(), SchemaValidationError> {
        let Some(upstream) = upstream else {
            return Ok(());
        };

        if upstream.pass_host == PASS_HOST_NODE {
            if let Some(nodes) = &upstream.nodes {
                let found = nodes.normalize().len();
                if found != 1 {
                    return Err(SemanticViolation::SingleNodeRequired { found }.into());
                }
            }
        }

        if upstream.pass_host == PASS_HOST_REWRITE && upstream.upstream_host.is_empty() {
            return Err(SemanticViolation::UpstreamHostRequired.into());
        }

        if !upstream.is_chash() {
            return Ok(());
        }

        if upstream.hash_on.is_empty() {
            upstream.hash_on = HashOn::DEFAULT.as_str().to_string();
        }

        let hash_on: HashOn = upstream
            .hash_on
            .parse()
            .map_err(|_| SemanticViolation::InvalidHashOn(upstream.hash_on.clone()))?;

        if hash_on.uses_key() && upstream.key.is_empty() {
            return Err(SemanticViolation::MissingKey.into());
        }

        self.check_hash_key(hash_on, &upstream.key)
    }

    /// Validate `key` against the schema for `hash_on`.
    fn check_hash_key(&self, hash_on: HashOn, key: &str) -> Result<(), SchemaValidationError> {
        let Some(path) = key_schema_path(hash_on) else {
            return Ok(());
        };
        let schema = match hash_on {
            HashOn::Vars => self.vars_key.as_ref(),
            _ => self.header_key.as_ref(),
        };
        let schema = schema.ok_or_else(|| SchemaValidationError::SchemaNotFound {
            path: path.to_string(),
        })?;
        tracing::trace!(hash_on = %hash_on, schema = %path, "checking chash key");
        schema.validate_value(&Value::String(key.to_string()))
    }
}
