//! # Schema Registry
//!
//! Resolves dotted schema paths (`main.route`, `plugins.limit-count`,
//! `main.upstream_hash_vars_schema`) to JSON Schema text.
//!
//! The validators depend only on [`SchemaRegistry::get`]. How schemas are
//! loaded, cached or refreshed is up to the implementation:
//!
//! - [`SchemaDocument`]: one JSON/YAML document holding every schema, the
//!   layout the gateway itself ships (`{"main": {...}, "plugins": {...}}`).
//! - [`MemoryRegistry`]: a flat path-to-text map.
//!
//! Registries are passed to validators explicitly; there is no process-wide
//! schema store.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::error::SchemaValidationError;

/// Source of schema text addressed by dotted path.
pub trait SchemaRegistry: Send + Sync {
    /// Schema text at `path`, or `None` when the path is not defined.
    ///
    /// An empty string is treated the same as `None` by every caller.
    fn get(&self, path: &str) -> Option<String>;

    /// Paths directly below `prefix` (`plugins` → `plugins.cors`, ...).
    ///
    /// Registries that cannot enumerate return nothing; callers then fall
    /// back to resolving paths one at a time.
    fn names(&self, _prefix: &str) -> Vec<String> {
        Vec::new()
    }
}

impl<T: SchemaRegistry + ?Sized> SchemaRegistry for Arc<T> {
    fn get(&self, path: &str) -> Option<String> {
        (**self).get(path)
    }

    fn names(&self, prefix: &str) -> Vec<String> {
        (**self).names(prefix)
    }
}

impl<T: SchemaRegistry + ?Sized> SchemaRegistry for &T {
    fn get(&self, path: &str) -> Option<String> {
        (**self).get(path)
    }

    fn names(&self, prefix: &str) -> Vec<String> {
        (**self).names(prefix)
    }
}

/// Look up `path`, folding empty text into "not found".
pub(crate) fn lookup(registry: &dyn SchemaRegistry, path: &str) -> Option<String> {
    registry.get(path).filter(|text| !text.trim().is_empty())
}

// ─── Document Registry ───────────────────────────────────────────────

/// A registry backed by a single schema document.
///
/// Path segments are object keys separated by `.`; a literal dot inside a
/// key is written `\.`. Numeric segments index into arrays.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    root: Value,
}

impl SchemaDocument {
    /// Wrap an already parsed document.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoad` if the text is not JSON.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaValidationError> {
        let root = serde_json::from_str(text).map_err(|e| SchemaValidationError::SchemaLoad {
            schema: "<inline>".to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
        Ok(Self { root })
    }

    /// Load a JSON or YAML document from disk.
    ///
    /// `.yaml`/`.yml` files are read as YAML, everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoad` if the file cannot be read
    /// or parsed.
    pub fn load(path: &Path) -> Result<Self, SchemaValidationError> {
        let root = read_document(path)?;
        tracing::debug!(path = %path.display(), "loaded schema document");
        Ok(Self { root })
    }

    /// The whole document.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The node at `path`, if any.
    pub fn node(&self, path: &str) -> Option<&Value> {
        split_path(path)
            .iter()
            .try_fold(&self.root, |node, segment| match node {
                Value::Object(map) => map.get(segment.as_str()),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl SchemaRegistry for SchemaDocument {
    fn get(&self, path: &str) -> Option<String> {
        match self.node(path)? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    fn names(&self, prefix: &str) -> Vec<String> {
        match self.node(prefix) {
            Some(Value::Object(map)) => map
                .keys()
                .map(|key| format!("{prefix}.{}", key.replace('.', "\\.")))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Split a dotted path, honouring `\.` escapes.
fn split_path(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            '.' => segments.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    segments.push(current);
    segments
}

// ─── In-Memory Registry ──────────────────────────────────────────────

/// A flat map from schema path to schema text.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    schemas: BTreeMap<String, String>,
}

impl MemoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register schema text under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<String>, schema: impl Into<String>) -> &mut Self {
        self.schemas.insert(path.into(), schema.into());
        self
    }

    /// Register a schema value under `path`.
    pub fn insert_value(&mut self, path: impl Into<String>, schema: &Value) -> &mut Self {
        self.insert(path, schema.to_string())
    }

    /// Builder form of [`insert_value`](Self::insert_value).
    pub fn with_value(mut self, path: impl Into<String>, schema: &Value) -> Self {
        self.insert_value(path, schema);
        self
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaRegistry for MemoryRegistry {
    fn get(&self, path: &str) -> Option<String> {
        self.schemas.get(path).cloned()
    }

    fn names(&self, prefix: &str) -> Vec<String> {
        let head = format!("{prefix}.");
        self.schemas
            .keys()
            .filter(|path| {
                path.strip_prefix(&head)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('.'))
            })
            .cloned()
            .collect()
    }
}

// ─── Document Loading ────────────────────────────────────────────────

/// Read a JSON or YAML file into a JSON value.
pub(crate) fn read_document(path: &Path) -> Result<Value, SchemaValidationError> {
    let load_err = |reason: String| SchemaValidationError::SchemaLoad {
        schema: path.display().to_string(),
        reason,
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| load_err(format!("cannot read file: {e}")))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => {
            let yaml_value: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| load_err(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml_value)
                .map_err(|e| load_err(format!("YAML-to-JSON conversion failed: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_err(format!("invalid JSON: {e}"))),
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Scalar map keys are stringified; YAML tags are dropped.
pub(crate) fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> SchemaDocument {
        SchemaDocument::from_value(json!({
            "main": {
                "route": {"type": "object"},
                "upstream_hash_vars_schema": {"type": "string"},
                "empty": null
            },
            "plugins": {
                "limit-count": {"type": "object", "required": ["count"]},
                "key-auth": {"type": "object"}
            },
            "raw": {"inline": "{\"type\":\"integer\"}"},
            "dotted": {"a.b": {"type": "boolean"}},
            "list": [{"type": "null"}]
        }))
    }

    #[test]
    fn resolves_object_nodes_to_json_text() {
        let doc = document();
        let text = doc.get("main.route").unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!({"type": "object"}));
    }

    #[test]
    fn resolves_string_nodes_verbatim() {
        assert_eq!(
            document().get("raw.inline").as_deref(),
            Some(r#"{"type":"integer"}"#)
        );
    }

    #[test]
    fn missing_and_null_paths_are_absent() {
        let doc = document();
        assert!(doc.get("plugins.cors").is_none());
        assert!(doc.get("main.empty").is_none());
        assert!(doc.get("main.route.type.deeper").is_none());
    }

    #[test]
    fn escaped_dots_and_array_indices() {
        let doc = document();
        assert!(doc.get("dotted.a\\.b").is_some());
        assert!(doc.get("dotted.a.b").is_none());
        assert_eq!(doc.get("list.0").as_deref(), Some(r#"{"type":"null"}"#));
    }

    #[test]
    fn document_lists_children() {
        let mut names = document().names("plugins");
        names.sort();
        assert_eq!(names, vec!["plugins.key-auth", "plugins.limit-count"]);
        assert!(document().names("nope").is_empty());
    }

    #[test]
    fn memory_registry_lists_direct_children_only() {
        let mut registry = MemoryRegistry::new();
        registry
            .insert("plugins.cors", "{}")
            .insert("plugins.cors.extra", "{}")
            .insert("main.route", "{}");
        assert_eq!(registry.names("plugins"), vec!["plugins.cors"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn lookup_treats_empty_text_as_absent() {
        let mut registry = MemoryRegistry::new();
        registry.insert("main.route", "  ");
        assert!(lookup(&registry, "main.route").is_none());
        assert!(lookup(&registry, "main.service").is_none());
    }

    #[test]
    fn load_yaml_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yaml");
        std::fs::write(
            &path,
            "main:\n  route:\n    type: object\n    required: [uri]\n",
        )
        .unwrap();
        let doc = SchemaDocument::load(&path).unwrap();
        let parsed: Value = serde_json::from_str(&doc.get("main.route").unwrap()).unwrap();
        assert_eq!(parsed, json!({"type": "object", "required": ["uri"]}));
    }

    #[test]
    fn load_reports_unreadable_file() {
        let err = SchemaDocument::load(Path::new("/nonexistent/apigw/schema.json")).unwrap_err();
        assert!(matches!(err, SchemaValidationError::SchemaLoad { .. }), "{err}");
    }

    #[test]
    fn invalid_inline_json_is_a_load_error() {
        let err = SchemaDocument::from_json_str("{not json").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn yaml_to_json_conversion() {
        let yaml_str = "name: limit-count\ncount: 42\nenabled: true\nitems:\n  - one\n  - two\n1: numeric-key\n";
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml_str).unwrap();
        let json_value = yaml_to_json_value(&yaml_value).unwrap();
        assert_eq!(json_value["name"], "limit-count");
        assert_eq!(json_value["count"], 42);
        assert_eq!(json_value["enabled"], true);
        assert_eq!(json_value["items"][1], "two");
        assert_eq!(json_value["1"], "numeric-key");
    }
}
