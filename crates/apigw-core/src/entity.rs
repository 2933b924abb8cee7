//! # Gateway Entities
//!
//! Typed records for the objects an operator writes through the control
//! plane, and the [`ConfigObject`] sum type over them.
//!
//! ## Which kinds carry what
//!
//! | Kind | Plugins | Upstream |
//! |------|---------|----------|
//! | Route | yes | embedded, optional |
//! | Service | yes | embedded, optional |
//! | Upstream | no | is one |
//! | Consumer | yes | no |
//! | Ssl | no | no |
//!
//! Identifiers (`id`, `service_id`, `upstream_id`) are kept as raw JSON
//! values because the gateway accepts both strings and integers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::EntityError;
use crate::upstream::UpstreamDef;

/// Plugin name to plugin configuration.
///
/// Ordered so that anything iterating it (diagnostics included) is
/// deterministic for a given document.
pub type PluginMap = BTreeMap<String, Value>;

/// Label key to label value.
pub type Labels = BTreeMap<String, String>;

/// Request matching rule bound to plugins and an upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// Extra matching expressions (`[["arg_name", "==", "json"]]`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    /// 1 enabled, 0 disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Plugin and upstream bundle shared by several routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_websocket: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Standalone upstream object referenced by `upstream_id`.
///
/// The upstream block itself is flattened, so the wire document is the
/// block plus identity fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    #[serde(flatten)]
    pub def: UpstreamDef,
}

/// API consumer, identified by username.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// TLS certificate bound to a set of SNIs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ssl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snis: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ─── Entity Kinds ────────────────────────────────────────────────────

/// Name of a managed entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Route,
    Service,
    Upstream,
    Consumer,
    Ssl,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub fn all() -> &'static [EntityKind] {
        &[
            Self::Route,
            Self::Service,
            Self::Upstream,
            Self::Consumer,
            Self::Ssl,
        ]
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Service => "service",
            Self::Upstream => "upstream",
            Self::Consumer => "consumer",
            Self::Ssl => "ssl",
        }
    }

    /// Registry path of the kind's top-level schema, e.g. `main.route`.
    pub fn schema_path(&self) -> String {
        format!("main.{}", self.as_str())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EntityError::UnknownKind(s.to_string()))
    }
}

// ─── Config Object ───────────────────────────────────────────────────

/// A configuration object submitted for persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigObject {
    Route(Route),
    Service(Service),
    Upstream(Upstream),
    Consumer(Consumer),
    Ssl(Ssl),
}

impl ConfigObject {
    /// Decode a JSON document as the given kind.
    pub fn from_value(kind: EntityKind, value: Value) -> Result<Self, EntityError> {
        let decode_err = |source| EntityError::Decode {
            kind: kind.as_str(),
            source,
        };
        Ok(match kind {
            EntityKind::Route => Self::Route(serde_json::from_value(value).map_err(decode_err)?),
            EntityKind::Service => {
                Self::Service(serde_json::from_value(value).map_err(decode_err)?)
            }
            EntityKind::Upstream => {
                Self::Upstream(serde_json::from_value(value).map_err(decode_err)?)
            }
            EntityKind::Consumer => {
                Self::Consumer(serde_json::from_value(value).map_err(decode_err)?)
            }
            EntityKind::Ssl => Self::Ssl(serde_json::from_value(value).map_err(decode_err)?),
        })
    }

    /// The object's kind.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Route(_) => EntityKind::Route,
            Self::Service(_) => EntityKind::Service,
            Self::Upstream(_) => EntityKind::Upstream,
            Self::Consumer(_) => EntityKind::Consumer,
            Self::Ssl(_) => EntityKind::Ssl,
        }
    }

    /// The wire document.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Plugin configurations, for kinds that carry them.
    pub fn plugins(&self) -> Option<&PluginMap> {
        match self {
            Self::Route(r) => r.plugins.as_ref(),
            Self::Service(s) => s.plugins.as_ref(),
            Self::Consumer(c) => c.plugins.as_ref(),
            Self::Upstream(_) | Self::Ssl(_) => None,
        }
    }

    /// The upstream block, embedded or standalone.
    pub fn upstream(&self) -> Option<&UpstreamDef> {
        match self {
            Self::Route(r) => r.upstream.as_ref(),
            Self::Service(s) => s.upstream.as_ref(),
            Self::Upstream(u) => Some(&u.def),
            Self::Consumer(_) | Self::Ssl(_) => None,
        }
    }

    /// Mutable access to the upstream block.
    pub fn upstream_mut(&mut self) -> Option<&mut UpstreamDef> {
        match self {
            Self::Route(r) => r.upstream.as_mut(),
            Self::Service(s) => s.upstream.as_mut(),
            Self::Upstream(u) => Some(&mut u.def),
            Self::Consumer(_) | Self::Ssl(_) => None,
        }
    }
}

impl Serialize for ConfigObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Route(r) => r.serialize(serializer),
            Self::Service(s) => s.serialize(serializer),
            Self::Upstream(u) => u.serialize(serializer),
            Self::Consumer(c) => c.serialize(serializer),
            Self::Ssl(s) => s.serialize(serializer),
        }
    }
}

impl From<Route> for ConfigObject {
    fn from(route: Route) -> Self {
        Self::Route(route)
    }
}

impl From<Service> for ConfigObject {
    fn from(service: Service) -> Self {
        Self::Service(service)
    }
}

impl From<Upstream> for ConfigObject {
    fn from(upstream: Upstream) -> Self {
        Self::Upstream(upstream)
    }
}

impl From<Consumer> for ConfigObject {
    fn from(consumer: Consumer) -> Self {
        Self::Consumer(consumer)
    }
}

impl From<Ssl> for ConfigObject {
    fn from(ssl: Ssl) -> Self {
        Self::Ssl(ssl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in EntityKind::all() {
            let parsed: EntityKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert_eq!("Route".parse::<EntityKind>().unwrap(), EntityKind::Route);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "plugin_config".parse::<EntityKind>().unwrap_err();
        assert!(matches!(err, EntityError::UnknownKind(ref k) if k == "plugin_config"));
    }

    #[test]
    fn schema_paths_live_under_main() {
        assert_eq!(EntityKind::Route.schema_path(), "main.route");
        assert_eq!(EntityKind::Ssl.schema_path(), "main.ssl");
    }

    #[test]
    fn route_document_round_trips() {
        let doc = json!({
            "id": "r1",
            "uri": "/hello",
            "methods": ["GET"],
            "plugins": {"limit-count": {"count": 2, "time_window": 60}},
            "upstream": {"type": "roundrobin", "nodes": {"127.0.0.1:1980": 1}},
            "enable_websocket": true
        });
        let obj = ConfigObject::from_value(EntityKind::Route, doc.clone()).unwrap();
        assert_eq!(obj.kind(), EntityKind::Route);
        assert_eq!(obj.to_value().unwrap(), doc);
    }

    #[test]
    fn standalone_upstream_flattens_definition() {
        let doc = json!({
            "id": 1,
            "type": "chash",
            "hash_on": "header",
            "key": "X-User",
            "nodes": [{"host": "10.0.0.1", "port": 80, "weight": 1}]
        });
        let obj = ConfigObject::from_value(EntityKind::Upstream, doc.clone()).unwrap();
        let def = obj.upstream().unwrap();
        assert!(def.is_chash());
        assert_eq!(def.hash_on, "header");
        assert_eq!(obj.to_value().unwrap(), doc);
    }

    #[test]
    fn accessors_follow_kind() {
        let consumer = ConfigObject::from(Consumer {
            username: Some("jack".into()),
            plugins: Some(PluginMap::from([("key-auth".into(), json!({"key": "k"}))])),
            ..Default::default()
        });
        assert!(consumer.upstream().is_none());
        assert_eq!(consumer.plugins().map(|p| p.len()), Some(1));

        let mut ssl = ConfigObject::from(Ssl::default());
        assert!(ssl.plugins().is_none());
        assert!(ssl.upstream_mut().is_none());

        let mut route = ConfigObject::from(Route {
            upstream: Some(UpstreamDef::default()),
            ..Default::default()
        });
        route.upstream_mut().unwrap().hash_on = "vars".into();
        assert_eq!(route.upstream().unwrap().hash_on, "vars");
    }

    #[test]
    fn absent_required_fields_stay_absent() {
        let consumer =
            ConfigObject::from_value(EntityKind::Consumer, json!({"desc": "x"})).unwrap();
        assert_eq!(consumer.to_value().unwrap(), json!({"desc": "x"}));

        let ssl = ConfigObject::from_value(EntityKind::Ssl, json!({"snis": ["a.com"]})).unwrap();
        assert_eq!(ssl.to_value().unwrap(), json!({"snis": ["a.com"]}));
    }

    #[test]
    fn decode_failure_names_kind() {
        let err = ConfigObject::from_value(EntityKind::Route, json!({"uri": 42})).unwrap_err();
        assert!(err.to_string().contains("route"), "{err}");
    }
}
