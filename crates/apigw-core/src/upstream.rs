//! # Upstream Definitions
//!
//! The upstream block embedded in routes and services, and carried by
//! standalone upstream objects. Field names match the gateway's wire format.
//!
//! ## Node Lists
//!
//! The gateway accepts two shapes for `nodes`:
//!
//! ```text
//! {"127.0.0.1:8080": 1, "127.0.0.1:8081": 2}            map form
//! [{"host": "127.0.0.1", "port": 8080, "weight": 1}]    list form
//! ```
//!
//! Rules that count or inspect nodes must go through [`Nodes::normalize`],
//! never through the raw shape.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EntityError;

/// Load-balancing type selecting consistent hashing.
pub const TYPE_CHASH: &str = "chash";

/// `pass_host` mode forwarding the selected node's host.
pub const PASS_HOST_NODE: &str = "node";

/// `pass_host` mode forwarding `upstream_host`.
pub const PASS_HOST_REWRITE: &str = "rewrite";

/// Upstream block of a route, service or standalone upstream.
///
/// String fields use the empty string for "unset", matching how the gateway
/// omits them on the wire. Empty strings are skipped on serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamDef {
    /// Load-balancing type (`roundrobin`, `chash`, `ewma`, `least_conn`).
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub lb_type: String,
    /// Hash input for `chash` upstreams.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hash_on: String,
    /// Hash key; its meaning depends on `hash_on`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    /// Host header policy (`pass`, `node`, `rewrite`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pass_host: String,
    /// Host header sent upstream when `pass_host` is `rewrite`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub upstream_host: String,
    /// Upstream nodes in either accepted shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Nodes>,
    /// Fields not modelled above (`retries`, `timeout`, `checks`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl UpstreamDef {
    /// Whether the upstream balances with consistent hashing.
    pub fn is_chash(&self) -> bool {
        self.lb_type == TYPE_CHASH
    }
}

/// Upstream nodes as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nodes {
    /// `[{"host": ..., "port": ..., "weight": ...}]`
    List(Vec<Node>),
    /// `{"host:port": weight}`
    Map(BTreeMap<String, u32>),
}

impl Nodes {
    /// Convert either shape into a uniform node sequence.
    ///
    /// Map entries come out in key order.
    pub fn normalize(&self) -> Vec<Node> {
        match self {
            Nodes::List(nodes) => nodes.clone(),
            Nodes::Map(map) => map
                .iter()
                .map(|(addr, weight)| {
                    let (host, port) = split_host_port(addr);
                    Node {
                        host,
                        port,
                        weight: Some(*weight),
                        ..Default::default()
                    }
                })
                .collect(),
        }
    }

    /// Number of nodes after normalization.
    pub fn len(&self) -> usize {
        match self {
            Nodes::List(nodes) => nodes.len(),
            Nodes::Map(map) => map.len(),
        }
    }

    /// Whether the node list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single upstream node.
///
/// Every field the operator submitted serializes back unchanged, so a node
/// list re-encoded from this type fails the same schema rules the original
/// did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Hostname or IP address, without IPv6 brackets.
    pub host: String,
    /// Port; `None` when the address carried none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Balancing weight; `None` when the list entry omitted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Split a `host[:port]` map key.
///
/// Accepts `[v6]:port` and bare IPv6 literals. A suffix that is not a valid
/// port leaves the whole key as the host.
fn split_host_port(addr: &str) -> (String, Option<u16>) {
    if let Some(rest) = addr.strip_prefix('[') {
        if let Some((host, tail)) = rest.split_once(']') {
            let port = tail.strip_prefix(':').and_then(|p| p.parse().ok());
            return (host.to_string(), port);
        }
    }

    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse() {
            Ok(port) => (host.to_string(), Some(port)),
            Err(_) => (addr.to_string(), None),
        },
        _ => (addr.to_string(), None),
    }
}

/// Hash input of a `chash` upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashOn {
    /// Nginx variable named by `key`.
    Vars,
    /// Request header named by `key`.
    Header,
    /// Cookie named by `key`.
    Cookie,
    /// Authenticated consumer; `key` is unused.
    Consumer,
}

impl HashOn {
    /// Value filled in when a `chash` upstream leaves `hash_on` unset.
    pub const DEFAULT: HashOn = HashOn::Vars;

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vars => "vars",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Consumer => "consumer",
        }
    }

    /// Whether hashing reads the `key` field.
    pub fn uses_key(&self) -> bool {
        !matches!(self, Self::Consumer)
    }
}

impl fmt::Display for HashOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashOn {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vars" => Ok(Self::Vars),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            "consumer" => Ok(Self::Consumer),
            other => Err(EntityError::UnknownHashOn(other.to_string())),
        }
    }
}
