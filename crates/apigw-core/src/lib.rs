//! # apigw-core: Entity Model for the Gateway Control Plane
//!
//! Typed records for every configuration object the control plane accepts
//! before persisting it and pushing it to the data plane.
//!
//! ## Key Design Principles
//!
//! 1. **Closed sum type over entity kinds.** [`ConfigObject`] enumerates
//!    every supported kind. Consumers `match` on it exhaustively instead of
//!    inspecting types at runtime; adding a kind forces every consumer to
//!    decide how it treats the new variant.
//!
//! 2. **Documents survive round-trips.** Each record keeps fields it does not
//!    model in a flattened `extra` map, so serializing a decoded entity yields
//!    the document the operator submitted. Structural validation depends on
//!    seeing unknown fields.
//!
//! 3. **Node lists are normalized before inspection.** Upstream nodes arrive
//!    either as a `"host:port" -> weight` map or as a list of node objects.
//!    [`Nodes::normalize`] turns both into one `Vec<Node>`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `apigw-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod entity;
pub mod error;
pub mod upstream;

pub use entity::{ConfigObject, Consumer, EntityKind, PluginMap, Route, Service, Ssl, Upstream};
pub use error::EntityError;
pub use upstream::{HashOn, Node, Nodes, UpstreamDef};
