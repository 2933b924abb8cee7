//! Property tests for upstream node normalization.
//!
//! Both wire shapes must normalize to the same node count the operator
//! submitted, so that node-count rules give the same answer regardless of
//! which shape was used.

use std::collections::BTreeMap;

use apigw_core::{Node, Nodes};
use proptest::prelude::*;

fn host_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}"
}

proptest! {
    #[test]
    fn map_shape_preserves_count(entries in prop::collection::btree_map(
        (host_strategy(), 1u16..65535u16),
        0u32..100,
        0..8,
    )) {
        let map: BTreeMap<String, u32> = entries
            .iter()
            .map(|((host, port), weight)| (format!("{host}:{port}"), *weight))
            .collect();
        let nodes = Nodes::Map(map.clone());
        let normalized = nodes.normalize();

        prop_assert_eq!(normalized.len(), map.len());
        prop_assert_eq!(nodes.len(), map.len());
        for node in &normalized {
            prop_assert!(node.port.is_some());
            prop_assert!(!node.host.contains(':'));
        }
    }

    #[test]
    fn list_and_map_shapes_agree(addrs in prop::collection::btree_set(
        (host_strategy(), 1u16..65535u16),
        0..8,
    )) {
        let map: BTreeMap<String, u32> = addrs
            .iter()
            .map(|(host, port)| (format!("{host}:{port}"), 1))
            .collect();
        let list: Vec<Node> = Nodes::Map(map.clone()).normalize();

        let from_map = Nodes::Map(map).normalize();
        let from_list = Nodes::List(list).normalize();
        prop_assert_eq!(from_map, from_list);
    }

    #[test]
    fn normalization_is_idempotent(weights in prop::collection::vec(0u32..10, 0..6)) {
        let nodes = Nodes::List(
            weights
                .iter()
                .enumerate()
                .map(|(i, w)| Node {
                    host: format!("10.0.0.{i}"),
                    port: Some(80),
                    weight: Some(*w),
                    ..Default::default()
                })
                .collect(),
        );
        let once = nodes.normalize();
        let twice = Nodes::List(once.clone()).normalize();
        prop_assert_eq!(once, twice);
    }
}
