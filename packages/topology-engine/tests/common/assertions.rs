//! Graph invariant assertions

use topology_engine::{GraphSnapshot, SchemaRegistry, Subgraph};

/// Every relationship's endpoints exist and its kind pair is allowed
pub fn assert_snapshot_consistent(snapshot: &GraphSnapshot) {
    let registry = SchemaRegistry::global();
    for rel in snapshot.relationships() {
        let source = snapshot
            .entity(rel.source_id())
            .unwrap_or_else(|| panic!("dangling source on {}", rel.id()));
        let target = snapshot
            .entity(rel.target_id())
            .unwrap_or_else(|| panic!("dangling target on {}", rel.id()));
        assert!(
            registry.allows(rel.kind(), source.kind(), target.kind()),
            "{} {} -> {} not allowed",
            rel.kind(),
            source.kind(),
            target.kind()
        );
    }
}

/// No edge in the subgraph points outside it
pub fn assert_subgraph_closed(subgraph: &Subgraph) {
    for edge in &subgraph.edges {
        assert!(subgraph.contains_node(edge.source_id()), "dangling {}", edge.id());
        assert!(subgraph.contains_node(edge.target_id()), "dangling {}", edge.id());
    }
}
