// Infrastructure: TraversalEngine - undirected BFS over a GraphSnapshot
//
// Relationships are walked in both directions. Cycles are expected
// (containers wire back into the network tier), so every walk keeps a
// visited set.

use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use super::graph_index::{Adjacency, GraphSnapshot};
use crate::errors::Result;
use crate::features::schema::RelationshipKind;
use crate::shared::Deadline;

/// BFS result: entity indices from source to target, each with the
/// adjacency entry used to reach it
pub(crate) type IndexPath = Vec<(usize, Option<Adjacency>)>;

pub(crate) struct TraversalEngine<'a> {
    snapshot: &'a GraphSnapshot,
}

impl<'a> TraversalEngine<'a> {
    pub(crate) fn new(snapshot: &'a GraphSnapshot) -> Self {
        Self { snapshot }
    }

    /// Shortest path by hop count
    ///
    /// Neighbors are expanded in adjacency (insertion) order and the first
    /// discovery of a node wins, so equal-length alternatives resolve the same
    /// way on every call. Returns `Ok(None)` when `target` is unreachable.
    pub(crate) fn shortest_path(
        &self,
        source: usize,
        target: usize,
        deadline: Deadline,
    ) -> Result<Option<IndexPath>> {
        if source == target {
            return Ok(Some(vec![(source, None)]));
        }

        let n = self.snapshot.entity_count();
        let mut visited = vec![false; n];
        let mut parent: Vec<Option<(usize, Adjacency)>> = vec![None; n];
        let mut queue = VecDeque::new();

        visited[source] = true;
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            deadline.check("shortest path search")?;

            for adj in self.snapshot.adjacency(current) {
                let next = adj.neighbor;
                if visited[next] {
                    continue;
                }
                visited[next] = true;
                parent[next] = Some((current, *adj));

                if next == target {
                    return Ok(Some(Self::reconstruct(&parent, source, target)));
                }
                queue.push_back(next);
            }
        }

        Ok(None)
    }

    fn reconstruct(
        parent: &[Option<(usize, Adjacency)>],
        source: usize,
        target: usize,
    ) -> IndexPath {
        let mut path = Vec::new();
        let mut current = target;
        while current != source {
            match parent[current] {
                Some((prev, adj)) => {
                    path.push((current, Some(adj)));
                    current = prev;
                }
                None => break,
            }
        }
        path.push((source, None));
        path.reverse();
        path
    }

    /// Distinct neighbor indices (either direction) in adjacency order
    ///
    /// `kinds` restricts the relationships followed; `None` follows all.
    /// A self-loop does not make an entity its own neighbor.
    pub(crate) fn neighbors(&self, idx: usize, kinds: Option<&[RelationshipKind]>) -> Vec<usize> {
        let mut seen = FxHashSet::default();
        seen.insert(idx);

        let mut out = Vec::new();
        for adj in self.snapshot.adjacency(idx) {
            if let Some(kinds) = kinds {
                let kind = self.snapshot.relationship_at(adj.relationship).kind();
                if !kinds.contains(&kind) {
                    continue;
                }
            }
            if seen.insert(adj.neighbor) {
                out.push(adj.neighbor);
            }
        }
        out
    }
}
