//! Execution ordering over a job or task graph.

use std::collections::HashSet;

use gridflow_core::{CycleError, Dag, NodeKey};

use crate::error::Result;

/// Orders the nodes so that they go depth-first. This is chosen so
/// that the data has the most locality during computation. It's not
/// strictly depth-first, but depth-first given that all predecessors
/// must be complete before a node executes.
///
/// Candidates live on a stack seeded with the no-predecessor nodes; a
/// popped node is emitted only once all of its predecessors have been
/// emitted, and its successors then become candidates. A node with
/// multiple predecessors is re-pushed by each of them and released by
/// the last one.
///
/// A cyclic graph cannot be ordered and returns [`CycleError`] rather
/// than dropping the unreachable nodes.
pub fn execution_ordered<N: NodeKey>(graph: &Dag<N>) -> Result<Vec<N>> {
    let mut possible = graph.nodes_without_predecessors();
    let mut seen: HashSet<N> = HashSet::new();
    let mut order = Vec::with_capacity(graph.node_count());

    while let Some(node) = possible.pop() {
        if seen.contains(&node) {
            continue;
        }
        let predecessors = graph.predecessors(&node);
        if !predecessors.iter().all(|parent| seen.contains(parent)) {
            // A later predecessor will push this node again.
            continue;
        }
        seen.insert(node.clone());
        for successor in graph.successors(&node) {
            possible.push(successor);
        }
        order.push(node);
    }

    if order.len() != graph.node_count() {
        return Err(CycleError.into());
    }
    Ok(order)
}
