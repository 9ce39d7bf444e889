//! Deciding which nodes of a remaining graph may launch now.

use gridflow_core::{Dag, NodeKey};

use crate::error::Result;
use crate::order::execution_ordered;

/// Nodes of the remaining graph that are eligible to launch.
///
/// The remaining graph is the task graph with completed nodes removed,
/// so an in-edge is an unfinished dependency; a node is runnable when
/// every such edge is launch-only. Results come back in execution
/// order so callers launching a prefix keep the depth-first bias.
pub fn find_runnable<N: NodeKey>(remaining: &Dag<N>) -> Result<Vec<N>> {
    let mut runnable = Vec::new();
    for node in execution_ordered(remaining)? {
        let blocked = remaining
            .in_edges(&node)
            .iter()
            .any(|(_, dependency)| !dependency.launch_only);
        if !blocked {
            runnable.push(node);
        }
    }
    Ok(runnable)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn remaining_after(graph: &Dag<i64>, completed: &[i64]) -> Dag<i64> {
        let completed: HashSet<i64> = completed.iter().copied().collect();
        let keep: HashSet<i64> = graph
            .nodes()
            .into_iter()
            .filter(|n| !completed.contains(n))
            .collect();
        graph.induced_subgraph(&keep)
    }

    #[test]
    fn test_only_roots_run_at_first() {
        let graph = Dag::from_edges([(0, 1), (0, 2), (1, 3), (2, 3)]);
        let runnable = find_runnable(&remaining_after(&graph, &[])).unwrap();
        assert_eq!(runnable, vec![0]);
    }

    #[test]
    fn test_completion_releases_successors() {
        let graph = Dag::from_edges([(0, 1), (0, 2), (1, 3), (2, 3)]);
        let runnable = find_runnable(&remaining_after(&graph, &[0])).unwrap();
        assert_eq!(
            runnable.into_iter().collect::<HashSet<_>>(),
            HashSet::from([1, 2])
        );

        let runnable = find_runnable(&remaining_after(&graph, &[0, 1])).unwrap();
        assert_eq!(runnable, vec![2]);

        let runnable = find_runnable(&remaining_after(&graph, &[0, 1, 2])).unwrap();
        assert_eq!(runnable, vec![3]);
    }

    #[test]
    fn test_launch_only_edges_do_not_block() {
        let mut graph = Dag::from_edges([(0, 1)]);
        graph.add_launch_edge(2, 1);
        graph.add_node(2);

        // 1 still waits on the completion edge from 0, but the
        // launch-only edge from 2 never blocks it.
        let runnable = find_runnable(&remaining_after(&graph, &[])).unwrap();
        assert_eq!(
            runnable.into_iter().collect::<HashSet<_>>(),
            HashSet::from([0, 2])
        );

        let runnable = find_runnable(&remaining_after(&graph, &[0])).unwrap();
        assert_eq!(
            runnable.into_iter().collect::<HashSet<_>>(),
            HashSet::from([1, 2])
        );
    }

    #[test]
    fn test_empty_remaining_graph_has_no_work() {
        let graph = Dag::from_edges([(0, 1)]);
        let runnable = find_runnable(&remaining_after(&graph, &[0, 1])).unwrap();
        assert!(runnable.is_empty());
    }
}
