//! Selecting the subgraph of jobs that should run.

use std::collections::HashSet;

use tracing::debug;

use gridflow_core::{Application, CoreError, Dag, Identifier, JobGraph, JobSelection, NodeKey};

use crate::error::{EngineError, Result};

/// Computes the execution subgraph for a command-line selection.
///
/// The subset is the selected identifiers, widened to all of their
/// descendants when `run_dependents` is set, as an induced subgraph of
/// the application's job graph. With `resume` set, jobs whose outputs
/// already validate are pruned through [`jobs_not_done`].
///
/// A selected identifier that is not a graph node is malformed input
/// and fails before anything runs.
pub fn job_subset(app: &dyn Application, selection: &JobSelection) -> Result<JobGraph> {
    let identifiers = app.job_identifiers(selection);
    let job_graph = app.job_graph();
    for identifier in &identifiers {
        if !job_graph.contains(identifier) {
            return Err(EngineError::UnknownJob(identifier.clone()));
        }
    }

    let mut keep: HashSet<Identifier> = identifiers.iter().cloned().collect();
    if selection.run_dependents {
        for identifier in &identifiers {
            keep.extend(job_graph.descendants(identifier));
        }
    }
    let mut sub_graph = job_graph.induced_subgraph(&keep);

    if selection.resume {
        sub_graph = jobs_not_done(&sub_graph, |identifier| app.job(identifier)?.done())?;
    }
    Ok(sub_graph)
}

/// Computes the subgraph of jobs that still have to run.
///
/// Each node's own `job_done` answer is consulted once, in topological
/// order; a node that is not done forces every descendant into the
/// not-done set without consulting their predicates, because their
/// inputs are about to be regenerated. Ancestor propagation always
/// wins over a descendant's own answer.
pub fn jobs_not_done<N, F>(graph: &Dag<N>, mut job_done: F) -> Result<Dag<N>>
where
    N: NodeKey,
    F: FnMut(&N) -> std::result::Result<bool, CoreError>,
{
    let mut forced: HashSet<N> = HashSet::new();
    let mut not_done: HashSet<N> = HashSet::new();

    for node in graph.topological_order()? {
        if forced.contains(&node) {
            not_done.insert(node);
            continue;
        }
        if !job_done(&node)? {
            forced.extend(graph.descendants(&node));
            not_done.insert(node);
        }
    }

    debug!(count = not_done.len(), "jobs left to run");
    Ok(graph.induced_subgraph(&not_done))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridflow_core::Job;

    /// A four-job diamond whose jobs report done-ness from a fixed set.
    struct DiamondApp {
        done: HashSet<i64>,
    }

    impl Application for DiamondApp {
        fn name(&self) -> String {
            "diamond".to_string()
        }

        fn job_graph(&self) -> JobGraph {
            JobGraph::from_edges(
                [(0, 1), (0, 2), (1, 3), (2, 3)]
                    .map(|(u, v)| (Identifier::Integer(u), Identifier::Integer(v))),
            )
        }

        fn job(&self, identifier: &Identifier) -> gridflow_core::Result<Box<dyn Job>> {
            struct FixedDone {
                identifier: Identifier,
                done: bool,
            }
            impl Job for FixedDone {
                fn identifier(&self) -> Identifier {
                    self.identifier.clone()
                }
                fn run(&self) -> gridflow_core::Result<()> {
                    Ok(())
                }
                fn done(&self) -> gridflow_core::Result<bool> {
                    Ok(self.done)
                }
            }
            let done = match identifier {
                Identifier::Integer(id) => self.done.contains(id),
                Identifier::Text(_) => false,
            };
            Ok(Box::new(FixedDone {
                identifier: identifier.clone(),
                done,
            }))
        }
    }

    fn int_set(nodes: &[i64]) -> HashSet<Identifier> {
        nodes.iter().map(|n| Identifier::Integer(*n)).collect()
    }

    #[test]
    fn test_subset_without_dependents_is_induced() {
        let app = DiamondApp {
            done: HashSet::new(),
        };
        let selection = JobSelection::single(Identifier::Integer(1));
        let subset = job_subset(&app, &selection).unwrap();
        assert_eq!(
            subset.nodes().into_iter().collect::<HashSet<_>>(),
            int_set(&[1])
        );
        assert_eq!(subset.edge_count(), 0);
    }

    #[test]
    fn test_subset_with_dependents_includes_descendants() {
        let app = DiamondApp {
            done: HashSet::new(),
        };
        let selection = JobSelection {
            job_id: Some(Identifier::Integer(1)),
            run_dependents: true,
            ..JobSelection::default()
        };
        let subset = job_subset(&app, &selection).unwrap();
        assert_eq!(
            subset.nodes().into_iter().collect::<HashSet<_>>(),
            int_set(&[1, 3])
        );
        assert_eq!(subset.edge_count(), 1);
    }

    #[test]
    fn test_subset_of_everything_keeps_all_edges() {
        let app = DiamondApp {
            done: HashSet::new(),
        };
        let subset = job_subset(&app, &JobSelection::all()).unwrap();
        assert_eq!(subset.node_count(), 4);
        assert_eq!(subset.edge_count(), 4);
    }

    #[test]
    fn test_unknown_target_fails_before_running() {
        let app = DiamondApp {
            done: HashSet::new(),
        };
        let selection = JobSelection::single(Identifier::Integer(99));
        assert!(matches!(
            job_subset(&app, &selection),
            Err(EngineError::UnknownJob(_))
        ));
    }

    #[test]
    fn test_resume_prunes_finished_jobs() {
        let app = DiamondApp {
            done: HashSet::from([0, 1]),
        };
        let selection = JobSelection {
            resume: true,
            ..JobSelection::default()
        };
        let subset = job_subset(&app, &selection).unwrap();
        // 2 is not done, which drags 3 along; 0 and 1 are skipped.
        assert_eq!(
            subset.nodes().into_iter().collect::<HashSet<_>>(),
            int_set(&[2, 3])
        );
    }

    /// Not-done propagation over chains, fans, and diamonds.
    #[test]
    fn test_jobs_not_done_table() {
        let cases: &[(&[(i64, i64)], &[i64], &[i64])] = &[
            (&[(0, 1)], &[0, 1], &[0, 1]),
            (&[(0, 1)], &[0], &[0, 1]),
            (&[(0, 1)], &[1], &[1]),
            (&[(0, 1), (0, 2)], &[1], &[1]),
            (&[(0, 1), (0, 2)], &[0], &[0, 1, 2]),
            (&[(0, 1), (0, 2), (1, 3), (2, 3)], &[1], &[1, 3]),
            (&[(0, 1), (0, 2), (1, 3), (2, 3)], &[0], &[0, 1, 2, 3]),
            (&[(0, 1), (0, 2), (1, 3), (2, 3)], &[3], &[3]),
        ];
        for (edges, not_done, expected) in cases {
            let graph: Dag<i64> = Dag::from_edges(edges.iter().copied());
            let not_done: HashSet<i64> = not_done.iter().copied().collect();
            let result =
                jobs_not_done(&graph, |n| Ok(!not_done.contains(n))).unwrap();
            let expected: HashSet<i64> = expected.iter().copied().collect();
            assert_eq!(
                result.nodes().into_iter().collect::<HashSet<_>>(),
                expected,
                "edges {:?}, not done {:?}",
                edges,
                not_done
            );
        }
    }

    /// A node forced not-done by an ancestor is never asked about
    /// itself.
    #[test]
    fn test_forced_nodes_skip_their_own_predicate() {
        let graph: Dag<i64> = Dag::from_edges([(0, 1), (1, 2)]);
        let mut asked = Vec::new();
        let result = jobs_not_done(&graph, |n| {
            asked.push(*n);
            Ok(*n != 0)
        })
        .unwrap();
        assert_eq!(result.node_count(), 3);
        assert_eq!(asked, vec![0]);
    }

    #[test]
    fn test_predicate_errors_propagate() {
        let graph: Dag<i64> = Dag::from_edges([(0, 1)]);
        let result = jobs_not_done(&graph, |_| {
            Err(CoreError::Misconfigured("broken artifact".to_string()))
        });
        assert!(result.is_err());
    }
}
