//! Directed acyclic graphs over job and task identifiers.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use thiserror::Error;

use crate::identifier::Identifier;

/// Anything usable as a graph node key.
pub trait NodeKey: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> NodeKey for T {}

/// The input graph is not acyclic, so no execution order exists.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("dependency cycle detected in job graph")]
pub struct CycleError;

/// Edge attribute on a dependency.
///
/// A `launch_only` edge requires the predecessor to be *submitted*, not
/// completed, before the successor may be submitted; under a grid
/// engine this lets a downstream job queue as soon as upstream queues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dependency {
    /// True when the predecessor only has to be launched first.
    pub launch_only: bool,
}

impl Dependency {
    /// A launch-order-only dependency.
    pub fn launch() -> Self {
        Self { launch_only: true }
    }
}

/// A directed acyclic graph keyed by node values.
///
/// Nodes live in petgraph's index-stable arena; the map from key to
/// index makes lookups cheap without reference cycles. Acyclicity is
/// the builder's responsibility and is checked wherever an order is
/// computed.
#[derive(Debug, Clone, Default)]
pub struct Dag<N: NodeKey> {
    /// Mapping from node key to arena index.
    nodes: HashMap<N, NodeIndex>,

    /// The underlying directed graph.
    graph: DiGraph<N, Dependency>,
}

/// The graph an application hands to the engine.
pub type JobGraph = Dag<Identifier>;

impl<N: NodeKey> Dag<N> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            graph: DiGraph::new(),
        }
    }

    /// Builds a graph from completion-dependency edges.
    pub fn from_edges(edges: impl IntoIterator<Item = (N, N)>) -> Self {
        let mut dag = Self::new();
        for (from, to) in edges {
            dag.add_edge(from, to);
        }
        dag
    }

    /// Adds a node if it is not already present.
    pub fn add_node(&mut self, node: N) {
        self.index_or_insert(node);
    }

    /// Adds a completion-dependency edge: `from` must complete before
    /// `to` starts. Missing endpoints are created.
    pub fn add_edge(&mut self, from: N, to: N) {
        self.add_edge_with(from, to, Dependency::default());
    }

    /// Adds a launch-order-only edge.
    pub fn add_launch_edge(&mut self, from: N, to: N) {
        self.add_edge_with(from, to, Dependency::launch());
    }

    /// Adds an edge carrying an explicit dependency attribute.
    /// A repeated edge replaces the previous attribute.
    pub fn add_edge_with(&mut self, from: N, to: N, dependency: Dependency) {
        let from_idx = self.index_or_insert(from);
        let to_idx = self.index_or_insert(to);
        self.graph.update_edge(from_idx, to_idx, dependency);
    }

    fn index_or_insert(&mut self, node: N) -> NodeIndex {
        match self.nodes.get(&node) {
            Some(idx) => *idx,
            None => {
                let idx = self.graph.add_node(node.clone());
                self.nodes.insert(node, idx);
                idx
            }
        }
    }

    fn index_of(&self, node: &N) -> Option<NodeIndex> {
        self.nodes.get(node).copied()
    }

    /// Whether the node is in the graph.
    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> Vec<N> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// All edges with their attributes.
    pub fn edges(&self) -> Vec<(N, N, Dependency)> {
        self.graph
            .edge_indices()
            .map(|edge| {
                let (from, to) = self.graph.edge_endpoints(edge).expect("edge exists");
                let weight = self.graph[edge];
                (self.graph[from].clone(), self.graph[to].clone(), weight)
            })
            .collect()
    }

    /// Direct predecessors of a node. Unknown nodes have none.
    pub fn predecessors(&self, node: &N) -> Vec<N> {
        self.neighbors(node, Direction::Incoming)
    }

    /// Direct successors of a node.
    pub fn successors(&self, node: &N) -> Vec<N> {
        self.neighbors(node, Direction::Outgoing)
    }

    fn neighbors(&self, node: &N, direction: Direction) -> Vec<N> {
        match self.index_of(node) {
            Some(idx) => self
                .graph
                .neighbors_directed(idx, direction)
                .map(|n| self.graph[n].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Incoming edges of a node with their dependency attributes.
    pub fn in_edges(&self, node: &N) -> Vec<(N, Dependency)> {
        match self.index_of(node) {
            Some(idx) => self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .map(|edge| (self.graph[edge.source()].clone(), *edge.weight()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Nodes with no predecessors, in insertion order.
    pub fn nodes_without_predecessors(&self) -> Vec<N> {
        self.graph
            .node_indices()
            .filter(|idx| {
                self.graph
                    .neighbors_directed(*idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Every node reachable from `node`, excluding `node` itself.
    pub fn descendants(&self, node: &N) -> HashSet<N> {
        let start = match self.index_of(node) {
            Some(idx) => idx,
            None => return HashSet::new(),
        };
        let mut found = HashSet::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(idx) = dfs.next(&self.graph) {
            if idx != start {
                found.insert(self.graph[idx].clone());
            }
        }
        found
    }

    /// A topological order over all nodes, or an error for a cyclic
    /// graph.
    pub fn topological_order(&self) -> Result<Vec<N>, CycleError> {
        let sorted = toposort(&self.graph, None).map_err(|_| CycleError)?;
        Ok(sorted.into_iter().map(|idx| self.graph[idx].clone()).collect())
    }

    /// The node-induced subgraph over `keep`, preserving edges (and
    /// their attributes) between retained nodes. Edges to dropped
    /// nodes disappear silently.
    pub fn induced_subgraph(&self, keep: &HashSet<N>) -> Self {
        let mut subgraph = Self::new();
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            if keep.contains(node) {
                subgraph.add_node(node.clone());
            }
        }
        for edge in self.graph.edge_indices() {
            let (from, to) = self.graph.edge_endpoints(edge).expect("edge exists");
            let (from, to) = (&self.graph[from], &self.graph[to]);
            if keep.contains(from) && keep.contains(to) {
                subgraph.add_edge_with(from.clone(), to.clone(), self.graph[edge]);
            }
        }
        subgraph
    }
}
