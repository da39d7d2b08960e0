//! Core types shared by the agent, the replay buffer and the Q-networks.
//!
//! A [`State`] is the triple handed over by the environment: the dependency
//! graph, one feature row per node, and the nodes that may be picked next.
//! Graph and features are reference counted so that storing a state in the
//! replay buffer never deep-copies the graph.

use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::AgentError;

/// Dependency graph: an edge `a → b` means `a` must be resolved before `b`.
///
/// Node indices are contiguous, so node `i` owns feature row `i`.
pub type TaskGraph = DiGraph<(), ()>;

/// Row-major node feature matrix, one fixed-width row per node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFeatures {
    data: Vec<f32>,
    width: usize,
    num_nodes: usize,
}

impl NodeFeatures {
    /// Builds a feature matrix from per-node rows.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Shape`] if the rows do not all have the same width.
    pub fn new(rows: Vec<Vec<f32>>) -> Result<Self, AgentError> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(AgentError::Shape(format!(
                "feature row {} has width {}, expected {}",
                i,
                row.len(),
                width
            )));
        }
        let num_nodes = rows.len();
        Ok(Self {
            data: rows.into_iter().flatten().collect(),
            width,
            num_nodes,
        })
    }

    /// All-zero features for `num_nodes` nodes.
    pub fn zeros(num_nodes: usize, width: usize) -> Self {
        Self {
            data: vec![0.0; num_nodes * width],
            width,
            num_nodes,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }
}

/// Returns the nodes that are unresolved but have every predecessor resolved.
///
/// `resolved[i]` marks node `i` as done; nodes past the end of the slice
/// count as unresolved. The result is in ascending node order.
pub fn leaf_nodes(graph: &TaskGraph, resolved: &[bool]) -> Vec<usize> {
    let is_resolved = |i: usize| resolved.get(i).copied().unwrap_or(false);
    graph
        .node_indices()
        .filter(|n| !is_resolved(n.index()))
        .filter(|&n| {
            graph
                .neighbors_directed(n, Direction::Incoming)
                .all(|p: NodeIndex| is_resolved(p.index()))
        })
        .map(|n| n.index())
        .collect()
}

/// Environment state: graph, node features and the legal-action set.
#[derive(Debug, Clone)]
pub struct State {
    pub graph: Arc<TaskGraph>,
    pub features: Arc<NodeFeatures>,
    /// Node indices that may be selected now. May be empty.
    pub legal_actions: Vec<usize>,
}

impl State {
    pub fn new(
        graph: Arc<TaskGraph>,
        features: Arc<NodeFeatures>,
        legal_actions: Vec<usize>,
    ) -> Self {
        Self {
            graph,
            features,
            legal_actions,
        }
    }

    /// Builds a state whose legal actions are the current [`leaf_nodes`].
    pub fn from_graph(
        graph: Arc<TaskGraph>,
        features: Arc<NodeFeatures>,
        resolved: &[bool],
    ) -> Self {
        let legal_actions = leaf_nodes(&graph, resolved);
        Self::new(graph, features, legal_actions)
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub fn has_legal_actions(&self) -> bool {
        !self.legal_actions.is_empty()
    }

    /// Checks that features line up with the graph and every legal action is a node.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.features.num_nodes() != self.num_nodes() {
            return Err(AgentError::Shape(format!(
                "{} feature rows for a graph with {} nodes",
                self.features.num_nodes(),
                self.num_nodes()
            )));
        }
        if let Some(&node) = self.legal_actions.iter().find(|&&a| a >= self.num_nodes()) {
            return Err(AgentError::NodeOutOfRange {
                node,
                num_nodes: self.num_nodes(),
            });
        }
        Ok(())
    }
}

/// One stored experience. Never modified after it enters the replay buffer.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: State,
    pub next_state: State,
    pub action: usize,
    pub reward: f64,
    pub done: bool,
}
