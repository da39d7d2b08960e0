//! Pure-Rust Q-table keyed by node index.
//!
//! Ignores node features and graph structure, which makes it a cheap
//! baseline and a deterministic stand-in wherever libtorch is unavailable.
//! Checkpoints are the two tables plus the exploration rate, bincode-encoded.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{NetworkRole, QNetwork, TdLoss};
use crate::error::AgentError;
use crate::types::{NodeFeatures, TaskGraph};

/// Online Q-value of one table cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableEstimate {
    pub node: usize,
    pub value: f64,
}

/// Online/target pair of per-node Q-tables trained by plain gradient descent.
///
/// Nodes outside the table evaluate to `0.0`; the online table grows when
/// such a node is updated.
#[derive(Debug, Clone)]
pub struct TabularQNetwork {
    online: Vec<f64>,
    target: Vec<f64>,
    learning_rate: f64,
    loss: TdLoss,
}

impl TabularQNetwork {
    /// Creates a pair whose target starts as a copy of `initial`.
    pub fn new(initial: Vec<f64>, learning_rate: f64, loss: TdLoss) -> Self {
        Self {
            target: initial.clone(),
            online: initial,
            learning_rate,
            loss,
        }
    }

    pub fn online_values(&self) -> &[f64] {
        &self.online
    }

    pub fn target_values(&self) -> &[f64] {
        &self.target
    }

    fn check_shape(graph: &TaskGraph, features: &NodeFeatures) -> Result<(), AgentError> {
        if graph.node_count() != features.num_nodes() {
            return Err(AgentError::Shape(format!(
                "{} feature rows for a graph with {} nodes",
                features.num_nodes(),
                graph.node_count()
            )));
        }
        Ok(())
    }
}

/// On-disk layout of a [`TabularQNetwork`] checkpoint.
#[derive(Serialize, Deserialize)]
struct TableCheckpoint {
    exploration_rate: f64,
    online: Vec<f64>,
    target: Vec<f64>,
}

fn lookup(table: &[f64], node: usize) -> f64 {
    table.get(node).copied().unwrap_or(0.0)
}

impl QNetwork for TabularQNetwork {
    type Estimate = TableEstimate;

    fn evaluate(
        &self,
        graph: &TaskGraph,
        features: &NodeFeatures,
        role: NetworkRole,
    ) -> Result<Vec<f64>, AgentError> {
        Self::check_shape(graph, features)?;
        let table = match role {
            NetworkRole::Online => &self.online,
            NetworkRole::Target => &self.target,
        };
        Ok((0..graph.node_count()).map(|n| lookup(table, n)).collect())
    }

    fn estimate(
        &self,
        graph: &TaskGraph,
        features: &NodeFeatures,
        node: usize,
    ) -> Result<TableEstimate, AgentError> {
        Self::check_shape(graph, features)?;
        if node >= graph.node_count() {
            return Err(AgentError::NodeOutOfRange {
                node,
                num_nodes: graph.node_count(),
            });
        }
        Ok(TableEstimate {
            node,
            value: lookup(&self.online, node),
        })
    }

    fn estimate_value(&self, estimate: &TableEstimate) -> f64 {
        estimate.value
    }

    fn update(&mut self, estimate: TableEstimate, target: f64) -> Result<f64, AgentError> {
        let loss = self.loss.value(estimate.value, target);
        let grad = self.loss.gradient(estimate.value, target);
        if self.online.len() <= estimate.node {
            self.online.resize(estimate.node + 1, 0.0);
        }
        self.online[estimate.node] -= self.learning_rate * grad;
        Ok(loss)
    }

    fn sync(&mut self) -> Result<(), AgentError> {
        self.target.clone_from(&self.online);
        Ok(())
    }

    fn save_checkpoint(&self, path: &Path, exploration_rate: f64) -> Result<(), AgentError> {
        let checkpoint = TableCheckpoint {
            exploration_rate,
            online: self.online.clone(),
            target: self.target.clone(),
        };
        let data = bincode::serialize(&checkpoint)
            .map_err(|e| AgentError::Checkpoint(e.to_string()))?;
        fs::write(path, data)?;
        Ok(())
    }

    fn load_checkpoint(&mut self, path: &Path) -> Result<f64, AgentError> {
        let data = fs::read(path)?;
        let checkpoint: TableCheckpoint = bincode::deserialize(&data).map_err(|e| {
            AgentError::Checkpoint(format!("{}: {}", path.display(), e))
        })?;
        self.online = checkpoint.online;
        self.target = checkpoint.target;
        Ok(checkpoint.exploration_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize) -> (TaskGraph, NodeFeatures) {
        let mut g = TaskGraph::new();
        for _ in 0..n {
            g.add_node(());
        }
        (g, NodeFeatures::zeros(n, 5))
    }

    #[test]
    fn evaluate_pads_missing_nodes() {
        let (g, f) = graph(4);
        let net = TabularQNetwork::new(vec![0.5, 1.5], 0.1, TdLoss::Mse);
        let q = net.evaluate(&g, &f, NetworkRole::Online).unwrap();
        assert_eq!(q, vec![0.5, 1.5, 0.0, 0.0]);
    }

    #[test]
    fn evaluate_rejects_misaligned_features() {
        let (g, _) = graph(3);
        let net = TabularQNetwork::new(vec![], 0.1, TdLoss::Mse);
        let f = NodeFeatures::zeros(2, 5);
        assert!(matches!(
            net.evaluate(&g, &f, NetworkRole::Target),
            Err(AgentError::Shape(_))
        ));
    }

    #[test]
    fn update_moves_online_only() {
        let (g, f) = graph(2);
        let mut net = TabularQNetwork::new(vec![1.0, 0.0], 0.25, TdLoss::Mse);
        let est = net.estimate(&g, &f, 0).unwrap();
        let loss = net.update(est, 0.0).unwrap();
        assert_eq!(loss, 1.0);
        // 1.0 - 0.25 * 2.0
        assert_eq!(net.online_values()[0], 0.5);
        assert_eq!(net.target_values()[0], 1.0);
    }

    #[test]
    fn sync_makes_roles_agree() {
        let (g, f) = graph(3);
        let mut net = TabularQNetwork::new(vec![0.0; 3], 0.5, TdLoss::Mse);
        let est = net.estimate(&g, &f, 2).unwrap();
        net.update(est, 4.0).unwrap();
        assert_ne!(
            net.evaluate(&g, &f, NetworkRole::Online).unwrap(),
            net.evaluate(&g, &f, NetworkRole::Target).unwrap()
        );
        net.sync().unwrap();
        assert_eq!(
            net.evaluate(&g, &f, NetworkRole::Online).unwrap(),
            net.evaluate(&g, &f, NetworkRole::Target).unwrap()
        );
    }

    #[test]
    fn estimate_rejects_unknown_node() {
        let (g, f) = graph(2);
        let net = TabularQNetwork::new(vec![], 0.1, TdLoss::Mse);
        assert!(matches!(
            net.estimate(&g, &f, 2),
            Err(AgentError::NodeOutOfRange { node: 2, num_nodes: 2 })
        ));
    }

    #[test]
    fn checkpoint_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.chkpt");
        let mut net = TabularQNetwork::new(vec![1.0, 2.0], 0.1, TdLoss::Mse);
        net.online[1] = 3.0;
        net.save_checkpoint(&path, 0.42).unwrap();

        let mut restored = TabularQNetwork::new(vec![], 0.1, TdLoss::Mse);
        let rate = restored.load_checkpoint(&path).unwrap();
        assert_eq!(rate, 0.42);
        assert_eq!(restored.online_values(), &[1.0, 3.0]);
        assert_eq!(restored.target_values(), &[1.0, 2.0]);
    }

    #[test]
    fn load_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk");
        std::fs::write(&path, b"junk").unwrap();
        let mut net = TabularQNetwork::new(vec![], 0.1, TdLoss::Mse);
        assert!(matches!(
            net.load_checkpoint(&path),
            Err(AgentError::Checkpoint(_))
        ));
        assert_eq!(net.online_values(), &[] as &[f64]);
    }

    #[test]
    fn load_rejects_truncated_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.chkpt");
        let net = TabularQNetwork::new(vec![1.0, 2.0, 3.0], 0.1, TdLoss::Mse);
        net.save_checkpoint(&path, 0.5).unwrap();

        let data = std::fs::read(&path).unwrap();
        std::fs::write(&path, &data[..data.len() - 4]).unwrap();
        let mut restored = TabularQNetwork::new(vec![9.0], 0.1, TdLoss::Mse);
        assert!(matches!(
            restored.load_checkpoint(&path),
            Err(AgentError::Checkpoint(_))
        ));
        assert_eq!(restored.online_values(), &[9.0]);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut net = TabularQNetwork::new(vec![], 0.1, TdLoss::Mse);
        assert!(matches!(
            net.load_checkpoint(&dir.path().join("absent.chkpt")),
            Err(AgentError::Io(_))
        ));
    }
}
