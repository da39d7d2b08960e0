//! Q-value networks over dependency graphs.
//!
//! [`QNetwork`] is the contract the agent trains against: a pair of
//! networks with identical architecture, where `online` is optimized and
//! `target` only ever receives value copies of `online`.

use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::types::{NodeFeatures, TaskGraph};

pub mod tabular;

#[cfg(feature = "gnn")]
pub mod dual;
#[cfg(feature = "gnn")]
pub mod gcn;

pub use tabular::TabularQNetwork;

#[cfg(feature = "gnn")]
pub use dual::{GcnConfig, GcnQNetwork};

/// Selects which half of the network pair to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkRole {
    Online,
    Target,
}

/// Loss between a TD-estimate and its TD-target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TdLoss {
    /// Squared error.
    #[default]
    Mse,
    /// Smooth L1 with a transition point of 1.
    Huber,
    /// Soft-target cross entropy over the single estimate logit.
    ///
    /// A one-element softmax is constant, so this loss is always zero and
    /// never moves the network. Only useful to reproduce runs that trained
    /// with it.
    CrossEntropy,
}

impl TdLoss {
    /// Loss value for a scalar estimate/target pair.
    pub fn value(&self, estimate: f64, target: f64) -> f64 {
        let diff = estimate - target;
        match self {
            TdLoss::Mse => diff * diff,
            TdLoss::Huber if diff.abs() < 1.0 => 0.5 * diff * diff,
            TdLoss::Huber => diff.abs() - 0.5,
            TdLoss::CrossEntropy => 0.0,
        }
    }

    /// Derivative of [`value`](Self::value) with respect to the estimate.
    pub fn gradient(&self, estimate: f64, target: f64) -> f64 {
        let diff = estimate - target;
        match self {
            TdLoss::Mse => 2.0 * diff,
            TdLoss::Huber if diff.abs() < 1.0 => diff,
            TdLoss::Huber => diff.signum(),
            TdLoss::CrossEntropy => 0.0,
        }
    }
}

/// Online/target pair of per-node Q-value estimators.
pub trait QNetwork {
    /// Online Q-value of one node, still attached to whatever the
    /// implementation needs to backpropagate through it.
    type Estimate;

    /// Per-node Q-values, index-aligned with `features`.
    ///
    /// Evaluation never records gradients; the target half cannot.
    fn evaluate(
        &self,
        graph: &TaskGraph,
        features: &NodeFeatures,
        role: NetworkRole,
    ) -> Result<Vec<f64>, AgentError>;

    /// Differentiable online Q-value of `node`.
    fn estimate(
        &self,
        graph: &TaskGraph,
        features: &NodeFeatures,
        node: usize,
    ) -> Result<Self::Estimate, AgentError>;

    /// Plain numeric value of an estimate.
    fn estimate_value(&self, estimate: &Self::Estimate) -> f64;

    /// One optimizer step on `online` toward `target`; returns the loss.
    ///
    /// Gradients are zeroed before backpropagation. Non-finite losses are
    /// returned as-is.
    fn update(&mut self, estimate: Self::Estimate, target: f64) -> Result<f64, AgentError>;

    /// Copies every online parameter value into the target network.
    fn sync(&mut self) -> Result<(), AgentError>;

    /// Writes online and target parameters plus `exploration_rate` to one file.
    fn save_checkpoint(&self, path: &Path, exploration_rate: f64) -> Result<(), AgentError>;

    /// Restores a file written by [`save_checkpoint`](Self::save_checkpoint);
    /// returns the stored exploration rate.
    fn load_checkpoint(&mut self, path: &Path) -> Result<f64, AgentError>;
}
