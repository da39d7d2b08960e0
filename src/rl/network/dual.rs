//! Online/target graph convolution Q-network.
//!
//! Both halves own a separate [`nn::VarStore`] with identically named
//! variables. The target store is frozen at construction and can only be
//! overwritten by copying values out of the online store.

use std::collections::HashMap;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tch::{nn, nn::OptimizerConfig, Device, Kind, Reduction, Tensor};

use super::gcn::{normalized_adjacency, Gcn};
use super::{NetworkRole, QNetwork, TdLoss};
use crate::error::AgentError;
use crate::types::{NodeFeatures, TaskGraph};

const EXPLORATION_RATE_KEY: &str = "exploration_rate";

/// Architecture and optimizer settings for [`GcnQNetwork`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GcnConfig {
    /// Width of each node feature row.
    pub features: usize,
    /// Hidden embedding width.
    pub hidden: usize,
    /// Adam learning rate.
    pub learning_rate: f64,
    pub loss: TdLoss,
}

impl Default for GcnConfig {
    fn default() -> Self {
        Self {
            features: 5,
            hidden: 5,
            learning_rate: 0.00025,
            loss: TdLoss::Mse,
        }
    }
}

/// Frozen copy of the online network.
///
/// Exposes no optimizer and no mutable variable access: the only write
/// path is [`load_from`](Self::load_from).
struct TargetGcn {
    vs: nn::VarStore,
    net: Gcn,
}

impl TargetGcn {
    fn snapshot_of(
        online: &nn::VarStore,
        config: &GcnConfig,
        device: Device,
    ) -> Result<Self, AgentError> {
        let mut vs = nn::VarStore::new(device);
        let net = Gcn::new(&vs.root(), config.features, config.hidden);
        vs.copy(online)?;
        vs.freeze();
        Ok(Self { vs, net })
    }

    fn load_from(&mut self, online: &nn::VarStore) -> Result<(), AgentError> {
        self.vs.copy(online)?;
        Ok(())
    }

    fn forward(&self, adj: &Tensor, inputs: &Tensor) -> Tensor {
        tch::no_grad(|| self.net.forward(adj, inputs))
    }
}

/// Dual graph convolution Q-network trained with Adam.
pub struct GcnQNetwork {
    online_vs: nn::VarStore,
    online: Gcn,
    target: TargetGcn,
    optimizer: nn::Optimizer,
    config: GcnConfig,
    device: Device,
}

impl GcnQNetwork {
    /// Creates an online network and a frozen, value-identical target.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] on zero-sized layers or a
    /// non-positive learning rate, and [`AgentError::Network`] if libtorch
    /// fails to build the optimizer.
    pub fn new(config: GcnConfig, device: Device) -> Result<Self, AgentError> {
        if config.features == 0 || config.hidden == 0 {
            return Err(AgentError::Config(
                "layer widths must be positive".to_string(),
            ));
        }
        if !(config.learning_rate > 0.0) {
            return Err(AgentError::Config(format!(
                "learning_rate must be positive, got {}",
                config.learning_rate
            )));
        }

        let online_vs = nn::VarStore::new(device);
        let online = Gcn::new(&online_vs.root(), config.features, config.hidden);
        let target = TargetGcn::snapshot_of(&online_vs, &config, device)?;
        let optimizer = nn::Adam::default().build(&online_vs, config.learning_rate)?;

        Ok(Self {
            online_vs,
            online,
            target,
            optimizer,
            config,
            device,
        })
    }

    pub fn config(&self) -> &GcnConfig {
        &self.config
    }

    pub fn device(&self) -> Device {
        self.device
    }

    fn inputs(
        &self,
        graph: &TaskGraph,
        features: &NodeFeatures,
    ) -> Result<(Tensor, Tensor), AgentError> {
        let n = graph.node_count();
        if features.num_nodes() != n {
            return Err(AgentError::Shape(format!(
                "{} feature rows for a graph with {} nodes",
                features.num_nodes(),
                n
            )));
        }
        if features.width() != self.config.features {
            return Err(AgentError::Shape(format!(
                "feature width {} does not match network input width {}",
                features.width(),
                self.config.features
            )));
        }
        let adj = normalized_adjacency(graph, self.device);
        let x = Tensor::from_slice(features.as_flat())
            .reshape([n as i64, features.width() as i64])
            .to_device(self.device);
        Ok((adj, x))
    }

    fn loss(&self, estimate: &Tensor, target: &Tensor) -> Tensor {
        match self.config.loss {
            TdLoss::Mse => estimate.mse_loss(target, Reduction::Mean),
            TdLoss::Huber => estimate.smooth_l1_loss(target, Reduction::Mean, 1.0),
            TdLoss::CrossEntropy => {
                let log_probs = estimate.reshape([1]).log_softmax(-1, Kind::Float);
                -(target.reshape([1]) * log_probs).sum(Kind::Float)
            }
        }
    }
}

fn to_vec(t: &Tensor) -> Result<Vec<f64>, AgentError> {
    Ok(Vec::<f64>::try_from(t.to_kind(Kind::Double))?)
}

fn restore(
    vs: &nn::VarStore,
    prefix: &str,
    entries: &mut HashMap<String, Tensor>,
) -> Result<(), AgentError> {
    tch::no_grad(|| -> Result<(), AgentError> {
        for (name, mut var) in vs.variables() {
            let key = format!("{}.{}", prefix, name);
            let value = entries
                .remove(&key)
                .ok_or_else(|| AgentError::Checkpoint(format!("missing tensor `{}`", key)))?;
            var.f_copy_(&value)?;
        }
        Ok(())
    })
}

impl QNetwork for GcnQNetwork {
    type Estimate = Tensor;

    fn evaluate(
        &self,
        graph: &TaskGraph,
        features: &NodeFeatures,
        role: NetworkRole,
    ) -> Result<Vec<f64>, AgentError> {
        let (adj, x) = self.inputs(graph, features)?;
        let q = match role {
            NetworkRole::Online => tch::no_grad(|| self.online.forward(&adj, &x)),
            NetworkRole::Target => self.target.forward(&adj, &x),
        };
        to_vec(&q)
    }

    fn estimate(
        &self,
        graph: &TaskGraph,
        features: &NodeFeatures,
        node: usize,
    ) -> Result<Tensor, AgentError> {
        let num_nodes = graph.node_count();
        if node >= num_nodes {
            return Err(AgentError::NodeOutOfRange { node, num_nodes });
        }
        let (adj, x) = self.inputs(graph, features)?;
        Ok(self.online.forward(&adj, &x).get(node as i64))
    }

    fn estimate_value(&self, estimate: &Tensor) -> f64 {
        estimate.double_value(&[])
    }

    fn update(&mut self, estimate: Tensor, target: f64) -> Result<f64, AgentError> {
        let target = estimate.full_like(target).detach();
        let loss = self.loss(&estimate, &target);
        self.optimizer.zero_grad();
        loss.backward();
        self.optimizer.step();
        Ok(loss.double_value(&[]))
    }

    fn sync(&mut self) -> Result<(), AgentError> {
        self.target.load_from(&self.online_vs)
    }

    fn save_checkpoint(&self, path: &Path, exploration_rate: f64) -> Result<(), AgentError> {
        let mut named: Vec<(String, Tensor)> = Vec::new();
        for (prefix, vs) in [("online", &self.online_vs), ("target", &self.target.vs)] {
            for (name, var) in vs.variables() {
                named.push((format!("{}.{}", prefix, name), var));
            }
        }
        named.push((
            EXPLORATION_RATE_KEY.to_string(),
            Tensor::from_slice(&[exploration_rate]),
        ));
        Tensor::save_multi(&named, path)?;
        Ok(())
    }

    fn load_checkpoint(&mut self, path: &Path) -> Result<f64, AgentError> {
        let mut entries: HashMap<String, Tensor> =
            Tensor::load_multi_with_device(path, self.device)?
                .into_iter()
                .collect();
        let rate = entries
            .remove(EXPLORATION_RATE_KEY)
            .ok_or_else(|| AgentError::Checkpoint("missing exploration rate".to_string()))?
            .double_value(&[0]);
        restore(&self.online_vs, "online", &mut entries)?;
        restore(&self.target.vs, "target", &mut entries)?;
        Ok(rate)
    }
}
