//! Hyperparameters for the DQN agent.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Configuration for the [`Agent`](super::Agent).
///
/// Interval fields are counted in environment steps (calls to `act`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentConfig {
    // --- Exploration ---
    /// Initial probability of picking a random legal action.
    pub exploration_rate: f64,
    /// Multiplicative decay applied after every `act` call.
    pub exploration_rate_decay: f64,
    /// Floor for the exploration rate.
    pub exploration_rate_min: f64,

    // --- Replay ---
    /// Maximum number of stored transitions.
    pub memory_capacity: usize,
    /// Transitions sampled per learning step.
    pub batch_size: usize,

    // --- Learning ---
    /// Discount factor γ.
    pub gamma: f64,
    /// Minimum steps before any learning happens.
    pub burnin: u64,
    /// Steps between updates of the online network.
    pub learn_every: u64,
    /// Steps between target syncs.
    pub sync_every: u64,

    // --- Checkpointing ---
    /// Steps between checkpoints.
    pub save_every: u64,
    /// Directory receiving checkpoint files.
    pub save_dir: PathBuf,
    /// Checkpoint file stem; files are named `{prefix}_{n}.chkpt`.
    pub checkpoint_prefix: String,
}

impl AgentConfig {
    /// Checks every field, failing on the first invalid one.
    pub fn validate(&self) -> Result<(), AgentError> {
        fn unit_interval(name: &str, v: f64) -> Result<(), AgentError> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(AgentError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, v
                )))
            }
        }

        unit_interval("exploration_rate", self.exploration_rate)?;
        unit_interval("exploration_rate_min", self.exploration_rate_min)?;
        unit_interval("gamma", self.gamma)?;
        if !(self.exploration_rate_decay > 0.0 && self.exploration_rate_decay <= 1.0) {
            return Err(AgentError::Config(format!(
                "exploration_rate_decay must be within (0, 1], got {}",
                self.exploration_rate_decay
            )));
        }
        if self.exploration_rate_min > self.exploration_rate {
            return Err(AgentError::Config(format!(
                "exploration_rate_min ({}) exceeds exploration_rate ({})",
                self.exploration_rate_min, self.exploration_rate
            )));
        }

        for (name, value) in [
            ("memory_capacity", self.memory_capacity as u64),
            ("batch_size", self.batch_size as u64),
            ("learn_every", self.learn_every),
            ("sync_every", self.sync_every),
            ("save_every", self.save_every),
        ] {
            if value == 0 {
                return Err(AgentError::Config(format!("{} must be positive", name)));
            }
        }
        if self.batch_size > self.memory_capacity {
            return Err(AgentError::Config(format!(
                "batch_size ({}) exceeds memory_capacity ({})",
                self.batch_size, self.memory_capacity
            )));
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            exploration_rate: 1.0,
            exploration_rate_decay: 0.99999975,
            exploration_rate_min: 0.1,
            memory_capacity: 100_000,
            batch_size: 32,
            gamma: 0.9,
            burnin: 1_000,
            learn_every: 3,
            sync_every: 1_000,
            save_every: 1_000,
            save_dir: PathBuf::from("."),
            checkpoint_prefix: "sched_net".to_string(),
        }
    }
}
