//! Deep Q-learning agent over dependency graphs.
//!
//! The agent, replay buffer, metric logger and training driver are always
//! available. The libtorch graph convolution network additionally requires
//! the `gnn` feature flag; without it the pure-Rust
//! [`TabularQNetwork`](network::TabularQNetwork) can stand in.

pub mod agent;
pub mod config;
pub mod environment;
pub mod metrics;
pub mod network;
pub mod plot;
pub mod training;

pub use agent::{Agent, LearnStats, NO_ACTION};
pub use config::AgentConfig;
pub use environment::{Environment, StepOutcome};
pub use metrics::{MetricLogger, RecordSummary};
pub use network::{NetworkRole, QNetwork, TabularQNetwork, TdLoss};
pub use training::{ReplayBuffer, Trainer};

#[cfg(feature = "gnn")]
pub use network::{GcnConfig, GcnQNetwork};
