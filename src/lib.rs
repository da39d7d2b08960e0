//! graphq - Deep Q-learning over dependency graphs
//!
//! An agent that learns which schedulable item to pick next from a
//! dependency graph. Q-values are produced per node by a graph network,
//! only currently unblocked nodes ("leaves") are legal actions, and
//! training follows the online/target double-network DQN recipe with an
//! experience replay buffer.
//!
//! The libtorch-backed graph convolution network lives behind the `gnn`
//! feature flag; everything else is pure Rust.

pub mod error;
pub mod rl;
pub mod types;

pub use error::AgentError;
pub use types::{leaf_nodes, NodeFeatures, State, TaskGraph, Transition};
