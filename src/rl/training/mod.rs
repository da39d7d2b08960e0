//! Training infrastructure for the DQN agent.
//!
//! Provides the experience replay buffer and the episode loop driver.

pub mod buffer;
pub mod trainer;

pub use buffer::ReplayBuffer;
pub use trainer::Trainer;
