//! Contract between the agent and a scheduling environment.
//!
//! The environment owns the graph and decides rewards and termination;
//! the agent only sees [`State`] snapshots.

use crate::types::State;

/// Result of a single environment step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// State after applying the action.
    pub next_state: State,
    pub reward: f64,
    /// Whether the episode ended with this step.
    pub done: bool,
}

/// A graph scheduling environment.
///
/// # Lifecycle
///
/// 1. Call [`Environment::reset`] to start an episode.
/// 2. Repeatedly call [`Environment::step`] with the chosen node until
///    [`StepOutcome::done`] is set.
///
/// When the agent has no legal action it passes
/// [`NO_ACTION`](super::agent::NO_ACTION); environments should treat that
/// as a no-op step.
pub trait Environment {
    /// Starts a new episode and returns its initial state.
    fn reset(&mut self) -> State;

    /// Applies `action` (a node index) and advances one step.
    fn step(&mut self, action: usize) -> StepOutcome;
}
