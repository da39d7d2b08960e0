use thiserror::Error;

/// Errors raised by the agent, its networks and the metric logger.
///
/// Running out of experience (too few transitions, no legal action) is not
/// an error: those paths return `None` instead.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Node {node} is out of range for a graph with {num_nodes} nodes")]
    NodeOutOfRange { node: usize, num_nodes: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid checkpoint: {0}")]
    Checkpoint(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to draw plot: {0}")]
    Plot(String),
}

#[cfg(feature = "gnn")]
impl From<tch::TchError> for AgentError {
    fn from(e: tch::TchError) -> Self {
        AgentError::Network(e.to_string())
    }
}
