//! Machine error types.

use crate::graph::GraphError;
use thiserror::Error;

/// Errors raised by the machine driver.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    /// Init-time validation found problems. Every problem in the tree is
    /// listed, not just the first.
    #[error("Graph validation failed with {} error(s)", .errors.len())]
    InvalidGraph { errors: Vec<GraphError> },

    /// Machine configuration is unusable
    #[error("Invalid machine configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
