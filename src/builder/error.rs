//! Build errors for sequence and machine builders.

use crate::graph::GraphError;
use thiserror::Error;

/// Errors that can occur when building sequences and machines.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("{sequence}: state name '{name}' is declared twice")]
    DuplicateStateName { sequence: String, name: String },

    #[error("{sequence}: no state named '{name}'")]
    UnknownStateName { sequence: String, name: String },

    #[error("Root sequence not specified. Call .root(sequence) before .build()")]
    MissingRoot,

    #[error("Host context not specified. Call .host(context) before .build()")]
    MissingHost,

    #[error(transparent)]
    Graph(#[from] GraphError),
}
