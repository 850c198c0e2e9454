//! Configuration errors raised while building or mutating a graph.

use thiserror::Error;

/// Errors raised synchronously by the mutation API.
///
/// Every variant names the owning sequence so a bad link can be found in the
/// authored graph without a debugger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("{sequence}: invalid {kind} link: {reason}")]
    InvalidLink {
        sequence: String,
        kind: String,
        reason: String,
    },

    #[error("{sequence}: condition '{condition}' is already linked from {origin} to '{destination}'")]
    DuplicateCondition {
        sequence: String,
        condition: String,
        origin: String,
        destination: String,
    },

    #[error("{sequence}: state '{state}' is not a child of this sequence")]
    UnknownState { sequence: String, state: String },

    #[error("{sequence}: state '{state}' is not endable and cannot own an end link")]
    NotEndable { sequence: String, state: String },

    #[error("{sequence}: no startable state configured")]
    MissingStartableState { sequence: String },

    #[error("{sequence}: index {index} out of range (len {len})")]
    IndexOutOfRange {
        sequence: String,
        index: usize,
        len: usize,
    },

    #[error("{sequence}: state '{state}' is running and cannot be removed")]
    RunningStateRemoval { sequence: String, state: String },
}

impl GraphError {
    /// Name of the sequence that raised the error.
    pub fn sequence(&self) -> &str {
        match self {
            Self::InvalidLink { sequence, .. }
            | Self::DuplicateCondition { sequence, .. }
            | Self::UnknownState { sequence, .. }
            | Self::NotEndable { sequence, .. }
            | Self::MissingStartableState { sequence }
            | Self::IndexOutOfRange { sequence, .. }
            | Self::RunningStateRemoval { sequence, .. } => sequence,
        }
    }
}
