//! Tri-state result shared by conditions and end checks.

use serde::{Deserialize, Serialize};

/// The result of evaluating a condition or a state's end check.
///
/// `Running` is a value, not a suspension: every evaluation returns to the
/// caller within the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    /// The predicate holds, or the state has finished its work.
    Succeeded,

    /// The predicate does not hold, or the state cannot report completion.
    #[default]
    Failure,

    /// The state is still working.
    Running,
}

impl Status {
    /// Returns `true` if this status is `Succeeded`.
    #[inline]
    pub fn is_succeeded(self) -> bool {
        matches!(self, Status::Succeeded)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Returns `true` if this status is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// Boolean inversion used by the `Inverter` combinator.
    ///
    /// `Succeeded` and `Failure` swap; `Running` collapses to `Failure`.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Succeeded => Status::Failure,
            Status::Failure => Status::Succeeded,
            Status::Running => Status::Failure,
        }
    }
}

impl From<bool> for Status {
    fn from(value: bool) -> Self {
        if value {
            Status::Succeeded
        } else {
            Status::Failure
        }
    }
}
