//! History of fired transitions.
//!
//! Each sequence keeps a bounded log of the links it executed, for
//! inspection tooling and tests. Records carry display names rather than
//! keys so they stay readable after the graph changes.

use crate::graph::{TransitionId, TransitionKind};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of records a sequence keeps.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Record of a single change of running child.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Child that was running before, if any
    pub from: Option<String>,
    /// Child that became running
    pub to: String,
    /// How the change happened
    pub kind: TransitionKind,
    /// Transition that fired; `None` for sequence start
    pub transition: Option<TransitionId>,
    /// Display name of the condition that succeeded
    pub condition: Option<String>,
    /// Clock time of the change
    pub at: Duration,
}

/// Ordered, bounded history of running-child changes.
///
/// When full, the oldest record is dropped.
///
/// # Example
///
/// ```rust
/// use behavior_graph::core::{StateHistory, StateTransition};
/// use behavior_graph::graph::TransitionKind;
/// use std::time::Duration;
///
/// let mut history = StateHistory::with_limit(8);
/// history.record(StateTransition {
///     from: Some("Idle".into()),
///     to: "Patrol".into(),
///     kind: TransitionKind::Local,
///     transition: None,
///     condition: Some("always".into()),
///     at: Duration::from_secs(1),
/// });
///
/// assert_eq!(history.get_path(), vec!["Idle", "Patrol"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    limit: usize,
    transitions: VecDeque<StateTransition>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl StateHistory {
    /// A limit of zero disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            transitions: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the limit, dropping the oldest records that no longer fit.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        while self.transitions.len() > limit {
            self.transitions.pop_front();
        }
    }

    pub fn record(&mut self, transition: StateTransition) {
        if self.limit == 0 {
            return;
        }
        if self.transitions.len() == self.limit {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Names of the children traversed: the first record's origin (when it
    /// had one), then the destination of every record.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(from) = self.transitions.front().and_then(|t| t.from.as_deref()) {
            path.push(from);
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Clock time between the first and last recorded change.
    pub fn duration(&self) -> Option<Duration> {
        match (self.transitions.front(), self.transitions.back()) {
            (Some(first), Some(last)) => Some(last.at.saturating_sub(first.at)),
            _ => None,
        }
    }

    pub fn transitions(&self) -> impl ExactSizeIterator<Item = &StateTransition> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
