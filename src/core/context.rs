//! Per-call contexts handed to states and conditions.

use crate::graph::{StateKey, StateNode};
use std::time::Duration;

/// Mutable context for lifecycle and tick dispatch.
///
/// Carries the host object (the opaque game-side handle the machine owns)
/// and the time of the current operation.
pub struct Frame<'a, C> {
    host: &'a mut C,
    now: Duration,
}

impl<'a, C> Frame<'a, C> {
    pub fn new(host: &'a mut C, now: Duration) -> Self {
        Self { host, now }
    }

    pub fn host(&self) -> &C {
        &*self.host
    }

    pub fn host_mut(&mut self) -> &mut C {
        &mut *self.host
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Read-only view without sibling access.
    pub fn probe(&self) -> Probe<'_, C> {
        Probe::new(&*self.host, self.now)
    }

    pub(crate) fn probe_with<'s>(&'s self, states: &'s [Option<StateNode<C>>]) -> Probe<'s, C> {
        Probe::with_states(&*self.host, self.now, states)
    }
}

/// Read-only context for condition evaluation and end checks.
///
/// Inside a sequence the probe also exposes the sequence's children, so a
/// condition can ask about a sibling by its [`StateKey`].
pub struct Probe<'a, C> {
    host: &'a C,
    now: Duration,
    states: &'a [Option<StateNode<C>>],
}

impl<'a, C> Probe<'a, C> {
    pub fn new(host: &'a C, now: Duration) -> Self {
        Self {
            host,
            now,
            states: &[],
        }
    }

    pub(crate) fn with_states(host: &'a C, now: Duration, states: &'a [Option<StateNode<C>>]) -> Self {
        Self { host, now, states }
    }

    pub fn host(&self) -> &'a C {
        self.host
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Look up a sibling of the sequence currently resolving links.
    pub fn state(&self, key: StateKey) -> Option<&'a StateNode<C>> {
        self.states.get(key.index()).and_then(Option::as_ref)
    }

    /// Same probe with the sibling view dropped.
    pub fn detached(&self) -> Probe<'a, C> {
        Probe::new(self.host, self.now)
    }
}

impl<C> Clone for Probe<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Probe<'_, C> {}
