//! Conditions and the guard handle that links store.
//!
//! A condition is a predicate over the host context and the sibling states
//! of the sequence resolving links. It must not mutate the graph.

use super::context::Probe;
use super::status::Status;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Predicate evaluated by a transition.
///
/// Implementations that wrap game queries must be idempotent within a tick:
/// the same condition can be evaluated once per candidate link per tick.
pub trait Condition<C = ()>: Send + Sync {
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn evaluate(&self, probe: &Probe<'_, C>) -> Status;
}

/// Unique identity of a guard. Clones of a guard share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConditionId(Uuid);

impl ConditionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConditionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Shareable handle to a condition.
///
/// The graph stores guards rather than bare conditions so one predicate can
/// sit on several links while keeping a single identity.
///
/// # Example
///
/// ```rust
/// use behavior_graph::core::{Guard, Probe, Status};
/// use std::time::Duration;
///
/// let low_health = Guard::from_fn("low_health", |probe: &Probe<'_, u32>| *probe.host() < 25);
/// let healthy = !low_health.clone();
///
/// let probe = Probe::new(&10, Duration::ZERO);
/// assert_eq!(low_health.evaluate(&probe), Status::Succeeded);
/// assert_eq!(healthy.evaluate(&probe), Status::Failure);
/// ```
pub struct Guard<C = ()> {
    id: ConditionId,
    name: Arc<str>,
    condition: Arc<dyn Condition<C>>,
    faulted: Arc<AtomicBool>,
}

impl<C: 'static> Guard<C> {
    /// Wrap a condition under a fresh identity.
    pub fn new<K>(condition: K) -> Self
    where
        K: Condition<C> + 'static,
    {
        let name: Arc<str> = Arc::from(condition.name());
        Self {
            id: ConditionId::new(),
            name,
            condition: Arc::new(condition),
            faulted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Guard from a boolean closure.
    pub fn from_fn<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Probe<'_, C>) -> bool + Send + Sync + 'static,
    {
        Self::new(FnCondition {
            name: name.into(),
            predicate,
        })
    }

    /// Guard that always succeeds.
    pub fn always() -> Self {
        Self::from_fn("always", |_| true)
    }

    /// Guard that never succeeds.
    pub fn never() -> Self {
        Self::from_fn("never", |_| false)
    }

    /// OR over `guards`, left to right with short-circuit.
    pub fn any(guards: Vec<Guard<C>>) -> Self {
        Self::new(super::combinators::Selector::new(guards))
    }

    /// AND over `guards`, left to right with short-circuit.
    pub fn all(guards: Vec<Guard<C>>) -> Self {
        Self::new(super::combinators::Sequencer::new(guards))
    }
}

impl<C> Guard<C> {
    pub fn id(&self) -> ConditionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the display name. Identity is unchanged.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Arc::from(name.into());
        self
    }

    /// Evaluate the wrapped condition.
    ///
    /// A panicking condition counts as `Failure` for this evaluation; the
    /// first fault is logged.
    pub fn evaluate(&self, probe: &Probe<'_, C>) -> Status {
        match panic::catch_unwind(AssertUnwindSafe(|| self.condition.evaluate(probe))) {
            Ok(status) => status,
            Err(payload) => {
                if !self.faulted.swap(true, Ordering::Relaxed) {
                    tracing::error!(
                        condition = %self.name,
                        condition_id = %self.id,
                        reason = %crate::graph::panic_message(&payload),
                        "Condition panicked; treating as failure"
                    );
                }
                Status::Failure
            }
        }
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            condition: Arc::clone(&self.condition),
            faulted: Arc::clone(&self.faulted),
        }
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl<C: 'static> std::ops::Not for Guard<C> {
    type Output = Guard<C>;

    fn not(self) -> Self::Output {
        Guard::new(super::combinators::Inverter::new(self))
    }
}

/// Condition backed by a boolean closure.
pub struct FnCondition<F> {
    name: String,
    predicate: F,
}

impl<C, F> Condition<C> for FnCondition<F>
where
    F: Fn(&Probe<'_, C>) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, probe: &Probe<'_, C>) -> Status {
        Status::from((self.predicate)(probe))
    }
}
