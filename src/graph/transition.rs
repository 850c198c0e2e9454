//! Transitions: conditioned, rate-limited, cooldown-gated edges.

use super::node::StateKey;
use crate::core::{ConditionId, Guard, Probe, Status};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identity of a transition within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionId(Uuid);

impl TransitionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which table a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    /// From one specific origin to a destination, when the condition holds.
    Local,
    /// From any other running child to a destination, when the condition
    /// holds. Evaluated first.
    Global,
    /// From an endable origin once it reports completion. Also used for
    /// forced entries and sequence starts.
    End,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Local => "local",
            Self::Global => "global",
            Self::End => "end",
        };
        f.write_str(label)
    }
}

/// How many times a transition may fire before it removes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionPolicy {
    #[default]
    Infinite,
    Custom(u32),
}

/// When the cooldown clock of a transition starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CooldownAnchor {
    /// As soon as the transition fires.
    OnEnterDestination,
    /// When the destination it entered exits again.
    #[default]
    OnExitDestination,
}

/// Minimum time between firings of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cooldown {
    pub duration: Duration,
    pub anchor: CooldownAnchor,
}

impl Cooldown {
    pub fn new(duration: Duration, anchor: CooldownAnchor) -> Self {
        Self { duration, anchor }
    }

    pub fn is_zero(&self) -> bool {
        self.duration.is_zero()
    }
}

/// Execution and cooldown policy for a new link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkOptions {
    pub policy: ExecutionPolicy,
    pub cooldown: Cooldown,
}

impl LinkOptions {
    /// Fire at most `max` times.
    pub fn times(mut self, max: u32) -> Self {
        self.policy = ExecutionPolicy::Custom(max);
        self
    }

    /// Fire at most once.
    pub fn once(self) -> Self {
        self.times(1)
    }

    pub fn cooldown(mut self, duration: Duration, anchor: CooldownAnchor) -> Self {
        self.cooldown = Cooldown::new(duration, anchor);
        self
    }
}

/// What a state receives when it is entered through a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionInfo {
    pub id: TransitionId,
    pub kind: TransitionKind,
    /// Running child at the moment the transition fired
    pub origin: Option<StateKey>,
    pub destination: StateKey,
    pub condition: Option<ConditionId>,
    pub condition_name: Option<String>,
    pub cooldown: Cooldown,
}

impl TransitionInfo {
    /// Unconditioned entry used by forced enters.
    pub(crate) fn forced(origin: Option<StateKey>, destination: StateKey) -> Self {
        Self {
            id: TransitionId::new(),
            kind: TransitionKind::End,
            origin,
            destination,
            condition: None,
            condition_name: None,
            cooldown: Cooldown::default(),
        }
    }

    /// Whether entering through this transition leaves a cooldown to stamp
    /// when the destination exits.
    pub(crate) fn defers_cooldown(&self) -> bool {
        !self.cooldown.is_zero() && self.cooldown.anchor == CooldownAnchor::OnExitDestination
    }
}

/// A link owned by exactly one sequence.
pub struct Transition<C = ()> {
    id: TransitionId,
    kind: TransitionKind,
    guard: Option<Guard<C>>,
    origin: Option<StateKey>,
    destination: StateKey,
    last_origin: Option<StateKey>,
    policy: ExecutionPolicy,
    executed: u32,
    cooldown: Cooldown,
    cooldown_set_at: Option<Duration>,
}

impl<C> Transition<C> {
    pub(crate) fn new(
        kind: TransitionKind,
        guard: Option<Guard<C>>,
        origin: Option<StateKey>,
        destination: StateKey,
        options: LinkOptions,
    ) -> Self {
        Self {
            id: TransitionId::new(),
            kind,
            guard,
            origin,
            destination,
            last_origin: None,
            policy: options.policy,
            executed: 0,
            cooldown: options.cooldown,
            cooldown_set_at: None,
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// `None` only for end links.
    pub fn guard(&self) -> Option<&Guard<C>> {
        self.guard.as_ref()
    }

    pub fn condition_id(&self) -> Option<ConditionId> {
        self.guard.as_ref().map(Guard::id)
    }

    /// Declared origin; `None` only for global links.
    pub fn origin(&self) -> Option<StateKey> {
        self.origin
    }

    pub fn destination(&self) -> StateKey {
        self.destination
    }

    /// Running child the last time this transition fired.
    pub fn last_origin(&self) -> Option<StateKey> {
        self.last_origin
    }

    pub fn policy(&self) -> ExecutionPolicy {
        self.policy
    }

    pub fn executed(&self) -> u32 {
        self.executed
    }

    pub fn cooldown(&self) -> Cooldown {
        self.cooldown
    }

    pub fn cooldown_set_at(&self) -> Option<Duration> {
        self.cooldown_set_at
    }

    /// True when no cooldown was ever stamped, or enough time has passed
    /// since the stamp.
    pub fn check_cooldown(&self, now: Duration) -> bool {
        match self.cooldown_set_at {
            None => true,
            Some(set_at) => now.saturating_sub(set_at) >= self.cooldown.duration,
        }
    }

    /// Time left before the cooldown check passes.
    pub fn remaining_cooldown(&self, now: Duration) -> Duration {
        match self.cooldown_set_at {
            None => Duration::ZERO,
            Some(set_at) => (set_at + self.cooldown.duration).saturating_sub(now),
        }
    }

    pub fn set_cooldown_time(&mut self, now: Duration) {
        self.cooldown_set_at = Some(now);
    }

    /// Condition succeeded and the cooldown allows firing.
    pub(crate) fn is_satisfied(&self, probe: &Probe<'_, C>) -> bool {
        let Some(guard) = &self.guard else {
            return false;
        };
        guard.evaluate(probe) == Status::Succeeded && self.check_cooldown(probe.now())
    }

    pub(crate) fn mark_fired(&mut self, origin: StateKey) {
        self.last_origin = Some(origin);
    }

    /// Count one firing. Returns `true` once a `Custom` budget is spent.
    pub(crate) fn record_execution(&mut self) -> bool {
        self.executed = self.executed.saturating_add(1);
        match self.policy {
            ExecutionPolicy::Infinite => false,
            ExecutionPolicy::Custom(max) => self.executed >= max,
        }
    }

    pub fn info(&self) -> TransitionInfo {
        TransitionInfo {
            id: self.id,
            kind: self.kind,
            origin: self.last_origin.or(self.origin),
            destination: self.destination,
            condition: self.condition_id(),
            condition_name: self.guard.as_ref().map(|g| g.name().to_string()),
            cooldown: self.cooldown,
        }
    }
}

impl<C> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("guard", &self.guard)
            .field("origin", &self.origin)
            .field("destination", &self.destination)
            .field("policy", &self.policy)
            .field("executed", &self.executed)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}
