//! Builder for link descriptors.

use crate::core::{Guard, Probe};
use crate::graph::{CooldownAnchor, GraphError, LinkOptions, Sequence, StateKey, TransitionId, TransitionKind};
use std::time::Duration;

/// Declarative link between children named by their display names.
///
/// The kind follows from the endpoints given:
///
/// | `from` | `to` | `when` | kind   |
/// |--------|------|--------|--------|
/// | yes    | yes  | yes    | Local  |
/// | no     | yes  | yes    | Global |
/// | yes    | yes  | no     | End    |
///
/// Any other combination is an `InvalidLink`.
pub struct LinkBuilder<C = ()> {
    from: Option<String>,
    to: Option<String>,
    when: Option<Guard<C>>,
    options: LinkOptions,
}

impl<C: 'static> LinkBuilder<C> {
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            when: None,
            options: LinkOptions::default(),
        }
    }

    /// Set the origin state (omit for global links).
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the destination state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Set the condition (omit for end links).
    pub fn when(mut self, guard: Guard<C>) -> Self {
        self.when = Some(guard);
        self
    }

    /// Set the condition from a boolean closure.
    pub fn when_fn<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Probe<'_, C>) -> bool + Send + Sync + 'static,
    {
        self.when(Guard::from_fn(name, predicate))
    }

    pub fn options(mut self, options: LinkOptions) -> Self {
        self.options = options;
        self
    }

    /// Fire at most `max` times.
    pub fn times(mut self, max: u32) -> Self {
        self.options = self.options.times(max);
        self
    }

    pub fn once(self) -> Self {
        self.times(1)
    }

    pub fn cooldown(mut self, duration: Duration, anchor: CooldownAnchor) -> Self {
        self.options = self.options.cooldown(duration, anchor);
        self
    }

    /// Kind implied by the endpoints and condition given so far.
    pub fn kind(&self) -> Option<TransitionKind> {
        match (&self.from, &self.to, &self.when) {
            (Some(_), Some(_), Some(_)) => Some(TransitionKind::Local),
            (None, Some(_), Some(_)) => Some(TransitionKind::Global),
            (Some(_), Some(_), None) => Some(TransitionKind::End),
            _ => None,
        }
    }

    /// Resolve names against `seq` and link through its mutation API.
    pub(crate) fn apply(self, seq: &mut Sequence<C>) -> Result<TransitionId, GraphError> {
        match (self.from, self.to, self.when) {
            (Some(from), Some(to), Some(when)) => {
                let origin = resolve(seq, &from)?;
                let destination = resolve(seq, &to)?;
                seq.link_local(origin, destination, when, self.options)
            }
            (None, Some(to), Some(when)) => {
                let destination = resolve(seq, &to)?;
                seq.link_global(destination, when, self.options)
            }
            (Some(from), Some(to), None) => {
                let origin = resolve(seq, &from)?;
                let destination = resolve(seq, &to)?;
                seq.link_end(origin, destination, self.options)
            }
            (_, to, _) => Err(GraphError::InvalidLink {
                sequence: seq.name().to_string(),
                kind: "unknown".into(),
                reason: if to.is_none() {
                    "no destination".into()
                } else {
                    "an origin or a condition is required".into()
                },
            }),
        }
    }
}

fn resolve<C: 'static>(seq: &Sequence<C>, name: &str) -> Result<StateKey, GraphError> {
    seq.key_of(name).ok_or_else(|| GraphError::UnknownState {
        sequence: seq.name().to_string(),
        state: name.to_string(),
    })
}

impl<C: 'static> Default for LinkBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
