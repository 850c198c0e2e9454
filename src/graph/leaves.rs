//! Ready-made leaf states.

use super::transition::TransitionInfo;
use crate::core::{Capabilities, Frame, Probe, State, Status};
use std::time::Duration;

/// Completes once `duration` has passed since it was entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delay {
    duration: Duration,
    entered_at: Option<Duration>,
}

impl Delay {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            entered_at: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left at `now`; the full duration when not entered.
    pub fn remaining(&self, now: Duration) -> Duration {
        match self.entered_at {
            Some(at) => (at + self.duration).saturating_sub(now),
            None => self.duration,
        }
    }
}

impl<C> State<C> for Delay {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ENDABLE
    }

    fn enter(&mut self, cx: &mut Frame<'_, C>, _via: Option<&TransitionInfo>) {
        self.entered_at = Some(cx.now());
    }

    fn exit(&mut self, _cx: &mut Frame<'_, C>) {
        self.entered_at = None;
    }

    fn end_condition(&self, probe: &Probe<'_, C>) -> Status {
        match self.entered_at {
            Some(_) if self.remaining(probe.now()).is_zero() => Status::Succeeded,
            Some(_) => Status::Running,
            None => Status::Failure,
        }
    }
}

/// Completes immediately. Useful as a pass-through step or as the target of
/// a forced entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Forced;

impl<C> State<C> for Forced {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ENDABLE
    }

    fn end_condition(&self, _probe: &Probe<'_, C>) -> Status {
        Status::Succeeded
    }
}
