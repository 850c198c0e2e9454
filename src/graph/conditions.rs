//! Conditions that read sibling states through the probe.

use super::node::StateKey;
use crate::core::{Condition, Probe, Status};
use std::time::Duration;

/// Succeeds while `state` is idle and has not run for at least `duration`.
///
/// A sibling that never ran passes. An unknown key fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PastCooldown {
    pub state: StateKey,
    pub duration: Duration,
}

impl PastCooldown {
    pub fn new(state: StateKey, duration: Duration) -> Self {
        Self { state, duration }
    }
}

impl<C: 'static> Condition<C> for PastCooldown {
    fn evaluate(&self, probe: &Probe<'_, C>) -> Status {
        probe
            .state(self.state)
            .map_or(Status::Failure, |node| Status::from(node.check_cd(self.duration, probe.now())))
    }
}

/// Mirrors the end condition of a sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEnded {
    pub state: StateKey,
}

impl StateEnded {
    pub fn new(state: StateKey) -> Self {
        Self { state }
    }
}

impl<C: 'static> Condition<C> for StateEnded {
    fn evaluate(&self, probe: &Probe<'_, C>) -> Status {
        probe
            .state(self.state)
            .map_or(Status::Failure, |node| node.end_condition(&probe.detached()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Frame, Guard};
    use crate::graph::{Delay, LinkOptions, Sequence};

    struct Clockless;

    impl crate::core::State for Clockless {}

    fn tick(seq: &mut Sequence, now: Duration) {
        let mut host = ();
        seq.late_update_tree(&mut Frame::new(&mut host, now));
    }

    #[test]
    fn past_cooldown_gates_on_sibling_exit() {
        let mut seq: Sequence = Sequence::new("Combat");
        let idle = seq.add_state(Clockless);
        let dash = seq.add_state(Clockless);
        seq.link_local(idle, dash, Guard::new(PastCooldown::new(dash, Duration::from_secs(2))), LinkOptions::default())
            .unwrap();
        seq.link_local(dash, idle, Guard::always(), LinkOptions::default()).unwrap();

        let mut host = ();
        seq.start(&mut Frame::new(&mut host, Duration::ZERO));
        tick(&mut seq, Duration::from_secs(1));
        assert_eq!(seq.running(), Some(dash));
        tick(&mut seq, Duration::from_secs(2));
        assert_eq!(seq.running(), Some(idle));

        tick(&mut seq, Duration::from_secs(3));
        assert_eq!(seq.running(), Some(idle));
        tick(&mut seq, Duration::from_secs(4));
        assert_eq!(seq.running(), Some(dash));
    }

    #[test]
    fn state_ended_reads_sibling_completion() {
        let mut seq: Sequence = Sequence::new("Watch");
        let timer = seq.add_state(Delay::new(Duration::from_secs(1)));
        let next = seq.add_state(Clockless);
        seq.link_local(timer, next, Guard::new(StateEnded::new(timer)), LinkOptions::default())
            .unwrap();

        let mut host = ();
        seq.start(&mut Frame::new(&mut host, Duration::ZERO));
        tick(&mut seq, Duration::from_millis(500));
        assert_eq!(seq.running(), Some(timer));
        tick(&mut seq, Duration::from_secs(1));
        assert_eq!(seq.running(), Some(next));
    }

    #[test]
    fn unknown_sibling_fails() {
        let probe = Probe::new(&(), Duration::ZERO);
        assert_eq!(Condition::<()>::evaluate(&StateEnded::new(StateKey::new(3)), &probe), Status::Failure);
        assert_eq!(
            Condition::<()>::evaluate(&PastCooldown::new(StateKey::new(3), Duration::ZERO), &probe),
            Status::Failure
        );
    }
}
