//! Run two branches under one lifecycle.

use super::node::StateNode;
use super::sequence::Sequence;
use super::transition::TransitionInfo;
use crate::core::{Capabilities, Frame, Probe, State, Status};
use std::fmt;

/// Runs a `main` and a `parallel` branch side by side.
///
/// Both branches are entered, ticked and exited together, `main` first
/// every time. Completion follows `main` only: the parallel branch is
/// simply exited when the owner moves on.
///
/// # Example
///
/// ```rust
/// use behavior_graph::core::{Frame, Probe, State, Status};
/// use behavior_graph::graph::{Forced, Parallel, Sequence};
/// use std::time::Duration;
///
/// let mut attack: Sequence = Sequence::new("Attack");
/// attack.add_state(Forced);
/// let mut taunt: Sequence = Sequence::new("Taunt");
/// taunt.add_state(Forced);
///
/// let mut both = Parallel::new(attack, taunt);
/// let mut host = ();
/// let mut cx = Frame::new(&mut host, Duration::ZERO);
/// both.enter(&mut cx, None);
/// both.late_update(&mut cx);
///
/// assert_eq!(both.end_condition(&cx.probe()), Status::Succeeded);
/// ```
pub struct Parallel<C = ()> {
    name: String,
    main: StateNode<C>,
    parallel: StateNode<C>,
}

impl<C: 'static> Parallel<C> {
    pub fn new<M, P>(main: M, parallel: P) -> Self
    where
        M: State<C>,
        P: State<C>,
    {
        Self::from_nodes(StateNode::new(main), StateNode::new(parallel))
    }

    pub fn from_nodes(main: StateNode<C>, parallel: StateNode<C>) -> Self {
        Self {
            name: format!("{} + {}", main.name(), parallel.name()),
            main,
            parallel,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn main(&self) -> &StateNode<C> {
        &self.main
    }

    pub fn main_mut(&mut self) -> &mut StateNode<C> {
        &mut self.main
    }

    pub fn parallel(&self) -> &StateNode<C> {
        &self.parallel
    }

    pub fn parallel_mut(&mut self) -> &mut StateNode<C> {
        &mut self.parallel
    }

    /// Main branch as a sequence, when it is one.
    pub fn main_sequence(&self) -> Option<&Sequence<C>> {
        self.main.state().as_sequence()
    }

    pub fn parallel_sequence(&self) -> Option<&Sequence<C>> {
        self.parallel.state().as_sequence()
    }
}

impl<C: 'static> fmt::Debug for Parallel<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parallel")
            .field("name", &self.name)
            .field("main", &self.main)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl<C: 'static> State<C> for Parallel<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn init(&mut self, host: &mut C) {
        self.main.init(host);
        self.parallel.init(host);
    }

    /// The transition is only handed to `main`.
    fn enter(&mut self, cx: &mut Frame<'_, C>, via: Option<&TransitionInfo>) {
        self.main.enter(cx, via);
        self.parallel.enter(cx, None);
    }

    fn exit(&mut self, cx: &mut Frame<'_, C>) {
        // Deferred cooldowns belong to the owning sequence's node, not ours.
        let _ = self.main.exit(cx);
        let _ = self.parallel.exit(cx);
    }

    fn update(&mut self, cx: &mut Frame<'_, C>) {
        self.main.update(cx);
        self.parallel.update(cx);
    }

    fn fixed_update(&mut self, cx: &mut Frame<'_, C>) {
        self.main.fixed_update(cx);
        self.parallel.fixed_update(cx);
    }

    fn late_update(&mut self, cx: &mut Frame<'_, C>) {
        self.main.late_update(cx);
        self.parallel.late_update(cx);
    }

    fn end_condition(&self, probe: &Probe<'_, C>) -> Status {
        self.main.end_condition(&probe.detached())
    }

    fn pause(&mut self) {
        self.main.pause();
        self.parallel.pause();
    }

    fn unpause(&mut self) {
        self.main.unpause();
        self.parallel.unpause();
    }

    fn children(&self) -> Vec<&StateNode<C>> {
        vec![&self.main, &self.parallel]
    }

    fn children_mut(&mut self) -> Vec<&mut StateNode<C>> {
        vec![&mut self.main, &mut self.parallel]
    }

    fn as_parallel(&self) -> Option<&Parallel<C>> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Guard;
    use crate::graph::{Forced, LinkOptions};
    use std::time::Duration;

    struct Branch {
        label: &'static str,
        status: Status,
    }

    impl State<Vec<String>> for Branch {
        fn name(&self) -> &str {
            self.label
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::UPDATE | Capabilities::ENDABLE
        }

        fn enter(&mut self, cx: &mut Frame<'_, Vec<String>>, via: Option<&TransitionInfo>) {
            cx.host_mut().push(format!("enter {} via={}", self.label, via.is_some()));
        }

        fn exit(&mut self, cx: &mut Frame<'_, Vec<String>>) {
            cx.host_mut().push(format!("exit {}", self.label));
        }

        fn update(&mut self, cx: &mut Frame<'_, Vec<String>>) {
            cx.host_mut().push(format!("update {}", self.label));
        }

        fn end_condition(&self, _probe: &Probe<'_, Vec<String>>) -> Status {
            self.status
        }
    }

    fn branch(label: &'static str, status: Status) -> Branch {
        Branch { label, status }
    }

    #[test]
    fn lifecycle_runs_main_first() {
        let mut both = Parallel::new(branch("main", Status::Running), branch("side", Status::Running));
        let via = TransitionInfo::forced(None, crate::graph::StateKey::new(0));
        let mut log = Vec::new();
        let mut cx = Frame::new(&mut log, Duration::ZERO);

        both.enter(&mut cx, Some(&via));
        both.update(&mut cx);
        both.exit(&mut cx);

        assert_eq!(
            log,
            vec![
                "enter main via=true",
                "enter side via=false",
                "update main",
                "update side",
                "exit main",
                "exit side"
            ]
        );
    }

    #[test]
    fn completion_follows_main_only() {
        let probe_host = Vec::new();
        let probe = Probe::new(&probe_host, Duration::ZERO);

        let done = Parallel::new(branch("main", Status::Succeeded), branch("side", Status::Failure));
        assert_eq!(done.end_condition(&probe), Status::Succeeded);

        let pending = Parallel::new(branch("main", Status::Running), branch("side", Status::Succeeded));
        assert_eq!(pending.end_condition(&probe), Status::Running);
    }

    #[test]
    fn name_joins_branches() {
        let both: Parallel<Vec<String>> = Parallel::new(branch("a", Status::Failure), branch("b", Status::Failure));
        assert_eq!(both.name(), "a + b");
        assert_eq!(both.named("Combo").name(), "Combo");
    }

    #[test]
    fn end_link_leaves_parallel_when_main_completes() {
        let mut main: Sequence = Sequence::new("Main");
        main.add_state(Forced);
        let side: Sequence = Sequence::new("Side");

        let mut root: Sequence = Sequence::new("Root");
        let both = root.add_state(Parallel::new(main, side));
        let after = root.add_state(Forced);
        root.link_end(both, after, LinkOptions::default()).unwrap();
        root.link_global(after, Guard::never(), LinkOptions::default()).unwrap();

        let mut host = ();
        root.start(&mut Frame::new(&mut host, Duration::ZERO));
        assert!(root.find::<Parallel>().and_then(Parallel::main_sequence).is_some_and(Sequence::is_running));

        // The main branch resolves before the root checks its end link.
        let outcome = root.late_update_tree(&mut Frame::new(&mut host, Duration::from_millis(16)));
        assert_eq!(outcome.fired.map(|t| t.origin), Some(Some(both)));
        assert_eq!(root.running(), Some(after));
    }
}
