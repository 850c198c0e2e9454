//! Driver owning a root sequence and the host context.
//!
//! The machine is the only place time is read. Each operation samples its
//! [`Clock`] once and lends the host context to the graph through a
//! [`Frame`]. Nothing here schedules itself: the host calls [`Machine::tick`],
//! [`Machine::run_frame`] or [`Machine::advance`] from its own loop.
//!
//! # Example
//!
//! ```rust
//! use behavior_graph::core::{Guard, ManualClock, Probe, State};
//! use behavior_graph::graph::{LinkOptions, Sequence};
//! use behavior_graph::machine::{Machine, MachineStatus};
//! use std::time::Duration;
//!
//! struct Idle;
//! impl State<u32> for Idle {}
//! struct Flee;
//! impl State<u32> for Flee {}
//!
//! let mut root: Sequence<u32> = Sequence::new("Root");
//! let _idle = root.add_state(Idle);
//! let flee = root.add_state(Flee);
//! let hurt = Guard::from_fn("hurt", |p: &Probe<'_, u32>| *p.host() < 30);
//! root.link_global(flee, hurt, LinkOptions::default()).unwrap();
//!
//! let clock = ManualClock::new();
//! let mut machine = Machine::new(root, 100u32).with_clock(clock.clone());
//! machine.init().unwrap();
//! machine.start();
//! assert_eq!(machine.status(), MachineStatus::Started);
//!
//! *machine.host_mut() = 10;
//! clock.advance(Duration::from_millis(16));
//! let outcome = machine.run_frame().unwrap();
//! assert!(outcome.fired.is_some());
//! assert_eq!(machine.root().running(), Some(flee));
//! ```

pub mod config;
pub mod error;

pub use config::{MachineConfig, UpdateMode};
pub use error::MachineError;

use crate::core::{Clock, Frame, SystemClock};
use crate::graph::{Sequence, StateKey, TickOutcome};
use crate::snapshot::Snapshot;
use crate::validation::{unreachable_states, GraphRules};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::time::Duration;
use stillwater::validation::Validation;

/// Lifecycle of a machine.
///
/// Legal moves: `None -> Inited -> Started <-> Paused -> Ended`, and
/// `dispose` back to `None` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MachineStatus {
    #[default]
    None,
    Inited,
    Started,
    Paused,
    Ended,
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Inited => "Inited",
            Self::Started => "Started",
            Self::Paused => "Paused",
            Self::Ended => "Ended",
        };
        f.write_str(name)
    }
}

/// One of the three per-frame calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickKind {
    Update,
    FixedUpdate,
    LateUpdate,
}

/// Owns the root sequence, the host context, the clock and the config.
pub struct Machine<C = ()> {
    root: Sequence<C>,
    host: C,
    status: MachineStatus,
    clock: Box<dyn Clock>,
    config: MachineConfig,
    rules: GraphRules<C>,
    last_frame_at: Option<Duration>,
}

impl<C: 'static> Machine<C> {
    /// Machine over `root` with a [`SystemClock`] and the default config.
    pub fn new(root: Sequence<C>, host: C) -> Self {
        Self {
            root,
            host,
            status: MachineStatus::None,
            clock: Box::new(SystemClock::new()),
            config: MachineConfig::default(),
            rules: GraphRules::default(),
            last_frame_at: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_boxed_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the rules checked by [`Machine::init`].
    pub fn with_rules(mut self, rules: GraphRules<C>) -> Self {
        self.rules = rules;
        self
    }

    /// Validate the graph and run every state's one-time setup.
    ///
    /// Calling it again after success is a no-op. Every validation problem
    /// in the tree is reported together.
    pub fn init(&mut self) -> Result<(), MachineError> {
        if self.status != MachineStatus::None {
            tracing::warn!(status = %self.status, "Machine already initialized");
            return Ok(());
        }

        self.config.check()?;
        if let Validation::Failure(errors) = self.rules.validate(&self.root) {
            let errors: Vec<_> = errors.iter().cloned().collect();
            tracing::error!(root = %self.root.name(), count = errors.len(), "Graph validation failed");
            return Err(MachineError::InvalidGraph { errors });
        }

        for seq in self.root.walk() {
            let unreachable = unreachable_states(seq);
            if !unreachable.is_empty() {
                let names: Vec<&str> = unreachable
                    .iter()
                    .filter_map(|key| seq.node(*key).map(|node| node.name()))
                    .collect();
                tracing::warn!(sequence = %seq.name(), states = ?names, "Unreachable states");
            }
        }

        if let Some(limit) = self.config.history_limit {
            self.root.walk_mut(&mut |seq| seq.set_history_limit(limit));
        }

        self.root.init(&mut self.host);
        self.set_status(MachineStatus::Inited);
        Ok(())
    }

    pub fn status(&self) -> MachineStatus {
        self.status
    }

    pub fn host(&self) -> &C {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut C {
        &mut self.host
    }

    pub fn root(&self) -> &Sequence<C> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Sequence<C> {
        &mut self.root
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Current time of the machine's clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn is_running(&self) -> bool {
        self.status == MachineStatus::Started
    }

    /// Enter the root's entry point. Only legal right after init.
    pub fn start(&mut self) {
        if !self.allowed("start", &[MachineStatus::Inited]) {
            return;
        }
        let now = self.clock.now();
        self.root.start(&mut Frame::new(&mut self.host, now));
        self.last_frame_at = None;
        self.set_status(MachineStatus::Started);
    }

    /// Exit the running tree. Legal while started or paused.
    pub fn stop(&mut self) {
        if !self.allowed("stop", &[MachineStatus::Started, MachineStatus::Paused]) {
            return;
        }
        self.halt();
        self.set_status(MachineStatus::Ended);
    }

    pub fn pause(&mut self) {
        if !self.allowed("pause", &[MachineStatus::Started]) {
            return;
        }
        self.root.pause();
        self.set_status(MachineStatus::Paused);
    }

    pub fn unpause(&mut self) {
        if !self.allowed("unpause", &[MachineStatus::Paused]) {
            return;
        }
        self.root.unpause();
        self.set_status(MachineStatus::Started);
    }

    /// Stop if needed and return to `None`.
    pub fn dispose(&mut self) {
        if matches!(self.status, MachineStatus::Started | MachineStatus::Paused) {
            self.halt();
        }
        self.last_frame_at = None;
        self.set_status(MachineStatus::None);
    }

    /// Forward one call to the root.
    ///
    /// Only `LateUpdate` resolves links, so only it returns an outcome.
    /// Returns `None` as well when the machine is not started.
    pub fn tick(&mut self, kind: TickKind) -> Option<TickOutcome> {
        if self.status != MachineStatus::Started {
            tracing::trace!(status = %self.status, ?kind, "Tick ignored");
            return None;
        }
        let now = self.clock.now();
        let mut frame = Frame::new(&mut self.host, now);
        match kind {
            TickKind::Update => {
                self.root.update_tree(&mut frame);
                None
            }
            TickKind::FixedUpdate => {
                self.root.fixed_update_tree(&mut frame);
                None
            }
            TickKind::LateUpdate => Some(self.root.late_update_tree(&mut frame)),
        }
    }

    /// `Update`, `FixedUpdate` then `LateUpdate`.
    pub fn run_frame(&mut self) -> Option<TickOutcome> {
        self.tick(TickKind::Update);
        self.tick(TickKind::FixedUpdate);
        let outcome = self.tick(TickKind::LateUpdate);
        if outcome.is_some() {
            self.last_frame_at = Some(self.clock.now());
        }
        outcome
    }

    /// Run a frame if the configured update mode says one is due.
    pub fn advance(&mut self) -> Option<TickOutcome> {
        if self.status != MachineStatus::Started {
            return None;
        }
        match self.config.update_mode {
            UpdateMode::EveryFrame => self.run_frame(),
            UpdateMode::Interval => {
                let now = self.clock.now();
                let due = self
                    .last_frame_at
                    .map_or(true, |last| now.saturating_sub(last) >= self.config.tick_interval);
                if due {
                    self.run_frame()
                } else {
                    None
                }
            }
        }
    }

    /// Make `key` the root's running child without evaluating conditions.
    pub fn force_enter(&mut self, key: StateKey) -> Result<(), MachineError> {
        let now = self.clock.now();
        self.root.force_enter(key, &mut Frame::new(&mut self.host, now))?;
        Ok(())
    }

    /// Force entry into the root's first child of type `T`.
    pub fn force_enter_type<T: Any>(&mut self) -> Option<StateKey> {
        let now = self.clock.now();
        self.root.force_enter_type::<T>(&mut Frame::new(&mut self.host, now))
    }

    /// Run `f` with the root and a frame stamped with the current time.
    ///
    /// Scripted overrides deeper in the tree go through here.
    pub fn with_frame<R>(&mut self, f: impl FnOnce(&mut Sequence<C>, &mut Frame<'_, C>) -> R) -> R {
        let now = self.clock.now();
        let mut frame = Frame::new(&mut self.host, now);
        f(&mut self.root, &mut frame)
    }

    /// Serializable picture of the live tree.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.root, self.status, self.clock.now())
    }

    fn halt(&mut self) {
        if self.status == MachineStatus::Paused {
            self.root.unpause();
        }
        let now = self.clock.now();
        self.root.stop(&mut Frame::new(&mut self.host, now));
    }

    fn allowed(&self, action: &str, from: &[MachineStatus]) -> bool {
        let ok = from.contains(&self.status);
        if !ok {
            tracing::warn!(action, status = %self.status, "Illegal machine call ignored");
        }
        ok
    }

    fn set_status(&mut self, status: MachineStatus) {
        tracing::info!(root = %self.root.name(), from = %self.status, to = %status, "Machine status changed");
        self.status = status;
    }
}

impl<C: 'static> fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("status", &self.status)
            .field("root", &self.root)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Capabilities, Guard, ManualClock, Probe, State, Status};
    use crate::graph::{Forced, GraphError, LinkOptions};

    type Log = Vec<String>;

    struct Traced(&'static str);

    impl State<Log> for Traced {
        fn name(&self) -> &str {
            self.0
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::UPDATE | Capabilities::FIXED_UPDATE | Capabilities::LATE_UPDATE
        }

        fn init(&mut self, host: &mut Log) {
            host.push(format!("{} init", self.0));
        }

        fn enter(&mut self, cx: &mut Frame<'_, Log>, _via: Option<&crate::graph::TransitionInfo>) {
            cx.host_mut().push(format!("{} enter", self.0));
        }

        fn exit(&mut self, cx: &mut Frame<'_, Log>) {
            cx.host_mut().push(format!("{} exit", self.0));
        }

        fn update(&mut self, cx: &mut Frame<'_, Log>) {
            cx.host_mut().push("update".into());
        }

        fn fixed_update(&mut self, cx: &mut Frame<'_, Log>) {
            cx.host_mut().push("fixed".into());
        }

        fn late_update(&mut self, cx: &mut Frame<'_, Log>) {
            cx.host_mut().push("late".into());
        }
    }

    fn machine() -> (Machine<Log>, ManualClock) {
        let mut root = Sequence::new("Root");
        root.add_state(Traced("A"));
        let clock = ManualClock::new();
        (Machine::new(root, Vec::new()).with_clock(clock.clone()), clock)
    }

    #[test]
    fn status_follows_lifecycle() {
        let (mut machine, _) = machine();
        assert_eq!(machine.status(), MachineStatus::None);

        machine.init().unwrap();
        assert_eq!(machine.status(), MachineStatus::Inited);
        machine.start();
        assert_eq!(machine.status(), MachineStatus::Started);
        machine.pause();
        assert_eq!(machine.status(), MachineStatus::Paused);
        machine.unpause();
        assert_eq!(machine.status(), MachineStatus::Started);
        machine.stop();
        assert_eq!(machine.status(), MachineStatus::Ended);
        machine.dispose();
        assert_eq!(machine.status(), MachineStatus::None);

        assert_eq!(machine.host(), &vec!["A init", "A enter", "A exit"]);
    }

    #[test]
    fn illegal_calls_are_ignored() {
        let (mut machine, _) = machine();
        machine.start();
        assert_eq!(machine.status(), MachineStatus::None);
        machine.pause();
        machine.stop();
        assert_eq!(machine.status(), MachineStatus::None);
        assert!(machine.run_frame().is_none());
        assert!(machine.host().is_empty());
    }

    #[test]
    fn init_is_idempotent() {
        let (mut machine, _) = machine();
        machine.init().unwrap();
        machine.init().unwrap();
        assert_eq!(machine.host(), &vec!["A init"]);
    }

    #[test]
    fn init_reports_every_validation_problem() {
        let mut inner: Sequence<Log> = Sequence::new("Inner");
        let orphan = inner.add_state(Traced("X"));
        inner.add_state(Traced("Y"));
        inner.remove_state(orphan).unwrap();

        let mut root: Sequence<Log> = Sequence::new("Root");
        let first = root.add_state(Traced("A"));
        root.add_state(inner);
        root.remove_state(first).unwrap();

        let mut machine = Machine::new(root, Vec::new());
        match machine.init() {
            Err(MachineError::InvalidGraph { errors }) => {
                assert_eq!(errors.len(), 2);
                assert!(errors
                    .iter()
                    .all(|e| matches!(e, GraphError::MissingStartableState { .. })));
            }
            other => panic!("Expected InvalidGraph, got {:?}", other),
        }
        assert_eq!(machine.status(), MachineStatus::None);
    }

    #[test]
    fn frame_dispatches_in_order() {
        let (mut machine, _) = machine();
        machine.init().unwrap();
        machine.start();
        machine.host_mut().clear();

        let outcome = machine.run_frame().unwrap();
        assert_eq!(outcome.status, Status::Running);
        assert_eq!(machine.host(), &vec!["update", "fixed", "late"]);
    }

    #[test]
    fn pause_suspends_dispatch_without_exit() {
        let (mut machine, _) = machine();
        machine.init().unwrap();
        machine.start();
        machine.pause();
        machine.host_mut().clear();

        assert!(machine.run_frame().is_none());
        assert!(machine.host().is_empty());

        machine.stop();
        assert_eq!(machine.host(), &vec!["A exit"]);
    }

    #[test]
    fn interval_mode_waits_for_tick_interval() {
        let (machine, clock) = machine();
        let mut machine = machine.with_config(MachineConfig {
            update_mode: UpdateMode::Interval,
            tick_interval: Duration::from_millis(100),
            history_limit: None,
        });
        machine.init().unwrap();
        machine.start();

        assert!(machine.advance().is_some());
        clock.advance(Duration::from_millis(40));
        assert!(machine.advance().is_none());
        clock.advance(Duration::from_millis(60));
        assert!(machine.advance().is_some());
    }

    #[test]
    fn zero_interval_fails_init() {
        let (machine, _) = machine();
        let mut machine = machine.with_config(MachineConfig {
            update_mode: UpdateMode::Interval,
            tick_interval: Duration::ZERO,
            history_limit: None,
        });
        assert!(matches!(machine.init(), Err(MachineError::InvalidConfig(_))));
    }

    #[test]
    fn history_limit_reaches_nested_sequences() {
        let mut inner: Sequence = Sequence::new("Inner");
        inner.add_state(Forced);
        let mut root: Sequence = Sequence::new("Root");
        root.add_state(inner);

        let mut machine = Machine::new(root, ()).with_config(MachineConfig {
            history_limit: Some(3),
            ..MachineConfig::default()
        });
        machine.init().unwrap();

        assert!(machine.root().walk().iter().all(|seq| seq.history().limit() == 3));
    }

    #[test]
    fn force_enter_bypasses_conditions() {
        let mut root: Sequence = Sequence::new("Root");
        root.add_state(Forced);
        let target = root.add_state(Forced);
        let mut machine = Machine::new(root, ());
        machine.init().unwrap();
        machine.start();

        machine.force_enter(target).unwrap();
        assert_eq!(machine.root().running(), Some(target));
        assert!(machine.force_enter(StateKey::new(9)).is_err());
    }

    #[test]
    fn custom_rules_are_checked_at_init() {
        let mut root: Sequence = Sequence::new("Root");
        root.add_state(Forced);
        let rules = GraphRules::default().require_pred(
            |seq: &Sequence| !seq.links().is_empty(),
            |seq: &Sequence| GraphError::InvalidLink {
                sequence: seq.name().to_string(),
                kind: "any".into(),
                reason: "no links".into(),
            },
        );
        let mut machine = Machine::new(root, ()).with_rules(rules);
        assert!(matches!(machine.init(), Err(MachineError::InvalidGraph { .. })));
    }

    #[test]
    fn conditions_read_the_host() {
        let mut root: Sequence<u32> = Sequence::new("Root");
        root.add_state(Forced);
        let alert = root.add_state(Forced);
        root.link_global(
            alert,
            Guard::from_fn("loud", |p: &Probe<'_, u32>| *p.host() > 5),
            LinkOptions::default(),
        )
        .unwrap();

        let mut machine = Machine::new(root, 0u32);
        machine.init().unwrap();
        machine.start();
        assert!(machine.run_frame().unwrap().fired.is_none());

        *machine.host_mut() = 9;
        assert!(machine.run_frame().unwrap().fired.is_some());
        assert_eq!(machine.root().running(), Some(alert));
    }
}
