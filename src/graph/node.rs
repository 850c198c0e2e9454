//! Bookkeeping wrapper around every registered state.

use super::transition::{TransitionId, TransitionInfo};
use crate::core::{Capabilities, Frame, Probe, State, Status};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use uuid::Uuid;

/// Index of a child inside its owning sequence.
///
/// Keys are stable: removing a child leaves its slot empty instead of
/// shifting the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey(usize);

impl StateKey {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process-wide unique identity of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateId(Uuid);

impl StateId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type EnterHook<C> = Box<dyn FnMut(&mut C, Option<&TransitionInfo>) + Send>;
type ExitHook<C> = Box<dyn FnMut(&mut C) + Send>;

/// A state together with the data the graph tracks about it.
///
/// # Example
///
/// ```rust
/// use behavior_graph::core::State;
/// use behavior_graph::graph::StateNode;
///
/// struct Guarding;
/// impl State for Guarding {}
///
/// let node: StateNode = StateNode::new(Guarding)
///     .named("Guard the gate")
///     .tagged("sentry")
///     .on_enter(|_host, _via| {});
///
/// assert_eq!(node.name(), "Guard the gate");
/// assert_eq!(node.tag(), Some("sentry"));
/// assert!(!node.is_running());
/// ```
pub struct StateNode<C = ()> {
    id: StateId,
    name: String,
    tag: Option<String>,
    capabilities: Capabilities,
    running: bool,
    last_exit: Option<Duration>,
    pending_cooldown: Option<TransitionId>,
    faulted: Cell<bool>,
    on_enter: Vec<EnterHook<C>>,
    on_exit: Vec<ExitHook<C>>,
    state: Box<dyn State<C>>,
}

impl<C: 'static> StateNode<C> {
    pub fn new<S: State<C>>(state: S) -> Self {
        Self::from_boxed(Box::new(state))
    }

    pub fn from_boxed(state: Box<dyn State<C>>) -> Self {
        Self {
            id: StateId::new(),
            name: state.name().to_string(),
            tag: None,
            capabilities: state.capabilities(),
            running: false,
            last_exit: None,
            pending_cooldown: None,
            faulted: Cell::new(false),
            on_enter: Vec::new(),
            on_exit: Vec::new(),
            state,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Behavior callback run before the state's own `enter`.
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut C, Option<&TransitionInfo>) + Send + 'static,
    {
        self.on_enter.push(Box::new(hook));
        self
    }

    /// Behavior callback run after the state's own `exit`.
    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut C) + Send + 'static,
    {
        self.on_exit.push(Box::new(hook));
        self
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_endable(&self) -> bool {
        self.capabilities.contains(Capabilities::ENDABLE)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_exit(&self) -> Option<Duration> {
        self.last_exit
    }

    /// Whether the state is idle and at least `duration` has passed since
    /// it last exited. A state that never ran passes.
    pub fn check_cd(&self, duration: Duration, now: Duration) -> bool {
        if self.running {
            return false;
        }
        match self.last_exit {
            None => true,
            Some(at) => now.saturating_sub(at) >= duration,
        }
    }

    /// Time since the state last exited, if it is idle and ever ran.
    pub fn since_exit(&self, now: Duration) -> Option<Duration> {
        if self.running {
            return None;
        }
        self.last_exit.map(|at| now.saturating_sub(at))
    }

    pub fn state(&self) -> &dyn State<C> {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut dyn State<C> {
        &mut *self.state
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.state().as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.state_mut().as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.state().as_any().is::<T>()
    }

    pub(crate) fn init(&mut self, host: &mut C) {
        self.state.init(host);
    }

    pub(crate) fn enter(&mut self, cx: &mut Frame<'_, C>, via: Option<&TransitionInfo>) {
        for hook in &mut self.on_enter {
            hook(cx.host_mut(), via);
        }
        self.state.enter(cx, via);
        self.running = true;
        self.pending_cooldown = via.filter(|t| t.defers_cooldown()).map(|t| t.id);
    }

    /// Exit the state. Returns the transition whose cooldown was waiting for
    /// this exit, so the owning sequence can stamp it.
    pub(crate) fn exit(&mut self, cx: &mut Frame<'_, C>) -> Option<TransitionId> {
        let pending = self.pending_cooldown.take();
        self.last_exit = Some(cx.now());
        self.running = false;
        self.state.exit(cx);
        for hook in &mut self.on_exit {
            hook(cx.host_mut());
        }
        pending
    }

    pub(crate) fn update(&mut self, cx: &mut Frame<'_, C>) {
        if self.capabilities.contains(Capabilities::UPDATE) {
            let state = &mut self.state;
            shielded(&self.name, &self.faulted, (), || state.update(cx));
        }
    }

    pub(crate) fn fixed_update(&mut self, cx: &mut Frame<'_, C>) {
        if self.capabilities.contains(Capabilities::FIXED_UPDATE) {
            let state = &mut self.state;
            shielded(&self.name, &self.faulted, (), || state.fixed_update(cx));
        }
    }

    pub(crate) fn late_update(&mut self, cx: &mut Frame<'_, C>) {
        if self.capabilities.contains(Capabilities::LATE_UPDATE) {
            let state = &mut self.state;
            shielded(&self.name, &self.faulted, (), || state.late_update(cx));
        }
    }

    /// End check; `Failure` when the state is not endable, `Running` when
    /// the check panics.
    pub fn end_condition(&self, probe: &Probe<'_, C>) -> Status {
        if !self.is_endable() {
            return Status::Failure;
        }
        shielded(&self.name, &self.faulted, Status::Running, || {
            self.state.end_condition(probe)
        })
    }

    pub(crate) fn pause(&mut self) {
        self.state.pause();
    }

    pub(crate) fn unpause(&mut self) {
        self.state.unpause();
    }
}

impl<C: 'static> fmt::Debug for StateNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("capabilities", &self.capabilities)
            .field("running", &self.running)
            .finish()
    }
}

/// Run tick-time state code, turning a panic into `fallback`.
///
/// Only the first fault of a node is logged.
fn shielded<R>(name: &str, faulted: &Cell<bool>, fallback: R, f: impl FnOnce() -> R) -> R {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            if !faulted.replace(true) {
                tracing::error!(
                    state = %name,
                    reason = %panic_message(&payload),
                    "State panicked during tick; treating as running"
                );
            }
            fallback
        }
    }
}

pub(crate) fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::transition::{CooldownAnchor, LinkOptions, Transition, TransitionKind};
    use crate::core::Guard;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl State for Recorder {
        fn capabilities(&self) -> Capabilities {
            Capabilities::UPDATE
        }

        fn enter(&mut self, _cx: &mut Frame<'_, ()>, _via: Option<&TransitionInfo>) {
            self.log.lock().unwrap().push("enter".into());
        }

        fn exit(&mut self, _cx: &mut Frame<'_, ()>) {
            self.log.lock().unwrap().push("exit".into());
        }

        fn update(&mut self, _cx: &mut Frame<'_, ()>) {
            self.log.lock().unwrap().push("update".into());
        }
    }

    struct Faulty;

    impl State for Faulty {
        fn capabilities(&self) -> Capabilities {
            Capabilities::UPDATE | Capabilities::ENDABLE
        }

        fn update(&mut self, _cx: &mut Frame<'_, ()>) {
            panic!("navmesh missing");
        }

        fn end_condition(&self, _probe: &Probe<'_, ()>) -> Status {
            panic!("target vanished");
        }
    }

    fn frame_at(host: &mut (), secs: u64) -> Frame<'_, ()> {
        Frame::new(host, Duration::from_secs(secs))
    }

    #[test]
    fn hooks_wrap_state_lifecycle() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let enter_log = Arc::clone(&log);
        let exit_log = Arc::clone(&log);
        let mut node = StateNode::new(Recorder { log: Arc::clone(&log) })
            .on_enter(move |_, _| enter_log.lock().unwrap().push("hook enter".into()))
            .on_exit(move |_| exit_log.lock().unwrap().push("hook exit".into()));

        let mut host = ();
        node.enter(&mut frame_at(&mut host, 0), None);
        assert!(node.is_running());
        node.update(&mut frame_at(&mut host, 0));
        node.exit(&mut frame_at(&mut host, 1));
        assert!(!node.is_running());

        assert_eq!(
            *log.lock().unwrap(),
            vec!["hook enter", "enter", "update", "exit", "hook exit"]
        );
    }

    #[test]
    fn check_cd_tracks_last_exit() {
        let mut node = StateNode::new(Recorder::default());
        let mut host = ();

        assert!(node.check_cd(Duration::from_secs(5), Duration::ZERO));
        node.enter(&mut frame_at(&mut host, 1), None);
        assert!(!node.check_cd(Duration::ZERO, Duration::from_secs(1)));
        node.exit(&mut frame_at(&mut host, 2));

        assert!(!node.check_cd(Duration::from_secs(5), Duration::from_secs(6)));
        assert!(node.check_cd(Duration::from_secs(5), Duration::from_secs(7)));
        assert_eq!(node.since_exit(Duration::from_secs(7)), Some(Duration::from_secs(5)));
    }

    #[test]
    fn exit_returns_deferred_cooldown() {
        let transition: Transition = Transition::new(
            TransitionKind::Local,
            Some(Guard::always()),
            Some(StateKey::new(0)),
            StateKey::new(1),
            LinkOptions::default().cooldown(Duration::from_secs(3), CooldownAnchor::OnExitDestination),
        );
        let info = transition.info();
        let mut node = StateNode::new(Recorder::default());
        let mut host = ();

        node.enter(&mut frame_at(&mut host, 0), Some(&info));
        assert_eq!(node.exit(&mut frame_at(&mut host, 1)), Some(transition.id()));
        node.enter(&mut frame_at(&mut host, 2), None);
        assert_eq!(node.exit(&mut frame_at(&mut host, 3)), None);
    }

    #[test]
    fn faults_degrade_instead_of_unwinding() {
        let mut node = StateNode::new(Faulty);
        let mut host = ();

        node.update(&mut frame_at(&mut host, 0));
        node.update(&mut frame_at(&mut host, 0));
        assert_eq!(node.end_condition(&Probe::new(&(), Duration::ZERO)), Status::Running);
    }

    #[test]
    fn non_endable_state_reports_failure() {
        let node = StateNode::new(Recorder::default());
        assert_eq!(node.end_condition(&Probe::new(&(), Duration::ZERO)), Status::Failure);
    }

    #[test]
    fn downcast_reaches_concrete_state() {
        let node = StateNode::new(Faulty).tagged("broken");
        assert!(node.is::<Faulty>());
        assert!(node.downcast_ref::<Recorder>().is_none());
        assert_eq!(node.name(), "Faulty");
    }
}
