//! Composite state owning children and the transition graph between them.
//!
//! # Resolution
//!
//! Links are resolved once per tick in `late_update_tree`, after the running
//! child had its own late update:
//!
//! 1. Global links, by destination then link order, skipping the running
//!    child as destination.
//! 2. Local links leaving the running child, by destination then link order.
//! 3. The running child's end link, when its end condition succeeded.
//!
//! The first satisfied transition fires and resolution stops. The child it
//! enters is not evaluated again until the next tick.

use super::error::GraphError;
use super::links::LinkTables;
use super::node::{StateKey, StateNode};
use super::transition::{CooldownAnchor, LinkOptions, Transition, TransitionId, TransitionInfo, TransitionKind};
use crate::core::{Capabilities, Frame, Guard, Probe, State, StateHistory, StateTransition, Status};
use std::any::Any;
use std::fmt;

/// Notification sent to sequence observers.
///
/// Delivered before the old running child exits.
#[derive(Debug, Clone, Copy)]
pub enum SequenceEvent<'a> {
    LinkExecuted {
        sequence: &'a str,
        transition: &'a TransitionInfo,
    },
    RunningStateChanged {
        sequence: &'a str,
        from: Option<&'a str>,
        to: &'a str,
        key: StateKey,
    },
}

/// Result of one `late_update_tree` call.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Transition that fired this tick, if any
    pub fired: Option<TransitionInfo>,
    /// `Running` unless the running child's end condition decided the tick
    pub status: Status,
}

impl TickOutcome {
    fn idle(status: Status) -> Self {
        Self { fired: None, status }
    }
}

type Observer = Box<dyn FnMut(&SequenceEvent<'_>) + Send>;

/// A composite state: children, link tables and the running child.
///
/// # Example
///
/// ```rust
/// use behavior_graph::core::{Frame, Guard, State};
/// use behavior_graph::graph::{LinkOptions, Sequence};
/// use std::time::Duration;
///
/// struct Idle;
/// impl State for Idle {}
/// struct Patrol;
/// impl State for Patrol {}
///
/// let mut seq: Sequence = Sequence::new("Guard");
/// let idle = seq.add_state(Idle);
/// let patrol = seq.add_state(Patrol);
/// seq.link_local(idle, patrol, Guard::always(), LinkOptions::default()).unwrap();
///
/// let mut host = ();
/// seq.start(&mut Frame::new(&mut host, Duration::ZERO));
/// assert_eq!(seq.running(), Some(idle));
///
/// let outcome = seq.late_update_tree(&mut Frame::new(&mut host, Duration::from_millis(16)));
/// assert!(outcome.fired.is_some());
/// assert_eq!(seq.running(), Some(patrol));
/// ```
pub struct Sequence<C = ()> {
    name: String,
    slots: Vec<Option<StateNode<C>>>,
    links: LinkTables<C>,
    startable: Option<StateKey>,
    running: Option<StateKey>,
    current: Option<StateKey>,
    reset_state_at_start: bool,
    paused: bool,
    status: Status,
    last_fired: Option<TransitionInfo>,
    history: StateHistory,
    observers: Vec<Observer>,
}

impl<C: 'static> Sequence<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
            links: LinkTables::default(),
            startable: None,
            running: None,
            current: None,
            reset_state_at_start: true,
            paused: false,
            status: Status::Failure,
            last_fired: None,
            history: StateHistory::default(),
            observers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// When `false`, `start` resumes the child that was running when the
    /// sequence last stopped.
    pub fn set_reset_state_at_start(&mut self, reset: bool) {
        self.reset_state_at_start = reset;
    }

    pub fn reset_state_at_start(&self) -> bool {
        self.reset_state_at_start
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.history.set_limit(limit);
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Register an inspection observer.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&SequenceEvent<'_>) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    pub fn links(&self) -> &LinkTables<C> {
        &self.links
    }

    /// Mutable access to one transition, for scripted cooldown stamps.
    pub fn transition_mut(&mut self, id: TransitionId) -> Option<&mut Transition<C>> {
        self.links.get_mut(id)
    }

    pub fn running(&self) -> Option<StateKey> {
        self.running
    }

    pub fn running_node(&self) -> Option<&StateNode<C>> {
        self.running.and_then(|key| self.node(key))
    }

    /// Last child that was running, kept across stops.
    pub fn current(&self) -> Option<StateKey> {
        self.current
    }

    pub fn startable(&self) -> Option<StateKey> {
        self.startable
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Status reported through `end_condition` when nested: the end
    /// condition of a terminal running child, `Running` while any other
    /// child runs, `Failure` when idle.
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn last_fired(&self) -> Option<&TransitionInfo> {
        self.last_fired.as_ref()
    }

    pub fn node(&self, key: StateKey) -> Option<&StateNode<C>> {
        self.slots.get(key.index()).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, key: StateKey) -> Option<&mut StateNode<C>> {
        self.slots.get_mut(key.index()).and_then(Option::as_mut)
    }

    /// Live children in insertion order.
    pub fn states(&self) -> impl Iterator<Item = (StateKey, &StateNode<C>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (StateKey::new(i), node)))
    }

    pub fn state_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Key of the first child with display name `name`.
    pub fn key_of(&self, name: &str) -> Option<StateKey> {
        self.states().find(|(_, node)| node.name() == name).map(|(key, _)| key)
    }

    /// Key of the first direct child of type `T`.
    pub fn key_of_type<T: Any>(&self) -> Option<StateKey> {
        self.states().find(|(_, node)| node.is::<T>()).map(|(key, _)| key)
    }

    /// First state of type `T`, searching nested composites depth-first.
    pub fn find<T: Any>(&self) -> Option<&T> {
        search(self.children_nodes(), &|node: &StateNode<C>| node.is::<T>()).and_then(|node| node.downcast_ref::<T>())
    }

    pub fn find_mut<T: Any>(&mut self) -> Option<&mut T> {
        search_mut(self.children_nodes_mut(), &|node: &StateNode<C>| node.is::<T>()).and_then(|node| node.downcast_mut::<T>())
    }

    /// First node carrying `tag`, searching nested composites depth-first.
    pub fn find_by_tag(&self, tag: &str) -> Option<&StateNode<C>> {
        search(self.children_nodes(), &|node: &StateNode<C>| node.tag() == Some(tag))
    }

    pub fn find_by_tag_mut(&mut self, tag: &str) -> Option<&mut StateNode<C>> {
        search_mut(self.children_nodes_mut(), &|node: &StateNode<C>| node.tag() == Some(tag))
    }

    /// This sequence and every sequence nested below it, depth-first.
    pub fn walk(&self) -> Vec<&Sequence<C>> {
        let mut out = Vec::new();
        collect_sequences(self, &mut out);
        out
    }

    /// Visit this sequence and every nested sequence, depth-first.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Sequence<C>)) {
        visit(self);
        for node in self.slots.iter_mut().flatten() {
            visit_node_mut(node, visit);
        }
    }

    fn children_nodes(&self) -> Vec<&StateNode<C>> {
        self.slots.iter().flatten().collect()
    }

    fn children_nodes_mut(&mut self) -> Vec<&mut StateNode<C>> {
        self.slots.iter_mut().flatten().collect()
    }

    /// Register a child. The very first child becomes the startable state;
    /// a cleared entry point stays cleared.
    pub fn add_node(&mut self, node: StateNode<C>) -> StateKey {
        let key = StateKey::new(self.slots.len());
        tracing::trace!(sequence = %self.name, state = %node.name(), key = %key, "State added");
        if self.slots.is_empty() {
            self.startable = Some(key);
        }
        self.slots.push(Some(node));
        key
    }

    pub fn set_startable(&mut self, key: StateKey) -> Result<(), GraphError> {
        self.require(key)?;
        self.startable = Some(key);
        Ok(())
    }

    /// Remove an idle child together with every link touching it.
    ///
    /// Removing the startable child leaves the sequence without an entry
    /// point until [`Sequence::set_startable`] is called.
    pub fn remove_state(&mut self, key: StateKey) -> Result<StateNode<C>, GraphError> {
        self.require(key)?;
        if self.running == Some(key) {
            return Err(GraphError::RunningStateRemoval {
                sequence: self.name.clone(),
                state: self.display(key),
            });
        }

        let purged = self.links.purge_state(key);
        let node = self.slots[key.index()].take().ok_or_else(|| self.unknown(key))?;

        if self.startable == Some(key) {
            self.startable = None;
        }
        if self.current == Some(key) {
            self.current = None;
        }

        tracing::debug!(sequence = %self.name, state = %node.name(), purged, "State removed");
        Ok(node)
    }

    /// Conditioned link from `origin` to `destination`.
    pub fn link_local(
        &mut self,
        origin: StateKey,
        destination: StateKey,
        guard: Guard<C>,
        options: LinkOptions,
    ) -> Result<TransitionId, GraphError> {
        self.require(origin)?;
        self.require(destination)?;
        if self.links.local_has_condition(origin, destination, guard.id()) {
            return Err(GraphError::DuplicateCondition {
                sequence: self.name.clone(),
                condition: guard.name().to_string(),
                origin: format!("'{}'", self.display(origin)),
                destination: self.display(destination),
            });
        }

        let transition = Transition::new(TransitionKind::Local, Some(guard), Some(origin), destination, options);
        Ok(self.links.insert_local(origin, transition))
    }

    /// Conditioned link from any other running child to `destination`.
    pub fn link_global(
        &mut self,
        destination: StateKey,
        guard: Guard<C>,
        options: LinkOptions,
    ) -> Result<TransitionId, GraphError> {
        self.require(destination)?;
        if self.links.global_has_condition(destination, guard.id()) {
            return Err(GraphError::DuplicateCondition {
                sequence: self.name.clone(),
                condition: guard.name().to_string(),
                origin: "any state".to_string(),
                destination: self.display(destination),
            });
        }

        let transition = Transition::new(TransitionKind::Global, Some(guard), None, destination, options);
        Ok(self.links.insert_global(transition))
    }

    /// Link taken when the endable `origin` completes. Replaces the previous
    /// end link of `origin`.
    pub fn link_end(
        &mut self,
        origin: StateKey,
        destination: StateKey,
        options: LinkOptions,
    ) -> Result<TransitionId, GraphError> {
        let endable = self.require(origin)?.is_endable();
        self.require(destination)?;
        if !endable {
            return Err(GraphError::NotEndable {
                sequence: self.name.clone(),
                state: self.display(origin),
            });
        }

        let transition = Transition::new(TransitionKind::End, None, Some(origin), destination, options);
        let (id, replaced) = self.links.insert_end(origin, transition);
        if let Some(old) = replaced {
            tracing::debug!(sequence = %self.name, origin = %self.display(origin), replaced = %old.id(), "End link replaced");
        }
        Ok(id)
    }

    /// Remove every local link on the `origin -> destination` edge.
    pub fn remove_local_link(&mut self, origin: StateKey, destination: StateKey) -> usize {
        self.links.remove_local(origin, destination).len()
    }

    /// Remove every global link into `destination`.
    pub fn remove_global_link(&mut self, destination: StateKey) -> usize {
        self.links.remove_global(destination).len()
    }

    pub fn remove_end_link(&mut self, origin: StateKey) -> bool {
        self.links.remove_end(origin).is_some()
    }

    pub fn remove_link(&mut self, id: TransitionId) -> bool {
        self.links.remove(id).is_some()
    }

    /// Remove the `index`-th transition in link order.
    pub fn remove_link_at(&mut self, index: usize) -> Result<TransitionId, GraphError> {
        let id = self.links.id_at(index).ok_or_else(|| GraphError::IndexOutOfRange {
            sequence: self.name.clone(),
            index,
            len: self.links.len(),
        })?;
        self.links.remove(id);
        Ok(id)
    }

    /// Drop every link while keeping the children.
    pub fn clear_links(&mut self) {
        self.links.clear();
    }

    /// Make `key` the running child without evaluating any condition.
    pub fn force_enter(&mut self, key: StateKey, cx: &mut Frame<'_, C>) -> Result<(), GraphError> {
        self.require(key)?;
        let via = TransitionInfo::forced(self.running, key);
        tracing::debug!(sequence = %self.name, state = %self.display(key), "Forced entry");
        self.change_running(key, Some(&via), cx);
        self.last_fired = Some(via);
        Ok(())
    }

    /// Force entry into the first direct child of type `T`.
    pub fn force_enter_type<T: Any>(&mut self, cx: &mut Frame<'_, C>) -> Option<StateKey> {
        let key = self.key_of_type::<T>()?;
        self.force_enter(key, cx).ok()?;
        Some(key)
    }

    /// Enter the startable child, or the last running child when the
    /// sequence resumes instead of resetting.
    pub fn try_start(&mut self, cx: &mut Frame<'_, C>) -> Result<(), GraphError> {
        if self.running.is_some() {
            return Ok(());
        }
        self.paused = false;
        self.status = Status::Failure;

        let resume = self
            .current
            .filter(|key| !self.reset_state_at_start && self.node(*key).is_some());
        let target = resume
            .or(self.startable)
            .ok_or_else(|| GraphError::MissingStartableState {
                sequence: self.name.clone(),
            })?;

        self.change_running(target, None, cx);
        Ok(())
    }

    /// Like [`Sequence::try_start`], logging instead of failing.
    pub fn start(&mut self, cx: &mut Frame<'_, C>) {
        if let Err(err) = self.try_start(cx) {
            tracing::warn!(sequence = %self.name, error = %err, "Sequence not started");
        }
    }

    /// Exit the running child. `current` keeps pointing at it.
    pub fn stop(&mut self, cx: &mut Frame<'_, C>) {
        self.abort_running(cx);
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
        if let Some(node) = self.running.and_then(|key| self.node_mut(key)) {
            node.pause();
        }
    }

    pub fn unpause(&mut self) {
        self.paused = false;
        if let Some(node) = self.running.and_then(|key| self.node_mut(key)) {
            node.unpause();
        }
    }

    pub fn update_tree(&mut self, cx: &mut Frame<'_, C>) {
        if self.paused {
            return;
        }
        if let Some(node) = self.running.and_then(|key| self.node_mut(key)) {
            node.update(cx);
        }
    }

    pub fn fixed_update_tree(&mut self, cx: &mut Frame<'_, C>) {
        if self.paused {
            return;
        }
        if let Some(node) = self.running.and_then(|key| self.node_mut(key)) {
            node.fixed_update(cx);
        }
    }

    /// Late-update the running child, then resolve links.
    pub fn late_update_tree(&mut self, cx: &mut Frame<'_, C>) -> TickOutcome {
        if self.paused {
            return TickOutcome::idle(Status::Running);
        }
        let Some(running) = self.running else {
            return TickOutcome::idle(Status::Failure);
        };

        if let Some(node) = self.node_mut(running) {
            node.late_update(cx);
        }

        let chosen = {
            let probe = cx.probe_with(&self.slots);
            self.select(running, &probe)
        };
        if let Some(id) = chosen {
            return TickOutcome {
                fired: self.fire(id, running, cx),
                status: Status::Running,
            };
        }

        let now = cx.now();
        let (status, end_id, terminal) = {
            let probe = cx.probe_with(&self.slots);
            let Some(node) = self.node(running) else {
                return TickOutcome::idle(Status::Failure);
            };
            match self.links.end_from(running) {
                Some(end) => {
                    let status = node.end_condition(&probe);
                    let ready = status.is_succeeded() && end.check_cooldown(now);
                    (status, ready.then(|| end.id()), false)
                }
                None if !self.links.has_local(running) && node.is_endable() => {
                    (node.end_condition(&probe), None, true)
                }
                None => (Status::Running, None, false),
            }
        };
        // Only a terminal child speaks for the whole sequence.
        self.status = if terminal { status } else { Status::Running };

        match end_id {
            Some(id) => TickOutcome {
                fired: self.fire(id, running, cx),
                status: Status::Running,
            },
            None => TickOutcome::idle(status),
        }
    }

    /// First satisfied global or local transition from `running`.
    fn select(&self, running: StateKey, probe: &Probe<'_, C>) -> Option<TransitionId> {
        let global = self
            .links
            .global()
            .iter()
            .filter(|group| group.destination() != running)
            .flat_map(|group| group.transitions().iter());

        let local = self
            .links
            .local_from(running)
            .into_iter()
            .flat_map(|group| group.edges().iter())
            .flat_map(|edge| edge.transitions().iter());

        global.chain(local).find(|t| t.is_satisfied(probe)).map(Transition::id)
    }

    fn fire(&mut self, id: TransitionId, origin: StateKey, cx: &mut Frame<'_, C>) -> Option<TransitionInfo> {
        let info = {
            let transition = self.links.get_mut(id)?;
            transition.mark_fired(origin);
            transition.info()
        };

        tracing::debug!(
            sequence = %self.name,
            kind = %info.kind,
            from = %self.display(origin),
            to = %self.display(info.destination),
            condition = info.condition_name.as_deref().unwrap_or("end"),
            "Link executed"
        );
        notify(
            &mut self.observers,
            &SequenceEvent::LinkExecuted {
                sequence: &self.name,
                transition: &info,
            },
        );

        self.change_running(info.destination, Some(&info), cx);

        let exhausted = self.links.get_mut(id).is_some_and(|t| t.record_execution());
        if exhausted {
            self.links.remove(id);
            tracing::debug!(sequence = %self.name, transition = %id, "Transition exhausted and removed");
        }

        self.last_fired = Some(info.clone());
        Some(info)
    }

    fn change_running(&mut self, destination: StateKey, via: Option<&TransitionInfo>, cx: &mut Frame<'_, C>) {
        let from = self.running;
        notify(
            &mut self.observers,
            &SequenceEvent::RunningStateChanged {
                sequence: &self.name,
                from: from.and_then(|key| slot_name(&self.slots, key)),
                to: slot_name(&self.slots, destination).unwrap_or_default(),
                key: destination,
            },
        );

        self.abort_running(cx);

        let now = cx.now();
        let Some(node) = self.node_mut(destination) else {
            return;
        };
        node.enter(cx, via);
        self.running = Some(destination);
        self.current = Some(destination);
        self.status = Status::Running;

        if let Some(info) = via {
            if !info.cooldown.is_zero() && info.cooldown.anchor == CooldownAnchor::OnEnterDestination {
                if let Some(transition) = self.links.get_mut(info.id) {
                    transition.set_cooldown_time(now);
                }
            }
        }

        let from_name = from.map(|key| self.display(key));
        let to_name = self.display(destination);
        tracing::debug!(
            sequence = %self.name,
            from = from_name.as_deref().unwrap_or("none"),
            to = %to_name,
            "Running state changed"
        );
        self.history.record(StateTransition {
            from: from_name,
            to: to_name,
            kind: via.map_or(TransitionKind::End, |info| info.kind),
            transition: via.map(|info| info.id),
            condition: via.and_then(|info| info.condition_name.clone()),
            at: now,
        });
    }

    /// Exit the running child and stamp any cooldown waiting for that exit.
    fn abort_running(&mut self, cx: &mut Frame<'_, C>) {
        let Some(key) = self.running.take() else {
            return;
        };
        self.status = Status::Failure;
        let pending = self.node_mut(key).and_then(|node| node.exit(cx));
        if let Some(transition) = pending.and_then(|id| self.links.get_mut(id)) {
            transition.set_cooldown_time(cx.now());
        }
    }

    fn require(&self, key: StateKey) -> Result<&StateNode<C>, GraphError> {
        self.node(key).ok_or_else(|| self.unknown(key))
    }

    fn unknown(&self, key: StateKey) -> GraphError {
        GraphError::UnknownState {
            sequence: self.name.clone(),
            state: key.to_string(),
        }
    }

    fn display(&self, key: StateKey) -> String {
        slot_name(&self.slots, key).map_or_else(|| key.to_string(), str::to_string)
    }

    /// Register a state as a new child.
    pub fn add_state<S: State<C>>(&mut self, state: S) -> StateKey {
        self.add_node(StateNode::new(state))
    }

    /// Run one-time setup on every child.
    pub fn init(&mut self, host: &mut C) {
        for node in self.slots.iter_mut().flatten() {
            node.init(host);
        }
    }
}

impl<C: 'static> fmt::Debug for Sequence<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name)
            .field("states", &self.state_count())
            .field("links", &self.links.len())
            .field("running", &self.running)
            .field("paused", &self.paused)
            .finish()
    }
}

impl<C: 'static> State<C> for Sequence<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn init(&mut self, host: &mut C) {
        Sequence::init(self, host);
    }

    fn enter(&mut self, cx: &mut Frame<'_, C>, _via: Option<&TransitionInfo>) {
        self.start(cx);
    }

    fn exit(&mut self, cx: &mut Frame<'_, C>) {
        self.stop(cx);
    }

    fn update(&mut self, cx: &mut Frame<'_, C>) {
        self.update_tree(cx);
    }

    fn fixed_update(&mut self, cx: &mut Frame<'_, C>) {
        self.fixed_update_tree(cx);
    }

    fn late_update(&mut self, cx: &mut Frame<'_, C>) {
        self.late_update_tree(cx);
    }

    fn end_condition(&self, _probe: &Probe<'_, C>) -> Status {
        self.status
    }

    fn pause(&mut self) {
        Sequence::pause(self);
    }

    fn unpause(&mut self) {
        Sequence::unpause(self);
    }

    fn children(&self) -> Vec<&StateNode<C>> {
        self.children_nodes()
    }

    fn children_mut(&mut self) -> Vec<&mut StateNode<C>> {
        self.children_nodes_mut()
    }

    fn as_sequence(&self) -> Option<&Sequence<C>> {
        Some(self)
    }

    fn as_sequence_mut(&mut self) -> Option<&mut Sequence<C>> {
        Some(self)
    }
}

fn notify(observers: &mut [Observer], event: &SequenceEvent<'_>) {
    for observer in observers.iter_mut() {
        observer(event);
    }
}

fn slot_name<C: 'static>(slots: &[Option<StateNode<C>>], key: StateKey) -> Option<&str> {
    slots.get(key.index()).and_then(Option::as_ref).map(StateNode::name)
}

fn collect_sequences<'a, C: 'static>(seq: &'a Sequence<C>, out: &mut Vec<&'a Sequence<C>>) {
    out.push(seq);
    for node in seq.slots.iter().flatten() {
        collect_nested(node, out);
    }
}

fn collect_nested<'a, C: 'static>(node: &'a StateNode<C>, out: &mut Vec<&'a Sequence<C>>) {
    match node.state().as_sequence() {
        Some(seq) => collect_sequences(seq, out),
        None => {
            for child in node.state().children() {
                collect_nested(child, out);
            }
        }
    }
}

fn visit_node_mut<C: 'static>(node: &mut StateNode<C>, visit: &mut dyn FnMut(&mut Sequence<C>)) {
    let state = node.state_mut();
    if let Some(seq) = state.as_sequence_mut() {
        seq.walk_mut(visit);
    } else {
        for child in state.children_mut() {
            visit_node_mut(child, visit);
        }
    }
}

fn search<'a, C: 'static>(nodes: Vec<&'a StateNode<C>>, matches: &dyn Fn(&StateNode<C>) -> bool) -> Option<&'a StateNode<C>> {
    for node in nodes {
        if matches(node) {
            return Some(node);
        }
        if let Some(found) = search(node.state().children(), matches) {
            return Some(found);
        }
    }
    None
}

fn search_mut<'a, C: 'static>(
    nodes: Vec<&'a mut StateNode<C>>,
    matches: &dyn Fn(&StateNode<C>) -> bool,
) -> Option<&'a mut StateNode<C>> {
    for node in nodes {
        if matches(&*node) {
            return Some(node);
        }
        if let Some(found) = search_mut(node.state_mut().children_mut(), matches) {
            return Some(found);
        }
    }
    None
}
