//! The three transition tables owned by a sequence.
//!
//! Insertion order is priority order: groups are kept in the order their
//! first transition was linked, transitions inside a group in link order.

use super::node::StateKey;
use super::transition::{Transition, TransitionId};
use crate::core::ConditionId;

/// Global transitions sharing one destination.
#[derive(Debug)]
pub struct GlobalLinks<C = ()> {
    destination: StateKey,
    transitions: Vec<Transition<C>>,
}

impl<C> GlobalLinks<C> {
    pub fn destination(&self) -> StateKey {
        self.destination
    }

    pub fn transitions(&self) -> &[Transition<C>] {
        &self.transitions
    }
}

/// Local transitions sharing one origin and one destination.
#[derive(Debug)]
pub struct Edge<C = ()> {
    destination: StateKey,
    transitions: Vec<Transition<C>>,
}

impl<C> Edge<C> {
    pub fn destination(&self) -> StateKey {
        self.destination
    }

    pub fn transitions(&self) -> &[Transition<C>] {
        &self.transitions
    }
}

/// Every local edge leaving one origin.
#[derive(Debug)]
pub struct LocalLinks<C = ()> {
    origin: StateKey,
    edges: Vec<Edge<C>>,
}

impl<C> LocalLinks<C> {
    pub fn origin(&self) -> StateKey {
        self.origin
    }

    pub fn edges(&self) -> &[Edge<C>] {
        &self.edges
    }
}

#[derive(Debug)]
pub struct LinkTables<C = ()> {
    global: Vec<GlobalLinks<C>>,
    local: Vec<LocalLinks<C>>,
    end: Vec<Transition<C>>,
    order: Vec<TransitionId>,
}

impl<C> Default for LinkTables<C> {
    fn default() -> Self {
        Self {
            global: Vec::new(),
            local: Vec::new(),
            end: Vec::new(),
            order: Vec::new(),
        }
    }
}

impl<C> LinkTables<C> {
    pub fn global(&self) -> &[GlobalLinks<C>] {
        &self.global
    }

    pub fn local(&self) -> &[LocalLinks<C>] {
        &self.local
    }

    pub fn end(&self) -> &[Transition<C>] {
        &self.end
    }

    pub fn local_from(&self, origin: StateKey) -> Option<&LocalLinks<C>> {
        self.local.iter().find(|l| l.origin == origin)
    }

    pub fn has_local(&self, origin: StateKey) -> bool {
        self.local_from(origin).is_some()
    }

    pub fn end_from(&self, origin: StateKey) -> Option<&Transition<C>> {
        self.end.iter().find(|t| t.origin() == Some(origin))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every transition in the order it was linked.
    pub fn iter(&self) -> impl Iterator<Item = &Transition<C>> {
        self.order.iter().filter_map(move |id| self.get(*id))
    }

    /// Id of the `index`-th transition in link order.
    pub fn id_at(&self, index: usize) -> Option<TransitionId> {
        self.order.get(index).copied()
    }

    pub fn get(&self, id: TransitionId) -> Option<&Transition<C>> {
        self.global
            .iter()
            .flat_map(|g| g.transitions.iter())
            .chain(self.local.iter().flat_map(|l| l.edges.iter()).flat_map(|e| e.transitions.iter()))
            .chain(self.end.iter())
            .find(|t| t.id() == id)
    }

    pub fn get_mut(&mut self, id: TransitionId) -> Option<&mut Transition<C>> {
        self.global
            .iter_mut()
            .flat_map(|g| g.transitions.iter_mut())
            .chain(
                self.local
                    .iter_mut()
                    .flat_map(|l| l.edges.iter_mut())
                    .flat_map(|e| e.transitions.iter_mut()),
            )
            .chain(self.end.iter_mut())
            .find(|t| t.id() == id)
    }

    pub(crate) fn global_has_condition(&self, destination: StateKey, condition: ConditionId) -> bool {
        self.global
            .iter()
            .filter(|g| g.destination == destination)
            .flat_map(|g| g.transitions.iter())
            .any(|t| t.condition_id() == Some(condition))
    }

    pub(crate) fn local_has_condition(&self, origin: StateKey, destination: StateKey, condition: ConditionId) -> bool {
        self.local_from(origin)
            .into_iter()
            .flat_map(|l| l.edges.iter())
            .filter(|e| e.destination == destination)
            .flat_map(|e| e.transitions.iter())
            .any(|t| t.condition_id() == Some(condition))
    }

    pub(crate) fn insert_global(&mut self, transition: Transition<C>) -> TransitionId {
        let id = transition.id();
        let destination = transition.destination();
        match self.global.iter_mut().find(|g| g.destination == destination) {
            Some(group) => group.transitions.push(transition),
            None => self.global.push(GlobalLinks {
                destination,
                transitions: vec![transition],
            }),
        }
        self.order.push(id);
        id
    }

    /// Callers guarantee `transition` has an origin.
    pub(crate) fn insert_local(&mut self, origin: StateKey, transition: Transition<C>) -> TransitionId {
        let id = transition.id();
        let destination = transition.destination();
        let index = match self.local.iter().position(|l| l.origin == origin) {
            Some(index) => index,
            None => {
                self.local.push(LocalLinks {
                    origin,
                    edges: Vec::new(),
                });
                self.local.len() - 1
            }
        };
        let group = &mut self.local[index];
        match group.edges.iter_mut().find(|e| e.destination == destination) {
            Some(edge) => edge.transitions.push(transition),
            None => group.edges.push(Edge {
                destination,
                transitions: vec![transition],
            }),
        }
        self.order.push(id);
        id
    }

    /// Install an end transition, returning the one it replaced.
    pub(crate) fn insert_end(&mut self, origin: StateKey, transition: Transition<C>) -> (TransitionId, Option<Transition<C>>) {
        let replaced = self.remove_end(origin);
        let id = transition.id();
        self.end.push(transition);
        self.order.push(id);
        (id, replaced)
    }

    pub(crate) fn remove(&mut self, id: TransitionId) -> Option<Transition<C>> {
        let mut removed = None;

        for group in &mut self.global {
            if let Some(pos) = group.transitions.iter().position(|t| t.id() == id) {
                removed = Some(group.transitions.remove(pos));
                break;
            }
        }

        if removed.is_none() {
            'outer: for group in &mut self.local {
                for edge in &mut group.edges {
                    if let Some(pos) = edge.transitions.iter().position(|t| t.id() == id) {
                        removed = Some(edge.transitions.remove(pos));
                        break 'outer;
                    }
                }
            }
        }

        if removed.is_none() {
            if let Some(pos) = self.end.iter().position(|t| t.id() == id) {
                removed = Some(self.end.remove(pos));
            }
        }

        if removed.is_some() {
            self.order.retain(|o| *o != id);
            self.prune();
        }
        removed
    }

    /// Drop every global transition into `destination`.
    pub(crate) fn remove_global(&mut self, destination: StateKey) -> Vec<Transition<C>> {
        let mut removed = Vec::new();
        self.global.retain_mut(|g| {
            if g.destination == destination {
                removed.append(&mut g.transitions);
                false
            } else {
                true
            }
        });
        self.forget(&removed);
        removed
    }

    /// Drop every local transition on the `origin -> destination` edge.
    pub(crate) fn remove_local(&mut self, origin: StateKey, destination: StateKey) -> Vec<Transition<C>> {
        let mut removed = Vec::new();
        for group in self.local.iter_mut().filter(|l| l.origin == origin) {
            group.edges.retain_mut(|e| {
                if e.destination == destination {
                    removed.append(&mut e.transitions);
                    false
                } else {
                    true
                }
            });
        }
        self.forget(&removed);
        self.prune();
        removed
    }

    pub(crate) fn remove_end(&mut self, origin: StateKey) -> Option<Transition<C>> {
        let pos = self.end.iter().position(|t| t.origin() == Some(origin))?;
        let removed = self.end.remove(pos);
        self.order.retain(|o| *o != removed.id());
        Some(removed)
    }

    /// Drop every transition touching `key`, as origin or destination.
    pub(crate) fn purge_state(&mut self, key: StateKey) -> usize {
        let mut removed = self.remove_global(key);

        self.local.retain_mut(|l| {
            if l.origin == key {
                removed.extend(l.edges.drain(..).flat_map(|e| e.transitions));
                false
            } else {
                true
            }
        });
        for group in &mut self.local {
            group.edges.retain_mut(|e| {
                if e.destination == key {
                    removed.append(&mut e.transitions);
                    false
                } else {
                    true
                }
            });
        }

        let (touching, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.end)
            .into_iter()
            .partition(|t| t.origin() == Some(key) || t.destination() == key);
        self.end = kept;
        removed.extend(touching);

        self.forget(&removed);
        self.prune();
        removed.len()
    }

    pub(crate) fn clear(&mut self) {
        self.global.clear();
        self.local.clear();
        self.end.clear();
        self.order.clear();
    }

    fn forget(&mut self, removed: &[Transition<C>]) {
        self.order.retain(|id| removed.iter().all(|t| t.id() != *id));
    }

    fn prune(&mut self) {
        self.global.retain(|g| !g.transitions.is_empty());
        for group in &mut self.local {
            group.edges.retain(|e| !e.transitions.is_empty());
        }
        self.local.retain(|l| !l.edges.is_empty());
    }
}
