//! Condition combinators.
//!
//! Combinators are conditions themselves, so they nest freely. They change
//! how predicates compose without touching the graph.

use super::context::Probe;
use super::guard::{Condition, Guard};
use super::status::Status;

fn joined<C>(guards: &[Guard<C>], separator: &str, open: &str, close: &str) -> String {
    let inner = guards
        .iter()
        .map(Guard::name)
        .collect::<Vec<_>>()
        .join(separator);
    format!("{open} {inner} {close}")
}

/// OR: succeeds on the first child that succeeds, left to right.
pub struct Selector<C = ()> {
    name: String,
    conditions: Vec<Guard<C>>,
}

impl<C> Selector<C> {
    pub fn new(conditions: Vec<Guard<C>>) -> Self {
        Self {
            name: joined(&conditions, " || ", "(", ")"),
            conditions,
        }
    }

    pub fn conditions(&self) -> &[Guard<C>] {
        &self.conditions
    }
}

impl<C> Condition<C> for Selector<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, probe: &Probe<'_, C>) -> Status {
        let any = self
            .conditions
            .iter()
            .any(|c| c.evaluate(probe) == Status::Succeeded);
        Status::from(any)
    }
}

/// AND: fails on the first child that fails, left to right.
///
/// A `Running` child does not stop the scan and does not fail the whole.
pub struct Sequencer<C = ()> {
    name: String,
    conditions: Vec<Guard<C>>,
}

impl<C> Sequencer<C> {
    pub fn new(conditions: Vec<Guard<C>>) -> Self {
        Self {
            name: joined(&conditions, " && ", "[", "]"),
            conditions,
        }
    }

    pub fn conditions(&self) -> &[Guard<C>] {
        &self.conditions
    }
}

impl<C> Condition<C> for Sequencer<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, probe: &Probe<'_, C>) -> Status {
        let failed = self
            .conditions
            .iter()
            .any(|c| c.evaluate(probe) == Status::Failure);
        Status::from(!failed)
    }
}

/// NOT: swaps `Succeeded` and `Failure`; `Running` collapses to `Failure`.
pub struct Inverter<C = ()> {
    name: String,
    condition: Guard<C>,
}

impl<C> Inverter<C> {
    pub fn new(condition: Guard<C>) -> Self {
        Self {
            name: format!("!{}", condition.name()),
            condition,
        }
    }
}

impl<C> Condition<C> for Inverter<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, probe: &Probe<'_, C>) -> Status {
        self.condition.evaluate(probe).invert()
    }
}
