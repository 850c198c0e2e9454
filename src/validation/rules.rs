//! Graph rules checked with Validation.

use crate::graph::{GraphError, Sequence};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for per-sequence check functions
pub type GraphCheck<C> = Box<dyn Fn(&Sequence<C>) -> Validation<(), NonEmptyVec<GraphError>> + Send + Sync>;

/// Rules applied to every sequence of a tree.
/// Uses Validation to accumulate ALL problems.
pub struct GraphRules<C = ()> {
    checks: Vec<GraphCheck<C>>,
}

impl<C: 'static> GraphRules<C> {
    /// Rules with no checks at all.
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    /// Add a custom check.
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&Sequence<C>) -> Validation<(), NonEmptyVec<GraphError>> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    /// Add a predicate check producing `error` when it fails.
    pub fn require_pred<F, E>(mut self, predicate: F, error: E) -> Self
    where
        F: Fn(&Sequence<C>) -> bool + Send + Sync + 'static,
        E: Fn(&Sequence<C>) -> GraphError + Send + Sync + 'static,
    {
        let check = move |seq: &Sequence<C>| {
            if predicate(seq) {
                Validation::success(())
            } else {
                Validation::fail(error(seq))
            }
        };
        self.checks.push(Box::new(check));
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check against `root` and each nested sequence.
    /// Returns Validation::Failure with ALL problems if any check fails.
    pub fn validate(&self, root: &Sequence<C>) -> Validation<(), NonEmptyVec<GraphError>> {
        let checks: Vec<Validation<(), NonEmptyVec<GraphError>>> = root
            .walk()
            .into_iter()
            .flat_map(|seq| self.checks.iter().map(move |check| check(seq)))
            .collect();

        Validation::all_vec(checks).map(|_| ())
    }
}

impl<C: 'static> Default for GraphRules<C> {
    /// The built-in rules: a non-empty sequence needs an entry point.
    fn default() -> Self {
        Self::empty().require(has_startable_state)
    }
}

/// A sequence with children must have a startable child.
pub fn has_startable_state<C: 'static>(seq: &Sequence<C>) -> Validation<(), NonEmptyVec<GraphError>> {
    if seq.state_count() == 0 || seq.startable().is_some() {
        Validation::success(())
    } else {
        Validation::fail(GraphError::MissingStartableState {
            sequence: seq.name().to_string(),
        })
    }
}

/// Check a whole tree with the built-in rules.
pub fn validate<C: 'static>(root: &Sequence<C>) -> Validation<(), NonEmptyVec<GraphError>> {
    GraphRules::default().validate(root)
}
