//! Children no resolution path can ever enter.

use crate::graph::{Sequence, StateKey};
use std::collections::{HashSet, VecDeque};

/// Children of `seq` that cannot be reached from the startable child
/// through local or end links and that no global link targets.
///
/// Forced entries can still reach them; this is a lint, not an error.
pub fn unreachable_states<C: 'static>(seq: &Sequence<C>) -> Vec<StateKey> {
    let links = seq.links();
    let mut seen: HashSet<StateKey> = links.global().iter().map(|g| g.destination()).collect();
    let mut queue: VecDeque<StateKey> = seen.iter().copied().collect();
    if let Some(start) = seq.startable() {
        if seen.insert(start) {
            queue.push_back(start);
        }
    }

    while let Some(key) = queue.pop_front() {
        let local = links
            .local_from(key)
            .into_iter()
            .flat_map(|group| group.edges().iter().map(|edge| edge.destination()));
        let end = links.end_from(key).map(|t| t.destination());

        for next in local.chain(end) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seq.states()
        .map(|(key, _)| key)
        .filter(|key| !seen.contains(key))
        .collect()
}
