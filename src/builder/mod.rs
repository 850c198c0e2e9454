//! Builder API for declarative graph construction.
//!
//! The builders turn a description written with state *names* into a live
//! [`Sequence`](crate::graph::Sequence) or [`Machine`](crate::machine::Machine).
//! Links are resolved through the mutation API in declaration order, so the
//! same validation applies as when linking by hand.

pub mod error;
pub mod link;
pub mod machine;
pub mod macros;
pub mod sequence;

pub use error::BuildError;
pub use link::LinkBuilder;
pub use machine::MachineBuilder;
pub use sequence::SequenceBuilder;

use crate::core::State;
use crate::graph::Sequence;

/// Build a sequence whose states run one after another, each ending into
/// the next through an end link.
///
/// Every state but the last must be endable.
///
/// # Example
///
/// ```
/// use behavior_graph::builder::chain;
/// use behavior_graph::graph::{Forced, Sequence};
///
/// let seq: Sequence = chain("Intro", vec![Forced, Forced]).unwrap();
/// assert_eq!(seq.links().end().len(), 1);
/// ```
pub fn chain<C, S>(name: impl Into<String>, states: Vec<S>) -> Result<Sequence<C>, BuildError>
where
    C: 'static,
    S: State<C>,
{
    let mut seq = Sequence::new(name);
    let keys: Vec<_> = states.into_iter().map(|state| seq.add_state(state)).collect();
    for pair in keys.windows(2) {
        seq.link_end(pair[0], pair[1], Default::default())?;
    }
    Ok(seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Frame;
    use crate::graph::{Delay, TransitionKind};
    use std::time::Duration;

    #[test]
    fn chain_links_each_state_to_the_next() {
        let mut seq: Sequence = chain(
            "Countdown",
            vec![Delay::new(Duration::from_secs(1)), Delay::new(Duration::from_secs(1))],
        )
        .unwrap();

        assert!(seq.links().iter().all(|t| t.kind() == TransitionKind::End));

        let mut host = ();
        seq.start(&mut Frame::new(&mut host, Duration::ZERO));
        let first = seq.running();
        seq.late_update_tree(&mut Frame::new(&mut host, Duration::from_secs(1)));
        assert_ne!(seq.running(), first);
    }

    #[test]
    fn chain_requires_endable_states() {
        struct Plain;
        impl State for Plain {}

        let result: Result<Sequence, _> = chain("Bad", vec![Plain, Plain]);
        assert!(matches!(result, Err(BuildError::Graph(_))));
    }
}
