//! The executable tree.
//!
//! A [`Sequence`] owns its children as [`StateNode`]s, addressed by
//! [`StateKey`], and the [`Transition`]s between them. [`Parallel`] runs two
//! branches under one lifecycle. Everything here is driven by calls coming
//! from the machine; nothing schedules itself.

mod conditions;
mod error;
mod leaves;
mod links;
mod node;
mod parallel;
mod sequence;
mod transition;

pub use conditions::{PastCooldown, StateEnded};
pub use error::GraphError;
pub use leaves::{Delay, Forced};
pub use links::{Edge, GlobalLinks, LinkTables, LocalLinks};
pub use node::{StateId, StateKey, StateNode};
pub use parallel::Parallel;
pub use sequence::{Sequence, SequenceEvent, TickOutcome};
pub use transition::{
    Cooldown, CooldownAnchor, ExecutionPolicy, LinkOptions, Transition, TransitionId, TransitionInfo, TransitionKind,
};

pub(crate) use node::panic_message;
