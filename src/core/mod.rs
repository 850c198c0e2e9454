//! Vocabulary shared by the whole graph.
//!
//! This module contains the pieces that do not own other states:
//! - Tri-state [`Status`] values
//! - The [`State`] trait and its [`Capabilities`]
//! - Conditions, the [`Guard`] handle and the combinators
//! - Per-call contexts ([`Frame`], [`Probe`]) and time sources
//! - Bounded transition history

mod clock;
mod combinators;
mod context;
mod guard;
mod history;
mod state;
mod status;

pub use clock::{Clock, ManualClock, SystemClock};
pub use combinators::{Inverter, Selector, Sequencer};
pub use context::{Frame, Probe};
pub use guard::{Condition, ConditionId, FnCondition, Guard};
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_LIMIT};
pub use state::{AsAny, Capabilities, State};
pub use status::Status;
