//! The unit of behavior driven by the graph.
//!
//! A state only decides *what* happens while it runs. *When* it runs is
//! decided by the sequence that owns it.

use super::context::{Frame, Probe};
use super::status::Status;
use crate::graph::{Parallel, Sequence, StateNode, TransitionInfo};
use std::any::Any;

bitflags::bitflags! {
    /// Optional facets a state implements.
    ///
    /// Queried once when the state is registered and cached on its node, so
    /// per-tick dispatch only tests bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        /// Receives `update` every tick.
        const UPDATE = 1 << 0;
        /// Receives `fixed_update` every fixed step.
        const FIXED_UPDATE = 1 << 1;
        /// Receives `late_update` every tick, before link resolution.
        const LATE_UPDATE = 1 << 2;
        /// Reports completion through `end_condition`; may own an end link.
        const ENDABLE = 1 << 3;
    }
}

/// Downcasting support for `dyn State`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Trait for graph states.
///
/// `C` is the host context: an object owned by the machine and lent to
/// states on every call. The graph never reads or writes it.
///
/// Only `enter` and `exit` are triggered from outside. The tick facets are
/// called only when the matching bit is present in [`State::capabilities`].
///
/// # Example
///
/// ```rust
/// use behavior_graph::core::{Capabilities, Frame, Probe, State, Status};
/// use behavior_graph::graph::TransitionInfo;
///
/// struct Reload {
///     rounds: u32,
/// }
///
/// impl State for Reload {
///     fn name(&self) -> &str {
///         "Reload"
///     }
///
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::UPDATE | Capabilities::ENDABLE
///     }
///
///     fn enter(&mut self, _cx: &mut Frame<'_, ()>, _via: Option<&TransitionInfo>) {
///         self.rounds = 0;
///     }
///
///     fn update(&mut self, _cx: &mut Frame<'_, ()>) {
///         self.rounds += 1;
///     }
///
///     fn end_condition(&self, _probe: &Probe<'_, ()>) -> Status {
///         Status::from(self.rounds >= 6)
///     }
/// }
/// ```
pub trait State<C = ()>: AsAny + Send {
    /// Display name used by default for the owning node.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Facets this state implements.
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// One-time setup when the machine is initialized.
    fn init(&mut self, _host: &mut C) {}

    /// Called when the state becomes the running child. `via` describes the
    /// transition taken, or is `None` on sequence start.
    fn enter(&mut self, _cx: &mut Frame<'_, C>, _via: Option<&TransitionInfo>) {}

    fn exit(&mut self, _cx: &mut Frame<'_, C>) {}

    fn update(&mut self, _cx: &mut Frame<'_, C>) {}

    fn fixed_update(&mut self, _cx: &mut Frame<'_, C>) {}

    fn late_update(&mut self, _cx: &mut Frame<'_, C>) {}

    /// Completion check for the `ENDABLE` facet.
    fn end_condition(&self, _probe: &Probe<'_, C>) -> Status {
        Status::Failure
    }

    /// Stop dispatching without exiting. Composites override this.
    fn pause(&mut self) {}

    fn unpause(&mut self) {}

    /// Nested nodes, for lookups and inspection. Leaves have none.
    fn children(&self) -> Vec<&StateNode<C>> {
        Vec::new()
    }

    fn children_mut(&mut self) -> Vec<&mut StateNode<C>> {
        Vec::new()
    }

    fn as_sequence(&self) -> Option<&Sequence<C>> {
        None
    }

    fn as_sequence_mut(&mut self) -> Option<&mut Sequence<C>> {
        None
    }

    fn as_parallel(&self) -> Option<&Parallel<C>> {
        None
    }
}
