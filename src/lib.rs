//! Behavior Graph: a hierarchical behavior state machine for game AI
//!
//! A [`Sequence`] owns child states and a transition graph between them.
//! Every tick it lets the running child update, then resolves its links in a
//! fixed priority order: global links ("interrupt from anywhere"), local links
//! leaving the running child, and finally the running child's end link. The
//! first satisfied, cooled-down transition fires and nothing else is
//! evaluated until the next tick.
//!
//! Children can be sequences themselves, and a [`Parallel`] runs two branches
//! under one lifecycle, completing with its main branch.
//!
//! # Core Concepts
//!
//! - **State**: unit of behavior with optional tick facets (`core::State`)
//! - **Guard**: shareable condition with a stable identity (`core::Guard`)
//! - **Transition**: conditioned edge with execution quantity and cooldown
//! - **Machine**: driver owning the root, the host context and the clock
//!
//! # Example
//!
//! ```rust
//! use behavior_graph::core::{Guard, ManualClock, Probe, State};
//! use behavior_graph::graph::{LinkOptions, Sequence};
//! use behavior_graph::machine::Machine;
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct Senses {
//!     sees_target: bool,
//! }
//!
//! struct Patrol;
//! impl State<Senses> for Patrol {}
//! struct Chase;
//! impl State<Senses> for Chase {}
//!
//! let mut root: Sequence<Senses> = Sequence::new("Guard");
//! let patrol = root.add_state(Patrol);
//! let chase = root.add_state(Chase);
//! let sees = Guard::from_fn("sees_target", |p: &Probe<'_, Senses>| p.host().sees_target);
//! root.link_local(patrol, chase, sees, LinkOptions::default()).unwrap();
//!
//! let clock = ManualClock::new();
//! let mut machine = Machine::new(root, Senses::default()).with_clock(clock.clone());
//! machine.init().unwrap();
//! machine.start();
//!
//! machine.run_frame();
//! assert_eq!(machine.root().running(), Some(patrol));
//!
//! machine.host_mut().sees_target = true;
//! clock.advance(Duration::from_millis(16));
//! machine.run_frame();
//! assert_eq!(machine.root().running(), Some(chase));
//! ```

pub mod builder;
pub mod core;
pub mod graph;
pub mod machine;
pub mod snapshot;
pub mod validation;

// Re-export commonly used types
pub use builder::{LinkBuilder, MachineBuilder, SequenceBuilder};
pub use core::{Capabilities, Condition, Frame, Guard, Probe, State, Status};
pub use graph::{LinkOptions, Parallel, Sequence, StateKey, TransitionKind};
pub use machine::{Machine, MachineStatus, TickKind};
pub use snapshot::Snapshot;
