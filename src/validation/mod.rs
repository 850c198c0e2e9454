//! Init-time checks over a whole graph.
//!
//! Mutation calls already reject malformed links one at a time. The checks
//! here look at the finished tree and use Stillwater's `Validation` type to
//! report ALL problems in one pass, so an authored graph can be fixed
//! without a round trip per error.
//!
//! # Example
//!
//! ```rust
//! use behavior_graph::graph::{Forced, Sequence};
//! use behavior_graph::validation::{validate, GraphRules};
//!
//! let mut root: Sequence = Sequence::new("Root");
//! root.add_state(Forced);
//!
//! assert!(validate(&root).is_success());
//!
//! let strict = GraphRules::default().require_pred(
//!     |seq: &Sequence| seq.links().len() > 0,
//!     |seq: &Sequence| behavior_graph::graph::GraphError::InvalidLink {
//!         sequence: seq.name().to_string(),
//!         kind: "any".into(),
//!         reason: "sequence has no links".into(),
//!     },
//! );
//! assert!(strict.validate(&root).is_failure());
//! ```

pub mod reachability;
pub mod rules;

pub use reachability::unreachable_states;
pub use rules::{has_startable_state, validate, GraphCheck, GraphRules};
