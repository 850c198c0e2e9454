//! Builder for constructing sequences from a declarative description.

use crate::builder::error::BuildError;
use crate::builder::link::LinkBuilder;
use crate::core::State;
use crate::graph::{Sequence, StateNode};

/// Builder for constructing sequences with a fluent API.
///
/// States are referred to by display name. Links are resolved at
/// [`SequenceBuilder::build`] through the sequence's mutation API, once per
/// link and in declaration order, so tie-breaks follow the order written.
///
/// # Example
///
/// ```rust
/// use behavior_graph::builder::{LinkBuilder, SequenceBuilder};
/// use behavior_graph::core::{Guard, State};
/// use behavior_graph::graph::Sequence;
///
/// struct Idle;
/// impl State for Idle {}
/// struct Patrol;
/// impl State for Patrol {}
///
/// let seq: Sequence = SequenceBuilder::new("Guard")
///     .state(Idle)
///     .state(Patrol)
///     .link(LinkBuilder::new().from("Idle").to("Patrol").when(Guard::always()))
///     .build()
///     .unwrap();
///
/// assert_eq!(seq.state_count(), 2);
/// assert_eq!(seq.links().len(), 1);
/// ```
pub struct SequenceBuilder<C = ()> {
    name: String,
    nodes: Vec<StateNode<C>>,
    startable: Option<String>,
    reset_state_at_start: bool,
    history_limit: Option<usize>,
    links: Vec<LinkBuilder<C>>,
}

impl<C: 'static> SequenceBuilder<C> {
    /// Create a new builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            startable: None,
            reset_state_at_start: true,
            history_limit: None,
            links: Vec::new(),
        }
    }

    /// Add a state under its own name.
    pub fn state<S: State<C>>(self, state: S) -> Self {
        self.node(StateNode::new(state))
    }

    /// Add a state under a chosen name.
    pub fn named<S: State<C>>(self, name: impl Into<String>, state: S) -> Self {
        self.node(StateNode::new(state).named(name))
    }

    /// Add a prepared node (tags, hooks).
    pub fn node(mut self, node: StateNode<C>) -> Self {
        self.nodes.push(node);
        self
    }

    /// Entry point. Defaults to the first state.
    pub fn startable(mut self, name: impl Into<String>) -> Self {
        self.startable = Some(name.into());
        self
    }

    /// Re-enter the last running state on start instead of the entry point.
    pub fn resume(mut self) -> Self {
        self.reset_state_at_start = false;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Add a link descriptor.
    pub fn link(mut self, link: LinkBuilder<C>) -> Self {
        self.links.push(link);
        self
    }

    /// Add multiple link descriptors at once.
    pub fn links(mut self, links: impl IntoIterator<Item = LinkBuilder<C>>) -> Self {
        self.links.extend(links);
        self
    }

    /// Build the sequence.
    /// Returns the first naming or linking error.
    pub fn build(self) -> Result<Sequence<C>, BuildError> {
        let mut seq = Sequence::new(self.name);
        seq.set_reset_state_at_start(self.reset_state_at_start);
        if let Some(limit) = self.history_limit {
            seq.set_history_limit(limit);
        }

        for node in self.nodes {
            if seq.key_of(node.name()).is_some() {
                return Err(BuildError::DuplicateStateName {
                    sequence: seq.name().to_string(),
                    name: node.name().to_string(),
                });
            }
            seq.add_node(node);
        }

        if let Some(name) = self.startable {
            let key = seq.key_of(&name).ok_or_else(|| BuildError::UnknownStateName {
                sequence: seq.name().to_string(),
                name,
            })?;
            seq.set_startable(key)?;
        }

        for link in self.links {
            link.apply(&mut seq)?;
        }

        tracing::debug!(
            sequence = %seq.name(),
            states = seq.state_count(),
            links = seq.links().len(),
            "Sequence built"
        );
        Ok(seq)
    }
}
