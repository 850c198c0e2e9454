//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::sequence::SequenceBuilder;
use crate::core::Clock;
use crate::graph::Sequence;
use crate::machine::{Machine, MachineConfig};
use crate::validation::GraphRules;

/// Builder for constructing machines with a fluent API.
pub struct MachineBuilder<C = ()> {
    host: Option<C>,
    root: Option<Sequence<C>>,
    clock: Option<Box<dyn Clock>>,
    config: MachineConfig,
    rules: GraphRules<C>,
}

impl<C: 'static> MachineBuilder<C> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            host: None,
            root: None,
            clock: None,
            config: MachineConfig::default(),
            rules: GraphRules::default(),
        }
    }

    /// Set the host context (required).
    pub fn host(mut self, host: C) -> Self {
        self.host = Some(host);
        self
    }

    /// Set the root sequence (required).
    pub fn root(mut self, root: Sequence<C>) -> Self {
        self.root = Some(root);
        self
    }

    /// Build the root from a sequence builder.
    pub fn root_builder(mut self, builder: SequenceBuilder<C>) -> Result<Self, BuildError> {
        self.root = Some(builder.build()?);
        Ok(self)
    }

    /// Use `clock` instead of the system clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Checks run at init, replacing the built-in ones.
    pub fn rules(mut self, rules: GraphRules<C>) -> Self {
        self.rules = rules;
        self
    }

    /// Build the machine.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<Machine<C>, BuildError> {
        let root = self.root.ok_or(BuildError::MissingRoot)?;
        let host = self.host.ok_or(BuildError::MissingHost)?;

        let machine = Machine::new(root, host).with_config(self.config).with_rules(self.rules);
        Ok(match self.clock {
            Some(clock) => machine.with_boxed_clock(clock),
            None => machine,
        })
    }
}

impl<C: 'static> Default for MachineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
