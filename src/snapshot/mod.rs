//! Read-only pictures of a live tree.
//!
//! A snapshot records what inspection tooling needs to render a machine:
//! every sequence with its children, running/current/startable children and
//! every link with its policy, executed count and cooldown. Behavior (states,
//! conditions, hooks) is not serializable and is not captured.
//!
//! Snapshots are encoded as JSON with `serde_json` or as binary with
//! `bincode`. Decoding rejects snapshots written by another format version.

use crate::core::Status;
use crate::graph::{
    Cooldown, ExecutionPolicy, Parallel, Sequence, StateId, StateKey, StateNode, TransitionId, TransitionKind,
};
use crate::machine::MachineStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable picture of a machine's tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// Wall-clock time the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Machine clock reading at capture
    pub clock: Duration,

    pub status: MachineStatus,

    pub root: SequenceSnapshot,
}

/// One sequence of the tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceSnapshot {
    pub name: String,
    pub status: Status,
    pub paused: bool,
    pub reset_state_at_start: bool,
    pub running: Option<StateKey>,
    pub current: Option<StateKey>,
    pub startable: Option<StateKey>,
    pub states: Vec<NodeSnapshot>,
    /// Links in declaration order
    pub links: Vec<LinkSnapshot>,
    /// Names of the states entered, oldest first
    pub path: Vec<String>,
}

/// One child of a sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub key: StateKey,
    pub id: StateId,
    pub name: String,
    pub tag: Option<String>,
    pub endable: bool,
    pub running: bool,
    pub last_exit: Option<Duration>,
    pub nested: Option<Nested>,
}

/// Composite content of a child.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Nested {
    Sequence(Box<SequenceSnapshot>),
    Parallel {
        main: Box<NodeSnapshot>,
        parallel: Box<NodeSnapshot>,
    },
}

/// One transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub origin: Option<StateKey>,
    pub destination: StateKey,
    pub condition: Option<String>,
    pub policy: ExecutionPolicy,
    pub executed: u32,
    pub cooldown: Cooldown,
    /// Time left before the link may fire again
    pub cooldown_remaining: Duration,
}

impl Snapshot {
    /// Capture `root` as seen at `now`.
    pub fn capture<C: 'static>(root: &Sequence<C>, status: MachineStatus, now: Duration) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            clock: now,
            status,
            root: SequenceSnapshot::capture(root, now),
        }
    }

    /// Serialize snapshot to JSON format.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize snapshot from JSON format.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Serialize snapshot to binary format.
    pub fn to_binary(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Deserialize snapshot from binary format.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Names of the running chain, root first.
    pub fn running_path(&self) -> Vec<&str> {
        let mut path = vec![self.root.name.as_str()];
        self.root.running_chain(&mut path);
        path
    }

    /// First sequence named `name`, depth-first.
    pub fn find(&self, name: &str) -> Option<&SequenceSnapshot> {
        self.root.find(name)
    }

    fn check_version(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}

impl SequenceSnapshot {
    pub fn capture<C: 'static>(seq: &Sequence<C>, now: Duration) -> Self {
        let links = seq
            .links()
            .iter()
            .map(|t| LinkSnapshot {
                id: t.id(),
                kind: t.kind(),
                origin: t.origin(),
                destination: t.destination(),
                condition: t.guard().map(|g| g.name().to_string()),
                policy: t.policy(),
                executed: t.executed(),
                cooldown: t.cooldown(),
                cooldown_remaining: t.remaining_cooldown(now),
            })
            .collect();

        Self {
            name: seq.name().to_string(),
            status: seq.status(),
            paused: seq.is_paused(),
            reset_state_at_start: seq.reset_state_at_start(),
            running: seq.running(),
            current: seq.current(),
            startable: seq.startable(),
            states: seq.states().map(|(key, node)| NodeSnapshot::capture(key, node, now)).collect(),
            links,
            path: seq.history().get_path().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn state(&self, key: StateKey) -> Option<&NodeSnapshot> {
        self.states.iter().find(|node| node.key == key)
    }

    pub fn running_state(&self) -> Option<&NodeSnapshot> {
        self.running.and_then(|key| self.state(key))
    }

    fn running_chain<'a>(&'a self, path: &mut Vec<&'a str>) {
        if let Some(node) = self.running_state() {
            path.push(&node.name);
            node.running_chain(path);
        }
    }

    fn find(&self, name: &str) -> Option<&SequenceSnapshot> {
        if self.name == name {
            return Some(self);
        }
        self.states.iter().find_map(|node| node.find(name))
    }
}

impl NodeSnapshot {
    fn capture<C: 'static>(key: StateKey, node: &StateNode<C>, now: Duration) -> Self {
        let state = node.state();
        let nested = match (state.as_sequence(), state.as_parallel()) {
            (Some(seq), _) => Some(Nested::Sequence(Box::new(SequenceSnapshot::capture(seq, now)))),
            (None, Some(parallel)) => Some(capture_parallel(parallel, now)),
            (None, None) => None,
        };

        Self {
            key,
            id: node.id(),
            name: node.name().to_string(),
            tag: node.tag().map(str::to_string),
            endable: node.is_endable(),
            running: node.is_running(),
            last_exit: node.last_exit(),
            nested,
        }
    }

    fn running_chain<'a>(&'a self, path: &mut Vec<&'a str>) {
        match &self.nested {
            Some(Nested::Sequence(seq)) => seq.running_chain(path),
            Some(Nested::Parallel { main, .. }) => {
                path.push(&main.name);
                main.running_chain(path);
            }
            None => {}
        }
    }

    fn find(&self, name: &str) -> Option<&SequenceSnapshot> {
        match &self.nested {
            Some(Nested::Sequence(seq)) => seq.find(name),
            Some(Nested::Parallel { main, parallel }) => main.find(name).or_else(|| parallel.find(name)),
            None => None,
        }
    }
}

fn capture_parallel<C: 'static>(parallel: &Parallel<C>, now: Duration) -> Nested {
    // Branch keys are positional: main first.
    Nested::Parallel {
        main: Box::new(NodeSnapshot::capture(StateKey::new(0), parallel.main(), now)),
        parallel: Box::new(NodeSnapshot::capture(StateKey::new(1), parallel.parallel(), now)),
    }
}
