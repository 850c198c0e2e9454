//! Driver configuration.

use super::error::MachineError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How [`Machine::advance`](super::Machine::advance) paces frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateMode {
    /// Every call runs a full frame.
    #[default]
    EveryFrame,
    /// A frame runs once at least `tick_interval` has passed since the last.
    Interval,
}

/// Machine configuration, loadable from JSON.
///
/// Missing fields take their defaults:
///
/// ```rust
/// use behavior_graph::machine::{MachineConfig, UpdateMode};
/// use std::time::Duration;
///
/// let config = MachineConfig::from_json(r#"{ "update_mode": "Interval" }"#).unwrap();
/// assert_eq!(config.update_mode, UpdateMode::Interval);
/// assert_eq!(config.tick_interval, Duration::from_millis(100));
/// assert_eq!(config.history_limit, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub update_mode: UpdateMode,
    /// Minimum spacing between frames under [`UpdateMode::Interval`]
    pub tick_interval: Duration,
    /// History cap applied to every sequence at init
    pub history_limit: Option<usize>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            update_mode: UpdateMode::EveryFrame,
            tick_interval: Duration::from_millis(100),
            history_limit: None,
        }
    }
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, MachineError> {
        serde_json::from_str(json).map_err(|e| MachineError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, MachineError> {
        serde_json::to_string_pretty(self).map_err(|e| MachineError::InvalidConfig(e.to_string()))
    }

    /// Reject settings the driver cannot honor.
    pub fn check(&self) -> Result<(), MachineError> {
        if self.update_mode == UpdateMode::Interval && self.tick_interval.is_zero() {
            return Err(MachineError::InvalidConfig(
                "interval mode needs a non-zero tick_interval".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runs_every_frame() {
        let config = MachineConfig::default();
        assert_eq!(config.update_mode, UpdateMode::EveryFrame);
        assert!(config.check().is_ok());
    }

    #[test]
    fn json_round_trip_keeps_every_field() {
        let config = MachineConfig {
            update_mode: UpdateMode::Interval,
            tick_interval: Duration::from_millis(250),
            history_limit: Some(8),
        };
        let json = config.to_json().unwrap();
        assert_eq!(MachineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let result = MachineConfig::from_json("{ not json");
        assert!(matches!(result, Err(MachineError::InvalidConfig(_))));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = MachineConfig {
            update_mode: UpdateMode::Interval,
            tick_interval: Duration::ZERO,
            history_limit: None,
        };
        assert!(matches!(config.check(), Err(MachineError::InvalidConfig(_))));
    }
}
