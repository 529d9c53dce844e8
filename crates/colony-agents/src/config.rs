//! Behavior and station layout tunables.
//!
//! Both structs deserialize from the `behavior` and `stations` sections of
//! `colony-config.yaml`; every key is optional and falls back to the
//! defaults documented on each field.

use serde::Deserialize;

use crate::error::AgentError;

/// What an agent without a station does each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdlePolicyKind {
    /// Stay put.
    #[default]
    Hold,
    /// Step onto a random free neighbor.
    Wander,
}

/// Per-role behavior parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BehaviorConfig {
    /// Hop radius of the gatherer's local resource scan (default: 4).
    #[serde(default = "default_search_radius")]
    pub search_radius: u32,

    /// An idle gatherer scans on its first idle tick and then every this
    /// many ticks (default: 5).
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u32,

    /// When the local scan finds nothing, fall back to the nearest
    /// unreserved resource anywhere on the map (default: true).
    #[serde(default = "default_global_fallback")]
    pub global_fallback: bool,

    /// Policy for agents that could not be given a station.
    #[serde(default)]
    pub idle_policy: IdlePolicyKind,

    /// Seed for the wander policy's random generator (default: 0).
    #[serde(default)]
    pub wander_seed: u64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            search_radius: default_search_radius(),
            scan_interval: default_scan_interval(),
            global_fallback: default_global_fallback(),
            idle_policy: IdlePolicyKind::default(),
            wander_seed: 0,
        }
    }
}

impl BehaviorConfig {
    /// Reject parameters the state machines cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] when `scan_interval` is zero.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.scan_interval == 0 {
            return Err(AgentError::InvalidConfig {
                field: "behavior.scan_interval",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Whether an idle gatherer that has been idle for `idle_ticks` scans.
    pub const fn scans_on(&self, idle_ticks: u32) -> bool {
        match idle_ticks.checked_rem(self.scan_interval) {
            Some(rem) => rem == 0,
            None => true,
        }
    }
}

/// Station ring layout parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationConfig {
    /// Distance between consecutive rings (default: 4). Ring `k` sits
    /// `k * step` cells from the anchor.
    #[serde(default = "default_step")]
    pub step: u32,

    /// Upper bound on lazily generated rings (default: 12).
    #[serde(default = "default_max_rings")]
    pub max_rings: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            max_rings: default_max_rings(),
        }
    }
}

impl StationConfig {
    /// Reject layouts that would collapse slots onto each other.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] when `step` is below 2 (edge
    /// midpoints would coincide with corners) or `max_rings` is zero.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.step < 2 {
            return Err(AgentError::InvalidConfig {
                field: "stations.step",
                reason: format!("must be at least 2, got {}", self.step),
            });
        }
        if self.max_rings == 0 {
            return Err(AgentError::InvalidConfig {
                field: "stations.max_rings",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

const fn default_search_radius() -> u32 {
    4
}

const fn default_scan_interval() -> u32 {
    5
}

const fn default_global_fallback() -> bool {
    true
}

const fn default_step() -> u32 {
    4
}

const fn default_max_rings() -> u32 {
    12
}
