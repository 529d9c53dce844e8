//! Configuration loading and typed config structures for the colony
//! coordinator.
//!
//! The canonical configuration lives in `colony-config.yaml` at the project
//! root. Every section and every key is optional; missing values fall back
//! to the defaults documented on each field. The terrain, behavior and
//! station sections are owned by the crates that use them and are only
//! assembled here.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use colony_agents::{AgentError, BehaviorConfig, StationConfig};
use colony_types::Role;
use colony_world::{TerrainTable, WorldError};
use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The terrain table is unusable.
    #[error("invalid terrain table: {source}")]
    World {
        /// The underlying validation error.
        #[from]
        source: WorldError,
    },

    /// A behavior or station parameter is out of range.
    #[error("{source}")]
    Agents {
        /// The underlying validation error.
        #[from]
        source: AgentError,
    },

    /// Any other out-of-range value.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// The offending configuration key.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level coordinator configuration.
///
/// Mirrors the structure of `colony-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColonyConfig {
    /// Move cost and danger penalty per terrain kind.
    #[serde(default)]
    pub terrain: TerrainTable,

    /// Hostile danger overlay.
    #[serde(default)]
    pub danger: DangerConfig,

    /// Per-role behavior parameters.
    #[serde(default)]
    pub behavior: BehaviorConfig,

    /// Station ring layout.
    #[serde(default)]
    pub stations: StationConfig,

    /// Remote arena connection.
    #[serde(default)]
    pub arena: ArenaConfig,

    /// Offline sandbox arena.
    #[serde(default)]
    pub sandbox: SandboxConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Which snapshot source drives the session, and for how long.
    #[serde(default)]
    pub session: SessionConfig,
}

impl ColonyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `COLONY_API_URL` overrides `arena.url`
    /// - `COLONY_API_TOKEN` overrides `arena.token`
    /// - `COLONY_MODE` overrides `session.mode`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or one of the
    /// validation variants if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment
    /// overrides, and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or one
    /// of the validation variants if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `COLONY_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("COLONY_API_URL") {
            self.arena.url = val;
        }
        if let Ok(val) = std::env::var("COLONY_API_TOKEN") {
            self.arena.token = val;
        }
        if let Ok(val) = std::env::var("COLONY_MODE") {
            match val.parse() {
                Ok(mode) => self.session.mode = mode,
                Err(reason) => warn!(value = %val, reason = %reason, "Ignoring COLONY_MODE"),
            }
        }
    }

    /// Check every section for values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        self.behavior.validate()?;
        self.stations.validate()?;
        self.arena.validate()?;
        self.sandbox.validate()?;
        Ok(())
    }
}

/// Hostile danger overlay settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DangerConfig {
    /// Penalty added to each neighbor of a visible hostile (default: 20).
    /// Overlapping halos add up.
    #[serde(default = "default_halo_penalty")]
    pub halo_penalty: u32,
}

impl Default for DangerConfig {
    fn default() -> Self {
        Self {
            halo_penalty: default_halo_penalty(),
        }
    }
}

/// Remote arena connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArenaConfig {
    /// Base URL of the match service.
    #[serde(default = "default_arena_url")]
    pub url: String,

    /// Value of the `X-Auth-Token` header. Usually supplied through
    /// `COLONY_API_TOKEN` rather than the file.
    #[serde(default)]
    pub token: String,

    /// Seconds between registration attempts (default: 5).
    #[serde(default = "default_register_retry_secs")]
    pub register_retry_secs: u64,

    /// Give up registering after this many seconds (default: 300).
    #[serde(default = "default_register_window_secs")]
    pub register_window_secs: u64,

    /// Minimum milliseconds between two outbound requests (default: 667,
    /// about 1.5 requests per second).
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,

    /// Per-request timeout in milliseconds (default: 5000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            url: default_arena_url(),
            token: String::new(),
            register_retry_secs: default_register_retry_secs(),
            register_window_secs: default_register_window_secs(),
            request_interval_ms: default_request_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ArenaConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "arena.url",
                reason: "must not be empty".to_owned(),
            });
        }
        if self.register_retry_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "arena.register_retry_secs",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "arena.request_timeout_ms",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Movement points per tick for each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MovementPoints {
    /// Gatherer budget (default: 4).
    #[serde(default = "default_gatherer_points")]
    pub gatherer: u32,
    /// Scout budget (default: 7).
    #[serde(default = "default_scout_points")]
    pub scout: u32,
    /// Defender budget (default: 4).
    #[serde(default = "default_defender_points")]
    pub defender: u32,
}

impl Default for MovementPoints {
    fn default() -> Self {
        Self {
            gatherer: default_gatherer_points(),
            scout: default_scout_points(),
            defender: default_defender_points(),
        }
    }
}

impl MovementPoints {
    /// Budget for `role`.
    pub const fn of(&self, role: Role) -> u32 {
        match role {
            Role::Gatherer => self.gatherer,
            Role::Scout => self.scout,
            Role::Defender => self.defender,
        }
    }
}

/// Offline sandbox arena settings.
///
/// Percentages are in whole percent of generated cells.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SandboxConfig {
    /// Random seed; the same seed replays the same match (default: 7).
    #[serde(default = "default_sandbox_seed")]
    pub seed: u64,

    /// Hex radius of the generated map around the anchor (default: 14).
    #[serde(default = "default_sandbox_radius")]
    pub radius: u32,

    /// Agents see terrain this many steps around themselves and the homes
    /// (default: 4).
    #[serde(default = "default_vision")]
    pub vision: u32,

    /// Share of rough cells (default: 15).
    #[serde(default = "default_rough_percent")]
    pub rough_percent: u32,

    /// Share of hazard cells (default: 5).
    #[serde(default = "default_hazard_percent")]
    pub hazard_percent: u32,

    /// Share of obstacle cells (default: 10).
    #[serde(default = "default_obstacle_percent")]
    pub obstacle_percent: u32,

    /// Gatherers spawned at start (default: 6).
    #[serde(default = "default_gatherers")]
    pub gatherers: u32,

    /// Scouts spawned at start (default: 3).
    #[serde(default = "default_scouts")]
    pub scouts: u32,

    /// Defenders spawned at start (default: 3).
    #[serde(default = "default_defenders")]
    pub defenders: u32,

    /// Resources placed at generation (default: 12).
    #[serde(default = "default_initial_resources")]
    pub initial_resources: u32,

    /// Resources spawned every turn (default: 1).
    #[serde(default = "default_resources_per_turn")]
    pub resources_per_turn: u32,

    /// Hostiles wandering the map (default: 2).
    #[serde(default = "default_hostiles")]
    pub hostiles: u32,

    /// Movement points per role.
    #[serde(default)]
    pub movement: MovementPoints,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            seed: default_sandbox_seed(),
            radius: default_sandbox_radius(),
            vision: default_vision(),
            rough_percent: default_rough_percent(),
            hazard_percent: default_hazard_percent(),
            obstacle_percent: default_obstacle_percent(),
            gatherers: default_gatherers(),
            scouts: default_scouts(),
            defenders: default_defenders(),
            initial_resources: default_initial_resources(),
            resources_per_turn: default_resources_per_turn(),
            hostiles: default_hostiles(),
            movement: MovementPoints::default(),
        }
    }
}

impl SandboxConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let terrain = self
            .rough_percent
            .saturating_add(self.hazard_percent)
            .saturating_add(self.obstacle_percent);
        if terrain > 100 {
            return Err(ConfigError::Invalid {
                field: "sandbox",
                reason: format!("terrain percentages add up to {terrain}, more than 100"),
            });
        }
        if self.radius < 2 {
            return Err(ConfigError::Invalid {
                field: "sandbox.radius",
                reason: format!("must be at least 2, got {}", self.radius),
            });
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (default: "info"). `RUST_LOG` wins
    /// when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text (default: false).
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Snapshot source for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Play against the remote match service.
    Arena,
    /// Feed recorded snapshots through the engine.
    Replay,
    /// Play in the offline sandbox.
    #[default]
    Sandbox,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Arena => "arena",
            Self::Replay => "replay",
            Self::Sandbox => "sandbox",
        };
        f.write_str(name)
    }
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arena" => Ok(Self::Arena),
            "replay" => Ok(Self::Replay),
            "sandbox" => Ok(Self::Sandbox),
            other => Err(format!("unknown session mode `{other}`")),
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Snapshot source (default: sandbox).
    #[serde(default)]
    pub mode: SessionMode,

    /// Stop after this many processed turns; unlimited when absent.
    #[serde(default)]
    pub max_turns: Option<u64>,

    /// When set, every fetched snapshot is written here as `NNNNN.json`.
    #[serde(default)]
    pub record_dir: Option<PathBuf>,

    /// Directory of recorded snapshots read in replay mode
    /// (default: "replays").
    #[serde(default = "default_replay_dir")]
    pub replay_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::default(),
            max_turns: None,
            record_dir: None,
            replay_dir: default_replay_dir(),
        }
    }
}

const fn default_halo_penalty() -> u32 {
    20
}

fn default_arena_url() -> String {
    "https://games-test.datsteam.dev".to_owned()
}

const fn default_register_retry_secs() -> u64 {
    5
}

const fn default_register_window_secs() -> u64 {
    300
}

const fn default_request_interval_ms() -> u64 {
    667
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

const fn default_gatherer_points() -> u32 {
    4
}

const fn default_scout_points() -> u32 {
    7
}

const fn default_defender_points() -> u32 {
    4
}

const fn default_sandbox_seed() -> u64 {
    7
}

const fn default_sandbox_radius() -> u32 {
    14
}

const fn default_vision() -> u32 {
    4
}

const fn default_rough_percent() -> u32 {
    15
}

const fn default_hazard_percent() -> u32 {
    5
}

const fn default_obstacle_percent() -> u32 {
    10
}

const fn default_gatherers() -> u32 {
    6
}

const fn default_scouts() -> u32 {
    3
}

const fn default_defenders() -> u32 {
    3
}

const fn default_initial_resources() -> u32 {
    12
}

const fn default_resources_per_turn() -> u32 {
    1
}

const fn default_hostiles() -> u32 {
    2
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_replay_dir() -> PathBuf {
    PathBuf::from("replays")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ColonyConfig::default();
        assert_eq!(config.danger.halo_penalty, 20);
        assert_eq!(config.behavior.scan_interval, 5);
        assert_eq!(config.stations.step, 4);
        assert_eq!(config.arena.request_interval_ms, 667);
        assert_eq!(config.arena.register_window_secs, 300);
        assert_eq!(config.sandbox.movement.of(Role::Scout), 7);
        assert_eq!(config.session.mode, SessionMode::Sandbox);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: ColonyConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, ColonyConfig::default());
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r"
terrain:
  rough:
    move_cost: 3
danger:
  halo_penalty: 35
behavior:
  search_radius: 6
  idle_policy: wander
stations:
  step: 5
sandbox:
  seed: 99
  movement:
    scout: 9
session:
  mode: replay
  max_turns: 40
  replay_dir: runs/run_05
";
        let config: ColonyConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.terrain.rough.move_cost, Some(3));
        assert_eq!(config.terrain.open.move_cost, Some(1));
        assert_eq!(config.danger.halo_penalty, 35);
        assert_eq!(config.behavior.search_radius, 6);
        assert_eq!(config.behavior.scan_interval, 5);
        assert_eq!(config.stations.step, 5);
        assert_eq!(config.sandbox.seed, 99);
        assert_eq!(config.sandbox.movement.scout, 9);
        assert_eq!(config.sandbox.movement.gatherer, 4);
        assert_eq!(config.session.mode, SessionMode::Replay);
        assert_eq!(config.session.max_turns, Some(40));
        assert_eq!(config.session.replay_dir, PathBuf::from("runs/run_05"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = ColonyConfig::default();
        config.stations.step = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Agents { .. })));

        let mut config = ColonyConfig::default();
        config.terrain.open.move_cost = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::World { .. })));

        let mut config = ColonyConfig::default();
        config.sandbox.obstacle_percent = 90;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "sandbox", .. })
        ));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = ColonyConfig::parse("terrain: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn session_mode_parses_loosely() {
        assert_eq!(" Arena ".parse::<SessionMode>(), Ok(SessionMode::Arena));
        assert_eq!("REPLAY".parse::<SessionMode>(), Ok(SessionMode::Replay));
        assert!("ladder".parse::<SessionMode>().is_err());
        assert_eq!(SessionMode::Sandbox.to_string(), "sandbox");
    }

    #[test]
    fn bundled_config_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../colony-config.yaml");
        let config = ColonyConfig::from_file(&path).unwrap();
        assert!(config.validate().is_ok());
    }
}
