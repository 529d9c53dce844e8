//! Engine core for the hex colony coordinator.
//!
//! This crate ties the world model and the agent machinery into a tick
//! cycle: one [`WorldSnapshot`](colony_types::WorldSnapshot) in, one
//! [`MovePlan`](colony_types::MovePlan) and one
//! [`TickReport`](colony_types::TickReport) out.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `colony-config.yaml`.
//! - [`sandbox`] -- Offline arena: map generation, resource spawning, move application.
//! - [`scheduler`] -- Per-tick destination conflict resolution.
//! - [`tick`] -- The ingest / cost model / FSM / schedule cycle.

pub mod config;
pub mod sandbox;
pub mod scheduler;
pub mod tick;

pub use config::{ColonyConfig, ConfigError, SessionMode};
pub use sandbox::{ApplyReport, Sandbox};
pub use scheduler::{MoveIntent, Resolution, resolve_moves};
pub use tick::{Colony, TickOutcome};
