//! Hex colony bot.
//!
//! Loads configuration, picks a snapshot source, and runs the colony
//! coordinator turn by turn until the source runs out or the turn limit is
//! reached.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument, or
//!    `colony-config.yaml` (defaults plus environment overrides when absent)
//! 2. Initialize structured logging (tracing)
//! 3. Open the link for the configured mode: register with the match
//!    service, open a replay directory, or generate a sandbox match
//! 4. Run the session loop
//! 5. Log the summary

mod arena;
mod error;
mod replay;
mod session;
mod throttle;
mod wire;

use std::path::{Path, PathBuf};

use colony_core::config::{ColonyConfig, LoggingConfig, SessionMode};
use colony_core::{Colony, Sandbox};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::arena::ArenaClient;
use crate::error::BotError;
use crate::replay::{Recorder, ReplaySource};
use crate::session::{ArenaLink, Session};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, registration with the
/// match service fails, or the replay or record directory is unusable.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("colony-config.yaml"), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("colony-bot starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        mode = %config.session.mode,
        idle_policy = ?config.behavior.idle_policy,
        max_turns = ?config.session.max_turns,
        "Session configured"
    );

    // 3. Open the link.
    let link = open_link(&config).await?;
    let recorder = config
        .session
        .record_dir
        .as_deref()
        .map(Recorder::create)
        .transpose()?;
    if let Some(dir) = &config.session.record_dir {
        info!(dir = %dir.display(), "Recording snapshots");
    }

    // 4. Run.
    let max_turns = config.session.max_turns;
    let mut session = Session::new(Colony::new(config), link, recorder, max_turns);
    let summary = session.run().await;

    // 5. Report.
    info!(
        turns = summary.turns,
        last_turn = ?session.colony().last_turn(),
        idle_policy = session.colony().idle_policy(),
        delivered = summary.delivered,
        "colony-bot stopped"
    );
    Ok(())
}

/// Load configuration from `path`, or defaults with environment overrides
/// when the file does not exist. The flag says whether the file was read.
fn load_config(path: &Path) -> Result<(ColonyConfig, bool), BotError> {
    if path.exists() {
        Ok((ColonyConfig::from_file(path)?, true))
    } else {
        let mut config = ColonyConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok((config, false))
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

async fn open_link(config: &ColonyConfig) -> Result<ArenaLink, BotError> {
    match config.session.mode {
        SessionMode::Arena => {
            let mut client = ArenaClient::new(&config.arena)?;
            info!(url = %config.arena.url, "Registering with arena");
            client.register().await?;
            Ok(ArenaLink::Http(client))
        }
        SessionMode::Replay => {
            let source = ReplaySource::open(&config.session.replay_dir)?;
            info!(
                dir = %config.session.replay_dir.display(),
                frames = source.remaining(),
                "Replay opened"
            );
            Ok(ArenaLink::Replay(source))
        }
        SessionMode::Sandbox => {
            let sandbox = Sandbox::generate(&config.sandbox);
            info!(
                seed = config.sandbox.seed,
                radius = config.sandbox.radius,
                "Sandbox generated"
            );
            Ok(ArenaLink::Sandbox(Box::new(sandbox)))
        }
    }
}
