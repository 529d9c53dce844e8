//! Error types for the bot binary.
//!
//! [`BotError`] wraps every failure that can end the process. Per-turn
//! failures inside the session loop are logged and do not surface here.

/// Top-level error for the bot binary.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: colony_core::ConfigError,
    },

    /// The match service could not be reached or refused us.
    #[error("arena error: {source}")]
    Arena {
        /// The underlying client error.
        #[from]
        source: crate::arena::ArenaError,
    },

    /// Filesystem access for recording or replay failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// The replay directory is unusable.
    #[error("replay error: {message}")]
    Replay {
        /// What is wrong with it.
        message: String,
    },
}
