//! Error types for the colony-agents crate.
//!
//! Nothing in the per-tick agent logic fails: unreachable goals, slot
//! exhaustion, and vanished targets are all recovered by holding and
//! re-planning. The only errors are tunables that would make the
//! machinery meaningless.

/// Errors that can occur while validating agent configuration.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A behavior or station parameter is out of range.
    #[error("invalid {field}: {reason}")]
    InvalidConfig {
        /// The offending configuration key.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
