//! The session loop: fetch a snapshot, tick the colony, submit the plan.
//!
//! Where snapshots come from is an [`ArenaLink`]: the live match service,
//! a recorded replay, or the offline sandbox. Failures on a single turn
//! (HTTP errors, bad JSON, a refused move request) are logged and the loop
//! carries on with the next snapshot.

use colony_core::{Colony, Sandbox};
use colony_types::MovePlan;
use tracing::{info, warn};

use crate::arena::{ArenaClient, ArenaError};
use crate::replay::{Recorder, ReplaySource};
use crate::wire::{ArenaState, MoveRequest};

/// Snapshot source and plan sink for one session.
#[derive(Debug)]
pub enum ArenaLink {
    /// The remote match service.
    Http(ArenaClient),
    /// A recording; plans are computed and dropped.
    Replay(ReplaySource),
    /// The offline sandbox.
    Sandbox(Box<Sandbox>),
}

impl ArenaLink {
    /// The next snapshot, or `Ok(None)` when the source is exhausted.
    async fn next_state(&mut self) -> Result<Option<ArenaState>, ArenaError> {
        match self {
            Self::Http(client) => client.fetch_arena().await.map(Some),
            Self::Replay(source) => Ok(source.next_state()),
            Self::Sandbox(sandbox) => Ok(Some(ArenaState::from_snapshot(&sandbox.snapshot()))),
        }
    }

    /// Hand a plan back. Returns the cargo delivered, when the link can
    /// tell.
    async fn submit(&mut self, plan: &MovePlan) -> Result<u32, ArenaError> {
        match self {
            Self::Http(client) => {
                client.submit_moves(&MoveRequest::from(plan)).await?;
                Ok(0)
            }
            Self::Replay(_) => Ok(0),
            Self::Sandbox(sandbox) => {
                let applied = sandbox.apply(plan);
                if !applied.rejected.is_empty() {
                    warn!(
                        turn = applied.turn,
                        rejected = applied.rejected.len(),
                        "Sandbox rejected moves"
                    );
                }
                Ok(applied.delivered)
            }
        }
    }

    /// Short name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Http(_) => "arena",
            Self::Replay(_) => "replay",
            Self::Sandbox(_) => "sandbox",
        }
    }
}

/// Totals for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Snapshots that produced a plan.
    pub turns: u64,
    /// Snapshots skipped as empty or repeated.
    pub skipped: u64,
    /// Snapshots lost to fetch or decode failures.
    pub failures: u64,
    /// Destination conflicts resolved over the session.
    pub conflicts: u64,
    /// Cargo delivered, as far as the link reports it.
    pub delivered: u64,
}

/// A colony wired to a link.
pub struct Session {
    colony: Colony,
    link: ArenaLink,
    recorder: Option<Recorder>,
    max_turns: Option<u64>,
}

impl Session {
    /// Assemble a session.
    pub const fn new(
        colony: Colony,
        link: ArenaLink,
        recorder: Option<Recorder>,
        max_turns: Option<u64>,
    ) -> Self {
        Self {
            colony,
            link,
            recorder,
            max_turns,
        }
    }

    /// The coordinator, for inspection after a run.
    pub const fn colony(&self) -> &Colony {
        &self.colony
    }

    /// Run until the link is exhausted or `max_turns` plans were made.
    pub async fn run(&mut self) -> SessionSummary {
        let mut summary = SessionSummary::default();
        info!(link = self.link.name(), max_turns = ?self.max_turns, "Session starting");

        while self.max_turns.is_none_or(|max| summary.turns < max) {
            let state = match self.link.next_state().await {
                Ok(Some(state)) => state,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to fetch arena state");
                    summary.failures = summary.failures.saturating_add(1);
                    continue;
                }
            };

            if let Some(recorder) = &self.recorder
                && let Err(e) = recorder.record(&state)
            {
                warn!(turn = state.turn_no, error = %e, "Failed to record snapshot");
            }

            let Some(outcome) = self.colony.tick(&state.into_snapshot()) else {
                summary.skipped = summary.skipped.saturating_add(1);
                continue;
            };
            summary.turns = summary.turns.saturating_add(1);
            summary.conflicts = summary
                .conflicts
                .saturating_add(u64::try_from(outcome.report.conflicts.len()).unwrap_or(u64::MAX));

            match self.link.submit(&outcome.plan).await {
                Ok(delivered) => {
                    summary.delivered = summary.delivered.saturating_add(u64::from(delivered));
                }
                Err(e) => warn!(turn = outcome.plan.turn, error = %e, "Failed to submit moves"),
            }
        }

        info!(
            turns = summary.turns,
            skipped = summary.skipped,
            failures = summary.failures,
            conflicts = summary.conflicts,
            delivered = summary.delivered,
            "Session finished"
        );
        summary
    }
}
