//! What an agent without a station does.
//!
//! When every slot its role could use is taken, an agent is left
//! unassigned. The engine does not invent a goal for it; an
//! [`IdlePolicy`] decides whether it stays put or shuffles about. The
//! policy is the only place randomness enters a tick, and it never affects
//! how conflicts are resolved.

use colony_types::HexCoord;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

use crate::agent::Agent;
use crate::config::{BehaviorConfig, IdlePolicyKind};
use crate::planner::Planner;

/// Chooses a one-step move for an unassigned agent.
pub trait IdlePolicy: Send {
    /// The cell to step onto, or `None` to hold.
    fn next_step(&mut self, agent: &Agent, planner: &Planner<'_>) -> Option<HexCoord>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the policy selected in configuration.
pub fn from_config(config: &BehaviorConfig) -> Box<dyn IdlePolicy> {
    match config.idle_policy {
        IdlePolicyKind::Hold => Box::new(HoldPosition),
        IdlePolicyKind::Wander => Box::new(RandomWander::new(config.wander_seed)),
    }
}

/// Never move.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldPosition;

impl IdlePolicy for HoldPosition {
    fn next_step(&mut self, _agent: &Agent, _planner: &Planner<'_>) -> Option<HexCoord> {
        None
    }

    fn name(&self) -> &'static str {
        "hold"
    }
}

/// Step onto a uniformly chosen free, passable neighbor.
#[derive(Debug, Clone)]
pub struct RandomWander {
    rng: SmallRng,
}

impl RandomWander {
    /// Create a wander policy with a reproducible seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl IdlePolicy for RandomWander {
    fn next_step(&mut self, agent: &Agent, planner: &Planner<'_>) -> Option<HexCoord> {
        let options: Vec<HexCoord> = agent
            .position
            .neighbors()
            .into_iter()
            .filter(|n| *n != agent.position && planner.is_enterable(*n, agent.position))
            .collect();
        options.choose(&mut self.rng).copied()
    }

    fn name(&self) -> &'static str {
        "wander"
    }
}
