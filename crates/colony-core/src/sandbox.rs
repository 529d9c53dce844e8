//! Offline sandbox arena.
//!
//! A small stand-in for the remote match service: it generates a hex map
//! around a three-cell home, spawns agents, resources and wandering
//! hostiles, hands out fogged [`WorldSnapshot`]s, and applies
//! [`MovePlan`]s under the arena's movement rules. All randomness comes
//! from one seeded generator, so a seed replays the same match.
//!
//! Rules applied each turn:
//!
//! - A move must start where the agent stands, go to an adjacent passable
//!   cell not held by a hostile, and cost no more than the role's movement
//!   points. Invalid moves are rejected and the agent stays.
//! - Moves that would put two agents on one cell are all rejected.
//! - An agent ending its move on a home cell unloads its cargo.
//! - An agent with no cargo ending its move on a resource picks it up.
//! - Hostiles then wander one step, and new resources spawn on free cells.

use std::collections::{BTreeMap, BTreeSet};

use colony_types::{
    AgentId, AgentObservation, CellObservation, HexCoord, MovePlan, Role, Terrain, WorldSnapshot,
};
use colony_world::TerrainTable;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::SandboxConfig;
use crate::scheduler::{self, MoveIntent};

/// One agent as the sandbox tracks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Body {
    coord: HexCoord,
    role: Role,
    cargo: u32,
}

/// What applying one plan did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// The turn the plan was applied to.
    pub turn: u64,
    /// Agents that changed cell.
    pub moved: u32,
    /// Agents whose move was refused, in id order.
    pub rejected: Vec<AgentId>,
    /// Resources picked up this turn.
    pub picked_up: u32,
    /// Cargo units unloaded at home this turn.
    pub delivered: u32,
}

/// A self-contained match.
#[derive(Debug, Clone)]
pub struct Sandbox {
    config: SandboxConfig,
    costs: TerrainTable,
    rng: SmallRng,
    turn: u64,
    terrain: BTreeMap<HexCoord, Terrain>,
    anchor: HexCoord,
    homes: Vec<HexCoord>,
    bodies: BTreeMap<AgentId, Body>,
    resources: BTreeSet<HexCoord>,
    hostiles: Vec<HexCoord>,
    delivered: u32,
}

impl Sandbox {
    /// Generate a fresh match from `config`.
    pub fn generate(config: &SandboxConfig) -> Self {
        let radius = i32::try_from(config.radius).unwrap_or(i32::MAX);
        let anchor = HexCoord::ORIGIN;
        let homes = vec![anchor, anchor.neighbor(0), anchor.neighbor(5)];

        let mut sandbox = Self::from_parts(config.clone(), Vec::new(), anchor, homes.clone());
        for coord in disc(anchor, radius) {
            let terrain = if homes.contains(&coord) {
                Terrain::Home
            } else if coord.distance(anchor) <= 2 {
                Terrain::Open
            } else {
                sandbox.roll_terrain()
            };
            sandbox.terrain.insert(coord, terrain);
        }

        let counts = [
            (Role::Gatherer, config.gatherers),
            (Role::Scout, config.scouts),
            (Role::Defender, config.defenders),
        ];
        for (role, count) in counts {
            for _ in 0..count {
                if let Some(cell) = sandbox.nearest_free_cell(anchor) {
                    sandbox.spawn_agent(role, cell);
                }
            }
        }

        sandbox.spawn_resources(config.initial_resources);

        let far = config.radius.checked_div(2).unwrap_or(0);
        for _ in 0..config.hostiles {
            let candidates: Vec<HexCoord> = sandbox
                .free_cells()
                .into_iter()
                .filter(|c| c.distance(anchor) >= far)
                .collect();
            if let Some(cell) = candidates.choose(&mut sandbox.rng).copied() {
                sandbox.hostiles.push(cell);
            }
        }

        debug!(
            cells = sandbox.terrain.len(),
            agents = sandbox.bodies.len(),
            resources = sandbox.resources.len(),
            hostiles = sandbox.hostiles.len(),
            seed = config.seed,
            "Sandbox generated"
        );
        sandbox
    }

    /// Build a match from explicit terrain, with no agents, resources or
    /// hostiles yet.
    pub fn from_parts<I>(config: SandboxConfig, cells: I, anchor: HexCoord, homes: Vec<HexCoord>) -> Self
    where
        I: IntoIterator<Item = CellObservation>,
    {
        let rng = SmallRng::seed_from_u64(config.seed);
        let mut terrain: BTreeMap<HexCoord, Terrain> =
            cells.into_iter().map(|c| (c.coord, c.terrain)).collect();
        for home in &homes {
            terrain.insert(*home, Terrain::Home);
        }
        Self {
            config,
            costs: TerrainTable::default(),
            rng,
            turn: 0,
            terrain,
            anchor,
            homes,
            bodies: BTreeMap::new(),
            resources: BTreeSet::new(),
            hostiles: Vec::new(),
            delivered: 0,
        }
    }

    fn roll_terrain(&mut self) -> Terrain {
        let roll: u32 = self.rng.random_range(0..100);
        let obstacle = self.config.obstacle_percent;
        let rough = obstacle.saturating_add(self.config.rough_percent);
        let hazard = rough.saturating_add(self.config.hazard_percent);
        if roll < obstacle {
            Terrain::Obstacle
        } else if roll < rough {
            Terrain::Rough
        } else if roll < hazard {
            Terrain::Hazard
        } else {
            Terrain::Open
        }
    }

    /// Add an agent with a fresh random id at `coord` and return the id.
    pub fn spawn_agent(&mut self, role: Role, coord: HexCoord) -> AgentId {
        let id = AgentId::from_u128(self.rng.random());
        self.insert_agent(id, role, coord);
        id
    }

    /// Add an agent with a caller-chosen id. Replaces any agent with the
    /// same id.
    pub fn insert_agent(&mut self, id: AgentId, role: Role, coord: HexCoord) {
        self.bodies.insert(
            id,
            Body {
                coord,
                role,
                cargo: 0,
            },
        );
    }

    /// Put a resource on `coord`. Returns `false` if one is already there.
    pub fn place_resource(&mut self, coord: HexCoord) -> bool {
        self.resources.insert(coord)
    }

    /// Put a hostile on `coord`.
    pub fn place_hostile(&mut self, coord: HexCoord) {
        self.hostiles.push(coord);
    }

    /// Spawn up to `count` resources on random free cells. Returns how
    /// many were placed.
    pub fn spawn_resources(&mut self, count: u32) -> u32 {
        let mut placed: u32 = 0;
        for _ in 0..count {
            let free = self.free_cells();
            let Some(cell) = free.choose(&mut self.rng).copied() else {
                break;
            };
            self.resources.insert(cell);
            placed = placed.saturating_add(1);
        }
        placed
    }

    /// Passable non-home cells holding no agent, resource or hostile.
    fn free_cells(&self) -> Vec<HexCoord> {
        let taken: BTreeSet<HexCoord> = self.bodies.values().map(|b| b.coord).collect();
        self.terrain
            .iter()
            .filter(|(coord, terrain)| {
                matches!(terrain, Terrain::Open | Terrain::Rough | Terrain::Hazard)
                    && !taken.contains(coord)
                    && !self.resources.contains(coord)
                    && !self.hostiles.contains(coord)
            })
            .map(|(coord, _)| *coord)
            .collect()
    }

    fn nearest_free_cell(&self, from: HexCoord) -> Option<HexCoord> {
        let taken: BTreeSet<HexCoord> = self.bodies.values().map(|b| b.coord).collect();
        from.nearest(
            self.terrain
                .iter()
                .filter(|(coord, terrain)| {
                    self.costs.cost_of(**terrain).move_cost.is_some() && !taken.contains(coord)
                })
                .map(|(coord, _)| *coord),
        )
    }

    /// What the agents can see this turn.
    ///
    /// Terrain, resources and hostiles are visible within `vision` steps of
    /// any agent or home cell.
    pub fn snapshot(&self) -> WorldSnapshot {
        let vision = self.config.vision;
        let eyes: Vec<HexCoord> = self
            .bodies
            .values()
            .map(|b| b.coord)
            .chain(self.homes.iter().copied())
            .collect();
        let visible = |cell: &HexCoord| eyes.iter().any(|e| e.distance(*cell) <= vision);

        WorldSnapshot {
            turn: self.turn,
            cells: self
                .terrain
                .iter()
                .filter(|(coord, _)| visible(coord))
                .map(|(coord, terrain)| CellObservation {
                    coord: *coord,
                    terrain: *terrain,
                })
                .collect(),
            anchor: self.anchor,
            homes: self.homes.clone(),
            agents: self
                .bodies
                .iter()
                .map(|(id, b)| AgentObservation {
                    id: *id,
                    coord: b.coord,
                    role: b.role,
                    cargo: b.cargo,
                })
                .collect(),
            resources: self.resources.iter().copied().filter(|c| visible(c)).collect(),
            hostiles: self.hostiles.iter().copied().filter(|c| visible(c)).collect(),
        }
    }

    /// Apply one plan and advance the turn.
    pub fn apply(&mut self, plan: &MovePlan) -> ApplyReport {
        let mut rejected: BTreeSet<AgentId> = BTreeSet::new();
        let mut wanted: BTreeMap<AgentId, HexCoord> = BTreeMap::new();
        for order in plan.moves() {
            match self.bodies.get(&order.agent) {
                Some(body) if self.is_legal(body, order.from, order.destination) => {
                    wanted.insert(order.agent, order.destination);
                }
                _ => {
                    rejected.insert(order.agent);
                }
            }
        }

        let intents: Vec<MoveIntent> = self
            .bodies
            .iter()
            .map(|(id, b)| MoveIntent {
                agent: *id,
                from: b.coord,
                to: wanted.get(id).copied().unwrap_or(b.coord),
            })
            .collect();
        let resolution = scheduler::resolve_moves(&intents);
        for id in &resolution.held {
            if wanted.contains_key(id) {
                rejected.insert(*id);
            }
        }

        let mut report = ApplyReport {
            turn: self.turn,
            ..ApplyReport::default()
        };
        for order in &resolution.orders {
            if let Some(body) = self.bodies.get_mut(&order.agent)
                && body.coord != order.destination
            {
                body.coord = order.destination;
                report.moved = report.moved.saturating_add(1);
            }
        }

        for body in self.bodies.values_mut() {
            if body.cargo > 0 && self.homes.contains(&body.coord) {
                report.delivered = report.delivered.saturating_add(body.cargo);
                body.cargo = 0;
            } else if body.cargo == 0 && self.resources.remove(&body.coord) {
                body.cargo = 1;
                report.picked_up = report.picked_up.saturating_add(1);
            }
        }
        self.delivered = self.delivered.saturating_add(report.delivered);

        self.wander_hostiles();
        self.spawn_resources(self.config.resources_per_turn);
        self.turn = self.turn.saturating_add(1);

        report.rejected = rejected.into_iter().collect();
        if !report.rejected.is_empty() {
            debug!(turn = report.turn, rejected = report.rejected.len(), "Moves rejected");
        }
        report
    }

    fn is_legal(&self, body: &Body, from: HexCoord, to: HexCoord) -> bool {
        if body.coord != from || !to.is_adjacent(from) || self.hostiles.contains(&to) {
            return false;
        }
        let Some(terrain) = self.terrain.get(&to) else {
            return false;
        };
        self.costs
            .cost_of(*terrain)
            .move_cost
            .is_some_and(|cost| cost <= self.config.movement.of(body.role))
    }

    fn wander_hostiles(&mut self) {
        let agents: BTreeSet<HexCoord> = self.bodies.values().map(|b| b.coord).collect();
        for i in 0..self.hostiles.len() {
            let Some(current) = self.hostiles.get(i).copied() else {
                continue;
            };
            let options: Vec<HexCoord> = current
                .neighbors()
                .into_iter()
                .filter(|n| {
                    matches!(
                        self.terrain.get(n),
                        Some(Terrain::Open | Terrain::Rough | Terrain::Hazard)
                    ) && !agents.contains(n)
                        && !self.hostiles.contains(n)
                })
                .collect();
            if let Some(next) = options.choose(&mut self.rng).copied()
                && let Some(slot) = self.hostiles.get_mut(i)
            {
                *slot = next;
            }
        }
    }

    /// The next turn number to be played.
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Total cargo delivered so far.
    pub const fn delivered(&self) -> u32 {
        self.delivered
    }

    /// Where an agent stands.
    pub fn position_of(&self, agent: AgentId) -> Option<HexCoord> {
        self.bodies.get(&agent).map(|b| b.coord)
    }

    /// What an agent carries.
    pub fn cargo_of(&self, agent: AgentId) -> Option<u32> {
        self.bodies.get(&agent).map(|b| b.cargo)
    }

    /// Every resource on the map, seen or not.
    pub const fn resources(&self) -> &BTreeSet<HexCoord> {
        &self.resources
    }

    /// Every hostile on the map, seen or not.
    pub fn hostiles(&self) -> &[HexCoord] {
        &self.hostiles
    }
}

/// Every cell within `radius` of `center`.
fn disc(center: HexCoord, radius: i32) -> Vec<HexCoord> {
    let mut cells = Vec::new();
    for q in radius.saturating_neg()..=radius {
        for r in radius.saturating_neg()..=radius {
            let cell = center.offset(HexCoord::new(q, r));
            if cell.distance(center) <= radius.unsigned_abs() {
                cells.push(cell);
            }
        }
    }
    cells
}
