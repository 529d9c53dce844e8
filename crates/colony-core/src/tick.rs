//! Tick cycle: the engine loop that turns one snapshot into one move plan.
//!
//! Each call to [`Colony::tick`] runs these phases in strict order:
//!
//! 1. **Ingest** -- skip empty or repeated snapshots, reset everything when
//!    the home layout changes, merge newly seen terrain into the accumulated
//!    knowledge, and sync the agent roster (release departed agents, create
//!    new ones, grow station rings, hand out slots).
//!
//! 2. **Cost model** -- rebuild per-cell costs from knowledge, block agents
//!    parked on their station, and wrap every visible hostile in a danger
//!    halo.
//!
//! 3. **FSM** -- run each agent's state machine in id order against a
//!    shared [`Planner`], so resource reservations made by one agent are
//!    seen by the next.
//!
//! 4. **Schedule** -- resolve destination conflicts and commit or drop
//!    paths accordingly.
//!
//! The cycle is deterministic given the same snapshots and configuration.

use std::collections::{BTreeMap, BTreeSet};

use colony_agents::fsm;
use colony_agents::policy::{self, IdlePolicy};
use colony_agents::{Agent, Planner, StationRegistry, WorldView};
use colony_types::{
    AgentId, AgentState, AgentStatus, GathererState, HexCoord, MovePlan, TickReport,
    WorldSnapshot,
};
use colony_world::{CostModel, TerrainKnowledge};
use tracing::{debug, info};

use crate::config::ColonyConfig;
use crate::scheduler::{self, MoveIntent};

/// What one tick produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// One order per live agent, in agent-id order.
    pub plan: MovePlan,
    /// Observability summary of the tick.
    pub report: TickReport,
}

/// The coordinator's state between ticks.
pub struct Colony {
    config: ColonyConfig,
    knowledge: TerrainKnowledge,
    agents: BTreeMap<AgentId, Agent>,
    registry: Option<StationRegistry>,
    layout: Option<(HexCoord, Vec<HexCoord>)>,
    last_turn: Option<u64>,
    model: CostModel,
    policy: Box<dyn IdlePolicy>,
}

impl Colony {
    /// Create a coordinator with no knowledge of the match yet.
    pub fn new(config: ColonyConfig) -> Self {
        let policy = policy::from_config(&config.behavior);
        Self {
            config,
            knowledge: TerrainKnowledge::new(),
            agents: BTreeMap::new(),
            registry: None,
            layout: None,
            last_turn: None,
            model: CostModel::new(),
            policy,
        }
    }

    /// Process one snapshot.
    ///
    /// Returns `None` when the snapshot carries no map or repeats the turn
    /// already processed; no state changes in that case.
    pub fn tick(&mut self, snapshot: &WorldSnapshot) -> Option<TickOutcome> {
        if !snapshot.has_map() {
            debug!(turn = snapshot.turn, "Snapshot without map; skipping");
            return None;
        }
        if self.last_turn == Some(snapshot.turn) {
            debug!(turn = snapshot.turn, "Turn already processed; skipping");
            return None;
        }

        // ---- Ingest ----
        self.sync_layout(snapshot);
        let learned = self.knowledge.absorb(&snapshot.cells);
        if learned > 0 {
            debug!(turn = snapshot.turn, learned, known = self.knowledge.len(), "Terrain learned");
        }
        let (joined, departed) = self.sync_roster(snapshot);

        // ---- Cost model ----
        let mut model = CostModel::from_knowledge(&self.knowledge, &self.config.terrain);
        model.block_static(self.parked_agents());
        model.add_hostiles(
            snapshot.hostiles.iter().copied(),
            self.config.danger.halo_penalty,
        );

        // ---- FSM ----
        let resources: BTreeSet<HexCoord> = snapshot.resources.iter().copied().collect();
        let depots = snapshot.depots();
        let view = WorldView {
            turn: snapshot.turn,
            model: &model,
            resources: &resources,
            hostiles: &snapshot.hostiles,
            homes: &snapshot.homes,
            depots: &depots,
        };
        let occupied: BTreeSet<HexCoord> = self.agents.values().map(|a| a.position).collect();
        let mut planner = Planner::new(view, &self.config.behavior, occupied);

        // Targets already being walked to stay taken.
        for agent in self.agents.values() {
            if agent.state == AgentState::Gatherer(GathererState::ToTarget)
                && let Some(target) = agent.target
            {
                planner.reserve(target);
            }
        }

        for agent in self.agents.values_mut() {
            let station = agent
                .station
                .and_then(|slot| self.registry.as_ref().and_then(|r| r.coord(slot)));
            fsm::advance(agent, station, &mut planner, self.policy.as_mut());
        }
        let unreachable = planner.into_unreachable();

        // ---- Schedule ----
        let intents: Vec<MoveIntent> = self
            .agents
            .values()
            .map(|a| MoveIntent {
                agent: a.id,
                from: a.position,
                to: a.next_cell(),
            })
            .collect();
        let resolution = scheduler::resolve_moves(&intents);

        for order in &resolution.orders {
            if let Some(agent) = self.agents.get_mut(&order.agent) {
                if resolution.was_held(order.agent) {
                    agent.clear_path();
                } else {
                    agent.commit(order.destination);
                }
            }
        }

        let report = TickReport {
            turn: snapshot.turn,
            agents: self.status_rows(&resolution),
            conflicts: resolution.conflicts,
            unreachable,
            joined,
            departed,
            slots_claimed: self.registry.as_ref().map_or(0, |r| saturating_u32(r.claimed())),
            slots_total: self.registry.as_ref().map_or(0, |r| saturating_u32(r.len())),
            known_cells: saturating_u32(self.knowledge.len()),
            danger_cells: saturating_u32(model.overlay().count()),
        };
        info!(
            turn = report.turn,
            agents = report.agents.len(),
            moving = report.moving(),
            conflicts = report.conflicts.len(),
            unreachable = report.unreachable.len(),
            unassigned = report.unassigned(),
            known_cells = report.known_cells,
            "Tick complete"
        );

        self.model = model;
        self.last_turn = Some(snapshot.turn);
        Some(TickOutcome {
            plan: MovePlan {
                turn: snapshot.turn,
                orders: resolution.orders,
            },
            report,
        })
    }

    /// Rebuild the station layout when the anchor or home cells change.
    ///
    /// A new layout means a new match or a moved colony: terrain knowledge,
    /// agents and claims all start over.
    fn sync_layout(&mut self, snapshot: &WorldSnapshot) {
        let mut homes = snapshot.homes.clone();
        homes.sort_unstable();
        homes.dedup();
        let layout = (snapshot.anchor, homes);
        if self.layout.as_ref() == Some(&layout) {
            return;
        }
        if self.layout.is_some() {
            info!(anchor = %snapshot.anchor, "Home layout changed; resetting colony state");
            self.knowledge.clear();
            self.agents.clear();
        }
        self.registry = Some(StationRegistry::new(
            snapshot.anchor,
            &snapshot.homes,
            self.config.stations.clone(),
        ));
        self.layout = Some(layout);
    }

    /// Bring the agent roster in line with the snapshot. Returns the ids
    /// that joined and departed.
    fn sync_roster(&mut self, snapshot: &WorldSnapshot) -> (Vec<AgentId>, Vec<AgentId>) {
        let live: BTreeMap<AgentId, _> = snapshot.agents.iter().map(|o| (o.id, o)).collect();

        let departed: Vec<AgentId> = self
            .agents
            .keys()
            .filter(|id| !live.contains_key(id))
            .copied()
            .collect();
        for id in &departed {
            self.agents.remove(id);
            if let Some(slot) = self.registry.as_mut().and_then(|r| r.release(*id)) {
                debug!(agent = %id, slot = %slot, "Departed agent released its slot");
            }
        }

        let mut joined = Vec::new();
        for (id, obs) in &live {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.observe(obs);
            } else {
                self.agents.insert(*id, Agent::new(obs));
                joined.push(*id);
            }
        }

        if let Some(registry) = self.registry.as_mut() {
            let patrol = self.agents.values().filter(|a| a.role.patrols_rings()).count();
            let added = registry.ensure_capacity(patrol);
            if added > 0 {
                debug!(added, rings = registry.rings(), "Station rings grown");
            }
            for agent in self.agents.values_mut().filter(|a| a.station.is_none()) {
                if let Some(slot) = registry.claim(agent.id, agent.role) {
                    debug!(agent = %agent.id, slot = %slot, role = %agent.role, "Slot claimed");
                    agent.assign(slot);
                }
            }
        }

        (joined, departed)
    }

    /// Cells of agents parked on their own station.
    fn parked_agents(&self) -> Vec<HexCoord> {
        let Some(registry) = self.registry.as_ref() else {
            return Vec::new();
        };
        self.agents
            .values()
            .filter(|a| {
                a.station
                    .and_then(|slot| registry.coord(slot))
                    .is_some_and(|cell| a.holds_station(cell))
            })
            .map(|a| a.position)
            .collect()
    }

    fn status_rows(&self, resolution: &scheduler::Resolution) -> Vec<AgentStatus> {
        self.agents
            .values()
            .map(|a| {
                let station = a
                    .station
                    .and_then(|slot| self.registry.as_ref().and_then(|r| r.coord(slot)));
                let order = resolution.orders.iter().find(|o| o.agent == a.id);
                AgentStatus {
                    id: a.id,
                    role: a.role,
                    position: a.position,
                    state: a.state,
                    goal: a.goal,
                    station,
                    path_len: saturating_u32(a.path.len()),
                    destination: order.map_or(a.position, |o| o.destination),
                    held: resolution.was_held(a.id),
                }
            })
            .collect()
    }

    /// Agents currently tracked, in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Look up one agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// The station registry, once a layout has been seen.
    pub const fn registry(&self) -> Option<&StationRegistry> {
        self.registry.as_ref()
    }

    /// Accumulated terrain knowledge.
    pub const fn knowledge(&self) -> &TerrainKnowledge {
        &self.knowledge
    }

    /// Cells with a non-zero penalty in the last tick's cost model.
    pub fn overlay(&self) -> impl Iterator<Item = (HexCoord, u32)> + '_ {
        self.model.overlay()
    }

    /// The last turn that produced a plan.
    pub const fn last_turn(&self) -> Option<u64> {
        self.last_turn
    }

    /// The configuration this colony runs with.
    pub const fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// Name of the idle policy in use.
    pub fn idle_policy(&self) -> &'static str {
        self.policy.name()
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{AgentObservation, CellObservation, Role, ScoutState, Terrain};

    use super::*;

    fn disc(radius: i32) -> Vec<CellObservation> {
        let mut cells = Vec::new();
        for q in radius.saturating_neg()..=radius {
            for r in radius.saturating_neg()..=radius {
                let coord = HexCoord::new(q, r);
                if coord.distance(HexCoord::ORIGIN) <= radius.unsigned_abs() {
                    cells.push(CellObservation {
                        coord,
                        terrain: Terrain::Open,
                    });
                }
            }
        }
        cells
    }

    fn ant(id: u128, q: i32, r: i32, role: Role) -> AgentObservation {
        AgentObservation {
            id: AgentId::from_u128(id),
            coord: HexCoord::new(q, r),
            role,
            cargo: 0,
        }
    }

    fn snapshot(turn: u64, agents: Vec<AgentObservation>) -> WorldSnapshot {
        WorldSnapshot {
            turn,
            cells: disc(10),
            anchor: HexCoord::ORIGIN,
            homes: vec![HexCoord::ORIGIN, HexCoord::new(1, 0), HexCoord::new(0, 1)],
            agents,
            resources: Vec::new(),
            hostiles: Vec::new(),
        }
    }

    #[test]
    fn empty_and_repeated_snapshots_are_skipped() {
        let mut colony = Colony::new(ColonyConfig::default());
        assert!(colony.tick(&WorldSnapshot::default()).is_none());

        let snap = snapshot(1, vec![ant(1, 0, 0, Role::Scout)]);
        assert!(colony.tick(&snap).is_some());
        assert!(colony.tick(&snap).is_none());
        assert_eq!(colony.last_turn(), Some(1));
    }

    #[test]
    fn new_agents_claim_slots_and_start_moving() {
        let mut colony = Colony::new(ColonyConfig::default());
        let outcome = colony
            .tick(&snapshot(1, vec![ant(1, 0, 0, Role::Scout)]))
            .unwrap();
        assert_eq!(outcome.report.joined, vec![AgentId::from_u128(1)]);
        assert_eq!(outcome.report.slots_claimed, 1);

        let scout = colony.agent(AgentId::from_u128(1)).unwrap();
        assert_eq!(scout.state, AgentState::Scout(ScoutState::ToStation));
        let order = outcome.plan.orders.first().unwrap();
        assert!(!order.is_hold());
        assert!(order.destination.is_adjacent(HexCoord::ORIGIN));
    }

    #[test]
    fn departed_agents_free_their_slot() {
        let mut colony = Colony::new(ColonyConfig::default());
        colony.tick(&snapshot(1, vec![ant(1, 0, 0, Role::Scout), ant(2, 1, 0, Role::Scout)]));
        let outcome = colony
            .tick(&snapshot(2, vec![ant(2, 1, 0, Role::Scout)]))
            .unwrap();
        assert_eq!(outcome.report.departed, vec![AgentId::from_u128(1)]);
        assert_eq!(outcome.report.slots_claimed, 1);
        assert!(colony.agent(AgentId::from_u128(1)).is_none());
    }

    #[test]
    fn layout_change_resets_state() {
        let mut colony = Colony::new(ColonyConfig::default());
        colony.tick(&snapshot(1, vec![ant(1, 0, 0, Role::Gatherer)]));

        let mut moved = snapshot(2, vec![ant(7, 5, 5, Role::Gatherer)]);
        moved.anchor = HexCoord::new(5, 5);
        moved.homes = vec![HexCoord::new(5, 5), HexCoord::new(6, 5)];
        let outcome = colony.tick(&moved).unwrap();

        assert_eq!(colony.registry().unwrap().anchor(), HexCoord::new(5, 5));
        assert_eq!(colony.agents().count(), 1);
        // The reset forgets agent 1 rather than reporting it as departed.
        assert!(outcome.report.departed.is_empty());
        assert_eq!(outcome.report.joined, vec![AgentId::from_u128(7)]);
    }

    #[test]
    fn hostiles_show_up_in_overlay() {
        let mut colony = Colony::new(ColonyConfig::default());
        let mut snap = snapshot(1, vec![ant(1, 0, 0, Role::Defender)]);
        snap.hostiles = vec![HexCoord::new(5, 0)];
        let outcome = colony.tick(&snap).unwrap();
        assert_eq!(outcome.report.danger_cells, 6);
        assert!(colony.overlay().all(|(cell, penalty)| {
            cell.is_adjacent(HexCoord::new(5, 0)) && penalty == 20
        }));
    }
}
