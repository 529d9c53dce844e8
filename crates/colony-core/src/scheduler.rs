//! Per-tick destination conflict resolution.
//!
//! Every agent proposes one destination: the head of its path, or its own
//! cell when it has nothing to do. Destinations are tallied. When a cell
//! is claimed more than once, every claimant holds in place. Holding puts
//! the agent back on its own cell, which can collide with someone else who
//! wanted to move there, so the tally is repeated until no cell is claimed
//! twice.
//!
//! The outcome depends only on the set of intents, not on their order:
//! a conflict never picks a winner, so there is nothing to break ties on.
//! Two agents swapping cells do not claim the same destination and are not
//! treated as a conflict.

use std::collections::{BTreeMap, BTreeSet};

use colony_types::{AgentId, ConflictRecord, HexCoord, MoveOrder};
use tracing::debug;

/// One agent's proposed move for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    /// The agent.
    pub agent: AgentId,
    /// Where it stands.
    pub from: HexCoord,
    /// Where it wants to be next tick.
    pub to: HexCoord,
}

/// The scheduler's verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Final destinations, in intent order.
    pub orders: Vec<MoveOrder>,
    /// Every cell that was claimed more than once, with all its claimants.
    pub conflicts: Vec<ConflictRecord>,
    /// Agents forced to hold by a conflict.
    pub held: BTreeSet<AgentId>,
}

impl Resolution {
    /// Whether `agent` was forced to hold.
    pub fn was_held(&self, agent: AgentId) -> bool {
        self.held.contains(&agent)
    }
}

/// Resolve destination conflicts among `intents`.
pub fn resolve_moves(intents: &[MoveIntent]) -> Resolution {
    let mut destination: BTreeMap<AgentId, HexCoord> =
        intents.iter().map(|i| (i.agent, i.to)).collect();
    let origin: BTreeMap<AgentId, HexCoord> = intents.iter().map(|i| (i.agent, i.from)).collect();
    let mut conflicts: BTreeMap<HexCoord, BTreeSet<AgentId>> = BTreeMap::new();
    let mut held: BTreeSet<AgentId> = BTreeSet::new();

    // Each round turns at least one mover into a holder, or stops.
    for round in 0..=intents.len() {
        let mut claims: BTreeMap<HexCoord, Vec<AgentId>> = BTreeMap::new();
        for (agent, cell) in &destination {
            claims.entry(*cell).or_default().push(*agent);
        }

        let mut changed = false;
        for (cell, claimants) in claims.into_iter().filter(|(_, c)| c.len() > 1) {
            let record = conflicts.entry(cell).or_default();
            for agent in claimants {
                record.insert(agent);
                held.insert(agent);
                if let (Some(dest), Some(from)) = (destination.get_mut(&agent), origin.get(&agent))
                    && *dest != *from
                {
                    *dest = *from;
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
        debug!(round, held = held.len(), "Holding cascaded; re-tallying");
    }

    let orders = intents
        .iter()
        .map(|i| MoveOrder {
            agent: i.agent,
            from: i.from,
            destination: destination.get(&i.agent).copied().unwrap_or(i.from),
        })
        .collect();

    let conflicts = conflicts
        .into_iter()
        .map(|(cell, agents)| ConflictRecord {
            cell,
            agents: agents.into_iter().collect(),
        })
        .collect();

    Resolution {
        orders,
        conflicts,
        held,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rand::seq::{IndexedRandom, SliceRandom};

    use super::*;

    fn intent(id: u128, from: (i32, i32), to: (i32, i32)) -> MoveIntent {
        MoveIntent {
            agent: AgentId::from_u128(id),
            from: HexCoord::new(from.0, from.1),
            to: HexCoord::new(to.0, to.1),
        }
    }

    fn destinations(resolution: &Resolution) -> BTreeMap<AgentId, HexCoord> {
        resolution
            .orders
            .iter()
            .map(|o| (o.agent, o.destination))
            .collect()
    }

    #[test]
    fn independent_moves_all_commit() {
        let intents = [intent(1, (0, 0), (1, 0)), intent(2, (0, 2), (0, 3))];
        let res = resolve_moves(&intents);
        assert!(res.conflicts.is_empty());
        assert!(res.held.is_empty());
        assert_eq!(res.orders.first().unwrap().destination, HexCoord::new(1, 0));
    }

    #[test]
    fn both_contenders_hold() {
        let intents = [intent(1, (0, 0), (1, 0)), intent(2, (2, 0), (1, 0))];
        let res = resolve_moves(&intents);
        assert_eq!(res.conflicts.len(), 1);
        let record = res.conflicts.first().unwrap();
        assert_eq!(record.cell, HexCoord::new(1, 0));
        assert_eq!(record.agents.len(), 2);
        assert!(res.orders.iter().all(MoveOrder::is_hold));
    }

    #[test]
    fn moving_into_a_stationary_agent_is_a_conflict() {
        let intents = [intent(1, (0, 0), (1, 0)), intent(2, (1, 0), (1, 0))];
        let res = resolve_moves(&intents);
        assert!(res.was_held(AgentId::from_u128(1)));
        assert!(res.was_held(AgentId::from_u128(2)));
        assert!(res.orders.iter().all(MoveOrder::is_hold));
    }

    #[test]
    fn holding_cascades_down_a_queue() {
        // 3 follows 2, 2 and 1 collide at (2,0): once 2 holds, 3 runs into it.
        let intents = [
            intent(1, (3, 0), (2, 0)),
            intent(2, (1, 0), (2, 0)),
            intent(3, (0, 0), (1, 0)),
        ];
        let res = resolve_moves(&intents);
        assert!(res.orders.iter().all(MoveOrder::is_hold));
        assert_eq!(res.conflicts.len(), 2);
        assert_eq!(res.held.len(), 3);
    }

    #[test]
    fn swaps_are_not_conflicts() {
        let intents = [intent(1, (0, 0), (1, 0)), intent(2, (1, 0), (0, 0))];
        let res = resolve_moves(&intents);
        assert!(res.conflicts.is_empty());
        assert_eq!(
            destinations(&res).get(&AgentId::from_u128(1)),
            Some(&HexCoord::new(1, 0))
        );
    }

    #[test]
    fn result_does_not_depend_on_intent_order() {
        let mut intents = vec![
            intent(1, (0, 0), (1, 0)),
            intent(2, (2, 0), (1, 0)),
            intent(3, (2, -1), (2, 0)),
            intent(4, (0, 1), (0, 2)),
            intent(5, (1, 2), (0, 2)),
            intent(6, (5, 5), (5, 6)),
        ];
        let reference = resolve_moves(&intents);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..20 {
            intents.shuffle(&mut rng);
            let res = resolve_moves(&intents);
            assert_eq!(destinations(&res), destinations(&reference));
            assert_eq!(res.conflicts, reference.conflicts);
            assert_eq!(res.held, reference.held);
        }
    }

    #[test]
    fn no_two_destinations_coincide_under_random_intents() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..50 {
            let mut cells: Vec<HexCoord> = (0..6)
                .flat_map(|q| (0..6).map(move |r| HexCoord::new(q, r)))
                .collect();
            cells.shuffle(&mut rng);
            let intents: Vec<MoveIntent> = cells
                .iter()
                .take(15)
                .zip(1_u128..)
                .map(|(from, id)| {
                    let to = *from
                        .neighbors()
                        .choose(&mut rng)
                        .unwrap_or(from);
                    MoveIntent {
                        agent: AgentId::from_u128(id),
                        from: *from,
                        to,
                    }
                })
                .collect();
            let res = resolve_moves(&intents);
            let unique: BTreeSet<HexCoord> = res.orders.iter().map(|o| o.destination).collect();
            assert_eq!(unique.len(), res.orders.len());
        }
    }
}
