//! Station slots around the colony anchor.
//!
//! Slots live in a flat arena and are addressed by [`SlotId`], which stays
//! valid for the lifetime of the registry. Generation order is arena order,
//! so "first unclaimed slot of a role" is a linear scan.
//!
//! # Layout
//!
//! Ring `k` sits at radius `R = k * step`. For each direction `d_i` in the
//! fixed cyclic order it yields:
//!
//! - a scout slot at the corner `anchor + d_i * R`,
//! - a gatherer slot at the same corner,
//! - a gatherer slot at the edge point `anchor + d_i * R + d_(i+1) * R/2`.
//!
//! Defender slots are the neighbors of every home cell other than the
//! anchor, minus the home cells themselves, deduplicated in discovery order.
//!
//! Rings are added lazily: only while the scout+gatherer pool is smaller
//! than twice the scout+gatherer population, and never beyond
//! `max_rings`.

use colony_types::{AgentId, DIRECTIONS, HexCoord, Role};
use tracing::debug;

use crate::config::StationConfig;

/// Stable index of a slot in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub usize);

impl core::fmt::Display for SlotId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// A role-tagged waypoint and its claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Where the slot is.
    pub coord: HexCoord,
    /// Which role the slot was generated for.
    pub role: Role,
    /// Ring number; 0 for defender slots around the homes.
    pub ring: u32,
    /// Position within its ring (or within the defender set).
    pub index: u32,
    /// The agent holding the slot.
    pub claimant: Option<AgentId>,
}

/// Owner of the slot table and its claims.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    anchor: HexCoord,
    config: StationConfig,
    slots: Vec<Slot>,
    rings: u32,
}

impl StationRegistry {
    /// Generate defender slots and the first ring for a colony layout.
    pub fn new(anchor: HexCoord, homes: &[HexCoord], config: StationConfig) -> Self {
        let mut registry = Self {
            anchor,
            config,
            slots: Vec::new(),
            rings: 0,
        };
        registry.generate_defender_slots(homes);
        registry.add_ring();
        registry
    }

    fn generate_defender_slots(&mut self, homes: &[HexCoord]) {
        let mut index: u32 = 0;
        for home in homes.iter().filter(|h| **h != self.anchor) {
            for cell in home.neighbors() {
                if homes.contains(&cell) || cell == self.anchor {
                    continue;
                }
                if self
                    .slots
                    .iter()
                    .any(|s| s.role == Role::Defender && s.coord == cell)
                {
                    continue;
                }
                self.slots.push(Slot {
                    coord: cell,
                    role: Role::Defender,
                    ring: 0,
                    index,
                    claimant: None,
                });
                index = index.saturating_add(1);
            }
        }
    }

    fn add_ring(&mut self) -> bool {
        if self.rings >= self.config.max_rings {
            return false;
        }
        let ring = self.rings.saturating_add(1);
        let radius = i32::try_from(ring.saturating_mul(self.config.step)).unwrap_or(i32::MAX);
        let half = radius.checked_div(2).unwrap_or(0);

        let mut scout_index: u32 = 0;
        let mut gatherer_index: u32 = 0;
        for (i, dir) in DIRECTIONS.iter().enumerate() {
            let next = DIRECTIONS
                .get(i.saturating_add(1).checked_rem(DIRECTIONS.len()).unwrap_or(0))
                .copied()
                .unwrap_or(*dir);
            let corner = self.anchor.offset(dir.scaled(radius));
            let edge = corner.offset(next.scaled(half));

            self.push_slot(corner, Role::Scout, ring, &mut scout_index);
            self.push_slot(corner, Role::Gatherer, ring, &mut gatherer_index);
            self.push_slot(edge, Role::Gatherer, ring, &mut gatherer_index);
        }
        self.rings = ring;
        debug!(ring, radius, slots = self.slots.len(), "Station ring generated");
        true
    }

    fn push_slot(&mut self, coord: HexCoord, role: Role, ring: u32, index: &mut u32) {
        self.slots.push(Slot {
            coord,
            role,
            ring,
            index: *index,
            claimant: None,
        });
        *index = index.saturating_add(1);
    }

    /// Grow rings until the scout+gatherer pool is at least twice
    /// `patrol_population`, or the ring cap is hit. Returns rings added.
    pub fn ensure_capacity(&mut self, patrol_population: usize) -> u32 {
        let wanted = patrol_population.saturating_mul(2);
        let mut added: u32 = 0;
        while self.patrol_slots() < wanted && self.add_ring() {
            added = added.saturating_add(1);
        }
        added
    }

    fn patrol_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.role.patrols_rings()).count()
    }

    /// Claim a slot for `agent`.
    ///
    /// Scans the agent's own role first, then scout slots. Returns `None`
    /// when both are exhausted. An agent that already holds a slot keeps it.
    pub fn claim(&mut self, agent: AgentId, role: Role) -> Option<SlotId> {
        if let Some(existing) = self.slot_of(agent) {
            return Some(existing);
        }
        let found = self.first_free(role).or_else(|| {
            if role == Role::Scout {
                None
            } else {
                self.first_free(Role::Scout)
            }
        })?;
        if let Some(slot) = self.slots.get_mut(found.0) {
            slot.claimant = Some(agent);
        }
        Some(found)
    }

    fn first_free(&self, role: Role) -> Option<SlotId> {
        self.slots
            .iter()
            .position(|s| s.role == role && s.claimant.is_none())
            .map(SlotId)
    }

    /// Release whatever `agent` holds. Returns the freed slot.
    pub fn release(&mut self, agent: AgentId) -> Option<SlotId> {
        let id = self.slot_of(agent)?;
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.claimant = None;
        }
        Some(id)
    }

    /// The slot held by `agent`.
    pub fn slot_of(&self, agent: AgentId) -> Option<SlotId> {
        self.slots
            .iter()
            .position(|s| s.claimant == Some(agent))
            .map(SlotId)
    }

    /// Look up a slot.
    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    /// Coordinate of a slot.
    pub fn coord(&self, id: SlotId) -> Option<HexCoord> {
        self.slot(id).map(|s| s.coord)
    }

    /// All slots in generation order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// The anchor the layout is built around.
    pub const fn anchor(&self) -> HexCoord {
        self.anchor
    }

    /// Rings generated so far.
    pub const fn rings(&self) -> u32 {
        self.rings
    }

    /// Number of slots with a claimant.
    pub fn claimed(&self) -> usize {
        self.slots.iter().filter(|s| s.claimant.is_some()).count()
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn registry(max_rings: u32) -> StationRegistry {
        let anchor = HexCoord::new(10, 10);
        let homes = [anchor, HexCoord::new(11, 10), HexCoord::new(10, 11)];
        StationRegistry::new(anchor, &homes, StationConfig { step: 4, max_rings })
    }

    fn count(reg: &StationRegistry, role: Role) -> usize {
        reg.slots().iter().filter(|s| s.role == role).count()
    }

    #[test]
    fn first_ring_layout() {
        let reg = registry(3);
        assert_eq!(reg.rings(), 1);
        assert_eq!(count(&reg, Role::Scout), 6);
        assert_eq!(count(&reg, Role::Gatherer), 12);

        let scouts: Vec<_> = reg
            .slots()
            .iter()
            .filter(|s| s.role == Role::Scout)
            .map(|s| s.coord)
            .collect();
        assert_eq!(scouts.first(), Some(&HexCoord::new(14, 10)));
        assert!(scouts.iter().all(|c| c.distance(reg.anchor()) == 4));

        // Edge point of direction 0: corner (14,10) plus (1,-1)*2.
        assert!(
            reg.slots()
                .iter()
                .any(|s| s.role == Role::Gatherer && s.coord == HexCoord::new(16, 8))
        );
    }

    #[test]
    fn defender_slots_surround_homes_without_duplicates() {
        let reg = registry(1);
        let guards: Vec<_> = reg
            .slots()
            .iter()
            .filter(|s| s.role == Role::Defender)
            .map(|s| s.coord)
            .collect();
        let unique: BTreeSet<_> = guards.iter().copied().collect();
        assert_eq!(unique.len(), guards.len());
        assert!(!guards.contains(&HexCoord::new(10, 10)));
        assert!(!guards.contains(&HexCoord::new(11, 10)));
        assert!(!guards.contains(&HexCoord::new(10, 11)));
        for g in &guards {
            assert!(g.is_adjacent(HexCoord::new(11, 10)) || g.is_adjacent(HexCoord::new(10, 11)));
        }
    }

    #[test]
    fn rings_grow_lazily_up_to_cap() {
        let mut reg = registry(3);
        // 18 patrol slots cover up to 9 agents.
        assert_eq!(reg.ensure_capacity(9), 0);
        assert_eq!(reg.ensure_capacity(10), 1);
        assert_eq!(reg.rings(), 2);
        assert!(reg
            .slots()
            .iter()
            .filter(|s| s.ring == 2 && s.role == Role::Scout)
            .all(|s| s.coord.distance(reg.anchor()) == 8));

        // Cap reached.
        assert_eq!(reg.ensure_capacity(1000), 1);
        assert_eq!(reg.rings(), 3);
        assert_eq!(reg.ensure_capacity(1000), 0);
    }

    #[test]
    fn claims_are_unique_and_ordered() {
        let mut reg = registry(1);
        let a = AgentId::from_u128(1);
        let b = AgentId::from_u128(2);
        let sa = reg.claim(a, Role::Gatherer).unwrap();
        let sb = reg.claim(b, Role::Gatherer).unwrap();
        assert_ne!(sa, sb);
        assert!(sa < sb);
        // Claiming again returns the same slot.
        assert_eq!(reg.claim(a, Role::Gatherer), Some(sa));
        assert_eq!(reg.claimed(), 2);
    }

    #[test]
    fn exhausted_role_falls_back_to_scout_slots() {
        let anchor = HexCoord::ORIGIN;
        // No auxiliary homes: no defender slots at all.
        let mut reg = StationRegistry::new(anchor, &[anchor], StationConfig::default());
        let d = AgentId::from_u128(7);
        let slot = reg.claim(d, Role::Defender).unwrap();
        assert_eq!(reg.slot(slot).unwrap().role, Role::Scout);
    }

    #[test]
    fn exhaustion_yields_none() {
        let anchor = HexCoord::ORIGIN;
        let mut reg = StationRegistry::new(anchor, &[anchor], StationConfig { step: 4, max_rings: 1 });
        for i in 0..6_u128 {
            assert!(reg.claim(AgentId::from_u128(i), Role::Scout).is_some());
        }
        assert!(reg.claim(AgentId::from_u128(99), Role::Scout).is_none());
    }

    #[test]
    fn release_frees_the_slot() {
        let mut reg = registry(1);
        let a = AgentId::from_u128(1);
        let slot = reg.claim(a, Role::Scout).unwrap();
        assert_eq!(reg.release(a), Some(slot));
        assert_eq!(reg.slot(slot).unwrap().claimant, None);
        assert_eq!(reg.release(a), None);

        let b = AgentId::from_u128(2);
        assert_eq!(reg.claim(b, Role::Scout), Some(slot));
    }
}
