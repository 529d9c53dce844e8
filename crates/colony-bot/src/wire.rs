//! JSON shapes of the arena API.
//!
//! `GET /api/arena` returns an [`ArenaState`]; `POST /api/move` takes a
//! [`MoveRequest`]. Field names follow the service (`turnNo`, `home`,
//! `spot`, ...). Conversion into the engine's [`WorldSnapshot`] maps the
//! service's numeric codes onto [`Terrain`] and [`Role`]:
//!
//! | code | cell      | ant      |
//! |------|-----------|----------|
//! | 0    | -         | worker   |
//! | 1    | home      | fighter  |
//! | 2    | open      | scout    |
//! | 3    | rough     | -        |
//! | 4    | hazard    | -        |
//! | 5    | obstacle  | -        |
//!
//! Recorded snapshots use the same shape, so a replay directory can be
//! filled from either a live match or the sandbox.

use colony_types::{
    AgentId, AgentObservation, CellObservation, HexCoord, MovePlan, Role, Terrain, WorldSnapshot,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// An axial coordinate as the service writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCoord {
    /// Column.
    pub q: i32,
    /// Row.
    pub r: i32,
}

impl From<WireCoord> for HexCoord {
    fn from(c: WireCoord) -> Self {
        Self::new(c.q, c.r)
    }
}

impl From<HexCoord> for WireCoord {
    fn from(c: HexCoord) -> Self {
        Self { q: c.q, r: c.r }
    }
}

/// One visible map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCell {
    /// Column.
    pub q: i32,
    /// Row.
    pub r: i32,
    /// Cell type code.
    #[serde(rename = "type")]
    pub kind: i64,
}

/// Cargo carried by an ant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCargo {
    /// Units carried.
    #[serde(default)]
    pub amount: u32,
}

/// One of our ants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAnt {
    /// Service-issued UUID.
    pub id: String,
    /// Column.
    pub q: i32,
    /// Row.
    pub r: i32,
    /// Ant type code.
    #[serde(rename = "type")]
    pub kind: i64,
    /// What it carries.
    #[serde(default)]
    pub food: WireCargo,
}

/// Full arena state for one turn. Every field is optional on the wire;
/// before the match starts the service answers with an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaState {
    /// Turn number.
    #[serde(default)]
    pub turn_no: u64,
    /// Visible cells.
    #[serde(default)]
    pub map: Vec<WireCell>,
    /// Home cells.
    #[serde(default)]
    pub home: Vec<WireCoord>,
    /// The main home cell.
    #[serde(default)]
    pub spot: Option<WireCoord>,
    /// Our ants.
    #[serde(default)]
    pub ants: Vec<WireAnt>,
    /// Visible enemy ants. Only their position matters here.
    #[serde(default)]
    pub enemies: Vec<WireCoord>,
    /// Visible food.
    #[serde(default)]
    pub food: Vec<WireCoord>,
}

impl ArenaState {
    /// Convert into the engine's snapshot.
    ///
    /// Unknown cell codes are read as obstacles. Ants with an unknown type
    /// or an unparsable id are dropped with a warning.
    pub fn into_snapshot(self) -> WorldSnapshot {
        let homes: Vec<HexCoord> = self.home.iter().copied().map(HexCoord::from).collect();
        let anchor = self
            .spot
            .map(HexCoord::from)
            .or_else(|| homes.first().copied())
            .unwrap_or(HexCoord::ORIGIN);

        let cells = self
            .map
            .iter()
            .map(|c| CellObservation {
                coord: HexCoord::new(c.q, c.r),
                terrain: terrain_from_code(c.kind),
            })
            .collect();

        let agents = self
            .ants
            .iter()
            .filter_map(|ant| {
                let Some(role) = role_from_code(ant.kind) else {
                    warn!(ant = %ant.id, kind = ant.kind, "Unknown ant type; ignoring ant");
                    return None;
                };
                let id = match Uuid::parse_str(&ant.id) {
                    Ok(id) => AgentId(id),
                    Err(e) => {
                        warn!(ant = %ant.id, error = %e, "Unparsable ant id; ignoring ant");
                        return None;
                    }
                };
                Some(AgentObservation {
                    id,
                    coord: HexCoord::new(ant.q, ant.r),
                    role,
                    cargo: ant.food.amount,
                })
            })
            .collect();

        WorldSnapshot {
            turn: self.turn_no,
            cells,
            anchor,
            homes,
            agents,
            resources: self.food.into_iter().map(HexCoord::from).collect(),
            hostiles: self.enemies.into_iter().map(HexCoord::from).collect(),
        }
    }

    /// Write a snapshot back in the service's shape, for recording sandbox
    /// matches.
    pub fn from_snapshot(snapshot: &WorldSnapshot) -> Self {
        Self {
            turn_no: snapshot.turn,
            map: snapshot
                .cells
                .iter()
                .map(|c| WireCell {
                    q: c.coord.q,
                    r: c.coord.r,
                    kind: terrain_code(c.terrain),
                })
                .collect(),
            home: snapshot.homes.iter().copied().map(WireCoord::from).collect(),
            spot: Some(snapshot.anchor.into()),
            ants: snapshot
                .agents
                .iter()
                .map(|a| WireAnt {
                    id: a.id.to_string(),
                    q: a.coord.q,
                    r: a.coord.r,
                    kind: role_code(a.role),
                    food: WireCargo { amount: a.cargo },
                })
                .collect(),
            enemies: snapshot.hostiles.iter().copied().map(WireCoord::from).collect(),
            food: snapshot.resources.iter().copied().map(WireCoord::from).collect(),
        }
    }
}

/// One ant's route in a move request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    /// Ant UUID.
    pub ant: String,
    /// Cells to walk, nearest first.
    pub path: Vec<WireCoord>,
}

/// Body of `POST /api/move`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Routes for ants that move this turn.
    pub moves: Vec<WireMove>,
}

impl From<&MovePlan> for MoveRequest {
    /// Ants that hold are left out.
    fn from(plan: &MovePlan) -> Self {
        Self {
            moves: plan
                .moves()
                .map(|o| WireMove {
                    ant: o.agent.to_string(),
                    path: vec![o.destination.into()],
                })
                .collect(),
        }
    }
}

const fn terrain_from_code(code: i64) -> Terrain {
    match code {
        1 => Terrain::Home,
        2 => Terrain::Open,
        3 => Terrain::Rough,
        4 => Terrain::Hazard,
        _ => Terrain::Obstacle,
    }
}

const fn terrain_code(terrain: Terrain) -> i64 {
    match terrain {
        Terrain::Home => 1,
        Terrain::Open => 2,
        Terrain::Rough => 3,
        Terrain::Hazard => 4,
        Terrain::Obstacle => 5,
    }
}

const fn role_from_code(code: i64) -> Option<Role> {
    match code {
        0 => Some(Role::Gatherer),
        1 => Some(Role::Defender),
        2 => Some(Role::Scout),
        _ => None,
    }
}

const fn role_code(role: Role) -> i64 {
    match role {
        Role::Gatherer => 0,
        Role::Defender => 1,
        Role::Scout => 2,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::MoveOrder;

    use super::*;

    const SAMPLE: &str = r#"{
        "turnNo": 12,
        "map": [
            {"q": 0, "r": 0, "type": 1},
            {"q": 1, "r": 0, "type": 2},
            {"q": 2, "r": 0, "type": 3},
            {"q": 3, "r": 0, "type": 4},
            {"q": 4, "r": 0, "type": 5},
            {"q": 5, "r": 0, "type": 9}
        ],
        "home": [{"q": 0, "r": 0}, {"q": 0, "r": 1}],
        "spot": {"q": 0, "r": 0},
        "ants": [
            {"id": "0190a6c4-6b1e-7c3a-9a4e-2f6d8b1c0e11", "q": 1, "r": 0, "type": 0,
             "health": 130, "food": {"type": 1, "amount": 2}},
            {"id": "0190a6c4-6b1e-7c3a-9a4e-2f6d8b1c0e12", "q": 2, "r": 0, "type": 2},
            {"id": "not-a-uuid", "q": 3, "r": 0, "type": 1},
            {"id": "0190a6c4-6b1e-7c3a-9a4e-2f6d8b1c0e13", "q": 0, "r": 1, "type": 7}
        ],
        "enemies": [{"q": 6, "r": -1, "type": 1, "health": 90}],
        "food": [{"q": 3, "r": -1, "type": 2, "amount": 5}],
        "score": 40
    }"#;

    #[test]
    fn arena_json_becomes_a_snapshot() {
        let state: ArenaState = serde_json::from_str(SAMPLE).unwrap();
        let snap = state.into_snapshot();

        assert_eq!(snap.turn, 12);
        assert_eq!(snap.anchor, HexCoord::ORIGIN);
        assert_eq!(snap.depots(), vec![HexCoord::new(0, 1)]);
        let terrains: Vec<Terrain> = snap.cells.iter().map(|c| c.terrain).collect();
        assert_eq!(
            terrains,
            vec![
                Terrain::Home,
                Terrain::Open,
                Terrain::Rough,
                Terrain::Hazard,
                Terrain::Obstacle,
                Terrain::Obstacle,
            ]
        );

        // The bad id and the unknown type are dropped.
        assert_eq!(snap.agents.len(), 2);
        let worker = snap.agents.first().unwrap();
        assert_eq!(worker.role, Role::Gatherer);
        assert_eq!(worker.cargo, 2);
        assert_eq!(snap.agents.get(1).unwrap().role, Role::Scout);

        assert_eq!(snap.hostiles, vec![HexCoord::new(6, -1)]);
        assert_eq!(snap.resources, vec![HexCoord::new(3, -1)]);
    }

    #[test]
    fn pre_match_answer_has_no_map() {
        let state: ArenaState = serde_json::from_str(r#"{"turnNo": 0}"#).unwrap();
        assert!(!state.into_snapshot().has_map());
    }

    #[test]
    fn missing_spot_falls_back_to_first_home() {
        let state: ArenaState =
            serde_json::from_str(r#"{"home": [{"q": 4, "r": 4}, {"q": 5, "r": 4}]}"#).unwrap();
        assert_eq!(state.into_snapshot().anchor, HexCoord::new(4, 4));
    }

    #[test]
    fn recorded_snapshot_reads_back_identically() {
        let original = serde_json::from_str::<ArenaState>(SAMPLE).unwrap().into_snapshot();
        let json = serde_json::to_string(&ArenaState::from_snapshot(&original)).unwrap();
        let reread = serde_json::from_str::<ArenaState>(&json).unwrap().into_snapshot();
        // Unknown cell codes were already folded into obstacles.
        assert_eq!(reread, original);
    }

    #[test]
    fn move_request_skips_holds() {
        let moving = AgentId::from_u128(1);
        let plan = MovePlan {
            turn: 3,
            orders: vec![
                MoveOrder {
                    agent: moving,
                    from: HexCoord::new(0, 0),
                    destination: HexCoord::new(1, 0),
                },
                MoveOrder {
                    agent: AgentId::from_u128(2),
                    from: HexCoord::new(2, 2),
                    destination: HexCoord::new(2, 2),
                },
            ],
        };
        let body = serde_json::to_value(MoveRequest::from(&plan)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "moves": [{"ant": moving.to_string(), "path": [{"q": 1, "r": 0}]}]
            })
        );
    }
}
