//! World data model: grid cells, voxels, players and teams.

use crate::{PlayerId, TeamId, VoxelId, BASE_VOXEL_HP, STARTING_BUCKS, XP_PER_LEVEL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal precision coordinates are snapped to before a cell is derived.
const KEY_PRECISION: f64 = 10_000.0;

fn quantize(value: f64) -> f64 {
    (value * KEY_PRECISION).round() / KEY_PRECISION
}

/// A point in world space.
///
/// Voxel positions are always canonical: `x` and `z` sit on cell centers
/// (integer + 0.5) and `y` is a non-negative integer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Snaps this point to the center of the grid cell containing it.
    pub fn canonical(&self) -> Vector3 {
        CellKey::from_position(self).center()
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Exact, hashable identity of one grid cell.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellKey {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal components are floored to their cell, `y` is rounded to the
    /// nearest level.
    pub fn from_position(pos: &Vector3) -> Self {
        Self {
            x: quantize(pos.x).floor() as i32,
            y: quantize(pos.y).round() as i32,
            z: quantize(pos.z).floor() as i32,
        }
    }

    pub fn center(&self) -> Vector3 {
        Vector3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }

    pub fn is_ground(&self) -> bool {
        self.y == 0
    }

    pub fn below(&self) -> CellKey {
        CellKey::new(self.x, self.y - 1, self.z)
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> CellKey {
        CellKey::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The six axis-adjacent cells (±1 on exactly one axis).
    pub fn neighbors6(&self) -> [CellKey; 6] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{}]", self.x, self.y, self.z)
    }
}

/// A unit cube of claimed territory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Voxel {
    pub id: VoxelId,
    pub position: Vector3,
    pub owner_id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub base_cost: u64,
    pub fortification_tier: u8,
    pub fortification_spend: u64,
    pub invested_value: u64,
    pub hp: u32,
    pub max_hp: u32,
    pub placed_at: u64,
    #[serde(default)]
    pub last_attacked_at: Option<u64>,
}

impl Voxel {
    pub fn new(
        id: VoxelId,
        position: Vector3,
        owner_id: PlayerId,
        color: Option<String>,
        cost: u64,
        placed_at: u64,
    ) -> Self {
        Self {
            id,
            position: position.canonical(),
            owner_id,
            color,
            base_cost: cost,
            fortification_tier: 0,
            fortification_spend: 0,
            invested_value: cost,
            hp: BASE_VOXEL_HP,
            max_hp: BASE_VOXEL_HP,
            placed_at,
            last_attacked_at: None,
        }
    }

    pub fn cell(&self) -> CellKey {
        CellKey::from_position(&self.position)
    }

    pub fn is_damaged(&self) -> bool {
        self.hp < self.max_hp
    }
}

/// A connected participant. Lives exactly as long as its connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub bucks: u64,
    pub xp: u64,
    pub level: u32,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    pub last_income_at: u64,
    pub joined_at: u64,
    pub is_new_player: bool,
}

impl Player {
    pub fn new(id: PlayerId, joined_at: u64) -> Self {
        let name = format!("Player-{}", &id[..id.len().min(6)]);
        Self {
            id,
            name,
            bucks: STARTING_BUCKS,
            xp: 0,
            level: 1,
            team_id: None,
            last_income_at: joined_at,
            joined_at,
            is_new_player: true,
        }
    }

    /// Adds experience and levels up as many times as it covers.
    /// Returns the number of levels gained.
    pub fn grant_xp(&mut self, amount: u64) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        loop {
            let threshold = self.level as u64 * XP_PER_LEVEL;
            if self.xp < threshold {
                break;
            }
            self.xp -= threshold;
            self.level += 1;
            gained += 1;
        }
        gained
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub leader_id: PlayerId,
    pub members: Vec<PlayerId>,
}

impl Team {
    pub fn new(id: TeamId, name: String, leader_id: PlayerId) -> Self {
        Self {
            id,
            name,
            members: vec![leader_id.clone()],
            leader_id,
        }
    }

    pub fn has_member(&self, player_id: &str) -> bool {
        self.members.iter().any(|m| m == player_id)
    }
}
