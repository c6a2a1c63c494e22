//! Types shared by the voxel territory server and its clients.
//!
//! Everything that crosses the wire lives here: the world data model
//! ([`Voxel`], [`Player`], [`Team`]), the live ruleset ([`GameConfig`]) and the
//! JSON protocol ([`ClientMessage`] commands and [`ServerEvent`] events).

pub mod config;
pub mod model;
pub mod protocol;

pub use config::{ConfigPatchOutcome, GameConfig};
pub use model::{CellKey, Player, Team, Vector3, Voxel};
pub use protocol::{ClientMessage, ServerEvent};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub type PlayerId = String;
pub type VoxelId = String;
pub type TeamId = String;

pub const STARTING_BUCKS: u64 = 150;
pub const BASE_VOXEL_HP: u32 = 120;
pub const PLACE_XP: u64 = 10;
pub const DESTROY_XP: u64 = 50;
pub const XP_PER_LEVEL: u64 = 500;
pub const MAX_FORTIFICATION_TIER: u8 = 3;
pub const PROTECTION_WINDOW_MS: u64 = 20_000;
pub const NEW_PLAYER_WINDOW_MS: u64 = 60 * 60 * 1000;
pub const NEW_PLAYER_DISCOUNT: f64 = 0.25;
pub const MAX_TEAM_MEMBERS: usize = 50;
pub const MAX_TEAM_NAME_LEN: usize = 32;
pub const MAX_CHAT_LEN: usize = 200;

/// Generates a random 128-bit identifier rendered as 32 lowercase hex digits.
pub fn new_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}
