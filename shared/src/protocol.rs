//! JSON wire protocol.
//!
//! Every frame is a single JSON object tagged by a `type` field in
//! SCREAMING_SNAKE_CASE, with camelCase payload fields alongside it:
//!
//! ```json
//! {"type":"PLACE_VOXEL","pos":{"x":0.5,"y":0,"z":0.5},"color":"#44aa88"}
//! ```

use crate::{GameConfig, Player, PlayerId, Team, TeamId, Vector3, Voxel, VoxelId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Commands sent by clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    PlaceVoxel {
        pos: Vector3,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    AttackVoxel {
        voxel_id: VoxelId,
    },
    FortifyVoxel {
        voxel_id: VoxelId,
    },
    DestroyVoxel {
        voxel_id: VoxelId,
    },
    RepairVoxels {
        voxel_id: VoxelId,
    },
    CreateTeam {
        name: String,
    },
    JoinTeam {
        team_id: TeamId,
    },
    Chat {
        message: String,
        #[serde(default)]
        team_only: bool,
    },
    /// Partial ruleset update. Accepted even while the game is paused.
    AdminUpdateConfig {
        config: Map<String, Value>,
    },
}

impl ClientMessage {
    pub fn is_admin(&self) -> bool {
        matches!(self, ClientMessage::AdminUpdateConfig { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::PlaceVoxel { .. } => "PLACE_VOXEL",
            ClientMessage::AttackVoxel { .. } => "ATTACK_VOXEL",
            ClientMessage::FortifyVoxel { .. } => "FORTIFY_VOXEL",
            ClientMessage::DestroyVoxel { .. } => "DESTROY_VOXEL",
            ClientMessage::RepairVoxels { .. } => "REPAIR_VOXELS",
            ClientMessage::CreateTeam { .. } => "CREATE_TEAM",
            ClientMessage::JoinTeam { .. } => "JOIN_TEAM",
            ClientMessage::Chat { .. } => "CHAT",
            ClientMessage::AdminUpdateConfig { .. } => "ADMIN_UPDATE_CONFIG",
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Events sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Full-state snapshot, sent once to a newly connected client.
    Init {
        config: GameConfig,
        player_id: PlayerId,
        players: Vec<Player>,
        teams: Vec<Team>,
        voxels: Vec<Voxel>,
    },
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    VoxelPlaced {
        voxel: Voxel,
        player: Player,
    },
    VoxelAttacked {
        voxel_id: VoxelId,
        attacker_id: PlayerId,
        damage: u32,
        new_hp: u32,
        player_bucks: u64,
    },
    /// The target and every voxel in `collapsed_voxels` are gone.
    VoxelDestroyed {
        voxel_id: VoxelId,
        attacker_id: PlayerId,
        loot: u64,
        player_bucks: u64,
        collapsed_voxels: Vec<VoxelId>,
    },
    /// Carries the updated voxel record; also used for repairs.
    VoxelFortified {
        voxel: Voxel,
        player: Player,
    },
    VoxelRemoved {
        voxel_id: VoxelId,
    },
    IncomeUpdate {
        player_id: PlayerId,
        bucks: u64,
        next_income_in: u64,
    },
    ConfigUpdate {
        config: GameConfig,
    },
    TeamUpdate {
        teams: Vec<Team>,
    },
    ChatMessage {
        player_id: PlayerId,
        player_name: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team_id: Option<TeamId>,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
