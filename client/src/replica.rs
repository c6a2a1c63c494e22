//! Client-side replica of the world, driven purely by server events

use log::debug;
use shared::{
    CellKey, GameConfig, Player, PlayerId, ServerEvent, Team, Voxel, VoxelId, DESTROY_XP,
};
use std::collections::HashMap;

/// One line of received chat
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLine {
    pub player_name: String,
    pub message: String,
    pub team_only: bool,
}

/// Everything the client knows about the world.
///
/// Nothing here is predicted. Every field changes only in [`ReplicaState::apply`],
/// so a replica fed the full event stream in order matches the server.
/// `Voxel::last_attacked_at` is the exception: attack events carry no
/// timestamp, so it is only known from an INIT snapshot.
#[derive(Debug, Clone, Default)]
pub struct ReplicaState {
    pub player_id: Option<PlayerId>,
    pub config: GameConfig,
    pub players: HashMap<PlayerId, Player>,
    pub teams: Vec<Team>,
    pub voxels: HashMap<VoxelId, Voxel>,
    pub chat: Vec<ChatLine>,
    pub last_error: Option<String>,
}

impl ReplicaState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the INIT snapshot has arrived.
    pub fn is_hydrated(&self) -> bool {
        self.player_id.is_some()
    }

    /// The local player, once known.
    pub fn me(&self) -> Option<&Player> {
        self.player_id.as_ref().and_then(|id| self.players.get(id))
    }

    pub fn voxel_at(&self, cell: CellKey) -> Option<&Voxel> {
        self.voxels.values().find(|v| v.cell() == cell)
    }

    /// Voxels ordered bottom-up, the same order INIT snapshots use.
    pub fn sorted_voxels(&self) -> Vec<Voxel> {
        let mut voxels: Vec<Voxel> = self.voxels.values().cloned().collect();
        voxels.sort_by_key(|v| {
            let c = v.cell();
            (c.y, c.x, c.z)
        });
        voxels
    }

    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::Init {
                config,
                player_id,
                players,
                teams,
                voxels,
            } => {
                self.player_id = Some(player_id.clone());
                self.config = config.clone();
                self.players = players.iter().map(|p| (p.id.clone(), p.clone())).collect();
                self.teams = teams.clone();
                self.voxels = voxels.iter().map(|v| (v.id.clone(), v.clone())).collect();
                debug!(
                    "Hydrated replica: {} players, {} voxels",
                    self.players.len(),
                    self.voxels.len()
                );
            }
            ServerEvent::PlayerJoined { player } => {
                self.players.insert(player.id.clone(), player.clone());
            }
            ServerEvent::PlayerLeft { player_id } => {
                self.players.remove(player_id);
            }
            ServerEvent::VoxelPlaced { voxel, player } | ServerEvent::VoxelFortified { voxel, player } => {
                self.voxels.insert(voxel.id.clone(), voxel.clone());
                self.players.insert(player.id.clone(), player.clone());
            }
            ServerEvent::VoxelAttacked {
                voxel_id,
                attacker_id,
                new_hp,
                player_bucks,
                ..
            } => {
                if let Some(voxel) = self.voxels.get_mut(voxel_id) {
                    voxel.hp = *new_hp;
                }
                self.set_bucks(attacker_id, *player_bucks);
            }
            ServerEvent::VoxelDestroyed {
                voxel_id,
                attacker_id,
                player_bucks,
                collapsed_voxels,
                ..
            } => {
                self.voxels.remove(voxel_id);
                for id in collapsed_voxels {
                    self.voxels.remove(id);
                }
                self.set_bucks(attacker_id, *player_bucks);
                if let Some(attacker) = self.players.get_mut(attacker_id) {
                    attacker.grant_xp(DESTROY_XP);
                }
            }
            ServerEvent::VoxelRemoved { voxel_id } => {
                self.voxels.remove(voxel_id);
            }
            ServerEvent::IncomeUpdate {
                player_id, bucks, ..
            } => {
                self.set_bucks(player_id, *bucks);
            }
            ServerEvent::ConfigUpdate { config } => {
                self.config = config.clone();
            }
            ServerEvent::TeamUpdate { teams } => {
                self.assign_new_members(teams);
                self.teams = teams.clone();
            }
            ServerEvent::ChatMessage {
                player_name,
                message,
                team_id,
                ..
            } => {
                self.chat.push(ChatLine {
                    player_name: player_name.clone(),
                    message: message.clone(),
                    team_only: team_id.is_some(),
                });
            }
            ServerEvent::Error { message } => {
                self.last_error = Some(message.clone());
            }
        }
    }

    /// Points every newly listed member at the team that gained them. A
    /// player who joins a second team stays listed in the first, so only
    /// additions move `team_id`.
    fn assign_new_members(&mut self, teams: &[Team]) {
        for team in teams {
            let previous = self.teams.iter().find(|t| t.id == team.id);
            for member in &team.members {
                if previous.is_some_and(|t| t.has_member(member)) {
                    continue;
                }
                if let Some(player) = self.players.get_mut(member) {
                    player.team_id = Some(team.id.clone());
                }
            }
        }
    }

    fn set_bucks(&mut self, player_id: &str, bucks: u64) {
        if let Some(player) = self.players.get_mut(player_id) {
            player.bucks = bucks;
        }
    }

    /// One-line status for the console.
    pub fn summary(&self) -> String {
        match self.me() {
            Some(me) => format!(
                "{} | bucks {} | level {} ({} xp) | {} voxels ({} mine) | {} players{}",
                me.name,
                me.bucks,
                me.level,
                me.xp,
                self.voxels.len(),
                self.voxels.values().filter(|v| v.owner_id == me.id).count(),
                self.players.len(),
                if self.config.is_paused { " | PAUSED" } else { "" }
            ),
            None => "waiting for snapshot".to_string(),
        }
    }
}
