//! Authoritative world state and the command processor that mutates it.
//!
//! [`GameState`] owns every voxel, player and team. It is only ever touched
//! from the server's single event loop, one command at a time, so each
//! handler below sees and leaves a consistent world. Handlers never send
//! anything themselves; they return [`Dispatch`]es for the session layer to
//! fan out.

use crate::error::CommandError;
use crate::index::VoxelIndex;
use crate::integrity;
use crate::ledger;
use crate::teams::{JoinOutcome, TeamRegistry};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use shared::{
    new_id, CellKey, ClientMessage, GameConfig, Player, PlayerId, ServerEvent, Vector3, Voxel,
    DESTROY_XP, MAX_CHAT_LEN, MAX_FORTIFICATION_TIER, MAX_TEAM_NAME_LEN, PLACE_XP,
    PROTECTION_WINDOW_MS,
};
use std::collections::HashMap;

/// Who should receive an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    All,
    Player(PlayerId),
    AllExcept(PlayerId),
    Players(Vec<PlayerId>),
}

/// An event paired with its audience.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub target: Target,
    pub event: ServerEvent,
}

impl Dispatch {
    pub fn all(event: ServerEvent) -> Self {
        Self {
            target: Target::All,
            event,
        }
    }

    pub fn to(player_id: &str, event: ServerEvent) -> Self {
        Self {
            target: Target::Player(player_id.to_string()),
            event,
        }
    }

    pub fn all_except(player_id: &str, event: ServerEvent) -> Self {
        Self {
            target: Target::AllExcept(player_id.to_string()),
            event,
        }
    }
}

type CommandResult = Result<Vec<Dispatch>, CommandError>;

#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub voxels: VoxelIndex,
    pub players: HashMap<PlayerId, Player>,
    pub teams: TeamRegistry,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            voxels: VoxelIndex::new(),
            players: HashMap::new(),
            teams: TeamRegistry::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Creates a player for a fresh connection. The new player gets a full
    /// snapshot; everyone else hears that they joined.
    pub fn add_player(&mut self, now: u64) -> (PlayerId, Vec<Dispatch>) {
        let player = Player::new(new_id(), now);
        let player_id = player.id.clone();
        info!("Added player {} ({})", player.name, player_id);

        self.players.insert(player_id.clone(), player.clone());

        let dispatches = vec![
            Dispatch::to(&player_id, self.snapshot(&player_id)),
            Dispatch::all_except(&player_id, ServerEvent::PlayerJoined { player }),
        ];
        (player_id, dispatches)
    }

    /// Drops a player. Their voxels stay in the world.
    pub fn remove_player(&mut self, player_id: &str) -> Vec<Dispatch> {
        if self.players.remove(player_id).is_none() {
            return Vec::new();
        }
        info!("Removed player {}", player_id);
        vec![Dispatch::all(ServerEvent::PlayerLeft {
            player_id: player_id.to_string(),
        })]
    }

    pub fn expire_discount(&mut self, player_id: &str) {
        if let Some(player) = self.players.get_mut(player_id) {
            player.is_new_player = false;
            debug!("New-player discount expired for {}", player_id);
        }
    }

    pub fn snapshot(&self, player_id: &str) -> ServerEvent {
        let mut players: Vec<Player> = self.players.values().cloned().collect();
        players.sort_by_key(|p| p.joined_at);

        ServerEvent::Init {
            config: self.config.clone(),
            player_id: player_id.to_string(),
            players,
            teams: self.teams.all(),
            voxels: self.voxels.snapshot(),
        }
    }

    // -----------------------------------------------------------------------
    // Command entry point
    // -----------------------------------------------------------------------

    /// Validates and applies one command from `player_id`.
    ///
    /// Unknown senders are ignored. Rule violations come back as a single
    /// `ERROR` addressed to the sender, with the world left untouched.
    pub fn handle_command(
        &mut self,
        player_id: &str,
        command: ClientMessage,
        now: u64,
    ) -> Vec<Dispatch> {
        if !self.players.contains_key(player_id) {
            debug!("Dropping {} from unknown player {}", command.kind(), player_id);
            return Vec::new();
        }

        let kind = command.kind();
        match self.apply_command(player_id, command, now) {
            Ok(dispatches) => dispatches,
            Err(err) => {
                debug!("Rejected {} from {}: {}", kind, player_id, err);
                vec![Dispatch::to(player_id, ServerEvent::error(err.to_string()))]
            }
        }
    }

    fn apply_command(&mut self, player_id: &str, command: ClientMessage, now: u64) -> CommandResult {
        if self.config.is_paused && !command.is_admin() {
            return Err(CommandError::Paused);
        }

        match command {
            ClientMessage::PlaceVoxel { pos, color } => self.place_voxel(player_id, pos, color, now),
            ClientMessage::AttackVoxel { voxel_id } => self.attack_voxel(player_id, &voxel_id, now),
            ClientMessage::FortifyVoxel { voxel_id } => self.fortify_voxel(player_id, &voxel_id),
            ClientMessage::DestroyVoxel { voxel_id } => self.destroy_voxel(player_id, &voxel_id),
            ClientMessage::RepairVoxels { voxel_id } => self.repair_voxels(player_id, &voxel_id),
            ClientMessage::CreateTeam { name } => self.create_team(player_id, &name),
            ClientMessage::JoinTeam { team_id } => self.join_team(player_id, &team_id),
            ClientMessage::Chat { message, team_only } => self.chat(player_id, &message, team_only),
            ClientMessage::AdminUpdateConfig { config } => Ok(self.update_config(&config)),
        }
    }

    // -----------------------------------------------------------------------
    // Authorization helpers
    // -----------------------------------------------------------------------

    /// Same player, or both currently on the same team.
    pub fn are_allies(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let team_of = |id: &str| self.players.get(id).and_then(|p| p.team_id.as_deref());
        matches!((team_of(a), team_of(b)), (Some(x), Some(y)) if x == y)
    }

    fn enemy_within_buffer(&self, player_id: &str, cell: CellKey) -> bool {
        let radius = self.config.build_buffer.max(0);
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    let near = cell.offset(dx, dy, dz);
                    if let Some(voxel) = self.voxels.get(&near) {
                        if !self.are_allies(player_id, &voxel.owner_id) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    fn place_voxel(
        &mut self,
        player_id: &str,
        pos: Vector3,
        color: Option<String>,
        now: u64,
    ) -> CommandResult {
        let cell = CellKey::from_position(&pos);
        let position = cell.center();
        let half = self.config.world_size / 2.0;

        if cell.y < 0
            || cell.y >= self.config.max_height
            || position.x.abs() > half
            || position.z.abs() > half
        {
            return Err(CommandError::OutOfBounds);
        }
        if self.voxels.is_occupied(&cell) {
            return Err(CommandError::CellOccupied);
        }
        if self.enemy_within_buffer(player_id, cell) {
            return Err(CommandError::EnemyTooClose);
        }
        if !cell.is_ground() {
            if let Some(below) = self.voxels.get(&cell.below()) {
                if !self.are_allies(player_id, &below.owner_id) {
                    return Err(CommandError::ForeignColumn);
                }
            }
            if !integrity::is_supported_from(&self.voxels, cell) {
                return Err(CommandError::Unsupported);
            }
        }

        let Some(player) = self.players.get_mut(player_id) else {
            return Ok(Vec::new());
        };
        let cost = ledger::placement_cost(&self.config, cell.y, ledger::has_discount(player, now));
        if player.bucks < cost {
            return Err(CommandError::InsufficientFunds {
                needed: cost,
                available: player.bucks,
            });
        }

        let voxel = Voxel::new(new_id(), position, player_id.to_string(), color, cost, now);
        if self.voxels.insert(voxel.clone()).is_err() {
            return Err(CommandError::CellOccupied);
        }

        player.bucks -= cost;
        if player.grant_xp(PLACE_XP) > 0 {
            info!("{} reached level {}", player.name, player.level);
        }
        debug!("{} placed voxel at {} for {}", player_id, cell, cost);

        Ok(vec![Dispatch::all(ServerEvent::VoxelPlaced {
            voxel,
            player: player.clone(),
        })])
    }

    // -----------------------------------------------------------------------
    // Combat & destruction
    // -----------------------------------------------------------------------

    fn attack_voxel(&mut self, attacker_id: &str, voxel_id: &str, now: u64) -> CommandResult {
        let Some(target) = self.voxels.get_by_id(voxel_id) else {
            return Ok(Vec::new());
        };
        if target.owner_id == attacker_id {
            return Err(CommandError::OwnVoxel);
        }
        if self.are_allies(attacker_id, &target.owner_id) {
            return Err(CommandError::AllyVoxel);
        }
        let age = now.saturating_sub(target.placed_at);
        if age < PROTECTION_WINDOW_MS {
            return Err(CommandError::Protected {
                remaining_secs: (PROTECTION_WINDOW_MS - age).div_ceil(1000),
            });
        }

        let Some(attacker) = self.players.get_mut(attacker_id) else {
            return Ok(Vec::new());
        };
        let attack_cost = self.config.attack_cost;
        if attacker.bucks < attack_cost {
            return Err(CommandError::InsufficientFunds {
                needed: attack_cost,
                available: attacker.bucks,
            });
        }
        let Some(target) = self.voxels.get_by_id_mut(voxel_id) else {
            return Ok(Vec::new());
        };

        let damage = self.config.attack_damage;
        attacker.bucks -= attack_cost;
        target.hp = target.hp.saturating_sub(damage);
        target.last_attacked_at = Some(now);

        if target.hp > 0 {
            return Ok(vec![Dispatch::all(ServerEvent::VoxelAttacked {
                voxel_id: voxel_id.to_string(),
                attacker_id: attacker_id.to_string(),
                damage,
                new_hp: target.hp,
                player_bucks: attacker.bucks,
            })]);
        }

        let Some(destroyed) = self.voxels.remove_by_id(voxel_id) else {
            return Ok(Vec::new());
        };
        let loot = ledger::loot(&self.config, &destroyed);
        attacker.bucks += loot;
        if attacker.grant_xp(DESTROY_XP) > 0 {
            info!("{} reached level {}", attacker.name, attacker.level);
        }
        let player_bucks = attacker.bucks;

        let collapsed = integrity::collapse_unsupported(&mut self.voxels);
        info!(
            "{} destroyed voxel {} (loot {}, {} collapsed)",
            attacker_id,
            voxel_id,
            loot,
            collapsed.len()
        );

        Ok(vec![Dispatch::all(ServerEvent::VoxelDestroyed {
            voxel_id: voxel_id.to_string(),
            attacker_id: attacker_id.to_string(),
            loot,
            player_bucks,
            collapsed_voxels: collapsed.into_iter().map(|v| v.id).collect(),
        })])
    }

    /// Removes a voxel outright. Allowed for its owner and for the leader of
    /// a team the owner belongs to. Nothing is refunded.
    fn destroy_voxel(&mut self, player_id: &str, voxel_id: &str) -> CommandResult {
        let Some(target) = self.voxels.get_by_id(voxel_id) else {
            return Ok(Vec::new());
        };
        if target.owner_id != player_id && !self.teams.leads_member(player_id, &target.owner_id) {
            return Err(CommandError::NotAuthorized);
        }

        let Some(removed) = self.voxels.remove_by_id(voxel_id) else {
            return Ok(Vec::new());
        };
        let collapsed = integrity::collapse_unsupported(&mut self.voxels);
        info!(
            "{} demolished voxel {} ({} collapsed)",
            player_id,
            removed.id,
            collapsed.len()
        );

        Ok(std::iter::once(removed)
            .chain(collapsed)
            .map(|v| Dispatch::all(ServerEvent::VoxelRemoved { voxel_id: v.id }))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Fortification & repair
    // -----------------------------------------------------------------------

    fn fortify_voxel(&mut self, player_id: &str, voxel_id: &str) -> CommandResult {
        let Some(voxel) = self.voxels.get_by_id_mut(voxel_id) else {
            return Ok(Vec::new());
        };
        if voxel.owner_id != player_id {
            return Err(CommandError::NotOwner);
        }
        if voxel.fortification_tier >= MAX_FORTIFICATION_TIER {
            return Err(CommandError::MaxFortification);
        }
        let Some(player) = self.players.get_mut(player_id) else {
            return Ok(Vec::new());
        };

        let cost = self.config.fortification_costs[voxel.fortification_tier as usize];
        if player.bucks < cost {
            return Err(CommandError::InsufficientFunds {
                needed: cost,
                available: player.bucks,
            });
        }

        let bonus = self.config.fortification_hp_bonus;
        player.bucks -= cost;
        voxel.fortification_tier += 1;
        voxel.fortification_spend += cost;
        voxel.invested_value += cost;
        voxel.max_hp += bonus;
        voxel.hp += bonus;
        debug!(
            "{} fortified {} to tier {}",
            player_id, voxel_id, voxel.fortification_tier
        );

        Ok(vec![Dispatch::all(ServerEvent::VoxelFortified {
            voxel: voxel.clone(),
            player: player.clone(),
        })])
    }

    /// Restores the whole allied structure around `voxel_id` to full health,
    /// or nothing at all if the player cannot pay for every voxel.
    fn repair_voxels(&mut self, player_id: &str, voxel_id: &str) -> CommandResult {
        let Some(seed) = self.voxels.get_by_id(voxel_id) else {
            return Ok(Vec::new());
        };
        if !self.are_allies(player_id, &seed.owner_id) {
            return Err(CommandError::NotAuthorized);
        }
        let seed_cell = seed.cell();

        let component = integrity::connected_component(&self.voxels, seed_cell, |v| {
            self.are_allies(player_id, &v.owner_id)
        });
        let damaged: Vec<CellKey> = component
            .into_iter()
            .filter(|c| self.voxels.get(c).is_some_and(|v| v.is_damaged()))
            .collect();
        if damaged.is_empty() {
            return Err(CommandError::NothingToRepair);
        }

        let total: u64 = damaged
            .iter()
            .filter_map(|c| self.voxels.get(c))
            .map(|v| ledger::repair_cost(&self.config, v))
            .sum();

        let Some(player) = self.players.get_mut(player_id) else {
            return Ok(Vec::new());
        };
        if player.bucks < total {
            return Err(CommandError::InsufficientFunds {
                needed: total,
                available: player.bucks,
            });
        }
        player.bucks -= total;
        let player = player.clone();

        let mut dispatches = Vec::with_capacity(damaged.len());
        for cell in &damaged {
            if let Some(voxel) = self.voxels.get_mut(cell) {
                voxel.hp = voxel.max_hp;
                dispatches.push(Dispatch::all(ServerEvent::VoxelFortified {
                    voxel: voxel.clone(),
                    player: player.clone(),
                }));
            }
        }
        debug!(
            "{} repaired {} voxels for {}",
            player_id,
            dispatches.len(),
            total
        );

        Ok(dispatches)
    }

    // -----------------------------------------------------------------------
    // Teams & chat
    // -----------------------------------------------------------------------

    fn create_team(&mut self, player_id: &str, name: &str) -> CommandResult {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_TEAM_NAME_LEN {
            return Err(CommandError::InvalidTeamName {
                max: MAX_TEAM_NAME_LEN,
            });
        }
        let Some(player) = self.players.get_mut(player_id) else {
            return Ok(Vec::new());
        };

        let team = self.teams.create(name.to_string(), player_id.to_string());
        player.team_id = Some(team.id.clone());
        info!("{} created team {} ({})", player_id, team.name, team.id);

        Ok(vec![Dispatch::all(ServerEvent::TeamUpdate {
            teams: self.teams.all(),
        })])
    }

    fn join_team(&mut self, player_id: &str, team_id: &str) -> CommandResult {
        if !self.players.contains_key(player_id) {
            return Ok(Vec::new());
        }

        match self.teams.join(team_id, player_id.to_string()) {
            JoinOutcome::UnknownTeam => return Ok(Vec::new()),
            JoinOutcome::Full => return Err(CommandError::TeamFull),
            JoinOutcome::Joined => {}
        }
        if let Some(player) = self.players.get_mut(player_id) {
            player.team_id = Some(team_id.to_string());
        }
        info!("{} joined team {}", player_id, team_id);

        Ok(vec![Dispatch::all(ServerEvent::TeamUpdate {
            teams: self.teams.all(),
        })])
    }

    fn chat(&mut self, player_id: &str, message: &str, team_only: bool) -> CommandResult {
        let message = message.trim();
        if message.is_empty() || message.chars().count() > MAX_CHAT_LEN {
            return Err(CommandError::InvalidChatMessage { max: MAX_CHAT_LEN });
        }
        let Some(sender) = self.players.get(player_id) else {
            return Ok(Vec::new());
        };

        let team_id = if team_only { sender.team_id.clone() } else { None };
        let event = ServerEvent::ChatMessage {
            player_id: player_id.to_string(),
            player_name: sender.name.clone(),
            message: message.to_string(),
            team_id: team_id.clone(),
        };

        let target = match team_id {
            Some(team_id) => Target::Players(
                self.players
                    .values()
                    .filter(|p| p.team_id.as_deref() == Some(team_id.as_str()))
                    .map(|p| p.id.clone())
                    .collect(),
            ),
            None => Target::All,
        };

        Ok(vec![Dispatch { target, event }])
    }

    // -----------------------------------------------------------------------
    // Administration & timers
    // -----------------------------------------------------------------------

    /// Merges a partial ruleset and broadcasts the result. Never fails.
    pub fn update_config(&mut self, patch: &Map<String, Value>) -> Vec<Dispatch> {
        let outcome = self.config.apply_patch(patch);
        if !outcome.applied.is_empty() {
            info!("Config updated: {}", outcome.applied.join(", "));
        }
        if !outcome.skipped.is_empty() {
            warn!("Ignored mistyped config keys: {}", outcome.skipped.join(", "));
        }

        vec![Dispatch::all(ServerEvent::ConfigUpdate {
            config: self.config.clone(),
        })]
    }

    /// One pass of the income timer over every connected player.
    pub fn income_tick(&mut self, now: u64) -> Vec<Dispatch> {
        if self.config.is_paused {
            return Vec::new();
        }

        let mut ids: Vec<&PlayerId> = self.players.keys().collect();
        ids.sort();
        let ids: Vec<PlayerId> = ids.into_iter().cloned().collect();

        let mut dispatches = Vec::new();
        for id in ids {
            let Some(player) = self.players.get_mut(&id) else {
                continue;
            };
            if let Some(bucks) = ledger::accrue_income(&self.config, player, now) {
                dispatches.push(Dispatch::all(ServerEvent::IncomeUpdate {
                    player_id: id,
                    bucks,
                    next_income_in: self.config.income_interval,
                }));
            }
        }
        dispatches
    }

    /// Liquid balance plus everything the player has sunk into voxels.
    pub fn net_worth(&self, player_id: &str) -> Option<u64> {
        let player = self.players.get(player_id)?;
        let invested: u64 = self
            .voxels
            .voxels()
            .filter(|v| v.owner_id == player_id)
            .map(|v| v.invested_value)
            .sum();
        Some(player.bucks + invested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::{BASE_VOXEL_HP, NEW_PLAYER_WINDOW_MS, STARTING_BUCKS};

    /// A moment after every new-player discount has lapsed.
    const LATER: u64 = NEW_PLAYER_WINDOW_MS + 1_000;

    fn join(game: &mut GameState) -> PlayerId {
        let (id, _) = game.add_player(0);
        id
    }

    fn place(game: &mut GameState, player: &str, cell: (i32, i32, i32), now: u64) -> Vec<Dispatch> {
        let pos = CellKey::new(cell.0, cell.1, cell.2).center();
        game.handle_command(player, ClientMessage::PlaceVoxel { pos, color: None }, now)
    }

    fn place_ok(game: &mut GameState, player: &str, cell: (i32, i32, i32), now: u64) -> String {
        let dispatches = place(game, player, cell, now);
        match dispatches.first().map(|d| &d.event) {
            Some(ServerEvent::VoxelPlaced { voxel, .. }) => voxel.id.clone(),
            other => panic!("placement at {:?} failed: {:?}", cell, other),
        }
    }

    fn error_of(dispatches: &[Dispatch]) -> Option<String> {
        match dispatches {
            [Dispatch {
                event: ServerEvent::Error { message },
                ..
            }] => Some(message.clone()),
            _ => None,
        }
    }

    fn attack(game: &mut GameState, attacker: &str, voxel_id: &str, now: u64) -> Vec<Dispatch> {
        game.handle_command(
            attacker,
            ClientMessage::AttackVoxel {
                voxel_id: voxel_id.to_string(),
            },
            now,
        )
    }

    fn command(game: &mut GameState, player: &str, msg: ClientMessage) -> Vec<Dispatch> {
        game.handle_command(player, msg, LATER)
    }

    fn assert_world_supported(game: &GameState) {
        let supported = integrity::supported_cells(&game.voxels);
        assert_eq!(supported.len(), game.voxels.len(), "floating voxels remain");
    }

    fn bucks(game: &GameState, player: &str) -> u64 {
        game.players[player].bucks
    }

    #[test]
    fn test_add_player_sends_snapshot_and_join() {
        let mut game = GameState::default();
        let first = join(&mut game);
        let (second, dispatches) = game.add_player(5);

        assert_eq!(dispatches.len(), 2);
        assert_eq!(dispatches[0].target, Target::Player(second.clone()));
        match &dispatches[0].event {
            ServerEvent::Init {
                player_id, players, ..
            } => {
                assert_eq!(player_id, &second);
                assert_eq!(players.len(), 2);
                assert_eq!(players[0].id, first);
            }
            other => panic!("expected INIT, got {:?}", other),
        }
        assert_eq!(dispatches[1].target, Target::AllExcept(second.clone()));
        assert!(matches!(dispatches[1].event, ServerEvent::PlayerJoined { .. }));
        assert_eq!(game.players[&second].bucks, STARTING_BUCKS);
    }

    #[test]
    fn test_remove_player_broadcasts_leave_and_keeps_voxels() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        place_ok(&mut game, &p1, (0, 0, 0), LATER);

        let dispatches = game.remove_player(&p1);
        assert_eq!(
            dispatches,
            vec![Dispatch::all(ServerEvent::PlayerLeft { player_id: p1.clone() })]
        );
        assert_eq!(game.voxels.len(), 1);
        assert!(game.remove_player(&p1).is_empty());
    }

    #[test]
    fn test_place_with_new_player_discount() {
        let mut game = GameState::default();
        let p1 = join(&mut game);

        let dispatches = place(&mut game, &p1, (0, 0, 0), 0);
        match &dispatches[0].event {
            ServerEvent::VoxelPlaced { voxel, player } => {
                assert_eq!(voxel.position, Vector3::new(0.5, 0.0, 0.5));
                assert_eq!(voxel.hp, BASE_VOXEL_HP);
                assert_eq!(voxel.max_hp, BASE_VOXEL_HP);
                assert_eq!(voxel.invested_value, 7);
                assert_eq!(player.bucks, 143);
                assert_eq!(player.xp, 10);
            }
            other => panic!("expected VOXEL_PLACED, got {:?}", other),
        }
        assert_eq!(dispatches[0].target, Target::All);
    }

    #[test]
    fn test_place_at_full_price_after_window() {
        let mut game = GameState::default();
        let p1 = join(&mut game);

        place_ok(&mut game, &p1, (0, 0, 0), LATER);
        assert_eq!(bucks(&game, &p1), 140);
    }

    #[test]
    fn test_expired_discount_flag_overrides_window() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        game.expire_discount(&p1);

        place_ok(&mut game, &p1, (0, 0, 0), 10);
        assert_eq!(bucks(&game, &p1), 140);
    }

    #[test]
    fn test_place_snaps_to_cell() {
        let mut game = GameState::default();
        let p1 = join(&mut game);

        let pos = Vector3::new(3.2, 0.3, -1.7);
        let dispatches =
            game.handle_command(&p1, ClientMessage::PlaceVoxel { pos, color: None }, LATER);
        match &dispatches[0].event {
            ServerEvent::VoxelPlaced { voxel, .. } => {
                assert_eq!(voxel.position, Vector3::new(3.5, 0.0, -1.5));
            }
            other => panic!("expected VOXEL_PLACED, got {:?}", other),
        }
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut game = GameState::default();
        let p1 = join(&mut game);

        for cell in [(0, -1, 0), (0, 32, 0), (50, 0, 0), (0, 0, -51)] {
            let err = error_of(&place(&mut game, &p1, cell, LATER));
            assert_eq!(err.as_deref(), Some("Position is outside the world"), "{:?}", cell);
        }
        place_ok(&mut game, &p1, (49, 0, -50), LATER);
        assert_eq!(bucks(&game, &p1), 140);
    }

    #[test]
    fn test_place_rejects_occupied_cell() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        place_ok(&mut game, &p1, (0, 0, 0), LATER);

        let err = error_of(&place(&mut game, &p1, (0, 0, 0), LATER));
        assert_eq!(err.as_deref(), Some("That cell is already occupied"));
        assert_eq!(game.voxels.len(), 1);
        assert_eq!(bucks(&game, &p1), 140);
    }

    #[test]
    fn test_place_requires_support() {
        let mut game = GameState::default();
        let p1 = join(&mut game);

        let err = error_of(&place(&mut game, &p1, (0, 1, 0), LATER));
        assert!(err.is_some());
        assert!(game.voxels.is_empty());

        place_ok(&mut game, &p1, (0, 0, 0), LATER);
        place_ok(&mut game, &p1, (0, 1, 0), LATER);
        // Cantilever off the side of the column.
        place_ok(&mut game, &p1, (1, 1, 0), LATER);
        assert!(error_of(&place(&mut game, &p1, (3, 1, 0), LATER)).is_some());
        assert_world_supported(&game);
    }

    #[test]
    fn test_enemy_build_buffer() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let p2 = join(&mut game);
        place_ok(&mut game, &p1, (0, 0, 0), LATER);

        let err = error_of(&place(&mut game, &p2, (2, 0, 2), LATER));
        assert_eq!(err.as_deref(), Some("Too close to an enemy structure"));
        place_ok(&mut game, &p2, (3, 0, 0), LATER);
    }

    #[test]
    fn test_teammates_may_build_adjacent() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let p2 = join(&mut game);
        command(&mut game, &p1, ClientMessage::CreateTeam { name: "Red".into() });
        let team_id = game.players[&p1].team_id.clone().unwrap();
        command(&mut game, &p2, ClientMessage::JoinTeam { team_id });

        place_ok(&mut game, &p1, (0, 0, 0), LATER);
        place_ok(&mut game, &p2, (1, 0, 0), LATER);
        place_ok(&mut game, &p2, (0, 1, 0), LATER);
    }

    #[test]
    fn test_cannot_stack_on_enemy_column() {
        let mut game = GameState::default();
        game.config.build_buffer = 0;
        let p1 = join(&mut game);
        let p2 = join(&mut game);
        place_ok(&mut game, &p1, (0, 0, 0), LATER);

        let err = error_of(&place(&mut game, &p2, (0, 1, 0), LATER));
        assert_eq!(
            err.as_deref(),
            Some("You can only stack on your own or your team's voxels")
        );
    }

    #[test]
    fn test_place_requires_funds() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        game.players.get_mut(&p1).unwrap().bucks = 9;

        let err = error_of(&place(&mut game, &p1, (0, 0, 0), LATER));
        assert_eq!(err.as_deref(), Some("Not enough bucks: need 10, have 9"));
        assert!(game.voxels.is_empty());
        assert_eq!(game.players[&p1].xp, 0);
    }

    #[test]
    fn test_paused_game_rejects_commands_but_not_admin() {
        let mut game = GameState::default();
        let p1 = join(&mut game);

        command(
            &mut game,
            &p1,
            ClientMessage::AdminUpdateConfig {
                config: json!({ "isPaused": true }).as_object().unwrap().clone(),
            },
        );
        assert!(game.config.is_paused);

        let dispatches = place(&mut game, &p1, (0, 0, 0), LATER);
        assert_eq!(error_of(&dispatches).as_deref(), Some("Game is paused"));
        assert_eq!(dispatches[0].target, Target::Player(p1.clone()));
        assert!(game.voxels.is_empty());

        let dispatches = command(
            &mut game,
            &p1,
            ClientMessage::AdminUpdateConfig {
                config: json!({ "isPaused": false }).as_object().unwrap().clone(),
            },
        );
        assert!(!game.config.is_paused);
        assert!(matches!(dispatches[0].event, ServerEvent::ConfigUpdate { .. }));
        place_ok(&mut game, &p1, (0, 0, 0), LATER);
    }

    #[test]
    fn test_admin_update_takes_effect_next_command() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        command(
            &mut game,
            &p1,
            ClientMessage::AdminUpdateConfig {
                config: json!({ "baseVoxelCost": 50, "motd": "hi" }).as_object().unwrap().clone(),
            },
        );

        place_ok(&mut game, &p1, (0, 0, 0), LATER);
        assert_eq!(bucks(&game, &p1), 100);
        assert_eq!(game.config.extra.get("motd"), Some(&json!("hi")));
    }

    #[test]
    fn test_unknown_sender_is_ignored() {
        let mut game = GameState::default();
        let dispatches = place(&mut game, "ghost", (0, 0, 0), LATER);
        assert!(dispatches.is_empty());
        assert!(game.voxels.is_empty());
    }

    #[test]
    fn test_stale_voxel_ids_are_silent() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        for msg in [
            ClientMessage::AttackVoxel { voxel_id: "gone".into() },
            ClientMessage::FortifyVoxel { voxel_id: "gone".into() },
            ClientMessage::DestroyVoxel { voxel_id: "gone".into() },
            ClientMessage::RepairVoxels { voxel_id: "gone".into() },
            ClientMessage::JoinTeam { team_id: "gone".into() },
        ] {
            assert!(command(&mut game, &p1, msg).is_empty());
        }
    }

    #[test]
    fn test_attack_rules() {
        let mut game = GameState::default();
        let owner = join(&mut game);
        let attacker = join(&mut game);
        let id = place_ok(&mut game, &owner, (0, 0, 0), LATER);

        let err = error_of(&attack(&mut game, &owner, &id, LATER + 30_000));
        assert_eq!(err.as_deref(), Some("You cannot attack your own voxel"));

        let err = error_of(&attack(&mut game, &attacker, &id, LATER + 19_999));
        assert_eq!(err.as_deref(), Some("Voxel is protected for another 1s"));

        game.players.get_mut(&attacker).unwrap().bucks = 4;
        let err = error_of(&attack(&mut game, &attacker, &id, LATER + 20_000));
        assert_eq!(err.as_deref(), Some("Not enough bucks: need 5, have 4"));
        assert_eq!(game.voxels.get_by_id(&id).unwrap().hp, BASE_VOXEL_HP);
    }

    #[test]
    fn test_teammates_cannot_attack_each_other() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let p2 = join(&mut game);
        command(&mut game, &p1, ClientMessage::CreateTeam { name: "Red".into() });
        let team_id = game.players[&p1].team_id.clone().unwrap();
        command(&mut game, &p2, ClientMessage::JoinTeam { team_id });
        let id = place_ok(&mut game, &p1, (0, 0, 0), LATER);

        let err = error_of(&attack(&mut game, &p2, &id, LATER + 30_000));
        assert_eq!(err.as_deref(), Some("You cannot attack your team's voxels"));
    }

    #[test]
    fn test_four_hits_destroy_a_fresh_voxel() {
        let mut game = GameState::default();
        let owner = join(&mut game);
        let attacker = join(&mut game);
        let id = place_ok(&mut game, &owner, (0, 0, 0), LATER);
        let t = LATER + 20_000;

        for (i, expected_hp) in [90u32, 60, 30].into_iter().enumerate() {
            let dispatches = attack(&mut game, &attacker, &id, t + i as u64);
            match &dispatches[0].event {
                ServerEvent::VoxelAttacked {
                    new_hp,
                    damage,
                    player_bucks,
                    ..
                } => {
                    assert_eq!(*new_hp, expected_hp);
                    assert_eq!(*damage, 30);
                    assert_eq!(*player_bucks, STARTING_BUCKS - 5 * (i as u64 + 1));
                }
                other => panic!("expected VOXEL_ATTACKED, got {:?}", other),
            }
        }

        let dispatches = attack(&mut game, &attacker, &id, t + 10);
        match &dispatches[0].event {
            ServerEvent::VoxelDestroyed {
                voxel_id,
                loot,
                player_bucks,
                collapsed_voxels,
                ..
            } => {
                assert_eq!(voxel_id, &id);
                assert_eq!(*loot, 3);
                assert_eq!(*player_bucks, STARTING_BUCKS - 20 + 3);
                assert!(collapsed_voxels.is_empty());
            }
            other => panic!("expected VOXEL_DESTROYED, got {:?}", other),
        }
        assert!(game.voxels.get_by_id(&id).is_none());
        assert_eq!(game.players[&attacker].xp, 50);
    }

    #[test]
    fn test_raid_loot_may_exceed_storage_cap() {
        let mut game = GameState::default();
        let owner = join(&mut game);
        let attacker = join(&mut game);
        let id = place_ok(&mut game, &owner, (0, 0, 0), LATER);
        let cap = ledger::storage_cap(&game.config, 1);
        game.players.get_mut(&attacker).unwrap().bucks = cap + 20;
        game.config.attack_damage = 500;

        attack(&mut game, &attacker, &id, LATER + 20_000);
        assert_eq!(bucks(&game, &attacker), cap + 20 - 5 + 3);
    }

    #[test]
    fn test_destroying_tower_base_collapses_it() {
        let mut game = GameState::default();
        let owner = join(&mut game);
        let attacker = join(&mut game);
        let a0 = place_ok(&mut game, &owner, (0, 0, 0), LATER);
        let a1 = place_ok(&mut game, &owner, (0, 1, 0), LATER);
        let a2 = place_ok(&mut game, &owner, (0, 2, 0), LATER);
        let b: Vec<String> = (0..3)
            .map(|y| place_ok(&mut game, &owner, (5, y, 0), LATER))
            .collect();
        game.config.attack_damage = BASE_VOXEL_HP;

        let dispatches = attack(&mut game, &attacker, &a0, LATER + 20_000);
        match &dispatches[0].event {
            ServerEvent::VoxelDestroyed {
                collapsed_voxels, ..
            } => {
                assert_eq!(collapsed_voxels, &vec![a1.clone(), a2.clone()]);
            }
            other => panic!("expected VOXEL_DESTROYED, got {:?}", other),
        }

        for id in [&a0, &a1, &a2] {
            assert!(game.voxels.get_by_id(id).is_none());
        }
        for id in &b {
            assert!(game.voxels.get_by_id(id).is_some());
        }
        match game.snapshot(&owner) {
            ServerEvent::Init { voxels, .. } => {
                assert_eq!(voxels.len(), 3);
                assert!(voxels.iter().all(|v| b.contains(&v.id)));
            }
            other => panic!("expected INIT, got {:?}", other),
        }
        assert_world_supported(&game);
    }

    #[test]
    fn test_owner_destroy_removes_cascade_without_refund() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let base = place_ok(&mut game, &p1, (0, 0, 0), LATER);
        let mid = place_ok(&mut game, &p1, (0, 1, 0), LATER);
        let top = place_ok(&mut game, &p1, (0, 2, 0), LATER);
        let before = bucks(&game, &p1);
        assert!(game.config.destroy_refund > 0.0);

        let dispatches = command(&mut game, &p1, ClientMessage::DestroyVoxel { voxel_id: base.clone() });
        let removed: Vec<String> = dispatches
            .iter()
            .map(|d| match &d.event {
                ServerEvent::VoxelRemoved { voxel_id } => voxel_id.clone(),
                other => panic!("expected VOXEL_REMOVED, got {:?}", other),
            })
            .collect();

        assert_eq!(removed, vec![base, mid, top]);
        assert!(game.voxels.is_empty());
        // destroyRefund is configured but never paid out.
        assert_eq!(bucks(&game, &p1), before);
    }

    #[test]
    fn test_destroy_authorization() {
        let mut game = GameState::default();
        let leader = join(&mut game);
        let member = join(&mut game);
        let stranger = join(&mut game);
        command(&mut game, &leader, ClientMessage::CreateTeam { name: "Red".into() });
        let team_id = game.players[&leader].team_id.clone().unwrap();
        command(&mut game, &member, ClientMessage::JoinTeam { team_id });
        let id = place_ok(&mut game, &member, (0, 0, 0), LATER);

        let err = error_of(&command(
            &mut game,
            &stranger,
            ClientMessage::DestroyVoxel { voxel_id: id.clone() },
        ));
        assert_eq!(err.as_deref(), Some("You are not allowed to modify this voxel"));

        let dispatches = command(&mut game, &leader, ClientMessage::DestroyVoxel { voxel_id: id.clone() });
        assert_eq!(dispatches.len(), 1);
        assert!(game.voxels.get_by_id(&id).is_none());
    }

    #[test]
    fn test_teammate_cannot_destroy_without_leading() {
        let mut game = GameState::default();
        let leader = join(&mut game);
        let builder = join(&mut game);
        let teammate = join(&mut game);
        command(&mut game, &leader, ClientMessage::CreateTeam { name: "Red".into() });
        let team_id = game.players[&leader].team_id.clone().unwrap();
        for player in [&builder, &teammate] {
            command(&mut game, player, ClientMessage::JoinTeam { team_id: team_id.clone() });
        }
        let id = place_ok(&mut game, &builder, (0, 0, 0), LATER);

        let err = error_of(&command(
            &mut game,
            &teammate,
            ClientMessage::DestroyVoxel { voxel_id: id.clone() },
        ));
        assert_eq!(err.as_deref(), Some("You are not allowed to modify this voxel"));
        assert!(game.voxels.get_by_id(&id).is_some());

        // Nor can a member remove the leader's voxels.
        let leader_voxel = place_ok(&mut game, &leader, (5, 0, 0), LATER);
        let err = error_of(&command(
            &mut game,
            &builder,
            ClientMessage::DestroyVoxel { voxel_id: leader_voxel.clone() },
        ));
        assert_eq!(err.as_deref(), Some("You are not allowed to modify this voxel"));
        assert!(game.voxels.get_by_id(&leader_voxel).is_some());
    }

    #[test]
    fn test_fortify_progression() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let id = place_ok(&mut game, &p1, (0, 0, 0), LATER);

        let dispatches = command(&mut game, &p1, ClientMessage::FortifyVoxel { voxel_id: id.clone() });
        match &dispatches[0].event {
            ServerEvent::VoxelFortified { voxel, player } => {
                assert_eq!(voxel.fortification_tier, 1);
                assert_eq!(voxel.fortification_spend, 20);
                assert_eq!(voxel.invested_value, 30);
                assert_eq!(voxel.hp, 180);
                assert_eq!(voxel.max_hp, 180);
                assert_eq!(player.bucks, 120);
            }
            other => panic!("expected VOXEL_FORTIFIED, got {:?}", other),
        }

        command(&mut game, &p1, ClientMessage::FortifyVoxel { voxel_id: id.clone() });
        command(&mut game, &p1, ClientMessage::FortifyVoxel { voxel_id: id.clone() });
        let voxel = game.voxels.get_by_id(&id).unwrap();
        assert_eq!(voxel.fortification_tier, 3);
        assert_eq!(voxel.max_hp, BASE_VOXEL_HP + 3 * 60);
        assert_eq!(voxel.invested_value, 10 + 20 + 40 + 80);
        assert_eq!(bucks(&game, &p1), 0);

        let err = error_of(&command(&mut game, &p1, ClientMessage::FortifyVoxel { voxel_id: id }));
        assert_eq!(err.as_deref(), Some("Voxel is already at maximum fortification"));
    }

    #[test]
    fn test_fortify_is_owner_only() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let p2 = join(&mut game);
        let id = place_ok(&mut game, &p1, (0, 0, 0), LATER);

        let err = error_of(&command(&mut game, &p2, ClientMessage::FortifyVoxel { voxel_id: id }));
        assert_eq!(err.as_deref(), Some("Only the owner can fortify this voxel"));
    }

    #[test]
    fn test_repair_restores_whole_component() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let ids: Vec<String> = (0..3)
            .map(|x| place_ok(&mut game, &p1, (x, 0, 0), LATER))
            .collect();
        for (id, hp) in ids.iter().zip([60u32, 120, 0]) {
            game.voxels.get_by_id_mut(id).unwrap().hp = hp;
        }
        let before = bucks(&game, &p1);

        let dispatches = command(&mut game, &p1, ClientMessage::RepairVoxels { voxel_id: ids[1].clone() });

        // 10 * 0.5 * 0.5 = 2.5 -> 3, plus 10 * 0.5 * 1.0 = 5
        assert_eq!(bucks(&game, &p1), before - 8);
        assert_eq!(dispatches.len(), 2);
        for id in &ids {
            assert_eq!(game.voxels.get_by_id(id).unwrap().hp, BASE_VOXEL_HP);
        }
    }

    #[test]
    fn test_repair_is_all_or_nothing() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let ids: Vec<String> = (0..2)
            .map(|x| place_ok(&mut game, &p1, (x, 0, 0), LATER))
            .collect();
        for id in &ids {
            game.voxels.get_by_id_mut(id).unwrap().hp = 0;
        }
        game.players.get_mut(&p1).unwrap().bucks = 9;

        let err = error_of(&command(&mut game, &p1, ClientMessage::RepairVoxels { voxel_id: ids[0].clone() }));
        assert_eq!(err.as_deref(), Some("Not enough bucks: need 10, have 9"));
        assert_eq!(bucks(&game, &p1), 9);
        for id in &ids {
            assert_eq!(game.voxels.get_by_id(id).unwrap().hp, 0);
        }
    }

    #[test]
    fn test_repair_requires_alliance() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let p2 = join(&mut game);
        let id = place_ok(&mut game, &p1, (0, 0, 0), LATER);
        game.voxels.get_by_id_mut(&id).unwrap().hp = 10;

        let err = error_of(&command(&mut game, &p2, ClientMessage::RepairVoxels { voxel_id: id.clone() }));
        assert_eq!(err.as_deref(), Some("You are not allowed to modify this voxel"));

        let err = error_of(&command(&mut game, &p1, ClientMessage::RepairVoxels { voxel_id: id.clone() }));
        assert!(err.is_none());
        let err = error_of(&command(&mut game, &p1, ClientMessage::RepairVoxels { voxel_id: id }));
        assert_eq!(err.as_deref(), Some("Nothing to repair"));
    }

    #[test]
    fn test_team_lifecycle() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let p2 = join(&mut game);

        let dispatches = command(&mut game, &p1, ClientMessage::CreateTeam { name: "  Red  ".into() });
        let teams = match &dispatches[0].event {
            ServerEvent::TeamUpdate { teams } => teams.clone(),
            other => panic!("expected TEAM_UPDATE, got {:?}", other),
        };
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name, "Red");
        assert_eq!(teams[0].leader_id, p1);

        command(&mut game, &p2, ClientMessage::JoinTeam { team_id: teams[0].id.clone() });
        assert_eq!(game.players[&p2].team_id.as_deref(), Some(teams[0].id.as_str()));
        assert!(game.are_allies(&p1, &p2));
        assert_eq!(game.teams.get(&teams[0].id).unwrap().members, vec![p1, p2]);
    }

    #[test]
    fn test_team_name_validation() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        assert!(error_of(&command(&mut game, &p1, ClientMessage::CreateTeam { name: "   ".into() })).is_some());
        assert!(error_of(&command(&mut game, &p1, ClientMessage::CreateTeam { name: "x".repeat(33) })).is_some());
        assert!(game.teams.is_empty());
    }

    #[test]
    fn test_join_second_team_leaves_stale_membership() {
        let mut game = GameState::default();
        let a = join(&mut game);
        let b = join(&mut game);
        let p = join(&mut game);
        command(&mut game, &a, ClientMessage::CreateTeam { name: "A".into() });
        command(&mut game, &b, ClientMessage::CreateTeam { name: "B".into() });
        let team_a = game.players[&a].team_id.clone().unwrap();
        let team_b = game.players[&b].team_id.clone().unwrap();

        command(&mut game, &p, ClientMessage::JoinTeam { team_id: team_a.clone() });
        command(&mut game, &p, ClientMessage::JoinTeam { team_id: team_b.clone() });

        assert_eq!(game.players[&p].team_id.as_deref(), Some(team_b.as_str()));
        assert!(game.teams.get(&team_a).unwrap().has_member(&p));
        assert!(game.teams.get(&team_b).unwrap().has_member(&p));
    }

    #[test]
    fn test_full_team_rejects_join() {
        let mut game = GameState::default();
        let leader = join(&mut game);
        command(&mut game, &leader, ClientMessage::CreateTeam { name: "Big".into() });
        let team_id = game.players[&leader].team_id.clone().unwrap();
        for _ in 1..shared::MAX_TEAM_MEMBERS {
            let p = join(&mut game);
            command(&mut game, &p, ClientMessage::JoinTeam { team_id: team_id.clone() });
        }

        let late = join(&mut game);
        let err = error_of(&command(&mut game, &late, ClientMessage::JoinTeam { team_id }));
        assert_eq!(err.as_deref(), Some("Team is full"));
        assert!(game.players[&late].team_id.is_none());
    }

    #[test]
    fn test_chat_scopes() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let p2 = join(&mut game);
        let outsider = join(&mut game);
        command(&mut game, &p1, ClientMessage::CreateTeam { name: "Red".into() });
        let team_id = game.players[&p1].team_id.clone().unwrap();
        command(&mut game, &p2, ClientMessage::JoinTeam { team_id: team_id.clone() });

        let global = command(&mut game, &p1, ClientMessage::Chat { message: "hello".into(), team_only: false });
        assert_eq!(global[0].target, Target::All);

        let team = command(&mut game, &p1, ClientMessage::Chat { message: " plan ".into(), team_only: true });
        match &team[0].target {
            Target::Players(ids) => {
                assert_eq!(ids.len(), 2);
                assert!(ids.contains(&p1) && ids.contains(&p2));
                assert!(!ids.contains(&outsider));
            }
            other => panic!("expected team target, got {:?}", other),
        }
        match &team[0].event {
            ServerEvent::ChatMessage { message, team_id: sent_team, .. } => {
                assert_eq!(message, "plan");
                assert_eq!(sent_team.as_deref(), Some(team_id.as_str()));
            }
            other => panic!("expected CHAT_MESSAGE, got {:?}", other),
        }

        // No team: falls back to everyone.
        let solo = command(&mut game, &outsider, ClientMessage::Chat { message: "hi".into(), team_only: true });
        assert_eq!(solo[0].target, Target::All);

        let err = error_of(&command(&mut game, &p1, ClientMessage::Chat { message: "  ".into(), team_only: false }));
        assert!(err.is_some());
    }

    #[test]
    fn test_income_tick() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        let interval = game.config.income_interval;

        assert!(game.income_tick(interval - 1).is_empty());
        let dispatches = game.income_tick(interval);
        assert_eq!(
            dispatches,
            vec![Dispatch::all(ServerEvent::IncomeUpdate {
                player_id: p1.clone(),
                bucks: 160,
                next_income_in: interval,
            })]
        );
        assert!(game.income_tick(interval + 1).is_empty());
    }

    #[test]
    fn test_no_income_while_paused() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        game.config.is_paused = true;

        assert!(game.income_tick(1_000_000).is_empty());
        assert_eq!(bucks(&game, &p1), STARTING_BUCKS);
    }

    #[test]
    fn test_net_worth() {
        let mut game = GameState::default();
        let p1 = join(&mut game);
        place_ok(&mut game, &p1, (0, 0, 0), LATER);
        place_ok(&mut game, &p1, (0, 1, 0), LATER);

        // 150 - 10 - 11 liquid, 21 invested
        assert_eq!(game.net_worth(&p1), Some(STARTING_BUCKS));
        assert_eq!(game.net_worth("ghost"), None);
    }
}
