use crate::commands::{parse_line, Input, HELP};
use crate::replica::ReplicaState;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::ServerEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Headless console client: stdin commands out, server events in
pub struct Client {
    url: String,
    replica: ReplicaState,
}

impl Client {
    pub fn new(server: &str) -> Self {
        let url = if server.starts_with("ws://") || server.starts_with("wss://") {
            server.to_string()
        } else {
            format!("ws://{}", server)
        };

        Client {
            url,
            replica: ReplicaState::new(),
        }
    }

    pub fn replica(&self) -> &ReplicaState {
        &self.replica
    }

    /// Applies one server frame to the replica and returns a line worth
    /// printing, if any.
    pub fn handle_frame(&mut self, text: &str) -> Option<String> {
        let event = match ServerEvent::from_json(text) {
            Ok(event) => event,
            Err(e) => {
                warn!("Undecodable event: {}", e);
                return None;
            }
        };
        self.replica.apply(&event);
        describe(&self.replica, &event)
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Connecting to {}...", self.url);
        let (ws, _) = connect_async(self.url.as_str()).await?;
        info!("Connected");
        let (mut write, mut read) = ws.split();

        let mut stdin = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(line) = self.handle_frame(&text) {
                                println!("{}", line);
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Server closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("Connection error: {}", e);
                            break;
                        }
                    }
                },

                line = stdin.next_line() => {
                    let Some(line) = line? else {
                        debug!("stdin closed");
                        break;
                    };
                    match parse_line(&line) {
                        Ok(Some(Input::Send(command))) => {
                            write.send(Message::Text(command.to_json()?)).await?;
                        }
                        Ok(Some(Input::Status)) => println!("{}", self.replica.summary()),
                        Ok(Some(Input::Help)) => println!("{}", HELP),
                        Ok(Some(Input::Quit)) => break,
                        Ok(None) => {}
                        Err(e) => println!("! {}", e),
                    }
                },
            }
        }

        let _ = write.close().await;
        Ok(())
    }
}

/// Human-readable rendering of an event, from the local player's view.
pub fn describe(replica: &ReplicaState, event: &ServerEvent) -> Option<String> {
    let name = |id: &str| {
        replica
            .players
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.chars().take(6).collect())
    };

    let line = match event {
        ServerEvent::Init { .. } => format!("joined: {}", replica.summary()),
        ServerEvent::PlayerJoined { player } => format!("{} joined", player.name),
        ServerEvent::PlayerLeft { player_id } => format!("{} left", name(player_id)),
        ServerEvent::VoxelPlaced { voxel, player } => format!(
            "{} placed {} at {}",
            player.name,
            voxel.id,
            voxel.cell()
        ),
        ServerEvent::VoxelAttacked {
            voxel_id,
            attacker_id,
            new_hp,
            ..
        } => format!("{} hit {} ({} hp left)", name(attacker_id), voxel_id, new_hp),
        ServerEvent::VoxelDestroyed {
            voxel_id,
            attacker_id,
            loot,
            collapsed_voxels,
            ..
        } => format!(
            "{} destroyed {} for {} loot, {} collapsed",
            name(attacker_id),
            voxel_id,
            loot,
            collapsed_voxels.len()
        ),
        ServerEvent::VoxelFortified { voxel, .. } => format!(
            "{} is tier {} ({}/{} hp)",
            voxel.id, voxel.fortification_tier, voxel.hp, voxel.max_hp
        ),
        ServerEvent::VoxelRemoved { voxel_id } => format!("{} removed", voxel_id),
        ServerEvent::IncomeUpdate { player_id, .. } => {
            // Everyone's income is broadcast; only ours is interesting.
            if replica.player_id.as_deref() != Some(player_id.as_str()) {
                return None;
            }
            replica.summary()
        }
        ServerEvent::ConfigUpdate { config } => {
            format!("rules updated{}", if config.is_paused { " (paused)" } else { "" })
        }
        ServerEvent::TeamUpdate { teams } => format!("{} teams", teams.len()),
        ServerEvent::ChatMessage {
            player_name,
            message,
            team_id,
            ..
        } => {
            let scope = if team_id.is_some() { "[team] " } else { "" };
            format!("{}{}: {}", scope, player_name, message)
        }
        ServerEvent::Error { message } => format!("! {}", message),
    };
    Some(line)
}
