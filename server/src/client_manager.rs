//! Connection bookkeeping for the game server
//!
//! This module tracks every live WebSocket session, including:
//! - Connection ids, remote addresses and connect times
//! - The player each connection is bound to once it has joined
//! - The outbound queue used to push serialized events to the socket writer
//! - Capacity limits for concurrent connections
//!
//! Delivery is fire-and-forget. A closed queue means the socket is already
//! going away, and its disconnect will arrive through the event loop shortly.
//! A full queue means the peer stopped reading; frames for it are dropped.

use crate::game::{Dispatch, Target};
use log::{debug, info, warn};
use shared::{PlayerId, ServerEvent};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Frames a connection may have queued before new ones are dropped.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 8_192;

/// Sending half of a connection's outbound queue
pub type Outbound = mpsc::Sender<String>;

/// Creates the outbound queue for one connection
pub fn outbound_queue() -> (Outbound, mpsc::Receiver<String>) {
    mpsc::channel(OUTBOUND_QUEUE_CAPACITY)
}

/// A connected WebSocket session
#[derive(Debug)]
pub struct Client {
    /// Unique connection identifier assigned by the server
    pub id: u32,
    /// Remote address of the socket
    pub addr: SocketAddr,
    /// Player bound to this connection, once the join has completed
    pub player_id: Option<PlayerId>,
    /// When the socket was accepted
    pub connected_at: Instant,
    /// Outbound text frames, drained by the connection's writer task
    pub sender: Outbound,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, sender: Outbound) -> Self {
        Self {
            id,
            addr,
            player_id: None,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// Queues a frame for this connection. Returns false if the frame was
    /// dropped because the writer is gone or has fallen too far behind.
    pub fn send(&self, text: &str) -> bool {
        match self.sender.try_send(text.to_string()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Dropped frame for client {}: outbound queue full", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Dropped frame for client {}: writer closed", self.id);
                false
            }
        }
    }
}

/// Manages all connected sessions and routes outgoing events
///
/// The ClientManager enforces server capacity and maps between connection
/// ids and player ids, so that the game layer can address events by player
/// while the network layer only ever sees connections.
pub struct ClientManager {
    /// Connected clients indexed by their connection id
    clients: HashMap<u32, Client>,
    /// Reverse lookup from player id to connection id
    by_player: HashMap<PlayerId, u32>,
    /// Next available connection id
    next_client_id: u32,
    /// Maximum number of concurrent connections allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates an empty manager. Connection ids start from 1.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            by_player: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Attempts to register a new connection
    ///
    /// Returns Some(client_id) if successful, None if the server is at
    /// capacity. A rejected socket is sent an ERROR frame before its queue
    /// is dropped, so the writer flushes it and closes.
    pub fn add_client(&mut self, addr: SocketAddr, sender: Outbound) -> Option<u32> {
        if self.clients.len() >= self.max_clients {
            warn!("Rejecting {}: server full ({} clients)", addr, self.max_clients);
            match ServerEvent::error("Server full").to_json() {
                Ok(text) => {
                    let _ = sender.try_send(text);
                }
                Err(e) => warn!("Failed to serialize rejection: {}", e),
            }
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients
            .insert(client_id, Client::new(client_id, addr, sender));

        Some(client_id)
    }

    /// Associates a joined player with its connection.
    pub fn bind_player(&mut self, client_id: u32, player_id: PlayerId) -> bool {
        let Some(client) = self.clients.get_mut(&client_id) else {
            return false;
        };
        client.player_id = Some(player_id.clone());
        self.by_player.insert(player_id, client_id);
        true
    }

    /// Removes a connection, returning it so the caller can clean up the
    /// bound player. Returns None if it was already gone.
    pub fn remove_client(&mut self, client_id: u32) -> Option<Client> {
        let client = self.clients.remove(&client_id)?;
        if let Some(player_id) = &client.player_id {
            self.by_player.remove(player_id);
        }
        info!(
            "Client {} disconnected after {:.1}s",
            client.id,
            client.connected_at.elapsed().as_secs_f64()
        );
        Some(client)
    }

    pub fn player_for(&self, client_id: u32) -> Option<&PlayerId> {
        self.clients.get(&client_id)?.player_id.as_ref()
    }

    /// Serializes an event once and fans it out to its target.
    ///
    /// Returns the number of connections the frame was queued for.
    pub fn dispatch(&self, dispatch: &Dispatch) -> usize {
        let text = match dispatch.event.to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to serialize event: {}", e);
                return 0;
            }
        };

        let recipients: Vec<&Client> = match &dispatch.target {
            Target::All => self.joined().collect(),
            Target::AllExcept(excluded) => self
                .joined()
                .filter(|c| c.player_id.as_deref() != Some(excluded.as_str()))
                .collect(),
            Target::Player(player_id) => self.lookup(player_id).into_iter().collect(),
            Target::Players(player_ids) => {
                player_ids.iter().filter_map(|id| self.lookup(id)).collect()
            }
        };

        recipients
            .into_iter()
            .filter(|client| client.send(&text))
            .count()
    }

    fn joined(&self) -> impl Iterator<Item = &Client> {
        self.clients.values().filter(|c| c.player_id.is_some())
    }

    fn lookup(&self, player_id: &str) -> Option<&Client> {
        self.by_player
            .get(player_id)
            .and_then(|id| self.clients.get(id))
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
