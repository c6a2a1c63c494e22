//! Server network layer: WebSocket sessions feeding a single-writer event loop

use crate::client_manager::{outbound_queue, ClientManager, Outbound};
use crate::game::{Dispatch, GameState};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{now_millis, ClientMessage, GameConfig, PlayerId, NEW_PLAYER_WINDOW_MS};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_tungstenite::{accept_async, tungstenite::Message};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Messages sent from connection tasks and timers to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    /// A socket finished its handshake. The loop replies with the assigned
    /// connection id, or None when the server is full.
    Connected {
        addr: SocketAddr,
        sender: Outbound,
        reply: oneshot::Sender<Option<u32>>,
    },
    Command {
        client_id: u32,
        command: ClientMessage,
    },
    Disconnected {
        client_id: u32,
    },
    DiscountExpired {
        player_id: PlayerId,
    },
    Shutdown,
}

/// Main server owning the world and every session.
///
/// Connection tasks never touch game state. They forward decoded commands as
/// [`ServerMessage`]s, and the loop in [`Server::run`] applies them one at a
/// time.
pub struct Server {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    clients: ClientManager,
    game_state: GameState,
    income_tick: Duration,
    /// Pending new-player discount expiries, aborted when the player leaves
    discount_timers: HashMap<PlayerId, JoinHandle<()>>,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        config: GameConfig,
        max_clients: usize,
        income_tick: Duration,
    ) -> Result<Self, BoxError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on ws://{}", local_addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener: Some(listener),
            local_addr,
            clients: ClientManager::new(max_clients),
            game_state: GameState::new(config),
            income_tick,
            discount_timers: HashMap::new(),
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// A handle for posting messages into the loop, e.g. [`ServerMessage::Shutdown`].
    pub fn handle(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    /// Spawns task that accepts sockets and hands each to its own connection task
    fn spawn_listener(&mut self) -> Result<(), BoxError> {
        let listener = self.listener.take().ok_or("listener already started")?;
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        tokio::spawn(handle_connection(stream, addr, server_tx.clone()));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
        Ok(())
    }

    fn dispatch(&self, dispatches: Vec<Dispatch>) {
        for dispatch in &dispatches {
            self.clients.dispatch(dispatch);
        }
    }

    /// Posts a [`ServerMessage::DiscountExpired`] once the player's
    /// new-player window has run out.
    fn schedule_discount_expiry(&mut self, player_id: PlayerId) {
        let server_tx = self.server_tx.clone();
        let expired = player_id.clone();
        let timer = tokio::spawn(async move {
            sleep(Duration::from_millis(NEW_PLAYER_WINDOW_MS)).await;
            let _ = server_tx.send(ServerMessage::DiscountExpired { player_id: expired });
        });
        self.discount_timers.insert(player_id, timer);
    }

    fn handle_discount_expired(&mut self, player_id: &str) {
        self.discount_timers.remove(player_id);
        self.game_state.expire_discount(player_id);
    }

    fn handle_connected(
        &mut self,
        addr: SocketAddr,
        sender: Outbound,
        reply: oneshot::Sender<Option<u32>>,
    ) {
        let Some(client_id) = self.clients.add_client(addr, sender) else {
            let _ = reply.send(None);
            return;
        };

        let (player_id, dispatches) = self.game_state.add_player(now_millis());
        self.clients.bind_player(client_id, player_id.clone());
        self.dispatch(dispatches);
        self.schedule_discount_expiry(player_id);

        if reply.send(Some(client_id)).is_err() {
            // The socket task vanished before it learned its id.
            self.handle_disconnected(client_id);
        }
    }

    fn handle_command(&mut self, client_id: u32, command: ClientMessage) {
        let Some(player_id) = self.clients.player_for(client_id).cloned() else {
            debug!("Command from unbound client {}", client_id);
            return;
        };
        let dispatches = self
            .game_state
            .handle_command(&player_id, command, now_millis());
        self.dispatch(dispatches);
    }

    fn handle_disconnected(&mut self, client_id: u32) {
        let Some(client) = self.clients.remove_client(client_id) else {
            return;
        };
        if let Some(player_id) = client.player_id {
            if let Some(timer) = self.discount_timers.remove(&player_id) {
                timer.abort();
            }
            let dispatches = self.game_state.remove_player(&player_id);
            self.dispatch(dispatches);
        }
    }

    /// Main server loop: session events and the income timer, strictly in turn
    pub async fn run(mut self) -> Result<(), BoxError> {
        self.spawn_listener()?;

        let mut income_interval = interval(self.income_tick);
        income_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Server started successfully");

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::Connected { addr, sender, reply }) => {
                            self.handle_connected(addr, sender, reply);
                        }
                        Some(ServerMessage::Command { client_id, command }) => {
                            self.handle_command(client_id, command);
                        }
                        Some(ServerMessage::Disconnected { client_id }) => {
                            self.handle_disconnected(client_id);
                        }
                        Some(ServerMessage::DiscountExpired { player_id }) => {
                            self.handle_discount_expired(&player_id);
                        }
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = income_interval.tick() => {
                    let dispatches = self.game_state.income_tick(now_millis());
                    if !dispatches.is_empty() {
                        debug!("Income paid to {} players", dispatches.len());
                    }
                    self.dispatch(dispatches);
                },
            }
        }

        Ok(())
    }
}

/// Drives one WebSocket: a writer task drains the outbound queue while this
/// task decodes inbound frames into commands.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    let (mut write, mut read) = ws.split();

    let (out_tx, mut out_rx) = outbound_queue();
    let writer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if write.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = write.close().await;
    });

    let (reply_tx, reply_rx) = oneshot::channel();
    let connected = ServerMessage::Connected {
        addr,
        sender: out_tx,
        reply: reply_tx,
    };
    if server_tx.send(connected).is_err() {
        return;
    }

    let client_id = match reply_rx.await {
        Ok(Some(client_id)) => client_id,
        _ => {
            // Rejected: let the writer flush the error and close.
            let _ = writer.await;
            return;
        }
    };

    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => match ClientMessage::from_json(&text) {
                Ok(command) => {
                    if server_tx
                        .send(ServerMessage::Command { client_id, command })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => warn!("Malformed message from client {}: {}", client_id, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Socket error for client {}: {}", client_id, e);
                break;
            }
        }
    }

    let _ = server_tx.send(ServerMessage::Disconnected { client_id });
}
