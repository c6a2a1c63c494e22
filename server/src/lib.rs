//! # Voxel Territory Server Library
//!
//! This library provides the authoritative server for the voxel territory
//! game. Players build voxels on a shared grid, raid each other's structures,
//! fortify and repair what they own, and organize into teams. Every rule is
//! checked here; clients only render what the server broadcasts.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative World
//! The server owns the only real copy of the world: voxels keyed by grid
//! cell, player balances and progression, teams and the live ruleset.
//! Clients send intents, never state.
//!
//! ### Rule Enforcement
//! Each command is validated against bounds, occupancy, build buffers,
//! structural support, protection windows and funds before anything changes.
//! A rejected command produces a single `ERROR` for the sender and leaves the
//! world untouched.
//!
//! ### Event Broadcasting
//! Accepted commands produce events addressed to everyone, to one player, or
//! to a team. Clients that apply these events in order hold the same world
//! as the server.
//!
//! ## Architecture Design
//!
//! ### Single-Writer Event Loop
//! Socket tasks decode JSON frames and forward them to one loop that owns the
//! [`game::GameState`]. Commands, disconnects and timers are applied strictly
//! one after another, so no handler ever observes a half-applied command.
//!
//! ### WebSocket Transport
//! Every connection gets an unbounded outbound queue drained by its own
//! writer task. Sends are fire-and-forget; a slow or dead socket never stalls
//! the loop.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Command processing and the world aggregate.
//!
//! ### Index Module (`index`)
//! Cell-keyed voxel storage with id lookup.
//!
//! ### Integrity Module (`integrity`)
//! Ground-support searches and collapse of disconnected structures.
//!
//! ### Ledger Module (`ledger`)
//! Costs, income, storage caps, loot and experience.
//!
//! ### Teams Module (`teams`)
//! Team creation, membership and leadership queries.
//!
//! ### Client Manager Module (`client_manager`)
//! Connection tracking and event fan-out.
//!
//! ### Network Module (`network`)
//! The listener, per-connection tasks and the main loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use shared::GameConfig;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let server = Server::new(
//!         "127.0.0.1:8080",
//!         GameConfig::default(),
//!         64,
//!         Duration::from_millis(1000),
//!     )
//!     .await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod error;
pub mod game;
pub mod index;
pub mod integrity;
pub mod ledger;
pub mod network;
pub mod teams;
