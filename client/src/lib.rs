//! # Voxel Territory Client Library
//!
//! A headless console client for the voxel territory server. It reads text
//! commands from stdin, sends them as protocol commands, and keeps a local
//! replica of the world up to date from the server's event stream.
//!
//! ## Module Organization
//!
//! ### Commands Module (`commands`)
//! Parses console lines such as `place 3 0 -2` or `team join <id>` into
//! [`shared::ClientMessage`]s, plus local actions like `status` and `quit`.
//!
//! ### Replica Module (`replica`)
//! [`replica::ReplicaState`] applies every [`shared::ServerEvent`] in arrival
//! order. It never predicts: a replica that has seen the full stream since
//! `INIT` holds the same voxels and balances as the server.
//!
//! ### Network Module (`network`)
//! The WebSocket session loop, multiplexing stdin and server frames.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::new("127.0.0.1:8080");
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod network;
pub mod replica;
