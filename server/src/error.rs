//! Rule violations surfaced to the issuing client as `ERROR` events.

use shared::CellKey;
use thiserror::Error;

/// A command that broke a game rule. The `Display` text is what the client
/// sees; world state is untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Game is paused")]
    Paused,
    #[error("Position is outside the world")]
    OutOfBounds,
    #[error("That cell is already occupied")]
    CellOccupied,
    #[error("Too close to an enemy structure")]
    EnemyTooClose,
    #[error("Voxel must rest on the ground or connect to a supported voxel")]
    Unsupported,
    #[error("You can only stack on your own or your team's voxels")]
    ForeignColumn,
    #[error("Not enough bucks: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("You cannot attack your own voxel")]
    OwnVoxel,
    #[error("You cannot attack your team's voxels")]
    AllyVoxel,
    #[error("Voxel is protected for another {remaining_secs}s")]
    Protected { remaining_secs: u64 },
    #[error("Only the owner can fortify this voxel")]
    NotOwner,
    #[error("Voxel is already at maximum fortification")]
    MaxFortification,
    #[error("You are not allowed to modify this voxel")]
    NotAuthorized,
    #[error("Nothing to repair")]
    NothingToRepair,
    #[error("Team name must be 1-{max} characters")]
    InvalidTeamName { max: usize },
    #[error("Team is full")]
    TeamFull,
    #[error("Message must be 1-{max} characters")]
    InvalidChatMessage { max: usize },
}

/// Failure inside the spatial index itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("cell {0} is already occupied")]
    Occupied(CellKey),
}
