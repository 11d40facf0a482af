//! Error types for the engine.
//!
//! Validation failures are rejected synchronously and leave the board
//! untouched. Resource shortfalls (short deck on a draw) and conflicting
//! restrictions are *not* errors; they resolve deterministically and are
//! recorded in the play sequence log instead.

use thiserror::Error;

use crate::core::{GameId, SelectionId};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown zone: {0}")]
    InvalidZone(String),

    #[error("Zone {zone} is restricted for {reason}")]
    ZoneRestricted { zone: String, reason: String },

    #[error("Zone {0} is already occupied")]
    ZoneOccupied(String),

    #[error("Card {0} is not in the player's hand")]
    CardNotInHand(u32),

    #[error("Card {0} is not in the catalog")]
    UnknownCard(u32),

    #[error("Selection not found: {0}")]
    SelectionNotFound(SelectionId),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Instance not found: {0}")]
    InstanceNotFound(u32),

    #[error("Game not found: {0}")]
    GameNotFound(GameId),
}

pub type Result<T> = std::result::Result<T, EngineError>;
