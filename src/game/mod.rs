//! Game sessions and the multi-game arena.

mod arena;
mod session;

pub use arena::{GameArena, StateSnapshot};
pub use session::{GameSession, PlacementOutcome, SavedGame, SelectionOutcome};
