//! Raw board state: hands, decks, and cards in play.

mod instance;
mod state;

pub use instance::CardInstance;
pub use state::BoardState;
