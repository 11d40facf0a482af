//! Derived state computation: power values, zone restrictions, and the
//! published `ComputedState` snapshot.

mod power;
mod restriction;
mod state;

pub use power::{compute_powers, PowerEntry};
pub use restriction::{can_play, compute_restrictions, AllowedTypes};
pub use state::{recompute, ComputedState};
