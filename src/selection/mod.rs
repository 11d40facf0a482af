//! Pending selections opened by search effects.

mod workflow;

pub use workflow::{PendingSelection, ResolvedSelection, SelectionManager};
