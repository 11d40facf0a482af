//! # tcg-engine
//!
//! A card effect resolution engine for zone-based trading card games.
//!
//! ## Design Principles
//!
//! 1. **Derived State Is Disposable**: Powers, zone restrictions, and
//!    victory-point modifiers are recomputed from scratch after every
//!    mutation. Nothing derived is ever patched in place, so
//!    recomputation on unchanged state is a no-op by construction.
//!
//! 2. **Deterministic Resolution**: Effects evaluate in registration
//!    order; single-target effects pick by a fixed zone priority. The
//!    same board and effects always produce the same computed state.
//!
//! 3. **Choices Never Block**: Search effects open resumable selection
//!    workflows instead of suspending the game loop.
//!
//! ## Architecture
//!
//! - **Per-Game Isolation**: Each game in the [`GameArena`] has its own
//!   session lock and published read snapshot; games share only the
//!   immutable card catalog.
//!
//! - **Persistent Data Structures**: O(1) log snapshots via `im-rs`.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, zones, card and game types
//! - `catalog`: Immutable card definitions
//! - `effects`: Effect vocabulary, target filters, the live registry
//! - `board`: Hands, decks, and cards in play
//! - `compute`: Power and restriction derivation, the computed state
//! - `dispatch`: Triggered effect firing on play events
//! - `selection`: Pending selection workflows for search effects
//! - `history`: The append-only play sequence log
//! - `game`: Session facade and the concurrent multi-game arena

pub mod board;
pub mod catalog;
pub mod compute;
pub mod core;
pub mod dispatch;
pub mod effects;
pub mod error;
pub mod game;
pub mod history;
pub mod selection;

// Re-export commonly used types
pub use crate::core::{
    CardTrait, CardType, EffectId, GameId, GameType, InstanceId, PlayerId, PlayerMap, SelectionId,
    Zone,
};

pub use crate::catalog::{CardCatalog, CardDefinition, CardId};

pub use crate::effects::{
    ApplyTo, BoostScope, Destination, Effect, EffectAction, EffectRegistry, EffectSpec, FilterDim,
    TargetFilter, Trigger,
};

pub use crate::board::{BoardState, CardInstance};

pub use crate::compute::{AllowedTypes, ComputedState, PowerEntry};

pub use crate::dispatch::{DispatchOutcome, DrawShortfall, PlayEvent};

pub use crate::selection::{PendingSelection, SelectionManager};

pub use crate::history::{PlaySequenceEntry, PlaySequenceLog, PlayStats, SequenceAction};

pub use crate::game::{
    GameArena, GameSession, PlacementOutcome, SavedGame, SelectionOutcome, StateSnapshot,
};

pub use crate::error::{EngineError, Result};
