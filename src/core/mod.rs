//! Core identifiers and vocabulary shared by every subsystem.

pub mod ids;
pub mod types;
pub mod zone;

pub use ids::{EffectId, GameId, InstanceId, PlayerId, PlayerMap, SelectionId};
pub use types::{CardTrait, CardType, GameType};
pub use zone::Zone;
