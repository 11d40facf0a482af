//! Effect system: target filters, effect definitions, and the registry
//! of effects active on the board.

mod effect;
mod filter;
mod registry;

pub use effect::{ApplyTo, BoostScope, Destination, Effect, EffectAction, EffectSpec, Trigger};
pub use filter::{FilterDim, TargetFilter};
pub use registry::EffectRegistry;
