//! Card catalog: immutable static card data.

#[allow(clippy::module_inception)]
mod catalog;
mod definition;

pub use catalog::CardCatalog;
pub use definition::{CardDefinition, CardId};
