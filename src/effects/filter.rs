//! Effect target filters.
//!
//! A filter narrows which cards an effect touches along three independent
//! dimensions: card type, game type, and traits. Each dimension is either
//! a wildcard or an explicit set; all specified dimensions must match
//! (AND across dimensions), while the trait set matches if the card
//! carries *any* listed trait (OR within the set).
//!
//! Matching never aborts effect evaluation: an empty explicit set simply
//! matches nothing.

use serde::{Deserialize, Serialize};

use crate::catalog::CardDefinition;
use crate::core::{CardTrait, CardType, GameType};

/// One filter dimension: wildcard or explicit set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterDim<T> {
    /// Matches everything.
    Any,
    /// Matches values in the set. An empty set matches nothing.
    OneOf(Vec<T>),
}

impl<T: PartialEq> FilterDim<T> {
    /// Check whether a single value satisfies this dimension.
    fn admits(&self, value: &T) -> bool {
        match self {
            FilterDim::Any => true,
            FilterDim::OneOf(set) => set.contains(value),
        }
    }

    /// Check whether any of the card's values satisfies this dimension.
    fn admits_any<'a>(&self, values: impl IntoIterator<Item = &'a T>) -> bool
    where
        T: 'a,
    {
        match self {
            FilterDim::Any => true,
            FilterDim::OneOf(set) => values.into_iter().any(|v| set.contains(v)),
        }
    }
}

impl<T> Default for FilterDim<T> {
    fn default() -> Self {
        FilterDim::Any
    }
}

/// Target filter over static card attributes.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetFilter {
    /// Card type dimension.
    pub card_types: FilterDim<CardType>,
    /// Game type (faction) dimension.
    pub game_types: FilterDim<GameType>,
    /// Trait dimension. A card matches if it carries at least one
    /// listed trait.
    pub traits: FilterDim<CardTrait>,
}

impl TargetFilter {
    /// The all-wildcard filter.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict the card type dimension (builder pattern).
    #[must_use]
    pub fn card_types(mut self, types: impl IntoIterator<Item = CardType>) -> Self {
        self.card_types = FilterDim::OneOf(types.into_iter().collect());
        self
    }

    /// Restrict the game type dimension (builder pattern).
    #[must_use]
    pub fn game_types(mut self, types: impl IntoIterator<Item = impl Into<GameType>>) -> Self {
        self.game_types = FilterDim::OneOf(types.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the trait dimension (builder pattern).
    #[must_use]
    pub fn traits(mut self, traits: impl IntoIterator<Item = impl Into<CardTrait>>) -> Self {
        self.traits = FilterDim::OneOf(traits.into_iter().map(Into::into).collect());
        self
    }

    /// Check whether a card satisfies this filter.
    ///
    /// Pure; no side effects. Fails closed: a dimension that admits
    /// nothing rejects every card rather than erroring out.
    #[must_use]
    pub fn matches(&self, def: &CardDefinition) -> bool {
        self.card_types.admits(&def.card_type)
            && self.game_types.admits(&def.game_type)
            && self.traits.admits_any(def.traits.iter())
    }
}
