//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable attributes of a card: base power,
//! card type, game type, traits, zone eligibility, and the effect
//! templates the card brings into play. Per-placement data lives in
//! `board::CardInstance`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{CardTrait, CardType, GameType, Zone};
use crate::effects::EffectSpec;

/// Unique identifier for a card definition.
///
/// Identifies the catalog entry, not a placed copy. Two placements of the
/// same card share a `CardId` but get distinct `InstanceId`s.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Static card definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card.
    pub id: CardId,

    /// Card name (for display/debugging).
    pub name: String,

    /// What kind of card this is.
    pub card_type: CardType,

    /// Faction label.
    pub game_type: GameType,

    /// Base power. Zero for non-character cards.
    pub power: i64,

    /// Trait labels. Most cards carry 0-2 traits.
    pub traits: SmallVec<[CardTrait; 2]>,

    /// Zones this card may be played into.
    pub zone_eligibility: Vec<Zone>,

    /// Effect templates instantiated when this card enters play.
    pub effects: Vec<EffectSpec>,
}

impl CardDefinition {
    /// Create a new card definition.
    ///
    /// Zone eligibility defaults to the card type's standard zones.
    #[must_use]
    pub fn new(
        id: CardId,
        name: impl Into<String>,
        card_type: CardType,
        game_type: impl Into<GameType>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            card_type,
            game_type: game_type.into(),
            power: 0,
            traits: SmallVec::new(),
            zone_eligibility: card_type.default_zones().to_vec(),
            effects: Vec::new(),
        }
    }

    /// Set the base power (builder pattern).
    #[must_use]
    pub fn with_power(mut self, power: i64) -> Self {
        self.power = power;
        self
    }

    /// Add a trait label (builder pattern).
    #[must_use]
    pub fn with_trait(mut self, card_trait: impl Into<CardTrait>) -> Self {
        self.traits.push(card_trait.into());
        self
    }

    /// Override zone eligibility (builder pattern).
    #[must_use]
    pub fn with_zones(mut self, zones: impl IntoIterator<Item = Zone>) -> Self {
        self.zone_eligibility = zones.into_iter().collect();
        self
    }

    /// Add an effect template (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, spec: EffectSpec) -> Self {
        self.effects.push(spec);
        self
    }

    /// Check if this card carries a given trait.
    #[must_use]
    pub fn has_trait(&self, card_trait: &CardTrait) -> bool {
        self.traits.contains(card_trait)
    }

    /// Check if this card may ever enter a zone, ignoring restrictions.
    #[must_use]
    pub fn eligible_for(&self, zone: Zone) -> bool {
        self.zone_eligibility.contains(&zone)
    }
}
