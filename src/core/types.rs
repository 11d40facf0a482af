//! Card vocabulary: card types, game types, traits.
//!
//! Card types are a closed set. Game types (factions like "經濟") and
//! traits (like "特朗普家族") are open string vocabularies owned by the
//! card catalog, so they stay newtyped strings rather than interned IDs.

use serde::{Deserialize, Serialize};

use super::zone::Zone;

/// The kind of a card. Determines which zones it may enter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Character cards carry power and occupy the top/left/right slots.
    Character,
    /// Help cards occupy the help slot.
    Help,
    /// Special cards occupy the sp slot.
    Sp,
    /// Leader cards occupy the leader slot and carry leader effects.
    Leader,
}

impl CardType {
    /// Default zone eligibility for this card type.
    #[must_use]
    pub fn default_zones(self) -> &'static [Zone] {
        match self {
            CardType::Character => &[Zone::Top, Zone::Left, Zone::Right],
            CardType::Help => &[Zone::Help],
            CardType::Sp => &[Zone::Sp],
            CardType::Leader => &[Zone::Leader],
        }
    }
}

/// Game type (faction) label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameType(pub String);

impl GameType {
    /// Create a new game type label.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Trait label carried by a card.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardTrait(pub String);

impl CardTrait {
    /// Create a new trait label.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardTrait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardTrait {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
