//! Card instances - cards in play.
//!
//! A `CardInstance` exists from the moment a card leaves a hand or deck
//! into a board zone until it is removed from play. It is owned
//! exclusively by its player's zone collection on the board.

use serde::{Deserialize, Serialize};

use crate::catalog::CardId;
use crate::core::{InstanceId, PlayerId, Zone};

/// A card placed into a board zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique per placement.
    pub instance_id: InstanceId,

    /// Catalog key for the card's static attributes.
    pub card_id: CardId,

    /// The player whose zone holds this card.
    pub owner: PlayerId,

    /// Where the card sits.
    pub zone: Zone,

    /// Face-down cards are excluded from effect targeting and
    /// contribute no power.
    pub face_down: bool,
}

impl CardInstance {
    /// Create a new instance.
    #[must_use]
    pub fn new(
        instance_id: InstanceId,
        card_id: CardId,
        owner: PlayerId,
        zone: Zone,
        face_down: bool,
    ) -> Self {
        Self {
            instance_id,
            card_id,
            owner,
            zone,
            face_down,
        }
    }
}
