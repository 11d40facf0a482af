//! Board state: hands, decks, and cards in play.
//!
//! The board is the raw, authoritative state the computed state derives
//! from. Decks are ordered with index 0 as the top. Each board zone
//! holds at most one card per player.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::CardId;
use crate::core::{InstanceId, PlayerId, PlayerMap, Zone};
use crate::error::{EngineError, Result};

use super::instance::CardInstance;

/// Raw board state for one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    /// Private hands per player.
    hands: PlayerMap<Vec<CardId>>,

    /// Private decks per player. Index 0 is the top card.
    decks: PlayerMap<Vec<CardId>>,

    /// Cards in play by instance ID.
    instances: FxHashMap<InstanceId, CardInstance>,

    /// Zone occupancy per player.
    occupancy: PlayerMap<FxHashMap<Zone, InstanceId>>,

    /// Next instance ID to allocate. Monotonic within the game.
    next_instance: u32,
}

impl BoardState {
    /// Create an empty board.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            hands: PlayerMap::with_default(player_count),
            decks: PlayerMap::with_default(player_count),
            instances: FxHashMap::default(),
            occupancy: PlayerMap::with_default(player_count),
            next_instance: 0,
        }
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.hands.player_count()
    }

    // === Hands ===

    /// Get a player's hand.
    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &[CardId] {
        &self.hands[player]
    }

    /// Add a card to a player's hand.
    pub fn add_to_hand(&mut self, player: PlayerId, card_id: CardId) {
        self.hands[player].push(card_id);
    }

    /// Remove a card from a player's hand.
    ///
    /// Returns true if the card was found and removed.
    pub fn remove_from_hand(&mut self, player: PlayerId, card_id: CardId) -> bool {
        if let Some(pos) = self.hands[player].iter().position(|&c| c == card_id) {
            self.hands[player].remove(pos);
            true
        } else {
            false
        }
    }

    // === Decks ===

    /// Set a player's deck. Index 0 is the top card.
    pub fn set_deck(&mut self, player: PlayerId, deck: Vec<CardId>) {
        self.decks[player] = deck;
    }

    /// Get a player's deck, top first.
    #[must_use]
    pub fn deck(&self, player: PlayerId) -> &[CardId] {
        &self.decks[player]
    }

    /// Get deck size.
    #[must_use]
    pub fn deck_size(&self, player: PlayerId) -> usize {
        self.decks[player].len()
    }

    /// Look at the top `n` cards without removing them.
    ///
    /// Returns fewer than `n` if the deck is short.
    #[must_use]
    pub fn peek_top(&self, player: PlayerId, n: usize) -> &[CardId] {
        let deck = &self.decks[player];
        &deck[..n.min(deck.len())]
    }

    /// Remove and return the top deck card, moving it to the hand.
    pub fn draw_top(&mut self, player: PlayerId) -> Option<CardId> {
        if self.decks[player].is_empty() {
            return None;
        }
        let card = self.decks[player].remove(0);
        self.hands[player].push(card);
        Some(card)
    }

    /// Remove cards at the given deck positions.
    ///
    /// Positions refer to the current deck (0 = top). The remaining
    /// cards keep their original relative order. Returns the removed
    /// cards in ascending position order.
    pub fn remove_from_deck(&mut self, player: PlayerId, positions: &[usize]) -> Vec<CardId> {
        let mut sorted: Vec<usize> = positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let deck = &mut self.decks[player];
        let mut removed = Vec::with_capacity(sorted.len());
        for &pos in sorted.iter().rev() {
            if pos < deck.len() {
                removed.push(deck.remove(pos));
            }
        }
        removed.reverse();
        removed
    }

    // === Cards in play ===

    /// Place a card into a zone, allocating its instance.
    ///
    /// Fails with `ZoneOccupied` if the zone already holds a card.
    pub fn place(
        &mut self,
        player: PlayerId,
        card_id: CardId,
        zone: Zone,
        face_down: bool,
    ) -> Result<InstanceId> {
        if self.occupancy[player].contains_key(&zone) {
            return Err(EngineError::ZoneOccupied(zone.to_string()));
        }

        let instance_id = InstanceId::new(self.next_instance);
        self.next_instance += 1;

        self.instances.insert(
            instance_id,
            CardInstance::new(instance_id, card_id, player, zone, face_down),
        );
        self.occupancy[player].insert(zone, instance_id);
        Ok(instance_id)
    }

    /// Remove a card from play.
    pub fn remove_from_play(&mut self, instance_id: InstanceId) -> Option<CardInstance> {
        let instance = self.instances.remove(&instance_id)?;
        self.occupancy[instance.owner].remove(&instance.zone);
        Some(instance)
    }

    /// Get a card instance.
    #[must_use]
    pub fn instance(&self, instance_id: InstanceId) -> Option<&CardInstance> {
        self.instances.get(&instance_id)
    }

    /// Check if an instance is in play.
    #[must_use]
    pub fn is_live(&self, instance_id: InstanceId) -> bool {
        self.instances.contains_key(&instance_id)
    }

    /// Iterate over all cards in play, in unspecified order.
    pub fn instances(&self) -> impl Iterator<Item = &CardInstance> {
        self.instances.values()
    }

    /// Cards in play sorted by instance ID (placement order).
    #[must_use]
    pub fn instances_ordered(&self) -> Vec<&CardInstance> {
        let mut all: Vec<&CardInstance> = self.instances.values().collect();
        all.sort_by_key(|i| i.instance_id);
        all
    }

    /// The card occupying a player's zone, if any.
    #[must_use]
    pub fn occupant(&self, player: PlayerId, zone: Zone) -> Option<InstanceId> {
        self.occupancy[player].get(&zone).copied()
    }

    /// Check if a player's zone is empty.
    #[must_use]
    pub fn zone_is_empty(&self, player: PlayerId, zone: Zone) -> bool {
        !self.occupancy[player].contains_key(&zone)
    }

    /// Iterate over all player IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        self.hands.player_ids()
    }
}
