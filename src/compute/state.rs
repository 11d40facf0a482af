//! Computed state: the derived view published after every mutation.
//!
//! `ComputedState` is never hand-authored and carries no independent
//! state: it is fully determined by the board and the effect registry,
//! and it is rebuilt whole on every recomputation rather than patched
//! incrementally.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::BoardState;
use crate::catalog::CardCatalog;
use crate::core::{InstanceId, PlayerId, Zone};
use crate::effects::{EffectAction, EffectRegistry};

use super::power::{compute_powers, PowerEntry};
use super::restriction::{compute_restrictions, AllowedTypes};

/// The derived, non-authoritative view of a game.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ComputedState {
    /// Final power per character card, grouped by owner.
    pub player_powers: FxHashMap<PlayerId, FxHashMap<InstanceId, PowerEntry>>,

    /// Active zone restrictions per player. Missing zones are
    /// unrestricted.
    pub active_restrictions: FxHashMap<PlayerId, FxHashMap<Zone, AllowedTypes>>,

    /// Nullified cards, sorted by instance ID.
    pub disabled_cards: Vec<InstanceId>,

    /// Continuous victory-point adjustments per player.
    pub victory_point_modifiers: FxHashMap<PlayerId, i64>,
}

impl ComputedState {
    /// Power entry for a card, if it is a character in play.
    #[must_use]
    pub fn power(&self, owner: PlayerId, instance: InstanceId) -> Option<&PowerEntry> {
        self.player_powers.get(&owner)?.get(&instance)
    }

    /// Restrictions for one player's zone.
    #[must_use]
    pub fn restriction(&self, owner: PlayerId, zone: Zone) -> &AllowedTypes {
        self.active_restrictions
            .get(&owner)
            .and_then(|zones| zones.get(&zone))
            .unwrap_or(&AllowedTypes::All)
    }

    /// Zones that are currently unplayable for a player.
    pub fn conflicted_zones(&self, owner: PlayerId) -> impl Iterator<Item = Zone> + '_ {
        self.active_restrictions
            .get(&owner)
            .into_iter()
            .flat_map(|zones| {
                zones
                    .iter()
                    .filter(|(_, allowed)| **allowed == AllowedTypes::None)
                    .map(|(zone, _)| *zone)
            })
    }
}

/// Rebuild the computed state from scratch.
///
/// Order matters for the published view: restrictions first, then
/// powers, so the snapshot a reader sees is internally consistent.
#[must_use]
pub fn recompute(
    board: &BoardState,
    catalog: &CardCatalog,
    registry: &EffectRegistry,
) -> ComputedState {
    let mut active_restrictions = FxHashMap::default();
    for player in board.player_ids() {
        active_restrictions.insert(player, compute_restrictions(player, registry));
    }

    let powers = compute_powers(board, catalog, registry);

    let mut player_powers: FxHashMap<PlayerId, FxHashMap<InstanceId, PowerEntry>> =
        FxHashMap::default();
    for player in board.player_ids() {
        player_powers.insert(player, FxHashMap::default());
    }
    let mut disabled_cards = Vec::new();
    for (instance_id, entry) in &powers {
        if let Some(inst) = board.instance(*instance_id) {
            player_powers
                .entry(inst.owner)
                .or_default()
                .insert(*instance_id, *entry);
            if entry.nullified {
                disabled_cards.push(*instance_id);
            }
        }
    }
    disabled_cards.sort_unstable();

    let mut victory_point_modifiers: FxHashMap<PlayerId, i64> = FxHashMap::default();
    for player in board.player_ids() {
        victory_point_modifiers.insert(player, 0);
    }
    for effect in registry.continuous() {
        if let EffectAction::VictoryPoints { delta } = effect.action {
            *victory_point_modifiers.entry(effect.owner).or_default() += delta;
        }
    }

    ComputedState {
        player_powers,
        active_restrictions,
        disabled_cards,
        victory_point_modifiers,
    }
}
