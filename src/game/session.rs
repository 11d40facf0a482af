//! Game session: the mutation surface for one game.
//!
//! A session owns the authoritative state (board, effect registry,
//! pending selections, play log) and the latest published computed
//! state. Every mutation runs the same tail: apply, rebuild the
//! computed state from scratch, diff restriction conflicts, append log
//! entries. The computed state is always consistent with the board a
//! caller just observed mutating.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::BoardState;
use crate::catalog::{CardCatalog, CardId};
use crate::compute::{can_play, recompute, ComputedState};
use crate::core::{CardType, InstanceId, PlayerId, SelectionId, Zone};
use crate::dispatch::{dispatch_play_event, PlayEvent};
use crate::effects::{EffectRegistry, Trigger};
use crate::error::{EngineError, Result};
use crate::history::{PlaySequenceEntry, PlaySequenceLog, PlayStats, SequenceAction};
use crate::selection::{PendingSelection, SelectionManager};

/// What one placement did.
#[derive(Clone, Debug)]
pub struct PlacementOutcome {
    /// The new instance on the board.
    pub instance: InstanceId,

    /// The computed state published by this mutation.
    pub computed: Arc<ComputedState>,

    /// Log entries this mutation appended, in order.
    pub new_entries: Vec<PlaySequenceEntry>,

    /// Selection workflows opened by triggered search effects.
    pub pending_selections: Vec<SelectionId>,
}

/// What resolving a selection did.
#[derive(Clone, Debug)]
pub struct SelectionOutcome {
    /// The computed state published by this mutation.
    pub computed: Arc<ComputedState>,

    /// Log entries this mutation appended, in order.
    pub new_entries: Vec<PlaySequenceEntry>,
}

/// Serializable snapshot of one game's authoritative state.
///
/// The catalog is shared across games and is not part of the save; the
/// computed state is derived and rebuilt on restore.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    pub board: BoardState,
    pub effects: EffectRegistry,
    pub selections: SelectionManager,
    pub log: PlaySequenceLog,
}

/// One running game.
#[derive(Clone, Debug)]
pub struct GameSession {
    catalog: Arc<CardCatalog>,
    board: BoardState,
    effects: EffectRegistry,
    selections: SelectionManager,
    log: PlaySequenceLog,
    computed: Arc<ComputedState>,

    /// Conflicted (player, zone) pairs already logged. A conflict is
    /// logged when it appears, not on every recomputation while it
    /// persists.
    known_conflicts: FxHashSet<(PlayerId, Zone)>,
}

impl GameSession {
    /// Create a fresh game.
    #[must_use]
    pub fn new(catalog: Arc<CardCatalog>, player_count: usize) -> Self {
        let board = BoardState::new(player_count);
        let effects = EffectRegistry::new();
        let computed = Arc::new(recompute(&board, &catalog, &effects));
        Self {
            catalog,
            board,
            effects,
            selections: SelectionManager::new(),
            log: PlaySequenceLog::new(),
            computed,
            known_conflicts: FxHashSet::default(),
        }
    }

    // === Setup ===

    /// Set a player's deck, top card first.
    pub fn set_deck(&mut self, player: PlayerId, deck: Vec<CardId>) {
        self.board.set_deck(player, deck);
    }

    /// Put a card into a player's hand.
    pub fn add_to_hand(&mut self, player: PlayerId, card: CardId) {
        self.board.add_to_hand(player, card);
    }

    // === Mutations ===

    /// Play a card from a player's hand into a zone.
    ///
    /// Validation order is fixed: unknown card, card not in hand, zone
    /// occupied, zone restricted. On success the card's effects are
    /// registered, triggered effects fire, and the computed state is
    /// rebuilt and published.
    pub fn apply_placement(
        &mut self,
        owner: PlayerId,
        card: CardId,
        zone: Zone,
        face_down: bool,
    ) -> Result<PlacementOutcome> {
        let def = self
            .catalog
            .get(card)
            .ok_or(EngineError::UnknownCard(card.raw()))?;

        if !self.board.hand(owner).contains(&card) {
            return Err(EngineError::CardNotInHand(card.raw()));
        }
        if self.board.occupant(owner, zone).is_some() {
            return Err(EngineError::ZoneOccupied(zone.to_string()));
        }

        let empty = FxHashMap::default();
        let restrictions = self
            .computed
            .active_restrictions
            .get(&owner)
            .unwrap_or(&empty);
        if !can_play(def, zone, restrictions) {
            return Err(EngineError::ZoneRestricted {
                zone: zone.to_string(),
                reason: format!("{} {}", def.game_type, def.name),
            });
        }

        let def = def.clone();
        self.board.remove_from_hand(owner, card);
        let instance = self.board.place(owner, card, zone, face_down)?;
        for spec in &def.effects {
            self.effects.register(instance, owner, spec);
        }

        let dispatched = dispatch_play_event(
            &mut self.board,
            &self.catalog,
            &mut self.effects,
            &mut self.selections,
            PlayEvent { owner, instance },
        );

        let mut new_entries = Vec::new();
        let play_action = if def.card_type == CardType::Leader {
            SequenceAction::PlayLeader
        } else {
            SequenceAction::PlayCard { zone }
        };
        new_entries.push(
            self.log
                .append(owner, play_action, Some(instance), Some(card)),
        );
        for shortfall in &dispatched.shortfalls {
            new_entries.push(self.log.append(
                owner,
                SequenceAction::DrawShortfall {
                    requested: shortfall.requested,
                    drawn: shortfall.drawn,
                },
                Some(instance),
                None,
            ));
        }

        let computed = self.publish(&mut new_entries);
        info!(
            player = owner.index(),
            card = card.raw(),
            zone = %zone,
            instance = instance.raw(),
            "placement applied"
        );

        Ok(PlacementOutcome {
            instance,
            computed,
            new_entries,
            pending_selections: dispatched.opened_selections,
        })
    }

    /// Resolve a pending selection with the player's chosen cards.
    ///
    /// Cards the selection places onto the board register their
    /// continuous effects; their summon triggers do not fire, since the
    /// cards arrive by effect rather than by a play action.
    pub fn resolve_selection(
        &mut self,
        id: SelectionId,
        chosen: &[CardId],
    ) -> Result<SelectionOutcome> {
        let resolved = self.selections.resolve(&mut self.board, id, chosen)?;

        for (card, _zone, instance) in &resolved.placed {
            if let Some(def) = self.catalog.get(*card) {
                for spec in &def.effects {
                    if spec.trigger == Trigger::Always {
                        self.effects.register(*instance, resolved.owner, spec);
                    }
                }
            }
        }

        let mut new_entries = vec![self.log.append(
            resolved.owner,
            SequenceAction::ResolveSelection { selection: id },
            resolved.placed.first().map(|(_, _, inst)| *inst),
            None,
        )];
        let computed = self.publish(&mut new_entries);

        Ok(SelectionOutcome {
            computed,
            new_entries,
        })
    }

    /// Discard a pending selection without touching the board.
    pub fn cancel_selection(&mut self, id: SelectionId) -> Result<()> {
        self.selections.cancel(id)?;
        Ok(())
    }

    /// Remove a card from play, dropping its effects.
    pub fn remove_from_play(&mut self, instance: InstanceId) -> Result<Arc<ComputedState>> {
        self.board
            .remove_from_play(instance)
            .ok_or(EngineError::InstanceNotFound(instance.raw()))?;
        self.effects.remove_for_source(instance);

        let mut entries = Vec::new();
        Ok(self.publish(&mut entries))
    }

    // === Queries ===

    /// The latest published computed state.
    #[must_use]
    pub fn computed(&self) -> Arc<ComputedState> {
        Arc::clone(&self.computed)
    }

    /// The play sequence log.
    #[must_use]
    pub fn log(&self) -> &PlaySequenceLog {
        &self.log
    }

    /// Per-player aggregates over the log.
    #[must_use]
    pub fn stats(&self, owner: PlayerId) -> PlayStats {
        self.log.stats(owner)
    }

    /// An open selection workflow.
    #[must_use]
    pub fn pending_selection(&self, id: SelectionId) -> Option<&PendingSelection> {
        self.selections.get(id)
    }

    /// IDs of all open selections.
    #[must_use]
    pub fn pending_selections(&self) -> Vec<SelectionId> {
        self.selections.open_ids()
    }

    /// Clones of all open selection workflows, sorted by ID.
    #[must_use]
    pub fn open_selections(&self) -> Vec<PendingSelection> {
        self.selections.open_selections()
    }

    /// Raw board state.
    #[must_use]
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    // === Persistence ===

    /// Snapshot the authoritative state for serialization.
    #[must_use]
    pub fn save(&self) -> SavedGame {
        SavedGame {
            board: self.board.clone(),
            effects: self.effects.clone(),
            selections: self.selections.clone(),
            log: self.log.clone(),
        }
    }

    /// Rebuild a session from a saved game.
    ///
    /// Derived state is recomputed rather than restored, so a save made
    /// by an older build replays against current rules. Conflicts
    /// present in the restored state are treated as already logged.
    #[must_use]
    pub fn restore(catalog: Arc<CardCatalog>, saved: SavedGame) -> Self {
        let computed = Arc::new(recompute(&saved.board, &catalog, &saved.effects));
        let known_conflicts = current_conflicts(&saved.board, &computed);
        Self {
            catalog,
            board: saved.board,
            effects: saved.effects,
            selections: saved.selections,
            log: saved.log,
            computed,
            known_conflicts,
        }
    }

    /// Recompute, publish, and log newly appearing restriction
    /// conflicts. Every mutation ends here.
    fn publish(&mut self, new_entries: &mut Vec<PlaySequenceEntry>) -> Arc<ComputedState> {
        // Stale effects from a source no longer in play would poison
        // the recomputation; purge before deriving.
        let board = &self.board;
        self.effects.purge_dead_sources(|source| board.is_live(source));

        let computed = Arc::new(recompute(&self.board, &self.catalog, &self.effects));

        let conflicts = current_conflicts(&self.board, &computed);
        let mut appeared: Vec<(PlayerId, Zone)> = conflicts
            .difference(&self.known_conflicts)
            .copied()
            .collect();
        appeared.sort_by_key(|(player, zone)| (player.index(), zone.priority()));
        for (player, zone) in appeared {
            new_entries.push(self.log.append(
                player,
                SequenceAction::RestrictionConflict { zone },
                None,
                None,
            ));
        }
        self.known_conflicts = conflicts;

        self.computed = Arc::clone(&computed);
        computed
    }
}

fn current_conflicts(
    board: &BoardState,
    computed: &ComputedState,
) -> FxHashSet<(PlayerId, Zone)> {
    board
        .player_ids()
        .flat_map(|player| {
            computed
                .conflicted_zones(player)
                .map(move |zone| (player, zone))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardDefinition;
    use crate::effects::{
        ApplyTo, BoostScope, Destination, EffectAction, EffectSpec, TargetFilter,
    };

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn catalog() -> Arc<CardCatalog> {
        let mut catalog = CardCatalog::new();
        catalog.register(
            CardDefinition::new(CardId::new(1), "Ivanka", CardType::Character, "右翼")
                .with_power(100)
                .with_trait("特朗普家族"),
        );
        catalog.register(
            CardDefinition::new(CardId::new(2), "Economist", CardType::Character, "經濟")
                .with_power(100),
        );
        catalog.register(
            CardDefinition::new(CardId::new(3), "Trump", CardType::Leader, "右翼").with_effect(
                EffectSpec::continuous(
                    EffectAction::PowerBoost {
                        amount: 45,
                        scope: BoostScope::AllMatching,
                    },
                    TargetFilter::any().traits(["特朗普家族"]),
                ),
            ),
        );
        catalog.register(
            CardDefinition::new(CardId::new(4), "Scout", CardType::Help, "經濟").with_effect(
                EffectSpec::on_summon(
                    EffectAction::Search {
                        depth: 4,
                        select_count: 1,
                        destination: Destination::Hand,
                    },
                    TargetFilter::any().card_types([CardType::Character]),
                ),
            ),
        );
        catalog.register(
            CardDefinition::new(CardId::new(5), "Wall", CardType::Sp, "右翼").with_effect(
                EffectSpec::continuous(
                    EffectAction::ZoneRestrict {
                        zone: Zone::Top,
                        allowed: vec!["右翼".into()],
                        applies: ApplyTo::AllPlayers,
                    },
                    TargetFilter::any(),
                ),
            ),
        );
        Arc::new(catalog)
    }

    fn session() -> GameSession {
        GameSession::new(catalog(), 2)
    }

    #[test]
    fn test_placement_validation_order() {
        let mut session = session();

        assert!(matches!(
            session.apply_placement(P0, CardId::new(99), Zone::Top, false),
            Err(EngineError::UnknownCard(99))
        ));
        assert!(matches!(
            session.apply_placement(P0, CardId::new(1), Zone::Top, false),
            Err(EngineError::CardNotInHand(1))
        ));

        session.add_to_hand(P0, CardId::new(1));
        session.add_to_hand(P0, CardId::new(2));
        session.apply_placement(P0, CardId::new(1), Zone::Top, false).unwrap();
        assert!(matches!(
            session.apply_placement(P0, CardId::new(2), Zone::Top, false),
            Err(EngineError::ZoneOccupied(_))
        ));
    }

    #[test]
    fn test_leader_boost_applies_to_trait() {
        let mut session = session();
        session.add_to_hand(P0, CardId::new(3));
        session.add_to_hand(P0, CardId::new(1));
        session.add_to_hand(P0, CardId::new(2));

        session
            .apply_placement(P0, CardId::new(3), Zone::Leader, false)
            .unwrap();
        let family = session
            .apply_placement(P0, CardId::new(1), Zone::Top, false)
            .unwrap();
        let other = session
            .apply_placement(P0, CardId::new(2), Zone::Left, false)
            .unwrap();

        let computed = session.computed();
        assert_eq!(computed.power(P0, family.instance).unwrap().final_power, 145);
        assert_eq!(computed.power(P0, other.instance).unwrap().final_power, 100);
    }

    #[test]
    fn test_restriction_blocks_placement() {
        let mut session = session();
        session.add_to_hand(P1, CardId::new(5));
        session.add_to_hand(P0, CardId::new(2));

        session
            .apply_placement(P1, CardId::new(5), Zone::Sp, false)
            .unwrap();

        // Top now admits 右翼 only; the 經濟 character is rejected
        let err = session
            .apply_placement(P0, CardId::new(2), Zone::Top, false)
            .unwrap_err();
        assert!(matches!(err, EngineError::ZoneRestricted { .. }));
        // The card stays in hand
        assert_eq!(session.board().hand(P0), &[CardId::new(2)]);
    }

    #[test]
    fn test_search_then_resolve_updates_log() {
        let mut session = session();
        session.add_to_hand(P0, CardId::new(4));
        session.set_deck(
            P0,
            vec![CardId::new(4), CardId::new(1), CardId::new(2)],
        );

        let outcome = session
            .apply_placement(P0, CardId::new(4), Zone::Help, false)
            .unwrap();
        assert_eq!(outcome.pending_selections.len(), 1);
        let id = outcome.pending_selections[0];

        let pending = session.pending_selection(id).unwrap();
        assert_eq!(pending.candidates, vec![CardId::new(1), CardId::new(2)]);

        session.resolve_selection(id, &[CardId::new(1)]).unwrap();
        assert!(session.board().hand(P0).contains(&CardId::new(1)));
        assert!(session.pending_selections().is_empty());

        let actions: Vec<&SequenceAction> =
            session.log().entries().map(|e| &e.action).collect();
        assert!(matches!(actions[0], SequenceAction::PlayCard { zone: Zone::Help }));
        assert!(matches!(actions[1], SequenceAction::ResolveSelection { .. }));
    }

    #[test]
    fn test_invalid_resolution_leaves_workflow_open() {
        let mut session = session();
        session.add_to_hand(P0, CardId::new(4));
        session.set_deck(P0, vec![CardId::new(1), CardId::new(2)]);

        let outcome = session
            .apply_placement(P0, CardId::new(4), Zone::Help, false)
            .unwrap();
        let id = outcome.pending_selections[0];

        let err = session
            .resolve_selection(id, &[CardId::new(2), CardId::new(1)])
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSelection(_)));
        assert!(session.pending_selection(id).is_some());
    }

    #[test]
    fn test_remove_from_play_drops_effects() {
        let mut session = session();
        session.add_to_hand(P0, CardId::new(3));
        session.add_to_hand(P0, CardId::new(1));

        session
            .apply_placement(P0, CardId::new(3), Zone::Leader, false)
            .unwrap();
        let family = session
            .apply_placement(P0, CardId::new(1), Zone::Top, false)
            .unwrap();
        assert_eq!(
            session.computed().power(P0, family.instance).unwrap().final_power,
            145
        );

        let leader = session.board().occupant(P0, Zone::Leader).unwrap();
        let computed = session.remove_from_play(leader).unwrap();
        assert_eq!(computed.power(P0, family.instance).unwrap().final_power, 100);
    }

    #[test]
    fn test_identical_restrictions_do_not_conflict() {
        let mut session = session();
        session.add_to_hand(P0, CardId::new(5));
        session.add_to_hand(P1, CardId::new(5));
        session.add_to_hand(P0, CardId::new(1));

        // One restriction: no conflict yet
        session
            .apply_placement(P0, CardId::new(5), Zone::Sp, false)
            .unwrap();
        assert!(!session
            .log()
            .entries()
            .any(|e| matches!(e.action, SequenceAction::RestrictionConflict { .. })));

        // A second, disjoint restriction would be needed for a conflict;
        // the same allowed set intersects to itself
        session
            .apply_placement(P1, CardId::new(5), Zone::Sp, false)
            .unwrap();
        let conflicts = session
            .log()
            .entries()
            .filter(|e| matches!(e.action, SequenceAction::RestrictionConflict { .. }))
            .count();
        assert_eq!(conflicts, 0);
    }

    #[test]
    fn test_save_restore_round_trip() {
        let mut session = session();
        session.add_to_hand(P0, CardId::new(3));
        session.add_to_hand(P0, CardId::new(1));
        session
            .apply_placement(P0, CardId::new(3), Zone::Leader, false)
            .unwrap();
        let family = session
            .apply_placement(P0, CardId::new(1), Zone::Top, false)
            .unwrap();

        let saved = session.save();
        let json = serde_json::to_string(&saved).unwrap();
        let back: SavedGame = serde_json::from_str(&json).unwrap();
        let restored = GameSession::restore(catalog(), back);

        assert_eq!(
            restored.computed().power(P0, family.instance).unwrap().final_power,
            145
        );
        assert_eq!(restored.log().len(), session.log().len());
    }
}
