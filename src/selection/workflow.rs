//! Selection workflows: pending player choices for search effects.
//!
//! A search effect does not block the game. It opens a `PendingSelection`
//! holding a fixed candidate snapshot and returns control; the searched
//! cards stay logically in the deck until the owner's choice commits
//! them. The workflow is a stored state machine, `Open -> {Resolved,
//! Cancelled}`, resumable by an external call and trivially persistable.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::BoardState;
use crate::catalog::CardId;
use crate::core::{InstanceId, PlayerId, SelectionId, Zone};
use crate::effects::Destination;
use crate::error::{EngineError, Result};

/// A pending player choice.
///
/// The candidate list is a snapshot taken when the search fired;
/// re-querying the deck afterwards never changes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingSelection {
    /// Workflow identifier.
    pub selection_id: SelectionId,

    /// The player who must choose.
    pub owner: PlayerId,

    /// The card whose effect opened this selection.
    pub source: InstanceId,

    /// Eligible cards, in deck order at snapshot time.
    pub candidates: Vec<CardId>,

    /// How many cards must be chosen. Already clamped to the candidate
    /// count at creation.
    pub select_count: usize,

    /// Where chosen cards go.
    pub destination: Destination,
}

/// What a resolved selection did to the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSelection {
    /// The player who chose.
    pub owner: PlayerId,

    /// Cards placed into a zone, with their new instances.
    pub placed: Vec<(CardId, Zone, InstanceId)>,

    /// Cards moved to the hand.
    pub to_hand: Vec<CardId>,
}

/// Tracks all open selection workflows for one game.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionManager {
    pending: FxHashMap<SelectionId, PendingSelection>,
    next_id: u32,
}

impl SelectionManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new selection workflow.
    ///
    /// `select_count` is clamped to the candidate count: fewer eligible
    /// cards than requested is partial fulfillment, not an error.
    pub fn open(
        &mut self,
        owner: PlayerId,
        source: InstanceId,
        candidates: Vec<CardId>,
        select_count: usize,
        destination: Destination,
    ) -> SelectionId {
        let selection_id = SelectionId::new(self.next_id);
        self.next_id += 1;

        let clamped = select_count.min(candidates.len());
        debug!(
            selection = selection_id.raw(),
            candidates = candidates.len(),
            select_count = clamped,
            "opened selection workflow"
        );
        self.pending.insert(
            selection_id,
            PendingSelection {
                selection_id,
                owner,
                source,
                candidates,
                select_count: clamped,
                destination,
            },
        );
        selection_id
    }

    /// Get an open selection.
    #[must_use]
    pub fn get(&self, id: SelectionId) -> Option<&PendingSelection> {
        self.pending.get(&id)
    }

    /// IDs of all open selections, sorted for determinism.
    #[must_use]
    pub fn open_ids(&self) -> Vec<SelectionId> {
        let mut ids: Vec<SelectionId> = self.pending.keys().copied().collect();
        ids.sort_by_key(|id| id.raw());
        ids
    }

    /// Clones of all open selections, sorted by ID.
    #[must_use]
    pub fn open_selections(&self) -> Vec<PendingSelection> {
        let mut all: Vec<PendingSelection> = self.pending.values().cloned().collect();
        all.sort_by_key(|s| s.selection_id.raw());
        all
    }

    /// Open selections owned by a player.
    pub fn for_owner(&self, owner: PlayerId) -> impl Iterator<Item = &PendingSelection> {
        self.pending.values().filter(move |s| s.owner == owner)
    }

    /// Number of open workflows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if no workflows are open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Resolve an open selection with the player's choice.
    ///
    /// Fails with `InvalidSelection` if `chosen` is not a sub-multiset
    /// of the candidates, its size differs from `select_count`, or a
    /// chosen card has meanwhile left the deck. The selection never
    /// silently truncates or pads a choice; on failure it stays open and
    /// the board is untouched.
    ///
    /// On success the chosen cards move to the destination, the
    /// unchosen searched cards keep their original deck order, and the
    /// workflow is deleted.
    pub fn resolve(
        &mut self,
        board: &mut BoardState,
        id: SelectionId,
        chosen: &[CardId],
    ) -> Result<ResolvedSelection> {
        let selection = self
            .pending
            .get(&id)
            .ok_or(EngineError::SelectionNotFound(id))?;

        if chosen.len() != selection.select_count {
            return Err(EngineError::InvalidSelection(format!(
                "expected {} cards, got {}",
                selection.select_count,
                chosen.len()
            )));
        }

        // Sub-multiset check against the candidate snapshot.
        let mut remaining = selection.candidates.clone();
        for card in chosen {
            match remaining.iter().position(|c| c == card) {
                Some(pos) => {
                    remaining.remove(pos);
                }
                None => {
                    return Err(EngineError::InvalidSelection(format!(
                        "{} is not an eligible candidate",
                        card
                    )));
                }
            }
        }

        // Locate each chosen card in the current deck, topmost first.
        // The deck may have shifted since the snapshot (e.g. a draw);
        // a chosen card that already left the deck is a contradiction
        // of the choice and rejects the resolution.
        let deck = board.deck(selection.owner);
        let mut positions: Vec<usize> = Vec::with_capacity(chosen.len());
        for card in chosen {
            let found = deck
                .iter()
                .enumerate()
                .position(|(pos, c)| c == card && !positions.contains(&pos));
            match found {
                Some(pos) => positions.push(pos),
                None => {
                    return Err(EngineError::InvalidSelection(format!(
                        "{} is no longer in the deck",
                        card
                    )));
                }
            }
        }

        // Commit: from here on the workflow is consumed.
        let selection = self.pending.remove(&id).expect("selection checked above");
        let removed = board.remove_from_deck(selection.owner, &positions);

        // Destination resolves now, not at trigger time: the help zone
        // may have filled or emptied while the selection was pending.
        let mut placed = Vec::new();
        let mut to_hand = Vec::new();
        for card in removed {
            let to_help = match selection.destination {
                Destination::Hand => false,
                Destination::ConditionalHelp => {
                    board.zone_is_empty(selection.owner, Zone::Help)
                }
            };
            if to_help {
                let instance = board.place(selection.owner, card, Zone::Help, false)?;
                placed.push((card, Zone::Help, instance));
            } else {
                board.add_to_hand(selection.owner, card);
                to_hand.push(card);
            }
        }

        debug!(
            selection = id.raw(),
            placed = placed.len(),
            to_hand = to_hand.len(),
            "resolved selection workflow"
        );
        Ok(ResolvedSelection {
            owner: selection.owner,
            placed,
            to_hand,
        })
    }

    /// Cancel an open selection (administrative teardown only).
    ///
    /// The deck was never touched while the selection was pending, so
    /// cancellation just deletes the workflow.
    pub fn cancel(&mut self, id: SelectionId) -> Result<PendingSelection> {
        self.pending
            .remove(&id)
            .ok_or(EngineError::SelectionNotFound(id))
    }
}
