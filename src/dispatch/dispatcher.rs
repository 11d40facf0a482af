//! Triggered effect dispatch.
//!
//! When a card enters the board, triggered effects fire in a fixed
//! order: the entering card's own summon effects first, then play
//! effects of cards the owner already controls. Within each group,
//! effect registration order decides. Summon effects are one-shot and
//! are consumed after firing; play effects persist and fire again on
//! every later play by the same owner.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::BoardState;
use crate::catalog::{CardCatalog, CardId};
use crate::core::{EffectId, InstanceId, PlayerId, SelectionId};
use crate::effects::{Effect, EffectAction, EffectRegistry, Trigger};
use crate::selection::SelectionManager;

/// A card entering the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayEvent {
    /// The player who placed the card.
    pub owner: PlayerId,
    /// The placed instance.
    pub instance: InstanceId,
}

/// A draw that found fewer cards than requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawShortfall {
    pub requested: usize,
    pub drawn: usize,
}

/// Everything a dispatch round did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Cards drawn into hands, in draw order.
    pub drawn: Vec<CardId>,
    /// Draws that ran out of deck. Never an error.
    pub shortfalls: Vec<DrawShortfall>,
    /// Selection workflows opened by search effects.
    pub opened_selections: Vec<SelectionId>,
}

/// Fire the triggered effects a play event activates.
///
/// Continuous effects never fire here; they are picked up by the next
/// recomputation. Triggered effects carrying a continuous-style action
/// are skipped with a debug log rather than misapplied.
pub fn dispatch_play_event(
    board: &mut BoardState,
    catalog: &CardCatalog,
    registry: &mut EffectRegistry,
    selections: &mut SelectionManager,
    event: PlayEvent,
) -> DispatchOutcome {
    let mut firing: Vec<EffectId> = Vec::new();
    let mut consumed: Vec<EffectId> = Vec::new();

    // Summon effects of the entering card, in registration order.
    for effect in registry.iter() {
        if effect.trigger == Trigger::OnSummon && effect.source == event.instance {
            firing.push(effect.id);
            consumed.push(effect.id);
        }
    }
    // Play effects of the owner's other cards. The entering card's own
    // play effects wait for the owner's next play action.
    for effect in registry.iter() {
        if effect.trigger == Trigger::OnPlay
            && effect.owner == event.owner
            && effect.source != event.instance
        {
            firing.push(effect.id);
        }
    }

    let mut outcome = DispatchOutcome::default();
    for id in firing {
        let Some(effect) = registry.get(id).cloned() else {
            continue;
        };
        fire(board, catalog, selections, &effect, &mut outcome);
    }

    for id in consumed {
        registry.remove(id);
    }

    outcome
}

fn fire(
    board: &mut BoardState,
    catalog: &CardCatalog,
    selections: &mut SelectionManager,
    effect: &Effect,
    outcome: &mut DispatchOutcome,
) {
    match &effect.action {
        EffectAction::Draw { count } => {
            let mut drawn = 0;
            for _ in 0..*count {
                match board.draw_top(effect.owner) {
                    Some(card) => {
                        outcome.drawn.push(card);
                        drawn += 1;
                    }
                    None => break,
                }
            }
            if drawn < *count {
                warn!(
                    player = effect.owner.index(),
                    requested = count,
                    drawn,
                    "deck exhausted during draw"
                );
                outcome.shortfalls.push(DrawShortfall {
                    requested: *count,
                    drawn,
                });
            }
        }
        EffectAction::Search {
            depth,
            select_count,
            destination,
        } => {
            let candidates: Vec<CardId> = board
                .peek_top(effect.owner, *depth)
                .iter()
                .filter(|card| catalog.get(**card).is_some_and(|def| effect.filter.matches(def)))
                .copied()
                .collect();
            if candidates.is_empty() {
                debug!(
                    source = effect.source.raw(),
                    depth, "search found no eligible cards"
                );
                return;
            }
            let id = selections.open(
                effect.owner,
                effect.source,
                candidates,
                *select_count,
                *destination,
            );
            outcome.opened_selections.push(id);
        }
        other => {
            debug!(
                source = effect.source.raw(),
                action = ?other,
                "triggered effect carries a continuous action; ignored"
            );
        }
    }
}
