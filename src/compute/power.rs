//! Power computation engine.
//!
//! Derives final power per character card from the board and the effect
//! registry. The pipeline order is fixed: base values, nullification,
//! all-matching boosts, single-matching boosts, clamp. Nullification
//! dominates: a nullified card ignores every boost.
//!
//! The whole computation is a pure function of its inputs. Recomputing
//! on unchanged state yields identical output, including which card a
//! single-target effect picks.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::{BoardState, CardInstance};
use crate::catalog::CardCatalog;
use crate::core::{CardType, InstanceId, PlayerId};
use crate::effects::{BoostScope, Effect, EffectAction, EffectRegistry};

/// Computed power for one character card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerEntry {
    /// Catalog base power.
    pub base_power: i64,
    /// Power after all effects, clamped to >= 0.
    pub final_power: i64,
    /// Set by a nullification effect. Face-down cards contribute zero
    /// power but are *not* nullified, so the UI can tell them apart.
    pub nullified: bool,
}

/// Compute final power for every character card in play.
pub fn compute_powers(
    board: &BoardState,
    catalog: &CardCatalog,
    registry: &EffectRegistry,
) -> FxHashMap<InstanceId, PowerEntry> {
    // Characters in placement order; the per-effect target order re-sorts.
    let characters: Vec<&CardInstance> = board
        .instances_ordered()
        .into_iter()
        .filter(|inst| {
            catalog
                .get(inst.card_id)
                .is_some_and(|def| def.card_type == CardType::Character)
        })
        .collect();

    let mut entries: FxHashMap<InstanceId, PowerEntry> = FxHashMap::default();
    for inst in &characters {
        let Some(def) = catalog.get(inst.card_id) else {
            warn!(card = inst.card_id.raw(), "card missing from catalog; skipped");
            continue;
        };
        entries.insert(
            inst.instance_id,
            PowerEntry {
                base_power: def.power,
                final_power: if inst.face_down { 0 } else { def.power },
                nullified: false,
            },
        );
    }

    // Nullification first: it dominates all boosts.
    for effect in registry.continuous() {
        if !matches!(effect.action, EffectAction::PowerNullify) {
            continue;
        }
        for inst in &characters {
            if !targetable(inst) {
                continue;
            }
            let Some(def) = catalog.get(inst.card_id) else {
                continue;
            };
            if effect.filter.matches(def) {
                if let Some(entry) = entries.get_mut(&inst.instance_id) {
                    entry.final_power = 0;
                    entry.nullified = true;
                }
            }
        }
    }

    // All-matching boosts stack additively across effects.
    for effect in registry.continuous() {
        let EffectAction::PowerBoost { amount, scope } = &effect.action else {
            continue;
        };
        match scope {
            BoostScope::SelfOnly => {
                let Some(inst) = board.instance(effect.source) else {
                    continue;
                };
                if targetable(inst) {
                    boost(&mut entries, inst.instance_id, *amount);
                }
            }
            BoostScope::AllMatching => {
                for inst in &characters {
                    if !targetable(inst) {
                        continue;
                    }
                    let Some(def) = catalog.get(inst.card_id) else {
                        continue;
                    };
                    if effect.filter.matches(def) {
                        boost(&mut entries, inst.instance_id, *amount);
                    }
                }
            }
            BoostScope::SingleMatching => {} // second pass below
        }
    }

    // Single-matching boosts pick exactly one card each, in the fixed
    // zone-priority order. Each effect evaluates independently, so two
    // such effects may land on the same card.
    for effect in registry.continuous() {
        let EffectAction::PowerBoost {
            amount,
            scope: BoostScope::SingleMatching,
        } = &effect.action
        else {
            continue;
        };
        if let Some(target) = pick_single_target(&characters, catalog, &entries, effect) {
            boost(&mut entries, target, *amount);
        }
    }

    // Clamp to a minimum of zero.
    for entry in entries.values_mut() {
        if entry.final_power < 0 {
            entry.final_power = 0;
        }
    }

    entries
}

/// A card is targetable if it is face-up and in a power zone.
fn targetable(inst: &CardInstance) -> bool {
    !inst.face_down && inst.zone.priority().is_some()
}

fn boost(entries: &mut FxHashMap<InstanceId, PowerEntry>, target: InstanceId, amount: i64) {
    if let Some(entry) = entries.get_mut(&target) {
        if !entry.nullified {
            entry.final_power += amount;
        }
    }
}

/// First matching, non-nullified candidate in (zone priority, owner
/// rank, instance id) order. The effect owner's cards come first.
fn pick_single_target(
    characters: &[&CardInstance],
    catalog: &CardCatalog,
    entries: &FxHashMap<InstanceId, PowerEntry>,
    effect: &Effect,
) -> Option<InstanceId> {
    let mut candidates: Vec<&&CardInstance> = characters
        .iter()
        .filter(|inst| {
            targetable(inst)
                && entries
                    .get(&inst.instance_id)
                    .is_some_and(|e| !e.nullified)
                && catalog
                    .get(inst.card_id)
                    .is_some_and(|def| effect.filter.matches(def))
        })
        .collect();

    candidates.sort_by_key(|inst| {
        (
            inst.zone.priority().unwrap_or(usize::MAX),
            owner_rank(inst.owner, effect.owner),
            inst.instance_id,
        )
    });

    candidates.first().map(|inst| inst.instance_id)
}

fn owner_rank(card_owner: PlayerId, effect_owner: PlayerId) -> (u8, u8) {
    (u8::from(card_owner != effect_owner), card_owner.0)
}
