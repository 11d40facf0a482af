//! Zone restriction engine.
//!
//! Computes, per player and per zone, which game types may currently be
//! played there. Restrictions only ever narrow: multiple effects on the
//! same zone intersect their allowed sets, and an empty intersection
//! makes the zone unplayable rather than silently picking one effect.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::CardDefinition;
use crate::core::{GameType, PlayerId, Zone};
use crate::effects::{ApplyTo, EffectAction, EffectRegistry};

/// The game types a zone currently admits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllowedTypes {
    /// No restriction.
    All,
    /// Only the listed game types.
    Only(Vec<GameType>),
    /// Conflicting restrictions left nothing playable.
    None,
}

impl AllowedTypes {
    /// Check whether a game type may enter.
    #[must_use]
    pub fn permits(&self, game_type: &GameType) -> bool {
        match self {
            AllowedTypes::All => true,
            AllowedTypes::Only(set) => set.contains(game_type),
            AllowedTypes::None => false,
        }
    }

    /// Narrow by another allowed set.
    fn intersect(self, allowed: &[GameType]) -> AllowedTypes {
        match self {
            AllowedTypes::All => {
                let mut set: Vec<GameType> = allowed.to_vec();
                set.sort();
                set.dedup();
                if set.is_empty() {
                    AllowedTypes::None
                } else {
                    AllowedTypes::Only(set)
                }
            }
            AllowedTypes::Only(mut set) => {
                set.retain(|gt| allowed.contains(gt));
                if set.is_empty() {
                    AllowedTypes::None
                } else {
                    AllowedTypes::Only(set)
                }
            }
            AllowedTypes::None => AllowedTypes::None,
        }
    }
}

/// Compute active zone restrictions for one player.
///
/// Zones without any active restriction are omitted; callers treat a
/// missing entry as [`AllowedTypes::All`].
pub fn compute_restrictions(
    owner: PlayerId,
    registry: &EffectRegistry,
) -> FxHashMap<Zone, AllowedTypes> {
    let mut restrictions: FxHashMap<Zone, AllowedTypes> = FxHashMap::default();

    for effect in registry.continuous() {
        let EffectAction::ZoneRestrict {
            zone,
            allowed,
            applies,
        } = &effect.action
        else {
            continue;
        };

        let binds = match applies {
            ApplyTo::Owner => effect.owner == owner,
            ApplyTo::Opponents => effect.owner != owner,
            ApplyTo::AllPlayers => true,
        };
        if !binds {
            continue;
        }

        let current = restrictions.remove(zone).unwrap_or(AllowedTypes::All);
        let narrowed = current.intersect(allowed);
        if narrowed == AllowedTypes::None {
            warn!(
                player = owner.index(),
                zone = %zone,
                "conflicting zone restrictions; zone is unplayable"
            );
        }
        restrictions.insert(*zone, narrowed);
    }

    restrictions
}

/// Check whether a card may be played into a zone right now.
///
/// Combines the card's own type-zone eligibility with the active
/// restrictions for the owner.
#[must_use]
pub fn can_play(
    def: &CardDefinition,
    zone: Zone,
    restrictions: &FxHashMap<Zone, AllowedTypes>,
) -> bool {
    if !def.eligible_for(zone) {
        return false;
    }
    restrictions
        .get(&zone)
        .map_or(true, |allowed| allowed.permits(&def.game_type))
}
