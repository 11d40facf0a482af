//! Effect definitions.
//!
//! An effect is a source card's standing contribution to the computed
//! state (continuous actions) or a one-shot reaction to a play event
//! (triggered actions). The action vocabulary is a closed enum processed
//! by exhaustive matching in the power engine and the dispatcher.

use serde::{Deserialize, Serialize};

use crate::core::{EffectId, GameType, InstanceId, PlayerId, Zone};

use super::filter::TargetFilter;

/// When an effect applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Continuous: re-evaluated on every recomputation.
    Always,
    /// Fires exactly once, when the source card enters play.
    OnSummon,
    /// Fires on every subsequent play action by the source's owner.
    OnPlay,
}

/// How a power boost selects its targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoostScope {
    /// The source card only. The effect's filter is ignored.
    SelfOnly,
    /// Every card matching the filter. Multiple effects stack additively.
    AllMatching,
    /// Exactly one matching card, chosen by the deterministic zone
    /// priority order.
    SingleMatching,
}

/// Which players a zone restriction binds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyTo {
    /// The effect owner's own zones.
    Owner,
    /// Every other player's zones.
    Opponents,
    /// Everyone's zones.
    AllPlayers,
}

/// Where cards chosen in a search workflow end up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// The owner's hand.
    Hand,
    /// Help zone if empty at resolution time, otherwise hand.
    /// The check happens at resolution, not at trigger time: the help
    /// zone may fill or empty while the selection is pending.
    ConditionalHelp,
}

/// The closed set of effect actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectAction {
    /// Add `amount` to matching characters' power.
    PowerBoost { amount: i64, scope: BoostScope },

    /// Set matching characters' power to zero. Dominates boosts: a
    /// nullified card ignores all boost effects.
    PowerNullify,

    /// Narrow a zone to the given game types. Multiple restrictions
    /// intersect; an empty intersection makes the zone unplayable.
    ZoneRestrict {
        zone: Zone,
        allowed: Vec<GameType>,
        applies: ApplyTo,
    },

    /// Look at the top `depth` deck cards, screen them through the
    /// effect's filter, and open a selection of `select_count` of them.
    Search {
        depth: usize,
        select_count: usize,
        destination: Destination,
    },

    /// Move up to `count` cards from deck top to hand. A short deck is
    /// partial fulfillment, not an error.
    Draw { count: usize },

    /// Continuous victory-point adjustment for the effect owner.
    VictoryPoints { delta: i64 },
}

/// An effect template on a card definition.
///
/// Instantiated into a live [`Effect`] when the source card enters play.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    /// When the effect applies.
    pub trigger: Trigger,
    /// What the effect does.
    pub action: EffectAction,
    /// Which cards it touches. For `Search`, this screens the deck
    /// candidates instead of board cards.
    pub filter: TargetFilter,
}

impl EffectSpec {
    /// Create a continuous effect template.
    #[must_use]
    pub fn continuous(action: EffectAction, filter: TargetFilter) -> Self {
        Self {
            trigger: Trigger::Always,
            action,
            filter,
        }
    }

    /// Create a template that fires once when the source enters play.
    #[must_use]
    pub fn on_summon(action: EffectAction, filter: TargetFilter) -> Self {
        Self {
            trigger: Trigger::OnSummon,
            action,
            filter,
        }
    }

    /// Create a template that fires on the owner's later plays.
    #[must_use]
    pub fn on_play(action: EffectAction, filter: TargetFilter) -> Self {
        Self {
            trigger: Trigger::OnPlay,
            action,
            filter,
        }
    }
}

/// A live effect bound to a source card in play.
///
/// An effect never outlives its source: the registry drops all of a
/// card's effects when the card leaves play.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Registry-assigned identifier.
    pub id: EffectId,
    /// The card instance this effect came from.
    pub source: InstanceId,
    /// The player who owns the source card.
    pub owner: PlayerId,
    /// When the effect applies.
    pub trigger: Trigger,
    /// What the effect does.
    pub action: EffectAction,
    /// Which cards it touches.
    pub filter: TargetFilter,
}

impl Effect {
    /// Check if this is a continuous effect.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.trigger == Trigger::Always
    }
}
