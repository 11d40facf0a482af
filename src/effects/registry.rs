//! Effect registry.
//!
//! Holds every effect currently active on the board, keyed by source
//! card. Registration order is the deterministic evaluation order: the
//! power engine and the dispatcher walk effects in the order their
//! sources entered play.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::core::{EffectId, InstanceId, PlayerId};

use super::effect::{Effect, EffectSpec};

/// Registry of live effects.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectRegistry {
    /// Effects in registration order.
    effects: Vec<Effect>,

    /// Index by source for lifecycle removal.
    by_source: FxHashMap<InstanceId, Vec<EffectId>>,

    /// Next effect ID to allocate.
    next_id: u32,
}

impl EffectRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate an effect template for a card entering play.
    ///
    /// Returns the assigned effect ID.
    pub fn register(&mut self, source: InstanceId, owner: PlayerId, spec: &EffectSpec) -> EffectId {
        let id = EffectId::new(self.next_id);
        self.next_id += 1;

        self.effects.push(Effect {
            id,
            source,
            owner,
            trigger: spec.trigger,
            action: spec.action.clone(),
            filter: spec.filter.clone(),
        });
        self.by_source.entry(source).or_default().push(id);
        id
    }

    /// Remove a single effect (e.g. a consumed one-shot trigger).
    pub fn remove(&mut self, id: EffectId) -> Option<Effect> {
        let pos = self.effects.iter().position(|e| e.id == id)?;
        let effect = self.effects.remove(pos);

        if let Some(ids) = self.by_source.get_mut(&effect.source) {
            ids.retain(|&eid| eid != id);
            if ids.is_empty() {
                self.by_source.remove(&effect.source);
            }
        }
        Some(effect)
    }

    /// Remove all effects whose source left play.
    ///
    /// Returns how many were removed.
    pub fn remove_for_source(&mut self, source: InstanceId) -> usize {
        let Some(ids) = self.by_source.remove(&source) else {
            return 0;
        };
        self.effects.retain(|e| e.source != source);
        ids.len()
    }

    /// Get an effect by ID.
    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Effects brought into play by a given source card.
    pub fn effects_for_source(&self, source: InstanceId) -> impl Iterator<Item = &Effect> {
        self.effects.iter().filter(move |e| e.source == source)
    }

    /// All effects in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    /// Continuous effects in registration order.
    pub fn continuous(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter().filter(|e| e.is_continuous())
    }

    /// Drop effects whose source is no longer a live instance.
    ///
    /// An effect referencing a dead source is an internal invariant
    /// violation. Recomputation is pure, so dropping the stale effects
    /// and rebuilding yields a clean state; the occurrence is surfaced
    /// to operators via the error log, never swallowed.
    pub fn purge_dead_sources(&mut self, is_live: impl Fn(InstanceId) -> bool) -> usize {
        let dead: Vec<InstanceId> = self
            .by_source
            .keys()
            .copied()
            .filter(|&source| !is_live(source))
            .collect();

        let mut removed = 0;
        for source in dead {
            let count = self.remove_for_source(source);
            error!(
                source = source.raw(),
                effects = count,
                "effect registry held effects for a dead source; purged"
            );
            removed += count;
        }
        removed
    }

    /// Get total effect count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
