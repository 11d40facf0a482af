//! Play sequence log.
//!
//! An append-only record of everything that happened in a game, in the
//! order it happened. Sequence numbers are allocated by the log and
//! strictly increase; wall-clock timestamps are informational only and
//! never used for ordering. Backed by a persistent vector, so
//! snapshotting the log for a published read view is O(1).

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::catalog::CardId;
use crate::core::{InstanceId, PlayerId, SelectionId, Zone};

/// What a log entry records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceAction {
    /// A card was placed into a zone.
    PlayCard { zone: Zone },

    /// A leader was placed. Logged separately so replay tooling can
    /// spot game setup without a catalog lookup.
    PlayLeader,

    /// A pending selection was resolved by the player.
    ResolveSelection { selection: SelectionId },

    /// A draw found fewer cards than requested.
    DrawShortfall { requested: usize, drawn: usize },

    /// Conflicting zone restrictions made a zone unplayable.
    RestrictionConflict { zone: Zone },
}

/// One entry in the play sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySequenceEntry {
    /// Strictly increasing position in the game.
    pub sequence: u64,

    /// The player the entry belongs to.
    pub owner: PlayerId,

    /// What happened.
    pub action: SequenceAction,

    /// The card instance involved, when one exists.
    pub instance: Option<InstanceId>,

    /// The catalog card involved, when one exists.
    pub card: Option<CardId>,

    /// Wall-clock milliseconds since the Unix epoch. Informational;
    /// ordering comes from `sequence` alone.
    pub timestamp_ms: u64,
}

/// Per-player aggregates over the log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayStats {
    /// Total placements, leader and non-leader alike.
    pub cards_played: usize,
    /// Leader placements only.
    pub leader_plays: usize,
    /// Non-leader placements only.
    pub card_plays: usize,
    /// Selections the player resolved.
    pub selections_resolved: usize,
    /// Draws that ran short.
    pub draw_shortfalls: usize,
}

/// Append-only game history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaySequenceLog {
    entries: Vector<PlaySequenceEntry>,
    next_sequence: u64,
}

impl PlaySequenceLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, allocating the next sequence number.
    pub fn append(
        &mut self,
        owner: PlayerId,
        action: SequenceAction,
        instance: Option<InstanceId>,
        card: Option<CardId>,
    ) -> PlaySequenceEntry {
        let entry = PlaySequenceEntry {
            sequence: self.next_sequence,
            owner,
            action,
            instance,
            card,
            timestamp_ms: now_ms(),
        };
        self.next_sequence += 1;
        self.entries.push_back(entry.clone());
        entry
    }

    /// All entries in chronological order.
    pub fn entries(&self) -> impl Iterator<Item = &PlaySequenceEntry> {
        self.entries.iter()
    }

    /// Entries with a sequence number at or after `since`.
    pub fn entries_since(&self, since: u64) -> impl Iterator<Item = &PlaySequenceEntry> {
        self.entries.iter().filter(move |e| e.sequence >= since)
    }

    /// The next sequence number the log will allocate.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Aggregate statistics for one player.
    #[must_use]
    pub fn stats(&self, owner: PlayerId) -> PlayStats {
        let mut stats = PlayStats::default();
        for entry in self.entries.iter().filter(|e| e.owner == owner) {
            match entry.action {
                SequenceAction::PlayCard { .. } => {
                    stats.cards_played += 1;
                    stats.card_plays += 1;
                }
                SequenceAction::PlayLeader => {
                    stats.cards_played += 1;
                    stats.leader_plays += 1;
                }
                SequenceAction::ResolveSelection { .. } => stats.selections_resolved += 1,
                SequenceAction::DrawShortfall { .. } => stats.draw_shortfalls += 1,
                SequenceAction::RestrictionConflict { .. } => {}
            }
        }
        stats
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
