//! Append-only play history.

mod sequence;

pub use sequence::{PlaySequenceEntry, PlaySequenceLog, PlayStats, SequenceAction};
