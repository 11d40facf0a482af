//! Board zones.
//!
//! Zones are a closed set in this game: three character slots, one help
//! slot, one special slot, and the leader slot. The fixed `PRIORITY`
//! order is the deterministic tie-break used when a single-target effect
//! must pick one card among several equally valid candidates.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// A named placement slot on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    /// Front character slot.
    Top,
    /// Left character slot.
    Left,
    /// Right character slot.
    Right,
    /// Help card slot.
    Help,
    /// Special card slot.
    Sp,
    /// Leader slot. Leaders are never power targets.
    Leader,
}

impl Zone {
    /// Deterministic targeting order for single-target effects.
    ///
    /// Re-running a computation on unchanged state walks candidates in
    /// this order and always picks the same card. The leader zone is
    /// excluded: leader cards have no power and are never targets.
    pub const PRIORITY: [Zone; 5] = [Zone::Top, Zone::Left, Zone::Right, Zone::Help, Zone::Sp];

    /// All zones, including the leader slot.
    pub const ALL: [Zone; 6] = [
        Zone::Top,
        Zone::Left,
        Zone::Right,
        Zone::Help,
        Zone::Sp,
        Zone::Leader,
    ];

    /// Position of this zone in the targeting order.
    ///
    /// `None` for the leader zone.
    #[must_use]
    pub fn priority(self) -> Option<usize> {
        Self::PRIORITY.iter().position(|&z| z == self)
    }

    /// Zone name as used on the wire.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Zone::Top => "top",
            Zone::Left => "left",
            Zone::Right => "right",
            Zone::Help => "help",
            Zone::Sp => "sp",
            Zone::Leader => "leader",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Zone {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Zone::Top),
            "left" => Ok(Zone::Left),
            "right" => Ok(Zone::Right),
            "help" => Ok(Zone::Help),
            "sp" => Ok(Zone::Sp),
            "leader" => Ok(Zone::Leader),
            other => Err(EngineError::InvalidZone(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert_eq!(Zone::Top.priority(), Some(0));
        assert_eq!(Zone::Left.priority(), Some(1));
        assert_eq!(Zone::Right.priority(), Some(2));
        assert_eq!(Zone::Help.priority(), Some(3));
        assert_eq!(Zone::Sp.priority(), Some(4));
        assert_eq!(Zone::Leader.priority(), None);
    }

    #[test]
    fn test_parse_round_trip() {
        for zone in Zone::ALL {
            assert_eq!(zone.name().parse::<Zone>().unwrap(), zone);
        }
    }

    #[test]
    fn test_parse_unknown_zone() {
        let err = "graveyard".parse::<Zone>().unwrap_err();
        assert!(matches!(err, EngineError::InvalidZone(name) if name == "graveyard"));
    }
}
