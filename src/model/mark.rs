//! The tri-state mark assigned to one facet value.
//!
//! A mark is one of ignored / required / excluded. The wire and persistence
//! representation is the integer code 0 / 1 / 2.

use serde::{Deserialize, Serialize};

// ===== Mark =====

/// Tri-state mark for one facet value.
///
/// # State Machine
///
/// The primary cycle step moves `Ignored → Required → Excluded → Ignored`;
/// the reverse step moves `Ignored → Excluded → Required → Ignored`. Both
/// cycles are closed: three applications of either step return the original
/// mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Mark {
    /// The value does not participate in matching. Code 0.
    #[default]
    Ignored,
    /// The value must match for the entry to display ("blue"). Code 1.
    Required,
    /// The value suppresses the entry when matched ("red"). Code 2.
    Excluded,
}

impl Mark {
    /// Primary cycle step: 0 → 1 → 2 → 0.
    pub fn cycled(self, direction: CycleDirection) -> Self {
        match direction {
            CycleDirection::Forward => match self {
                Mark::Ignored => Mark::Required,
                Mark::Required => Mark::Excluded,
                Mark::Excluded => Mark::Ignored,
            },
            CycleDirection::Reverse => match self {
                Mark::Ignored => Mark::Excluded,
                Mark::Excluded => Mark::Required,
                Mark::Required => Mark::Ignored,
            },
        }
    }

    /// The integer code used by tokens and persistence snapshots.
    pub fn code(self) -> u8 {
        match self {
            Mark::Ignored => 0,
            Mark::Required => 1,
            Mark::Excluded => 2,
        }
    }

    /// Parse an integer code. Returns `None` for anything outside 0..=2.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Mark::Ignored),
            1 => Some(Mark::Required),
            2 => Some(Mark::Excluded),
            _ => None,
        }
    }
}

impl From<Mark> for u8 {
    fn from(mark: Mark) -> u8 {
        mark.code()
    }
}

impl TryFrom<u8> for Mark {
    type Error = InvalidMarkCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Mark::from_code(code).ok_or(InvalidMarkCode(code))
    }
}

/// A mark code outside `{0, 1, 2}` was encountered during deserialization.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("invalid mark code {0}: expected 0, 1 or 2")]
pub struct InvalidMarkCode(pub u8);

// ===== CycleDirection =====

/// Which direction a mark cycle step moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    /// Primary action: 0 → 1 → 2 → 0.
    Forward,
    /// Secondary (reverse) action: 0 → 2 → 1 → 0.
    Reverse,
}

// ===== Tests =====
