//! Boolean combine modes for the required and excluded axes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===== CombineMode =====

/// Boolean reduction applied across multiple marks on one axis.
///
/// The blue (required) and red (excluded) axes each carry their own mode,
/// configured independently. The variants form a fixed total order used by
/// [`next`](CombineMode::next) for the "cycle to next mode" operation:
/// `Or → And → Xor → Or`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// At least one mark on the axis must match.
    #[default]
    Or,
    /// Every mark on the axis must match.
    And,
    /// Exactly one mark on the axis must match.
    Xor,
}

impl CombineMode {
    /// The next mode in the fixed cycling order.
    pub fn next(self) -> Self {
        match self {
            CombineMode::Or => CombineMode::And,
            CombineMode::And => CombineMode::Xor,
            CombineMode::Xor => CombineMode::Or,
        }
    }

    /// Lowercase token form used in meta tokens and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            CombineMode::Or => "or",
            CombineMode::And => "and",
            CombineMode::Xor => "xor",
        }
    }
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombineMode {
    type Err = InvalidCombineMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "or" => Ok(CombineMode::Or),
            "and" => Ok(CombineMode::And),
            "xor" => Ok(CombineMode::Xor),
            other => Err(InvalidCombineMode(other.to_string())),
        }
    }
}

/// A combine-mode token outside `{or, and, xor}` was encountered.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid combine mode '{0}': expected or, and or xor")]
pub struct InvalidCombineMode(pub String);

// ===== Axis =====

/// Which combination axis an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The required-match axis.
    Blue,
    /// The excluded-match axis.
    Red,
}

// ===== Tests =====
