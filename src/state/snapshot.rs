//! Read-only state snapshots consumed by the matcher and encoder.

use crate::model::{CombineMode, ItemKey, Mark};
use crate::state::store::MarkTotals;
use std::collections::BTreeMap;

// ===== FilterSnapshot =====

/// Immutable copy of a filter's matching-relevant state.
///
/// The matching algorithm and the token encoder only ever consume this
/// shape, never the live store. That keeps both pure and lets callers
/// evaluate a *hypothetical* next-state (e.g. previewing URL-driven
/// changes) without mutating live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSnapshot {
    state: BTreeMap<ItemKey, Mark>,
    combine_blue: CombineMode,
    combine_red: CombineMode,
}

impl FilterSnapshot {
    /// Build a snapshot from an explicit mark map and combine modes.
    pub fn new(
        state: BTreeMap<ItemKey, Mark>,
        combine_blue: CombineMode,
        combine_red: CombineMode,
    ) -> Self {
        Self {
            state,
            combine_blue,
            combine_red,
        }
    }

    /// Mark for an identity. Absent identities read as `Ignored`.
    pub fn mark(&self, key: &ItemKey) -> Mark {
        self.state.get(key).copied().unwrap_or_default()
    }

    /// The required-axis combine mode captured in this snapshot.
    pub fn combine_blue(&self) -> CombineMode {
        self.combine_blue
    }

    /// The excluded-axis combine mode captured in this snapshot.
    pub fn combine_red(&self) -> CombineMode {
        self.combine_red
    }

    /// Counts of each mark across the snapshot.
    pub fn totals(&self) -> MarkTotals {
        let mut totals = MarkTotals::default();
        for mark in self.state.values() {
            match mark {
                Mark::Ignored => totals.ignored += 1,
                Mark::Required => totals.yes += 1,
                Mark::Excluded => totals.no += 1,
            }
        }
        totals
    }

    /// Whether any non-ignored mark is present.
    pub fn is_active(&self) -> bool {
        self.totals().is_active()
    }

    /// Iterate marks in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemKey, Mark)> {
        self.state.iter().map(|(k, m)| (k, *m))
    }
}

// ===== Tests =====
