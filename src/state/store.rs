//! Per-item mark storage.

use crate::model::{ItemKey, Mark};
use std::collections::BTreeMap;

// ===== StateStore =====

/// Mapping from item identity to its current mark.
///
/// # Invariants
///
/// - Keys are exactly the owning filter's current item set: every item has
///   exactly one entry and no stale entries survive item-set changes.
/// - Mutated only through the owning [`Filter`](crate::state::Filter)'s
///   operations, which apply the mutation and fan out change notifications
///   atomically. The store itself is a plain map; it is not exposed mutably.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    marks: BTreeMap<ItemKey, Mark>,
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mark for an identity. Absent identities read as `Ignored`.
    pub fn mark(&self, key: &ItemKey) -> Mark {
        self.marks.get(key).copied().unwrap_or_default()
    }

    /// Whether the store tracks this identity.
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.marks.contains_key(key)
    }

    /// Set the mark for an identity. Returns `true` if the stored value
    /// changed (insert or different mark).
    pub(crate) fn set(&mut self, key: ItemKey, mark: Mark) -> bool {
        self.marks.insert(key, mark) != Some(mark)
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether the store tracks no identities.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Iterate entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemKey, Mark)> {
        self.marks.iter().map(|(k, m)| (k, *m))
    }

    /// Counts of each mark across the store.
    pub fn totals(&self) -> MarkTotals {
        let mut totals = MarkTotals::default();
        for mark in self.marks.values() {
            match mark {
                Mark::Ignored => totals.ignored += 1,
                Mark::Required => totals.yes += 1,
                Mark::Excluded => totals.no += 1,
            }
        }
        totals
    }

    /// Copy of the full map, for snapshot construction.
    pub(crate) fn to_map(&self) -> BTreeMap<ItemKey, Mark> {
        self.marks.clone()
    }
}

// ===== MarkTotals =====

/// Counts of marks per tri-state value across one facet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkTotals {
    /// Number of required marks.
    pub yes: usize,
    /// Number of excluded marks.
    pub no: usize,
    /// Number of ignored marks.
    pub ignored: usize,
}

impl MarkTotals {
    /// Whether any non-ignored mark is present.
    pub fn is_active(&self) -> bool {
        self.yes > 0 || self.no > 0
    }
}

// ===== Tests =====
