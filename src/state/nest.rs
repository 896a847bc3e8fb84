//! Nest registry and hidden-mark accounting.
//!
//! Nests are named groups of items that collapse independently of matching:
//! hiding a nest removes its pills from view but leaves their marks and
//! matching effect untouched. The registry tracks per-nest visibility; the
//! owning filter folds it into item visibility and hidden-mark summaries.

use crate::model::NestName;
use std::collections::BTreeMap;

// ===== NestInfo =====

/// Per-nest visibility metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestInfo {
    /// Whether the nest starts hidden. Serves as the default the compact
    /// encoding diffs against.
    pub hidden_by_default: bool,
    /// Current, user-toggleable hidden flag. Independently persistable.
    pub hidden: bool,
}

impl NestInfo {
    /// Create nest metadata starting at its default visibility.
    pub fn new(hidden_by_default: bool) -> Self {
        Self {
            hidden_by_default,
            hidden: hidden_by_default,
        }
    }
}

// ===== NestRegistry =====

/// Mapping from nest name to nest metadata.
///
/// Owned by a [`Filter`](crate::state::Filter) only when nesting is enabled;
/// every item referencing a nest must find it registered here (validated at
/// item insertion).
#[derive(Debug, Clone, Default)]
pub struct NestRegistry {
    nests: BTreeMap<NestName, NestInfo>,
}

impl NestRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a nest. Returns `false` (no-op) if already present.
    pub(crate) fn register(&mut self, name: NestName, info: NestInfo) -> bool {
        if self.nests.contains_key(&name) {
            return false;
        }
        self.nests.insert(name, info);
        true
    }

    /// Whether a nest is registered.
    pub fn contains(&self, name: &NestName) -> bool {
        self.nests.contains_key(name)
    }

    /// Metadata for a nest.
    pub fn get(&self, name: &NestName) -> Option<NestInfo> {
        self.nests.get(name).copied()
    }

    /// Whether a nest is currently hidden. Unknown nests read as visible.
    pub fn is_hidden(&self, name: &NestName) -> bool {
        self.nests.get(name).is_some_and(|n| n.hidden)
    }

    /// Flip a nest's hidden flag. Returns the new flag, or `None` for an
    /// unknown nest.
    pub(crate) fn toggle_hidden(&mut self, name: &NestName) -> Option<bool> {
        let info = self.nests.get_mut(name)?;
        info.hidden = !info.hidden;
        Some(info.hidden)
    }

    /// Set a nest's hidden flag directly. Returns `true` if the flag
    /// changed, `None`-like `false` for unknown nests.
    pub(crate) fn set_hidden(&mut self, name: &NestName, hidden: bool) -> bool {
        match self.nests.get_mut(name) {
            Some(info) if info.hidden != hidden => {
                info.hidden = hidden;
                true
            }
            _ => false,
        }
    }

    /// Iterate nests in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&NestName, NestInfo)> {
        self.nests.iter().map(|(n, i)| (n, *i))
    }

    /// Find the registered nest matching a raw token name, ASCII
    /// case-insensitively. Used by the decode path.
    pub fn resolve_ignore_case(&self, raw: &str) -> Option<&NestName> {
        self.nests.keys().find(|n| n.eq_ignore_case(raw))
    }
}

// ===== HiddenMarks =====

/// Counts of active marks among the currently hidden items of one nest.
///
/// Feeds the "N active marks are hidden" summary surfaced next to a
/// collapsed nest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HiddenMarks {
    /// Required marks hidden from view.
    pub required: usize,
    /// Excluded marks hidden from view.
    pub excluded: usize,
}

impl HiddenMarks {
    /// Total hidden active marks.
    pub fn total(&self) -> usize {
        self.required + self.excluded
    }
}

// ===== Tests =====
