//! Saved-state persistence: full snapshots written to and restored from
//! storage.
//!
//! Unlike the token encoding, persistence is not diffed against defaults: a
//! saved facet carries its complete mark map so a later session restores it
//! regardless of how the configured defaults have since changed. Restore is
//! lenient the same way decode is: unknown identities are parked for items
//! added later, unknown nests are dropped with a warning.

use crate::model::{Axis, CombineMode, Mark, NestName};
use crate::state::Filter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

// ===== Snapshot shapes =====

/// Persisted form of one facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSnapshot {
    /// Mark per item identity, complete at save time.
    #[serde(default)]
    pub state: BTreeMap<String, Mark>,
    /// Hidden flag per nest name.
    #[serde(default)]
    pub nests_hidden: BTreeMap<String, bool>,
    /// Combine modes and collapse state. Absent in older saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaSnapshot>,
}

/// Persisted facet metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaSnapshot {
    /// Required-axis combine mode.
    pub combine_blue: CombineMode,
    /// Excluded-axis combine mode.
    pub combine_red: CombineMode,
    /// Whether the facet's controls were collapsed.
    pub hidden: bool,
}

/// Persisted form of a whole panel: facet name to facet snapshot.
pub type PanelSnapshot = BTreeMap<String, FacetSnapshot>;

impl Filter {
    /// Capture the facet's full state for persistence.
    pub fn to_snapshot(&self) -> FacetSnapshot {
        FacetSnapshot {
            state: self
                .store()
                .iter()
                .map(|(k, m)| (k.as_str().to_string(), m))
                .collect(),
            nests_hidden: match self.nests() {
                Some(registry) => registry
                    .iter()
                    .map(|(n, info)| (n.as_str().to_string(), info.hidden))
                    .collect(),
                None => BTreeMap::new(),
            },
            meta: Some(MetaSnapshot {
                combine_blue: self.combine_blue(),
                combine_red: self.combine_red(),
                hidden: self.is_hidden(),
            }),
        }
    }

    /// Merge a persisted snapshot into live state.
    ///
    /// Identities are matched ASCII case-insensitively. Saved identities not
    /// currently in the item set are parked and honored if the item arrives
    /// later; saved nest names with no registered nest are dropped with a
    /// warning. A snapshot whose marks are all ignored flips the
    /// loaded-cleared flag so newly added items stop defaulting on.
    pub fn restore(&mut self, snapshot: &FacetSnapshot) {
        let cleared = !snapshot.state.is_empty()
            && snapshot.state.values().all(|m| *m == Mark::Ignored);
        self.set_user_loaded(cleared);

        for (raw_identity, mark) in &snapshot.state {
            match self.resolve_item_ignore_case(raw_identity) {
                Some(item) => {
                    let key = item.key().clone();
                    self.set_mark_notify(key, *mark);
                }
                None => {
                    self.park_restored(raw_identity, *mark);
                }
            }
        }

        for (raw_nest, hidden) in &snapshot.nests_hidden {
            let resolved: Option<NestName> = self
                .nests()
                .and_then(|r| r.resolve_ignore_case(raw_nest))
                .cloned();
            match resolved {
                Some(nest) => self.set_nest_hidden_notify(&nest, *hidden),
                None => {
                    warn!(facet = %self.name(), nest = raw_nest, "dropping saved state for unknown nest");
                }
            }
        }

        if let Some(meta) = &snapshot.meta {
            self.set_combine_notify(Axis::Blue, meta.combine_blue);
            self.set_combine_notify(Axis::Red, meta.combine_red);
            self.set_hidden(meta.hidden);
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
