//! The facet-value value object.

use crate::model::{GroupName, ItemKey, NestName};

// ===== FilterItem =====

/// One facet value plus its grouping metadata. No behavior beyond identity.
///
/// Items are created when added to a [`Filter`](crate::state::Filter) and are
/// never deleted; identity is permanent for the life of the filter. The nest
/// reference, when set, must name a nest registered on the owning filter
/// (validated at insertion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterItem {
    key: ItemKey,
    nest: Option<NestName>,
    group: Option<GroupName>,
    ignore_in_exclusion: bool,
}

impl FilterItem {
    /// Create an item with no nest, no group and normal exclusion behavior.
    ///
    /// This is the normalizing constructor: any accepted input shape (a bare
    /// key or a fully configured item) goes through here plus the `with_`
    /// builders, so the engine only ever sees the canonical type.
    pub fn new(key: ItemKey) -> Self {
        Self {
            key,
            nest: None,
            group: None,
            ignore_in_exclusion: false,
        }
    }

    /// Assign the item to a nest.
    pub fn with_nest(mut self, nest: NestName) -> Self {
        self.nest = Some(nest);
        self
    }

    /// Assign the item to a divider group.
    pub fn with_group(mut self, group: GroupName) -> Self {
        self.group = Some(group);
        self
    }

    /// Exempt this item from red-combine evaluation.
    ///
    /// Used for advisory facet values whose excluded mark must never
    /// suppress an entry.
    pub fn with_ignore_in_exclusion(mut self, ignore: bool) -> Self {
        self.ignore_in_exclusion = ignore;
        self
    }

    /// The item's identity.
    pub fn key(&self) -> &ItemKey {
        &self.key
    }

    /// The nest this item belongs to, if any.
    pub fn nest(&self) -> Option<&NestName> {
        self.nest.as_ref()
    }

    /// The divider group this item belongs to, if any.
    pub fn group(&self) -> Option<&GroupName> {
        self.group.as_ref()
    }

    /// Whether the red-combine evaluation skips this item.
    pub fn ignore_in_exclusion(&self) -> bool {
        self.ignore_in_exclusion
    }
}

// ===== Tests =====
