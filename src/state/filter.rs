//! The filtering engine: item set, mark store, nest registry and mutation API.
//!
//! A [`Filter`] owns one facet: its ordered items, their tri-state marks,
//! the optional nest registry, the combine-mode metadata and the umbrella
//! configuration. All mutation goes through the methods here; each mutation
//! applies its change and fans out notifications synchronously before
//! returning, so dependent recomputation has always run by return time.

use crate::model::{
    Axis, CombineMode, CycleDirection, FacetName, FilterError, FilterItem, GroupName, ItemKey,
    Mark, NestName,
};
use crate::state::matching::{self, MatchContext};
use crate::state::nest::{HiddenMarks, NestInfo, NestRegistry};
use crate::state::notify::{ChangeEvent, ChangeKey, ListenerId, MetaField, Subscribers};
use crate::state::snapshot::FilterSnapshot;
use crate::state::store::{MarkTotals, StateStore};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ===== DefaultPolicy =====

/// Predicate deciding a default mark for an item.
pub type MarkPredicate = Box<dyn Fn(&FilterItem) -> bool>;

/// Select/deselect predicates driving default-state computation.
///
/// Deselect takes precedence: an item matching both predicates defaults to
/// `Excluded`.
#[derive(Default)]
pub struct DefaultPolicy {
    select: Option<MarkPredicate>,
    deselect: Option<MarkPredicate>,
}

impl fmt::Debug for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultPolicy")
            .field("select", &self.select.as_ref().map(|_| "<predicate>"))
            .field("deselect", &self.deselect.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

// ===== Filter =====

/// Tri-state filtering engine for one facet.
///
/// # Invariants
///
/// - The store's key set is exactly the item set: every item has exactly one
///   mark entry at all times.
/// - Every item nest reference names a registered nest (validated at
///   insertion; insertion fails fast otherwise).
/// - Notifications fire synchronously, in registration order, before the
///   mutating call returns.
///
/// Single-threaded: a filter exclusively owns its store and nest registry,
/// and nothing here suspends or defers.
pub struct Filter {
    name: FacetName,
    items: Vec<FilterItem>,
    store: StateStore,
    nests: Option<NestRegistry>,
    combine_blue: CombineMode,
    combine_red: CombineMode,
    default_combine_blue: CombineMode,
    default_combine_red: CombineMode,
    hidden: bool,
    umbrella_items: BTreeSet<ItemKey>,
    umbrella_excludes: BTreeSet<ItemKey>,
    defaults: DefaultPolicy,
    /// Externally restored marks for identities not yet added, keyed by
    /// lowercased identity. Honored (and consumed) by later `add_item`.
    parked_restores: BTreeMap<String, Mark>,
    /// True once a loaded user state was entirely ignored: newly added
    /// items then default to `Ignored` instead of running the predicates,
    /// so a new catalog value cannot become the sole active mark for a
    /// user who deliberately cleared everything.
    user_cleared: bool,
    dirty: bool,
    subscribers: Subscribers,
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("name", &self.name)
            .field("items", &self.items)
            .field("store", &self.store)
            .field("nests", &self.nests)
            .field("combine_blue", &self.combine_blue)
            .field("combine_red", &self.combine_red)
            .field("hidden", &self.hidden)
            .field("user_cleared", &self.user_cleared)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Filter {
    /// Create an empty, non-nested filter with `or`/`or` combine modes.
    pub fn new(name: FacetName) -> Self {
        Self {
            name,
            items: Vec::new(),
            store: StateStore::new(),
            nests: None,
            combine_blue: CombineMode::Or,
            combine_red: CombineMode::Or,
            default_combine_blue: CombineMode::Or,
            default_combine_red: CombineMode::Or,
            hidden: false,
            umbrella_items: BTreeSet::new(),
            umbrella_excludes: BTreeSet::new(),
            defaults: DefaultPolicy::default(),
            parked_restores: BTreeMap::new(),
            user_cleared: false,
            dirty: false,
            subscribers: Subscribers::new(),
        }
    }

    /// Enable nesting with an empty registry.
    pub fn with_nesting(mut self) -> Self {
        self.nests = Some(NestRegistry::new());
        self
    }

    /// Set the combine modes (also recorded as the defaults the compact
    /// encoding diffs against).
    pub fn with_combine(mut self, blue: CombineMode, red: CombineMode) -> Self {
        self.combine_blue = blue;
        self.combine_red = red;
        self.default_combine_blue = blue;
        self.default_combine_red = red;
        self
    }

    /// Configure the umbrella item and umbrella-exclude sets.
    pub fn with_umbrella(
        mut self,
        items: impl IntoIterator<Item = ItemKey>,
        excludes: impl IntoIterator<Item = ItemKey>,
    ) -> Self {
        self.umbrella_items = items.into_iter().collect();
        self.umbrella_excludes = excludes.into_iter().collect();
        self
    }

    /// Set the select-default predicate (items matching it default to
    /// `Required`).
    pub fn with_select_default(mut self, predicate: impl Fn(&FilterItem) -> bool + 'static) -> Self {
        self.defaults.select = Some(Box::new(predicate));
        self
    }

    /// Set the deselect-default predicate (items matching it default to
    /// `Excluded`; wins over the select predicate).
    pub fn with_deselect_default(
        mut self,
        predicate: impl Fn(&FilterItem) -> bool + 'static,
    ) -> Self {
        self.defaults.deselect = Some(Box::new(predicate));
        self
    }

    // ===== Accessors =====

    /// The facet this filter manages.
    pub fn name(&self) -> &FacetName {
        &self.name
    }

    /// Ordered item list.
    pub fn items(&self) -> &[FilterItem] {
        &self.items
    }

    /// Look up an item by exact identity.
    pub fn item(&self, key: &ItemKey) -> Option<&FilterItem> {
        self.items.iter().find(|i| i.key() == key)
    }

    /// Look up an item by raw identity, ASCII case-insensitively.
    ///
    /// Decode/restore only; live identity stays case-sensitive.
    pub fn resolve_item_ignore_case(&self, raw: &str) -> Option<&FilterItem> {
        self.items.iter().find(|i| i.key().eq_ignore_case(raw))
    }

    /// The live mark store (read-only).
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Current mark for an identity.
    pub fn mark(&self, key: &ItemKey) -> Mark {
        self.store.mark(key)
    }

    /// Mark totals across the facet.
    pub fn totals(&self) -> MarkTotals {
        self.store.totals()
    }

    /// The nest registry, present only when nesting is enabled.
    pub fn nests(&self) -> Option<&NestRegistry> {
        self.nests.as_ref()
    }

    /// Required-axis combine mode.
    pub fn combine_blue(&self) -> CombineMode {
        self.combine_blue
    }

    /// Excluded-axis combine mode.
    pub fn combine_red(&self) -> CombineMode {
        self.combine_red
    }

    /// Default required-axis combine mode (what the encoding diffs against).
    pub fn default_combine_blue(&self) -> CombineMode {
        self.default_combine_blue
    }

    /// Default excluded-axis combine mode.
    pub fn default_combine_red(&self) -> CombineMode {
        self.default_combine_red
    }

    /// Whether the facet's controls are collapsed in the UI. Irrelevant to
    /// matching.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Umbrella item set.
    pub fn umbrella_items(&self) -> &BTreeSet<ItemKey> {
        &self.umbrella_items
    }

    /// Umbrella-exclude item set.
    pub fn umbrella_excludes(&self) -> &BTreeSet<ItemKey> {
        &self.umbrella_excludes
    }

    /// Whether a deferred re-render is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume the dirty flag; returns its prior value. Lets a renderer
    /// batch multiple mutations into one pass.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    // ===== Defaults =====

    /// Default mark for one item per the configured predicates: deselect
    /// wins, then select, else ignored.
    pub fn default_mark(&self, item: &FilterItem) -> Mark {
        if self.defaults.deselect.as_ref().is_some_and(|p| p(item)) {
            Mark::Excluded
        } else if self.defaults.select.as_ref().is_some_and(|p| p(item)) {
            Mark::Required
        } else {
            Mark::Ignored
        }
    }

    /// The full predicate-default state, item by item.
    pub fn default_state(&self) -> BTreeMap<ItemKey, Mark> {
        self.items
            .iter()
            .map(|i| (i.key().clone(), self.default_mark(i)))
            .collect()
    }

    // ===== Item/nest mutation =====

    /// Add an item. No-op when an item with the same identity exists.
    ///
    /// Fails fast when the item references a nest that is unknown or when
    /// nesting is disabled; the item is not inserted in either case. The
    /// initial mark is an externally restored mark when one is parked for
    /// this identity, otherwise the predicate default (or `Ignored` after a
    /// cleared user state was loaded).
    pub fn add_item(&mut self, item: FilterItem) -> Result<(), FilterError> {
        if self.item(item.key()).is_some() {
            return Ok(());
        }
        if let Some(nest) = item.nest() {
            match &self.nests {
                None => {
                    return Err(FilterError::NestingDisabled { nest: nest.clone() });
                }
                Some(registry) if !registry.contains(nest) => {
                    return Err(FilterError::UnknownNestForItem {
                        item: item.key().clone(),
                        nest: nest.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        let key = item.key().clone();
        let parked = self.parked_restores.remove(&key.as_str().to_lowercase());
        let mark = match parked {
            Some(restored) => restored,
            None if self.user_cleared => Mark::Ignored,
            None => self.default_mark(&item),
        };
        self.items.push(item);
        self.store.set(key.clone(), mark);
        self.dirty = true;
        self.subscribers.emit(&ChangeEvent::State { key, mark });
        Ok(())
    }

    /// Register a nest. No-op when already present; fails fast when nesting
    /// is disabled.
    pub fn add_nest(&mut self, name: NestName, hidden_by_default: bool) -> Result<(), FilterError> {
        let Some(registry) = self.nests.as_mut() else {
            return Err(FilterError::NestingDisabled { nest: name });
        };
        if registry.register(name.clone(), NestInfo::new(hidden_by_default)) {
            self.dirty = true;
            // Re-run visibility folding for anything keyed on this nest.
            self.subscribers.emit(&ChangeEvent::NestHidden {
                nest: name,
                hidden: hidden_by_default,
            });
        }
        Ok(())
    }

    // ===== Mark mutation =====

    /// Cycle one item's mark.
    ///
    /// `Forward` steps 0 → 1 → 2 → 0, `Reverse` steps 0 → 2 → 1 → 0.
    /// `clear_first` resets every mark to ignored before applying the single
    /// step, which lets one gesture isolate the named value. Returns the
    /// item's new mark.
    pub fn cycle_mark(
        &mut self,
        key: &ItemKey,
        direction: CycleDirection,
        clear_first: bool,
    ) -> Result<Mark, FilterError> {
        if self.item(key).is_none() {
            return Err(FilterError::UnknownItem { item: key.clone() });
        }
        if clear_first {
            self.set_all(Mark::Ignored);
        }
        let next = self.store.mark(key).cycled(direction);
        self.set_mark_notify(key.clone(), next);
        Ok(next)
    }

    /// Set one item's mark directly.
    pub fn set_mark(&mut self, key: &ItemKey, mark: Mark) -> Result<(), FilterError> {
        if self.item(key).is_none() {
            return Err(FilterError::UnknownItem { item: key.clone() });
        }
        self.set_mark_notify(key.clone(), mark);
        Ok(())
    }

    /// Set every item's mark to the same value.
    pub fn set_all(&mut self, mark: Mark) {
        let keys: Vec<ItemKey> = self.items.iter().map(|i| i.key().clone()).collect();
        for key in keys {
            self.set_mark_notify(key, mark);
        }
    }

    /// Reset every item's mark to its predicate default.
    pub fn reset_to_default(&mut self) {
        let defaults = self.default_state();
        for (key, mark) in defaults {
            self.set_mark_notify(key, mark);
        }
    }

    /// Apply a mark and notify, marking the engine dirty on change.
    pub(crate) fn set_mark_notify(&mut self, key: ItemKey, mark: Mark) {
        if self.store.set(key.clone(), mark) {
            self.dirty = true;
            self.subscribers.emit(&ChangeEvent::State { key, mark });
        }
    }

    // ===== Nest visibility =====

    /// Toggle a nest's hidden flag. Returns the new flag.
    pub fn toggle_nest_hidden(&mut self, name: &NestName) -> Result<bool, FilterError> {
        let Some(registry) = self.nests.as_mut() else {
            return Err(FilterError::NestingDisabled { nest: name.clone() });
        };
        let hidden = registry
            .toggle_hidden(name)
            .ok_or_else(|| FilterError::UnknownNest { nest: name.clone() })?;
        self.dirty = true;
        self.subscribers.emit(&ChangeEvent::NestHidden {
            nest: name.clone(),
            hidden,
        });
        Ok(hidden)
    }

    /// Set a nest's hidden flag, notifying on change.
    pub(crate) fn set_nest_hidden_notify(&mut self, name: &NestName, hidden: bool) {
        if let Some(registry) = self.nests.as_mut() {
            if registry.set_hidden(name, hidden) {
                self.dirty = true;
                self.subscribers.emit(&ChangeEvent::NestHidden {
                    nest: name.clone(),
                    hidden,
                });
            }
        }
    }

    /// Whether an item is currently visible (its nest, if any, is not
    /// hidden). Visibility never affects matching.
    pub fn is_item_visible(&self, key: &ItemKey) -> bool {
        let Some(item) = self.item(key) else {
            return false;
        };
        match (item.nest(), &self.nests) {
            (Some(nest), Some(registry)) => !registry.is_hidden(nest),
            _ => true,
        }
    }

    /// Counts of required/excluded marks among the hidden items of a nest,
    /// for the "N active marks are hidden" summary. Zero when the nest is
    /// currently visible.
    pub fn hidden_mark_summary(&self, name: &NestName) -> Result<HiddenMarks, FilterError> {
        let Some(registry) = self.nests.as_ref() else {
            return Err(FilterError::NestingDisabled { nest: name.clone() });
        };
        if !registry.contains(name) {
            return Err(FilterError::UnknownNest { nest: name.clone() });
        }
        if !registry.is_hidden(name) {
            return Ok(HiddenMarks::default());
        }
        let mut summary = HiddenMarks::default();
        for item in self.items.iter().filter(|i| i.nest() == Some(name)) {
            match self.store.mark(item.key()) {
                Mark::Required => summary.required += 1,
                Mark::Excluded => summary.excluded += 1,
                Mark::Ignored => {}
            }
        }
        Ok(summary)
    }

    // ===== Group dividers =====

    /// The divider groups present among this filter's items, in name order.
    pub fn groups(&self) -> BTreeSet<GroupName> {
        self.items.iter().filter_map(|i| i.group().cloned()).collect()
    }

    /// Whether a group's divider is hidden from view.
    ///
    /// With nesting: hidden when every item of the group sits in a hidden
    /// nest. Without nesting: hidden only for the alphabetically-first
    /// group.
    pub fn is_group_divider_hidden(&self, group: &GroupName) -> bool {
        match &self.nests {
            Some(registry) => self
                .items
                .iter()
                .filter(|i| i.group() == Some(group))
                .all(|i| i.nest().is_some_and(|n| registry.is_hidden(n))),
            None => self.groups().first() == Some(group),
        }
    }

    // ===== Meta mutation =====

    /// Cycle one axis's combine mode to the next in the fixed order.
    /// Returns the new mode.
    pub fn cycle_combine(&mut self, axis: Axis) -> CombineMode {
        let next = match axis {
            Axis::Blue => {
                self.combine_blue = self.combine_blue.next();
                self.combine_blue
            }
            Axis::Red => {
                self.combine_red = self.combine_red.next();
                self.combine_red
            }
        };
        self.dirty = true;
        self.subscribers.emit(&ChangeEvent::Meta {
            field: match axis {
                Axis::Blue => MetaField::CombineBlue,
                Axis::Red => MetaField::CombineRed,
            },
        });
        next
    }

    /// Set one axis's combine mode, notifying on change.
    pub(crate) fn set_combine_notify(&mut self, axis: Axis, mode: CombineMode) {
        let (slot, field) = match axis {
            Axis::Blue => (&mut self.combine_blue, MetaField::CombineBlue),
            Axis::Red => (&mut self.combine_red, MetaField::CombineRed),
        };
        if *slot != mode {
            *slot = mode;
            self.dirty = true;
            self.subscribers.emit(&ChangeEvent::Meta { field });
        }
    }

    /// Collapse or expand the facet's controls.
    pub fn set_hidden(&mut self, hidden: bool) {
        if self.hidden != hidden {
            self.hidden = hidden;
            self.dirty = true;
            self.subscribers.emit(&ChangeEvent::Meta {
                field: MetaField::Hidden,
            });
        }
    }

    // ===== Restore bookkeeping =====

    /// Park an externally restored mark for an identity not yet added.
    pub(crate) fn park_restored(&mut self, raw_identity: &str, mark: Mark) {
        self.parked_restores
            .insert(raw_identity.to_lowercase(), mark);
    }

    /// Record that user state was loaded; `cleared` indicates it carried no
    /// active marks.
    pub(crate) fn set_user_loaded(&mut self, cleared: bool) {
        self.user_cleared = cleared;
    }

    /// Whether a fully cleared user state has been loaded.
    pub fn user_cleared(&self) -> bool {
        self.user_cleared
    }

    // ===== Matching =====

    /// Snapshot the matching-relevant state.
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot::new(self.store.to_map(), self.combine_blue, self.combine_red)
    }

    /// Item metadata the matcher needs alongside a snapshot.
    pub fn match_context(&self) -> MatchContext {
        MatchContext {
            exclusion_exempt: self
                .items
                .iter()
                .filter(|i| i.ignore_in_exclusion())
                .map(|i| i.key().clone())
                .collect(),
            umbrella_items: self.umbrella_items.clone(),
            umbrella_excludes: self.umbrella_excludes.clone(),
        }
    }

    /// Decide visibility for an entry's associated values against live
    /// state.
    pub fn to_display(&self, values: &[ItemKey]) -> bool {
        matching::to_display(&self.match_context(), &self.snapshot(), values)
    }

    /// Decide visibility against an explicit (possibly hypothetical)
    /// snapshot.
    pub fn to_display_with(&self, snapshot: &FilterSnapshot, values: &[ItemKey]) -> bool {
        matching::to_display(&self.match_context(), snapshot, values)
    }

    // ===== Subscriptions =====

    /// Register a listener for one `(category, key)` address.
    pub fn subscribe(
        &mut self,
        key: ChangeKey,
        listener: impl FnMut(&ChangeEvent) + 'static,
    ) -> ListenerId {
        self.subscribers.subscribe(key, listener)
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ===== Summary tag =====

    /// Short authoring shorthand for the facet's non-default marks, e.g.
    /// `source=PHB;!XGE`. `None` when every mark equals its default.
    ///
    /// Not a round-trip transport format; see the token encoding for that.
    pub fn summary_tag(&self) -> Option<String> {
        let defaults = self.default_state();
        let differs = self
            .items
            .iter()
            .any(|i| self.store.mark(i.key()) != defaults.get(i.key()).copied().unwrap_or_default());
        if !differs {
            return None;
        }
        let mut parts = Vec::new();
        for item in &self.items {
            match self.store.mark(item.key()) {
                Mark::Required => parts.push(item.key().as_str().to_string()),
                Mark::Excluded => parts.push(format!("!{}", item.key())),
                Mark::Ignored => {}
            }
        }
        Some(format!(
            "{}={}",
            self.name.as_str().to_lowercase(),
            parts.join(";")
        ))
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
