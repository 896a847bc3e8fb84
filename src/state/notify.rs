//! Typed publish/subscribe registry for state-change notifications.
//!
//! Listeners subscribe to an enumerated `(category, key)` address and are
//! invoked synchronously, in registration order, before the mutating call
//! returns. There is no dynamic dispatch on string keys: the address space
//! is the closed [`ChangeKey`] sum type.

use crate::model::{ItemKey, Mark, NestName};
use std::collections::BTreeMap;
use std::fmt;

// ===== ChangeKey =====

/// Subscription address: an enumerated category plus identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeKey {
    /// A per-item mark changed. Keyed by item identity.
    State(ItemKey),
    /// A nest's hidden flag changed. Keyed by nest name.
    NestHidden(NestName),
    /// A metadata field changed.
    Meta(MetaField),
}

/// Filter metadata fields that emit change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MetaField {
    /// The required-axis combine mode.
    CombineBlue,
    /// The excluded-axis combine mode.
    CombineRed,
    /// The facet-level hidden flag (collapses the facet's controls).
    Hidden,
}

// ===== ChangeEvent =====

/// Payload delivered to listeners when a subscribed address fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// An item's mark is now `mark`.
    State {
        /// The item whose mark changed.
        key: ItemKey,
        /// The new mark.
        mark: Mark,
    },
    /// A nest's hidden flag is now `hidden`.
    NestHidden {
        /// The nest whose visibility changed.
        nest: NestName,
        /// The new hidden flag.
        hidden: bool,
    },
    /// A metadata field changed; listeners re-read the filter.
    Meta {
        /// Which field changed.
        field: MetaField,
    },
}

impl ChangeEvent {
    /// The subscription address this event fires.
    pub fn key(&self) -> ChangeKey {
        match self {
            ChangeEvent::State { key, .. } => ChangeKey::State(key.clone()),
            ChangeEvent::NestHidden { nest, .. } => ChangeKey::NestHidden(nest.clone()),
            ChangeEvent::Meta { field } => ChangeKey::Meta(*field),
        }
    }
}

// ===== Subscribers =====

/// Handle identifying one registered listener, for unsubscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ChangeEvent)>;

/// Ordered listener registry.
///
/// Listeners for one address run in registration order. Emission is
/// synchronous: `emit` returns only after every matching listener has run,
/// so by the time a mutation call returns, every dependent recomputation
/// has already happened.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    listeners: BTreeMap<ChangeKey, Vec<(ListenerId, Listener)>>,
}

impl Subscribers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one `(category, key)` address.
    pub fn subscribe(
        &mut self,
        key: ChangeKey,
        listener: impl FnMut(&ChangeEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(key)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                drop(list.remove(pos));
                return true;
            }
        }
        false
    }

    /// Invoke every listener subscribed to the event's address, in
    /// registration order.
    pub fn emit(&mut self, event: &ChangeEvent) {
        if let Some(list) = self.listeners.get_mut(&event.key()) {
            for (_, listener) in list.iter_mut() {
                listener(event);
            }
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(&ChangeKey, usize)> =
            self.listeners.iter().map(|(k, v)| (k, v.len())).collect();
        f.debug_struct("Subscribers")
            .field("next_id", &self.next_id)
            .field("listeners", &counts)
            .finish()
    }
}

// ===== Tests =====
