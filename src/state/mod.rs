//! Filter state: stores, registries, snapshots, matching and mutation.
//!
//! The module splits along a pure/impure line the way the rest of the crate
//! expects:
//!
//! - [`store`], [`nest`], [`snapshot`] hold plain data with no behavior
//!   beyond bookkeeping.
//! - [`matching`] is pure functions over snapshots.
//! - [`filter`] owns the data and is the only mutation surface; every
//!   mutation notifies [`notify`] listeners synchronously before returning.

pub mod filter;
pub mod matching;
pub mod nest;
pub mod notify;
pub mod snapshot;
pub mod store;

pub use filter::{DefaultPolicy, Filter, MarkPredicate};
pub use matching::{to_display, umbrella_active, MatchContext};
pub use nest::{HiddenMarks, NestInfo, NestRegistry};
pub use notify::{ChangeEvent, ChangeKey, ListenerId, MetaField, Subscribers};
pub use snapshot::FilterSnapshot;
pub use store::{MarkTotals, StateStore};
