//! State serialization: compact shareable tokens and full persistence
//! snapshots.
//!
//! Two formats with different contracts live here. [`tokens`] is the
//! diff-against-defaults encoding for links and sharing; [`persist`] is the
//! complete-state snapshot for saved sessions. Both restore leniently,
//! dropping or parking anything the current catalog no longer knows.

pub mod persist;
pub mod tokens;

pub use persist::{FacetSnapshot, MetaSnapshot, PanelSnapshot};
pub use tokens::{FacetTokens, NextState, OPTION_EXTEND};
