//! trifacet
//!
//! Tri-state faceted filtering engine: per-value ignored/required/excluded
//! marks, independent boolean combination on the required and excluded axes,
//! nested collapsible grouping, and compact diffable state serialization.
//!
//! The crate follows a Pure Core / Impure Shell split: [`state::matching`]
//! and [`state::snapshot`] are pure, [`state::Filter`] is the single
//! mutation surface, and I/O (config, catalog, logging) lives at the edges.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod model;
pub mod serial;
pub mod state;

#[cfg(test)]
mod tests;
