//! Internal test modules - whitebox tests with crate access
//!
//! Tests here exercise the engine across module boundaries: end-to-end
//! filtering scenarios and property-based invariant checks.

mod scenarios;
