//! Core domain types (pure data).

pub mod combine;
pub mod error;
pub mod identifiers;
pub mod item;
pub mod mark;

pub use combine::{Axis, CombineMode, InvalidCombineMode};
pub use error::FilterError;
pub use identifiers::{FacetName, GroupName, InvalidIdentifier, ItemKey, NestName};
pub use item::FilterItem;
pub use mark::{CycleDirection, InvalidMarkCode, Mark};
