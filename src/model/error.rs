//! Error types for the filtering engine.
//!
//! Structured error taxonomy built on `thiserror`. Two classes of failure
//! exist and are handled differently:
//!
//! - **Configuration errors** ([`FilterError`]) are programmer errors: an
//!   item referencing a nest that was never registered, nest operations on a
//!   filter built without nesting, or mutation of an identity the filter has
//!   never seen. These fail immediately at the call that introduced the
//!   inconsistency and are never retried.
//! - **Malformed restore input** (unknown identities or nest names in a
//!   decoded snapshot) is NOT an error: it is silently dropped in favor of
//!   forward compatibility, since saved state may reference values removed
//!   in a later catalog version. Those paths log at `warn` and carry on.

use crate::model::{ItemKey, NestName};
use thiserror::Error;

/// Configuration and mutation errors raised by a [`Filter`](crate::state::Filter).
///
/// Every variant is a programmer error: the operation either fully succeeds
/// or returns one of these, and there is no partial state to recover.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// An item was added with a nest reference that names no registered nest.
    ///
    /// The nest must be registered via `add_nest` before any item may
    /// reference it. The item is NOT inserted.
    #[error("item '{item}' references unknown nest '{nest}'")]
    UnknownNestForItem {
        /// The item whose nest reference failed validation.
        item: ItemKey,
        /// The nest name that was not found.
        nest: NestName,
    },

    /// A nest operation named a nest that was never registered.
    #[error("unknown nest '{nest}'")]
    UnknownNest {
        /// The nest name that was not found.
        nest: NestName,
    },

    /// A nest operation was attempted on a filter built without nesting.
    #[error("nesting is not enabled on this filter (nest '{nest}')")]
    NestingDisabled {
        /// The nest name involved in the rejected operation.
        nest: NestName,
    },

    /// A mutation named an item identity the filter does not contain.
    #[error("unknown item '{item}'")]
    UnknownItem {
        /// The identity that was not found.
        item: ItemKey,
    },
}
