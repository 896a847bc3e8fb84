//! Core identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.
//! Identity comparisons are case-sensitive; restore/decode paths that need
//! case-insensitive matching use `eq_ignore_case` explicitly.

use std::fmt;

/// Identity of one facet value within a [`Filter`](crate::state::Filter).
///
/// Unique within a filter for the life of the filter. NEVER export the
/// raw constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(String);

impl ItemKey {
    /// Smart constructor: validates a non-empty key.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let s = raw.into();
        if s.is_empty() {
            Err(InvalidIdentifier::Empty { kind: "item key" })
        } else {
            Ok(Self(s))
        }
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ASCII case-insensitive comparison against a raw token identity.
    ///
    /// Used only by decode/restore paths; live identity stays case-sensitive.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a nest (collapsible subgroup of a facet's values).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NestName(String);

impl NestName {
    /// Smart constructor: validates a non-empty nest name.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let s = raw.into();
        if s.is_empty() {
            Err(InvalidIdentifier::Empty { kind: "nest name" })
        } else {
            Ok(Self(s))
        }
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ASCII case-insensitive comparison against a raw token identity.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for NestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a divider group. Orthogonal to nesting; buckets items for
/// divider rendering only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupName(String);

impl GroupName {
    /// Smart constructor: validates a non-empty group name.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let s = raw.into();
        if s.is_empty() {
            Err(InvalidIdentifier::Empty { kind: "group name" })
        } else {
            Ok(Self(s))
        }
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a facet (a filterable dimension, e.g. "Source").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacetName(String);

impl FacetName {
    /// Smart constructor: validates a non-empty facet name.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let s = raw.into();
        if s.is_empty() {
            Err(InvalidIdentifier::Empty { kind: "facet name" })
        } else {
            Ok(Self(s))
        }
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ASCII case-insensitive comparison against a raw name.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for FacetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== Error Types =====

/// Construction failure for any identifier newtype.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidIdentifier {
    /// The identifier string was empty.
    #[error("{kind} cannot be empty")]
    Empty {
        /// Which identifier kind was being constructed.
        kind: &'static str,
    },
}

// ===== Tests =====
