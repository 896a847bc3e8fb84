//! Catalog loading: the entries a filter panel decides visibility for.
//!
//! A catalog is a JSONL file, one entry per line. Loading is lenient per
//! line: a malformed line is skipped with a warning rather than failing the
//! whole file, since catalogs are hand-edited and partially usable data
//! beats none.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

// ===== CatalogEntry =====

/// One entry in the catalog: a name plus its facet associations.
///
/// `tags` maps a facet name to the item identities the entry is associated
/// with under that facet. A facet absent from the map means the entry has no
/// associations there, which is not the same as an empty list once marks
/// exist on that facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name.
    pub name: String,
    /// Facet name to associated item identities.
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
}

// ===== Errors =====

/// Catalog loading failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be opened or read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

// ===== Loading =====

/// Load a JSONL catalog, skipping malformed lines with a warning.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<CatalogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                warn!(line = index + 1, error = %err, "skipping malformed catalog line");
            }
        }
    }
    Ok(entries)
}

// ===== Tests =====
