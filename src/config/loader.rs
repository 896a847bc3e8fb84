//! Facet configuration loading with precedence handling.

use crate::model::{CombineMode, FacetName, FilterItem, GroupName, ItemKey, NestName};
use crate::state::Filter;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A facet definition is structurally invalid.
    #[error("Invalid facet definition '{facet}': {reason}")]
    InvalidFacet {
        /// Facet name from the definition, or the raw text if the name
        /// itself was invalid.
        facet: String,
        /// What was wrong.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// Corresponds to `~/.config/trifacet/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Facet definitions, in panel order.
    #[serde(default)]
    pub facet: Vec<FacetDef>,
}

/// One facet definition from TOML.
///
/// ```toml
/// [[facet]]
/// name = "Source"
/// combine_blue = "or"
/// umbrella = ["All"]
/// default_required = ["PHB"]
///
/// [[facet.nest]]
/// name = "Core"
///
/// [[facet.item]]
/// value = "PHB"
/// nest = "Core"
/// group = "Official"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FacetDef {
    /// Facet name, unique within the panel.
    pub name: String,

    /// Required-axis combine mode. Defaults to `or`.
    #[serde(default)]
    pub combine_blue: CombineMode,

    /// Excluded-axis combine mode. Defaults to `or`.
    #[serde(default)]
    pub combine_red: CombineMode,

    /// Whether nesting is enabled. Implied by a non-empty `nest` list.
    #[serde(default)]
    pub nesting: bool,

    /// Umbrella item identities.
    #[serde(default)]
    pub umbrella: Vec<String>,

    /// Identities whose non-ignored mark vetoes the umbrella rule.
    #[serde(default)]
    pub umbrella_excludes: Vec<String>,

    /// Identities defaulting to required.
    #[serde(default)]
    pub default_required: Vec<String>,

    /// Identities defaulting to excluded (wins over `default_required`).
    #[serde(default)]
    pub default_excluded: Vec<String>,

    /// Nest definitions. Must precede any item referencing them.
    #[serde(default)]
    pub nest: Vec<NestDef>,

    /// Item definitions, in display order.
    #[serde(default)]
    pub item: Vec<ItemDef>,
}

/// One nest definition.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NestDef {
    /// Nest name, unique within the facet.
    pub name: String,

    /// Whether the nest starts collapsed.
    #[serde(default)]
    pub hidden: bool,
}

/// One item definition.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ItemDef {
    /// Item identity.
    pub value: String,

    /// Nest this item belongs to, if any.
    #[serde(default)]
    pub nest: Option<String>,

    /// Divider group this item belongs to, if any.
    #[serde(default)]
    pub group: Option<String>,

    /// Whether the item's excluded mark is ignored by red evaluation.
    #[serde(default)]
    pub ignore_in_exclusion: bool,
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/trifacet/trifacet.log` on Unix-like systems, or
/// the platform equivalent elsewhere. Falls back to the current directory
/// when no state directory can be determined.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("trifacet").join("trifacet.log")
    } else {
        PathBuf::from("trifacet.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist (not an error - use
/// defaults). Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/trifacet/config.toml` on Unix, the platform
/// equivalent elsewhere, or `None` if no config directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("trifacet").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (like CLI `--config`)
/// 2. `TRIFACET_CONFIG` environment variable
/// 3. Default path `~/.config/trifacet/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("TRIFACET_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Build a filter from one facet definition.
///
/// Nests are registered before items, so definition order inside the TOML
/// does not matter. Every structural problem (empty names, an item naming an
/// undefined nest) maps to [`ConfigError::InvalidFacet`].
pub fn build_filter(def: &FacetDef) -> Result<Filter, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidFacet {
        facet: def.name.clone(),
        reason,
    };

    let name = FacetName::new(def.name.clone()).map_err(|e| invalid(e.to_string()))?;
    let umbrella = parse_keys(&def.umbrella).map_err(invalid)?;
    let umbrella_excludes = parse_keys(&def.umbrella_excludes).map_err(invalid)?;
    let required: BTreeSet<String> = def.default_required.iter().cloned().collect();
    let excluded: BTreeSet<String> = def.default_excluded.iter().cloned().collect();

    let mut filter = Filter::new(name)
        .with_combine(def.combine_blue, def.combine_red)
        .with_umbrella(umbrella, umbrella_excludes);
    if !required.is_empty() {
        filter = filter.with_select_default(move |i| required.contains(i.key().as_str()));
    }
    if !excluded.is_empty() {
        filter = filter.with_deselect_default(move |i| excluded.contains(i.key().as_str()));
    }
    if def.nesting || !def.nest.is_empty() {
        filter = filter.with_nesting();
    }

    for nest_def in &def.nest {
        let nest = NestName::new(nest_def.name.clone()).map_err(|e| invalid(e.to_string()))?;
        filter
            .add_nest(nest, nest_def.hidden)
            .map_err(|e| invalid(e.to_string()))?;
    }

    for item_def in &def.item {
        let key = ItemKey::new(item_def.value.clone()).map_err(|e| invalid(e.to_string()))?;
        let mut item = FilterItem::new(key).with_ignore_in_exclusion(item_def.ignore_in_exclusion);
        if let Some(raw) = &item_def.nest {
            item = item.with_nest(NestName::new(raw.clone()).map_err(|e| invalid(e.to_string()))?);
        }
        if let Some(raw) = &item_def.group {
            item = item.with_group(GroupName::new(raw.clone()).map_err(|e| invalid(e.to_string()))?);
        }
        filter.add_item(item).map_err(|e| invalid(e.to_string()))?;
    }

    filter.take_dirty();
    Ok(filter)
}

/// Build the whole panel's filters, in definition order.
pub fn build_filters(config: &ConfigFile) -> Result<Vec<Filter>, ConfigError> {
    config.facet.iter().map(build_filter).collect()
}

fn parse_keys(raw: &[String]) -> Result<Vec<ItemKey>, String> {
    raw.iter()
        .map(|s| ItemKey::new(s.clone()).map_err(|e| e.to_string()))
        .collect()
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
