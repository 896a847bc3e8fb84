//! Configuration: facet definitions and loading precedence.

pub mod loader;

pub use loader::{
    build_filter, build_filters, default_config_path, default_log_path, load_config_file,
    load_config_with_precedence, ConfigError, ConfigFile, FacetDef, ItemDef, NestDef,
};
