//! trifacet - Entry Point

use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use trifacet::catalog::CatalogEntry;
use trifacet::model::Mark;
use trifacet::state::Filter;

/// trifacet - tri-state faceted filtering over a JSONL catalog
#[derive(Parser, Debug)]
#[command(name = "trifacet")]
#[command(version)]
#[command(about = "Filter a JSONL catalog through tri-state facet marks")]
pub struct Args {
    /// Path to JSONL catalog file
    pub catalog: PathBuf,

    /// Mark override, repeatable: "Facet:Item=code" with code 0/1/2
    #[arg(short, long = "mark")]
    pub marks: Vec<String>,

    /// Print each facet's summary tag before the results
    #[arg(long)]
    pub summary: bool,

    /// Path to log file (overrides config)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// One parsed `Facet:Item=code` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOverride {
    /// Raw facet name, matched case-insensitively against configured facets.
    pub facet: String,
    /// Raw item identity, matched case-insensitively within the facet.
    pub item: String,
    /// Mark to apply.
    pub mark: Mark,
}

/// Parse a `Facet:Item=code` override string.
pub fn parse_mark_override(raw: &str) -> Result<MarkOverride, String> {
    let (facet, rest) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid mark override '{raw}': expected Facet:Item=code"))?;
    let (item, code) = rest
        .split_once('=')
        .ok_or_else(|| format!("invalid mark override '{raw}': expected Facet:Item=code"))?;
    let mark = code
        .parse::<u8>()
        .ok()
        .and_then(Mark::from_code)
        .ok_or_else(|| format!("invalid mark code '{code}' in '{raw}': expected 0, 1 or 2"))?;
    if facet.is_empty() || item.is_empty() {
        return Err(format!("invalid mark override '{raw}': empty facet or item"));
    }
    Ok(MarkOverride {
        facet: facet.to_string(),
        item: item.to_string(),
        mark,
    })
}

/// Whether an entry displays under every configured facet.
///
/// Tags naming facets not configured are ignored (a facet the panel has
/// never seen cannot suppress anything); a configured facet absent from the
/// entry's tags is evaluated against an empty value set.
pub fn entry_visible(filters: &[Filter], entry: &CatalogEntry) -> bool {
    filters.iter().all(|filter| {
        let values: Vec<_> = entry
            .tags
            .iter()
            .find(|(facet, _)| filter.name().eq_ignore_case(facet))
            .map(|(_, raw_values)| {
                raw_values
                    .iter()
                    .filter_map(|raw| filter.resolve_item_ignore_case(raw))
                    .map(|item| item.key().clone())
                    .collect()
            })
            .unwrap_or_default();
        filter.to_display(&values)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with precedence:
    // Defaults → Config File (explicit path → env var → default path)
    let config = trifacet::config::load_config_with_precedence(args.config.clone())?
        .unwrap_or_default();

    let log_path = args
        .log_file
        .clone()
        .or_else(|| config.log_file_path.clone())
        .unwrap_or_else(trifacet::config::default_log_path);
    trifacet::logging::init(&log_path)?;

    let mut filters = trifacet::config::build_filters(&config)?;
    info!(facets = filters.len(), "Configuration loaded and resolved");

    for raw in &args.marks {
        let over = parse_mark_override(raw).map_err(std::io::Error::other)?;
        let Some(filter) = filters
            .iter_mut()
            .find(|f| f.name().eq_ignore_case(&over.facet))
        else {
            warn!(facet = %over.facet, "ignoring mark override for unknown facet");
            continue;
        };
        match filter.resolve_item_ignore_case(&over.item).map(|i| i.key().clone()) {
            Some(key) => {
                filter.set_mark(&key, over.mark)?;
            }
            None => {
                warn!(facet = %over.facet, item = %over.item, "ignoring mark override for unknown item");
            }
        }
    }

    if args.summary {
        for filter in &filters {
            if let Some(tag) = filter.summary_tag() {
                println!("# {tag}");
            }
        }
    }

    let entries = trifacet::catalog::load_catalog(&args.catalog)?;
    info!(entries = entries.len(), "Catalog loaded");

    for entry in entries.iter().filter(|e| entry_visible(&filters, e)) {
        println!("{}", entry.name);
    }

    Ok(())
}
