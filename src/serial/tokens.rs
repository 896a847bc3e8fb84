//! Compact token encoding for sharing and linking.
//!
//! A facet encodes to a flat token list: `key=code` per item, `nest=0|1` per
//! diverged nest, `combineblue=and`-style meta tokens, plus the `extend`
//! option marker. A facet whose state is entirely at its defaults encodes to
//! nothing at all, so links stay minimal and diff cleanly.
//!
//! Decoding is two-phase: [`Filter::decode`] produces a [`NextState`]
//! candidate without touching live state, [`Filter::preview`] evaluates it
//! hypothetically, and [`Filter::commit`] applies it. Unknown identities and
//! nest names in incoming tokens are dropped with a warning, never an error:
//! a shared link must survive catalog drift.

use crate::model::{CombineMode, ItemKey, Mark, NestName};
use crate::state::{Filter, FilterSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

/// Option token requesting that decode seed from predicate defaults rather
/// than a blank all-ignored state.
pub const OPTION_EXTEND: &str = "extend";

const META_COMBINE_BLUE: &str = "combineblue";
const META_COMBINE_RED: &str = "combinered";
const META_HIDDEN: &str = "hidden";

// ===== FacetTokens =====

/// One facet's encoded token lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetTokens {
    /// `key=code` tokens, one per item. All-or-nothing: when any mark
    /// diverges from its default, every item is listed.
    pub state: Vec<String>,
    /// `nest=0|1` tokens for nests whose hidden flag diverges from default.
    #[serde(default)]
    pub nests_hidden: Vec<String>,
    /// Meta tokens for diverged combine modes.
    #[serde(default)]
    pub meta: Vec<String>,
    /// Decode option markers, currently just [`OPTION_EXTEND`].
    #[serde(default)]
    pub options: Vec<String>,
}

// ===== NextState =====

/// A decoded candidate state, not yet applied.
///
/// Produced by [`Filter::decode`]; carries a full mark map plus whatever
/// nest and meta overrides the tokens named. Evaluate it with
/// [`Filter::preview`], apply it with [`Filter::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextState {
    /// Candidate mark for every item identity.
    pub state: BTreeMap<ItemKey, Mark>,
    /// Candidate hidden flag for every registered nest.
    pub nests_hidden: BTreeMap<NestName, bool>,
    /// Required-axis combine mode, when the candidate carries one.
    pub combine_blue: Option<CombineMode>,
    /// Excluded-axis combine mode, when the candidate carries one.
    pub combine_red: Option<CombineMode>,
    /// Facet collapse flag, when the candidate carries one.
    pub hidden: Option<bool>,
}

impl Filter {
    // ===== Encode =====

    /// Encode the facet's state as tokens, or `None` when everything sits
    /// at its defaults.
    ///
    /// Defaults are the *predicate* defaults, deliberately ignoring the
    /// loaded-cleared flag: a user who cleared every mark gets a link that
    /// says so explicitly, and the clear round-trips.
    pub fn encode(&self) -> Option<FacetTokens> {
        let defaults = self.default_state();
        let marks_diverge = self
            .items()
            .iter()
            .any(|i| self.mark(i.key()) != defaults.get(i.key()).copied().unwrap_or_default());

        let state = if marks_diverge {
            self.items()
                .iter()
                .map(|i| format!("{}={}", i.key(), self.mark(i.key()).code()))
                .collect()
        } else {
            Vec::new()
        };

        let nests_hidden: Vec<String> = match self.nests() {
            Some(registry) => registry
                .iter()
                .filter(|(_, info)| info.hidden != info.hidden_by_default)
                .map(|(name, info)| format!("{}={}", name, u8::from(info.hidden)))
                .collect(),
            None => Vec::new(),
        };

        let mut meta = Vec::new();
        if self.combine_blue() != self.default_combine_blue() {
            meta.push(format!("{}={}", META_COMBINE_BLUE, self.combine_blue()));
        }
        if self.combine_red() != self.default_combine_red() {
            meta.push(format!("{}={}", META_COMBINE_RED, self.combine_red()));
        }
        // Facets start expanded, so only a collapse diverges.
        if self.is_hidden() {
            meta.push(format!("{META_HIDDEN}=1"));
        }

        if state.is_empty() && nests_hidden.is_empty() && meta.is_empty() {
            return None;
        }
        Some(FacetTokens {
            state,
            nests_hidden,
            meta,
            options: vec![OPTION_EXTEND.to_string()],
        })
    }

    // ===== Decode =====

    /// Decode tokens into a candidate state without touching live state.
    ///
    /// `None` (the facet absent from the link entirely) decodes to the full
    /// default state: predicate-default marks, per-nest default visibility
    /// and the configured combine modes. With tokens, every seed follows the
    /// `extend` option - marks seed from the predicate defaults (or
    /// all-ignored without `extend`), nest flags from their registered
    /// defaults (or all-visible), combine modes from the configured
    /// defaults - and then each token overrides its target, matched ASCII
    /// case-insensitively. Tokens naming unknown identities or nests are
    /// dropped with a warning.
    ///
    /// A live flag diverged from its default therefore never survives a
    /// link that omits it: committing the candidate resets it.
    pub fn decode(&self, tokens: Option<&FacetTokens>) -> NextState {
        let Some(tokens) = tokens else {
            return NextState {
                state: self.default_state(),
                nests_hidden: self.default_nests_hidden(),
                combine_blue: Some(self.default_combine_blue()),
                combine_red: Some(self.default_combine_red()),
                hidden: Some(false),
            };
        };

        let extend = tokens.options.iter().any(|o| o == OPTION_EXTEND);
        let mut state: BTreeMap<ItemKey, Mark> = if extend {
            self.default_state()
        } else {
            self.items()
                .iter()
                .map(|i| (i.key().clone(), Mark::Ignored))
                .collect()
        };

        for token in &tokens.state {
            let Some((raw_key, raw_code)) = token.split_once('=') else {
                warn!(facet = %self.name(), token, "dropping malformed state token");
                continue;
            };
            let mark = match raw_code.parse::<u8>().ok().and_then(Mark::from_code) {
                Some(mark) => mark,
                None => {
                    warn!(facet = %self.name(), token, "dropping state token with invalid mark code");
                    continue;
                }
            };
            match self.resolve_item_ignore_case(raw_key) {
                Some(item) => {
                    state.insert(item.key().clone(), mark);
                }
                None => {
                    warn!(facet = %self.name(), identity = raw_key, "dropping token for unknown identity");
                }
            }
        }

        let mut nests_hidden = if extend {
            self.default_nests_hidden()
        } else {
            match self.nests() {
                Some(registry) => registry.iter().map(|(n, _)| (n.clone(), false)).collect(),
                None => BTreeMap::new(),
            }
        };
        for token in &tokens.nests_hidden {
            let Some((raw_nest, raw_flag)) = token.split_once('=') else {
                warn!(facet = %self.name(), token, "dropping malformed nest token");
                continue;
            };
            let hidden = match raw_flag {
                "0" => false,
                "1" => true,
                _ => {
                    warn!(facet = %self.name(), token, "dropping nest token with invalid flag");
                    continue;
                }
            };
            match self.nests().and_then(|r| r.resolve_ignore_case(raw_nest)) {
                Some(nest) => {
                    nests_hidden.insert(nest.clone(), hidden);
                }
                None => {
                    warn!(facet = %self.name(), nest = raw_nest, "dropping token for unknown nest");
                }
            }
        }

        let mut combine_blue = Some(self.default_combine_blue());
        let mut combine_red = Some(self.default_combine_red());
        let mut hidden = Some(false);
        for token in &tokens.meta {
            let Some((field, raw_value)) = token.split_once('=') else {
                warn!(facet = %self.name(), token, "dropping malformed meta token");
                continue;
            };
            match field {
                META_COMBINE_BLUE | META_COMBINE_RED => match CombineMode::from_str(raw_value) {
                    Ok(mode) if field == META_COMBINE_BLUE => combine_blue = Some(mode),
                    Ok(mode) => combine_red = Some(mode),
                    Err(_) => {
                        warn!(facet = %self.name(), token, "dropping meta token with invalid combine mode");
                    }
                },
                META_HIDDEN => match raw_value {
                    "0" => hidden = Some(false),
                    "1" => hidden = Some(true),
                    _ => {
                        warn!(facet = %self.name(), token, "dropping meta token with invalid flag");
                    }
                },
                _ => {
                    warn!(facet = %self.name(), field, "dropping unrecognized meta token");
                }
            }
        }

        NextState {
            state,
            nests_hidden,
            combine_blue,
            combine_red,
            hidden,
        }
    }

    fn default_nests_hidden(&self) -> BTreeMap<NestName, bool> {
        match self.nests() {
            Some(registry) => registry
                .iter()
                .map(|(n, info)| (n.clone(), info.hidden_by_default))
                .collect(),
            None => BTreeMap::new(),
        }
    }

    // ===== Preview and commit =====

    /// Evaluate a candidate state as a snapshot, without applying it.
    ///
    /// Combine overrides absent from the candidate fall back to the live
    /// modes, matching what [`Filter::commit`] would leave in place.
    pub fn preview(&self, next: &NextState) -> FilterSnapshot {
        FilterSnapshot::new(
            next.state.clone(),
            next.combine_blue.unwrap_or(self.combine_blue()),
            next.combine_red.unwrap_or(self.combine_red()),
        )
    }

    /// Apply a candidate state to live state, notifying per change.
    pub fn commit(&mut self, next: NextState) {
        let cleared = !next.state.is_empty() && next.state.values().all(|m| *m == Mark::Ignored);
        for (key, mark) in next.state {
            self.set_mark_notify(key, mark);
        }
        for (nest, hidden) in &next.nests_hidden {
            self.set_nest_hidden_notify(nest, *hidden);
        }
        if let Some(mode) = next.combine_blue {
            self.set_combine_notify(crate::model::Axis::Blue, mode);
        }
        if let Some(mode) = next.combine_red {
            self.set_combine_notify(crate::model::Axis::Red, mode);
        }
        if let Some(hidden) = next.hidden {
            self.set_hidden(hidden);
        }
        self.set_user_loaded(cleared);
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "tokens_tests.rs"]
mod tests;
