//! The visibility decision: blue/red combination over an entry's values.
//!
//! Pure functions of a [`FilterSnapshot`] plus an entry's associated value
//! set. The blue (required) axis decides inclusion, the red (excluded) axis
//! decides suppression, and red wins ties: visibility is
//! `blue_result && !red_result`. The two axes are evaluated independently
//! under their own combine modes.

use crate::model::{CombineMode, ItemKey, Mark};
use crate::state::FilterSnapshot;
use std::collections::BTreeSet;

// ===== MatchContext =====

/// Per-filter item metadata the matcher needs beyond the snapshot.
///
/// Marks come from the snapshot; everything here is structural and does not
/// change with user state: which items are exempt from red evaluation and
/// the umbrella configuration.
#[derive(Debug, Clone, Default)]
pub struct MatchContext {
    /// Items whose excluded mark is ignored by red evaluation.
    pub exclusion_exempt: BTreeSet<ItemKey>,
    /// Umbrella items: values whose presence can short-circuit the blue
    /// evaluation to "pass" (see [`umbrella_active`]).
    pub umbrella_items: BTreeSet<ItemKey>,
    /// Items whose non-ignored mark vetoes the umbrella rule.
    pub umbrella_excludes: BTreeSet<ItemKey>,
}

// ===== Umbrella rule =====

/// Whether the umbrella rule applies for this entry.
///
/// Active iff all three hold:
/// (a) at least one umbrella item is among the entry's values,
/// (b) no umbrella-exclude item currently has a non-ignored mark, and
/// (c) at least one umbrella item is currently ignored or required.
///
/// When active, umbrella membership counts as satisfying the required
/// condition for `or`/`xor` blue evaluation. The umbrella rule does not
/// participate in `and` blue evaluation.
pub fn umbrella_active(
    ctx: &MatchContext,
    snapshot: &FilterSnapshot,
    values: &BTreeSet<&ItemKey>,
) -> bool {
    if ctx.umbrella_items.is_empty() {
        return false;
    }
    let touches_umbrella = values.iter().any(|v| ctx.umbrella_items.contains(*v));
    if !touches_umbrella {
        return false;
    }
    let vetoed = ctx
        .umbrella_excludes
        .iter()
        .any(|k| snapshot.mark(k) != Mark::Ignored);
    if vetoed {
        return false;
    }
    ctx.umbrella_items
        .iter()
        .any(|k| matches!(snapshot.mark(k), Mark::Ignored | Mark::Required))
}

// ===== to_display =====

/// Decide visibility for one entry's associated value set.
///
/// Pure: calling twice with identical inputs yields identical output.
/// Duplicate values are de-duplicated before counting so an entry tagged
/// `[PHB, PHB]` behaves like `[PHB]`.
pub fn to_display(ctx: &MatchContext, snapshot: &FilterSnapshot, values: &[ItemKey]) -> bool {
    let values: BTreeSet<&ItemKey> = values.iter().collect();
    let totals = snapshot.totals();
    let umbrella = umbrella_active(ctx, snapshot, &values);

    // Blue: does the entry satisfy the required marks?
    let required_hits = values
        .iter()
        .filter(|v| snapshot.mark(v) == Mark::Required)
        .count();
    let blue_hits = values
        .iter()
        .filter(|v| {
            snapshot.mark(v) == Mark::Required
                || (umbrella
                    && ctx.umbrella_items.contains(**v)
                    && snapshot.mark(v) != Mark::Excluded)
        })
        .count();
    let blue = match snapshot.combine_blue() {
        CombineMode::Or => totals.yes == 0 || blue_hits > 0,
        CombineMode::Xor => totals.yes == 0 || blue_hits == 1,
        // Every required mark in the facet must be matched by an
        // association; umbrella does not fold in here.
        CombineMode::And => totals.yes == 0 || required_hits == totals.yes,
    };

    // Red: do the excluded marks suppress the entry? Items flagged
    // ignore-in-exclusion never count.
    let excluded_hits = values
        .iter()
        .filter(|v| !ctx.exclusion_exempt.contains(**v))
        .filter(|v| snapshot.mark(v) == Mark::Excluded)
        .count();
    let red = match snapshot.combine_red() {
        CombineMode::Or => excluded_hits > 0,
        CombineMode::Xor => excluded_hits == 1,
        CombineMode::And => totals.no != 0 && excluded_hits == totals.no,
    };

    blue && !red
}

// ===== Tests =====
