//! End-to-end filtering scenarios exercised through the public API.

use crate::model::{CombineMode, FacetName, FilterItem, ItemKey, Mark};
use crate::state::Filter;

fn key(s: &str) -> ItemKey {
    ItemKey::new(s).expect("valid key")
}

fn keys(names: &[&str]) -> Vec<ItemKey> {
    names.iter().map(|n| key(n)).collect()
}

/// A "Source" facet with the three core items, no defaults.
fn source_filter(blue: CombineMode, red: CombineMode) -> Filter {
    let mut f = Filter::new(FacetName::new("Source").expect("facet")).with_combine(blue, red);
    for name in ["PHB", "DMG", "XGE"] {
        f.add_item(FilterItem::new(key(name))).expect("add");
    }
    f
}

#[test]
fn required_mark_under_or_needs_one_match() {
    let mut f = source_filter(CombineMode::Or, CombineMode::Or);
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    assert!(!f.to_display(&keys(&["DMG"])));
    assert!(f.to_display(&keys(&["PHB", "DMG"])));
}

#[test]
fn required_marks_under_and_need_full_cover() {
    let mut f = source_filter(CombineMode::And, CombineMode::Or);
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    f.set_mark(&key("DMG"), Mark::Required).expect("set");
    assert!(!f.to_display(&keys(&["PHB"])));
    assert!(f.to_display(&keys(&["PHB", "DMG"])));
}

#[test]
fn excluded_mark_suppresses_regardless_of_blue() {
    let mut f = source_filter(CombineMode::Or, CombineMode::Or);
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    f.set_mark(&key("XGE"), Mark::Excluded).expect("set");
    // Blue passes via PHB; red still wins.
    assert!(!f.to_display(&keys(&["PHB", "XGE"])));
}

#[test]
fn ignored_umbrella_item_satisfies_required_condition() {
    let mut f = Filter::new(FacetName::new("Source").expect("facet"))
        .with_umbrella([key("All")], []);
    for name in ["All", "PHB", "DMG"] {
        f.add_item(FilterItem::new(key(name))).expect("add");
    }
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    assert!(f.to_display(&keys(&["All"])));
    // A non-umbrella entry still has to match the required mark.
    assert!(!f.to_display(&keys(&["DMG"])));
}

#[test]
fn all_default_marks_encode_to_nothing() {
    let f = source_filter(CombineMode::Or, CombineMode::Or);
    assert_eq!(f.encode(), None);
}

#[test]
fn full_session_flow_mark_share_restore() {
    // Mark up a facet, share its tokens, restore into a fresh session, and
    // verify both sessions agree on every entry.
    let mut original = source_filter(CombineMode::Or, CombineMode::Or);
    original.set_mark(&key("PHB"), Mark::Required).expect("set");
    original.set_mark(&key("XGE"), Mark::Excluded).expect("set");

    let tokens = original.encode().expect("tokens");
    insta::assert_debug_snapshot!(tokens.state, @r###"
    [
        "PHB=1",
        "DMG=0",
        "XGE=2",
    ]
    "###);

    let mut restored = source_filter(CombineMode::Or, CombineMode::Or);
    let next = restored.decode(Some(&tokens));
    restored.commit(next);

    for entry in [
        keys(&["PHB"]),
        keys(&["DMG"]),
        keys(&["PHB", "XGE"]),
        keys(&[]),
    ] {
        assert_eq!(restored.to_display(&entry), original.to_display(&entry));
    }
}

#[test]
fn summary_tag_shorthand_snapshot() {
    let mut f = source_filter(CombineMode::Or, CombineMode::Or);
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    f.set_mark(&key("XGE"), Mark::Excluded).expect("set");
    insta::assert_snapshot!(f.summary_tag().expect("diverged"), @"source=PHB;!XGE");
}

#[test]
fn clear_then_reset_then_clear_again() {
    let mut f = Filter::new(FacetName::new("Source").expect("facet"))
        .with_select_default(|i| i.key().as_str() == "PHB");
    f.add_item(FilterItem::new(key("PHB"))).expect("add");
    f.add_item(FilterItem::new(key("DMG"))).expect("add");
    assert_eq!(f.mark(&key("PHB")), Mark::Required);

    f.set_all(Mark::Ignored);
    assert!(!f.totals().is_active());

    f.reset_to_default();
    assert_eq!(f.mark(&key("PHB")), Mark::Required);
    assert_eq!(f.mark(&key("DMG")), Mark::Ignored);
}
