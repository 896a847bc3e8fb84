use super::*;
use crate::model::{FacetName, FilterItem, ItemKey};
use crate::state::Filter;

fn key(s: &str) -> ItemKey {
    ItemKey::new(s).expect("valid key")
}

fn nest(s: &str) -> NestName {
    NestName::new(s).expect("valid nest name")
}

fn facet(s: &str) -> FacetName {
    FacetName::new(s).expect("valid facet name")
}

fn item(s: &str) -> FilterItem {
    FilterItem::new(key(s))
}

fn source_filter() -> Filter {
    let mut f = Filter::new(facet("Source")).with_select_default(|i| i.key().as_str() == "PHB");
    f.add_item(item("PHB")).expect("add");
    f.add_item(item("XGE")).expect("add");
    f
}

#[test]
fn snapshot_captures_complete_state() {
    let mut f = source_filter();
    f.set_mark(&key("XGE"), Mark::Excluded).expect("set");
    let snap = f.to_snapshot();
    // Complete, not diffed: every identity appears.
    assert_eq!(snap.state.get("PHB"), Some(&Mark::Required));
    assert_eq!(snap.state.get("XGE"), Some(&Mark::Excluded));
    let meta = snap.meta.expect("meta present");
    assert_eq!(meta.combine_blue, CombineMode::Or);
    assert!(!meta.hidden);
}

#[test]
fn restore_round_trips_state_and_meta() {
    let mut f = source_filter();
    f.set_mark(&key("XGE"), Mark::Excluded).expect("set");
    f.cycle_combine(Axis::Blue);
    f.set_hidden(true);
    let snap = f.to_snapshot();

    let mut fresh = source_filter();
    fresh.restore(&snap);
    assert_eq!(fresh.snapshot(), f.snapshot());
    assert!(fresh.is_hidden());
}

#[test]
fn restore_matches_identities_case_insensitively() {
    let mut snap = FacetSnapshot::default();
    snap.state.insert("phb".into(), Mark::Excluded);
    let mut f = source_filter();
    f.restore(&snap);
    assert_eq!(f.mark(&key("PHB")), Mark::Excluded);
}

#[test]
fn restore_parks_unknown_identity_for_later_items() {
    let mut snap = FacetSnapshot::default();
    snap.state.insert("TCE".into(), Mark::Required);
    let mut f = source_filter();
    f.restore(&snap);
    // Not in the item set yet: nothing visible changes.
    assert!(!f.store().contains(&key("TCE")));
    // The item arrives later and picks up the saved mark.
    f.add_item(item("TCE")).expect("add");
    assert_eq!(f.mark(&key("TCE")), Mark::Required);
}

#[test]
fn restore_drops_unknown_nests() {
    let mut f = Filter::new(facet("Source")).with_nesting();
    f.add_nest(nest("Core"), false).expect("add nest");
    let mut snap = FacetSnapshot::default();
    snap.nests_hidden.insert("Core".into(), true);
    snap.nests_hidden.insert("Removed".into(), true);
    f.restore(&snap);
    let nests = f.nests().expect("nesting");
    assert!(nests.is_hidden(&nest("Core")));
    assert_eq!(nests.iter().count(), 1);
}

#[test]
fn restore_of_all_ignored_marks_flags_user_cleared() {
    let mut snap = FacetSnapshot::default();
    snap.state.insert("PHB".into(), Mark::Ignored);
    snap.state.insert("XGE".into(), Mark::Ignored);
    let mut f = source_filter();
    f.restore(&snap);
    assert!(f.user_cleared());
    f.add_item(item("TCE")).expect("add");
    assert_eq!(f.mark(&key("TCE")), Mark::Ignored);
}

#[test]
fn restore_of_active_marks_clears_the_flag() {
    let mut snap = FacetSnapshot::default();
    snap.state.insert("PHB".into(), Mark::Required);
    let mut f = source_filter();
    f.restore(&snap);
    assert!(!f.user_cleared());
}

#[test]
fn restore_without_meta_keeps_live_modes() {
    // Older saves predate the meta block.
    let mut f = source_filter();
    f.cycle_combine(Axis::Red);
    let snap = FacetSnapshot::default();
    f.restore(&snap);
    assert_eq!(f.combine_red(), CombineMode::And);
}

#[test]
fn panel_snapshot_serializes_as_json_map() {
    let mut f = source_filter();
    f.set_mark(&key("XGE"), Mark::Excluded).expect("set");
    let mut panel = PanelSnapshot::new();
    panel.insert(f.name().as_str().to_string(), f.to_snapshot());
    let json = serde_json::to_string(&panel).expect("serialize");
    let back: PanelSnapshot = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, panel);
}
