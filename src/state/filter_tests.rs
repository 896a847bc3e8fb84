use super::*;
use std::cell::RefCell;
use std::rc::Rc;

fn key(s: &str) -> ItemKey {
    ItemKey::new(s).expect("valid key")
}

fn nest_name(s: &str) -> NestName {
    NestName::new(s).expect("valid nest name")
}

fn group(s: &str) -> GroupName {
    GroupName::new(s).expect("valid group name")
}

fn facet(s: &str) -> FacetName {
    FacetName::new(s).expect("valid facet name")
}

fn item(s: &str) -> FilterItem {
    FilterItem::new(key(s))
}

/// A source-style filter: Core/Supplement nests, a couple of groups.
fn source_filter() -> Filter {
    let mut f = Filter::new(facet("Source")).with_nesting();
    f.add_nest(nest_name("Core"), false).expect("add nest");
    f.add_nest(nest_name("Supplement"), true).expect("add nest");
    f.add_item(item("PHB").with_nest(nest_name("Core")).with_group(group("Official")))
        .expect("add item");
    f.add_item(item("DMG").with_nest(nest_name("Core")).with_group(group("Official")))
        .expect("add item");
    f.add_item(
        item("XGE")
            .with_nest(nest_name("Supplement"))
            .with_group(group("Expansions")),
    )
    .expect("add item");
    f
}

// ===== Construction and defaults =====

#[test]
fn new_filter_is_empty_and_inactive() {
    let f = Filter::new(facet("Source"));
    assert!(f.items().is_empty());
    assert!(!f.totals().is_active());
    assert_eq!(f.combine_blue(), CombineMode::Or);
    assert_eq!(f.combine_red(), CombineMode::Or);
    assert!(f.nests().is_none());
}

#[test]
fn add_item_applies_predicate_defaults() {
    let mut f = Filter::new(facet("Source"))
        .with_select_default(|i| i.key().as_str() == "PHB")
        .with_deselect_default(|i| i.key().as_str() == "Homebrew");
    f.add_item(item("PHB")).expect("add");
    f.add_item(item("Homebrew")).expect("add");
    f.add_item(item("XGE")).expect("add");
    assert_eq!(f.mark(&key("PHB")), Mark::Required);
    assert_eq!(f.mark(&key("Homebrew")), Mark::Excluded);
    assert_eq!(f.mark(&key("XGE")), Mark::Ignored);
}

#[test]
fn deselect_predicate_wins_over_select() {
    let mut f = Filter::new(facet("Source"))
        .with_select_default(|_| true)
        .with_deselect_default(|i| i.key().as_str() == "UA");
    f.add_item(item("UA")).expect("add");
    assert_eq!(f.mark(&key("UA")), Mark::Excluded);
}

#[test]
fn add_item_duplicate_identity_is_noop() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    f.add_item(item("PHB")).expect("duplicate add is ok");
    assert_eq!(f.items().len(), 1);
    // Existing mark survives the duplicate insertion.
    assert_eq!(f.mark(&key("PHB")), Mark::Required);
}

#[test]
fn add_item_with_unknown_nest_fails_and_inserts_nothing() {
    let mut f = Filter::new(facet("Source")).with_nesting();
    let err = f
        .add_item(item("PHB").with_nest(nest_name("Ghost")))
        .expect_err("must fail");
    assert_eq!(
        err,
        FilterError::UnknownNestForItem {
            item: key("PHB"),
            nest: nest_name("Ghost"),
        }
    );
    assert!(f.items().is_empty());
    assert!(f.store().is_empty());
}

#[test]
fn add_nested_item_without_nesting_fails() {
    let mut f = Filter::new(facet("Source"));
    let err = f
        .add_item(item("PHB").with_nest(nest_name("Core")))
        .expect_err("must fail");
    assert!(matches!(err, FilterError::NestingDisabled { .. }));
}

#[test]
fn add_nest_on_flat_filter_fails() {
    let mut f = Filter::new(facet("Source"));
    let err = f.add_nest(nest_name("Core"), false).expect_err("must fail");
    assert!(matches!(err, FilterError::NestingDisabled { .. }));
}

#[test]
fn store_tracks_exactly_the_item_set() {
    let f = source_filter();
    assert_eq!(f.store().len(), f.items().len());
    for i in f.items() {
        assert!(f.store().contains(i.key()));
    }
}

#[test]
fn after_cleared_user_state_new_items_default_ignored() {
    let mut f = Filter::new(facet("Source")).with_select_default(|_| true);
    f.set_user_loaded(true);
    f.add_item(item("NewBook")).expect("add");
    assert_eq!(f.mark(&key("NewBook")), Mark::Ignored);
}

#[test]
fn parked_restore_overrides_default_case_insensitively() {
    let mut f = Filter::new(facet("Source")).with_select_default(|_| true);
    f.park_restored("phb", Mark::Excluded);
    f.add_item(item("PHB")).expect("add");
    assert_eq!(f.mark(&key("PHB")), Mark::Excluded);
}

// ===== Mark mutation =====

#[test]
fn cycle_mark_forward_steps_through_states() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    let k = key("PHB");
    assert_eq!(
        f.cycle_mark(&k, CycleDirection::Forward, false).expect("cycle"),
        Mark::Required
    );
    assert_eq!(
        f.cycle_mark(&k, CycleDirection::Forward, false).expect("cycle"),
        Mark::Excluded
    );
    assert_eq!(
        f.cycle_mark(&k, CycleDirection::Forward, false).expect("cycle"),
        Mark::Ignored
    );
}

#[test]
fn cycle_mark_reverse_steps_backwards() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    let k = key("PHB");
    assert_eq!(
        f.cycle_mark(&k, CycleDirection::Reverse, false).expect("cycle"),
        Mark::Excluded
    );
    assert_eq!(
        f.cycle_mark(&k, CycleDirection::Reverse, false).expect("cycle"),
        Mark::Required
    );
}

#[test]
fn cycle_mark_clear_first_isolates_the_target() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    f.add_item(item("DMG")).expect("add");
    f.set_mark(&key("DMG"), Mark::Required).expect("set");
    let got = f
        .cycle_mark(&key("PHB"), CycleDirection::Forward, true)
        .expect("cycle");
    assert_eq!(got, Mark::Required);
    assert_eq!(f.mark(&key("DMG")), Mark::Ignored);
}

#[test]
fn cycle_mark_unknown_item_fails() {
    let mut f = Filter::new(facet("Source"));
    let err = f
        .cycle_mark(&key("Ghost"), CycleDirection::Forward, false)
        .expect_err("must fail");
    assert_eq!(err, FilterError::UnknownItem { item: key("Ghost") });
}

#[test]
fn set_all_overwrites_every_mark() {
    let mut f = source_filter();
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    f.set_all(Mark::Excluded);
    for i in f.items() {
        assert_eq!(f.mark(i.key()), Mark::Excluded);
    }
}

#[test]
fn reset_to_default_restores_predicate_state() {
    let mut f = Filter::new(facet("Source")).with_select_default(|i| i.key().as_str() == "PHB");
    f.add_item(item("PHB")).expect("add");
    f.add_item(item("XGE")).expect("add");
    f.set_all(Mark::Excluded);
    f.reset_to_default();
    assert_eq!(f.mark(&key("PHB")), Mark::Required);
    assert_eq!(f.mark(&key("XGE")), Mark::Ignored);
}

#[test]
fn reset_to_default_is_idempotent() {
    let mut f = Filter::new(facet("Source")).with_select_default(|i| i.key().as_str() == "PHB");
    f.add_item(item("PHB")).expect("add");
    f.add_item(item("XGE")).expect("add");
    f.reset_to_default();
    let once = f.snapshot();
    f.reset_to_default();
    assert_eq!(f.snapshot(), once);
}

// ===== Dirty flag =====

#[test]
fn mutation_sets_dirty_and_take_dirty_consumes_it() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    assert!(f.is_dirty());
    assert!(f.take_dirty());
    assert!(!f.is_dirty());
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    assert!(f.is_dirty());
}

#[test]
fn no_op_mutation_leaves_dirty_clear() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    f.take_dirty();
    f.set_mark(&key("PHB"), Mark::Ignored).expect("set same");
    assert!(!f.is_dirty());
}

// ===== Nest visibility =====

#[test]
fn nest_default_visibility_applies_at_registration() {
    let f = source_filter();
    let nests = f.nests().expect("nesting enabled");
    assert!(!nests.is_hidden(&nest_name("Core")));
    assert!(nests.is_hidden(&nest_name("Supplement")));
}

#[test]
fn toggle_nest_hidden_flips_and_reports() {
    let mut f = source_filter();
    assert!(f.toggle_nest_hidden(&nest_name("Core")).expect("toggle"));
    assert!(!f.toggle_nest_hidden(&nest_name("Core")).expect("toggle"));
}

#[test]
fn toggle_unknown_nest_fails() {
    let mut f = source_filter();
    let err = f.toggle_nest_hidden(&nest_name("Ghost")).expect_err("must fail");
    assert_eq!(err, FilterError::UnknownNest { nest: nest_name("Ghost") });
}

#[test]
fn hiding_a_nest_does_not_change_matching() {
    let mut f = source_filter();
    f.set_mark(&key("XGE"), Mark::Required).expect("set");
    let before = f.to_display(&[key("XGE")]);
    // XGE sits in Supplement, which is already hidden; toggle it both ways.
    f.toggle_nest_hidden(&nest_name("Supplement")).expect("toggle");
    assert_eq!(f.to_display(&[key("XGE")]), before);
    f.toggle_nest_hidden(&nest_name("Supplement")).expect("toggle");
    assert_eq!(f.to_display(&[key("XGE")]), before);
}

#[test]
fn item_visibility_follows_its_nest() {
    let f = source_filter();
    assert!(f.is_item_visible(&key("PHB")));
    assert!(!f.is_item_visible(&key("XGE")));
}

#[test]
fn flat_items_are_always_visible() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    assert!(f.is_item_visible(&key("PHB")));
}

#[test]
fn hidden_mark_summary_counts_only_hidden_active_marks() {
    let mut f = source_filter();
    f.set_mark(&key("XGE"), Mark::Excluded).expect("set");
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    let summary = f
        .hidden_mark_summary(&nest_name("Supplement"))
        .expect("summary");
    assert_eq!(summary.required, 0);
    assert_eq!(summary.excluded, 1);
    assert_eq!(summary.total(), 1);
    // Core is visible, so its counts are zero regardless of marks.
    let core = f.hidden_mark_summary(&nest_name("Core")).expect("summary");
    assert_eq!(core.total(), 0);
}

// ===== Group dividers =====

#[test]
fn group_divider_hidden_when_all_items_in_hidden_nests() {
    let f = source_filter();
    assert!(f.is_group_divider_hidden(&group("Expansions")));
    assert!(!f.is_group_divider_hidden(&group("Official")));
}

#[test]
fn flat_filter_hides_first_group_divider_only() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB").with_group(group("Alpha"))).expect("add");
    f.add_item(item("XGE").with_group(group("Beta"))).expect("add");
    assert!(f.is_group_divider_hidden(&group("Alpha")));
    assert!(!f.is_group_divider_hidden(&group("Beta")));
}

// ===== Meta mutation =====

#[test]
fn cycle_combine_steps_through_fixed_order() {
    let mut f = Filter::new(facet("Source"));
    assert_eq!(f.cycle_combine(Axis::Blue), CombineMode::And);
    assert_eq!(f.cycle_combine(Axis::Blue), CombineMode::Xor);
    assert_eq!(f.cycle_combine(Axis::Blue), CombineMode::Or);
    // Axes are independent.
    assert_eq!(f.combine_red(), CombineMode::Or);
}

#[test]
fn with_combine_records_defaults_separately_from_live_modes() {
    let mut f = Filter::new(facet("Source")).with_combine(CombineMode::And, CombineMode::Or);
    f.cycle_combine(Axis::Blue);
    assert_eq!(f.default_combine_blue(), CombineMode::And);
    assert_ne!(f.combine_blue(), f.default_combine_blue());
}

#[test]
fn set_hidden_tracks_collapse_state() {
    let mut f = Filter::new(facet("Source"));
    f.set_hidden(true);
    assert!(f.is_hidden());
    f.set_hidden(false);
    assert!(!f.is_hidden());
}

// ===== Notifications =====

#[test]
fn state_listener_fires_synchronously_on_mark_change() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    let seen: Rc<RefCell<Vec<Mark>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    f.subscribe(ChangeKey::State(key("PHB")), move |event| {
        if let ChangeEvent::State { mark, .. } = event {
            sink.borrow_mut().push(*mark);
        }
    });
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    // Synchronous: observed before the call returned control to us.
    assert_eq!(seen.borrow().as_slice(), &[Mark::Required]);
}

#[test]
fn listener_does_not_fire_on_no_op_mutation() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    let count = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&count);
    f.subscribe(ChangeKey::State(key("PHB")), move |_| {
        *sink.borrow_mut() += 1;
    });
    f.set_mark(&key("PHB"), Mark::Ignored).expect("set same");
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn listeners_fire_in_registration_order() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let sink = Rc::clone(&order);
        f.subscribe(ChangeKey::State(key("PHB")), move |_| {
            sink.borrow_mut().push(tag);
        });
    }
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    assert_eq!(order.borrow().as_slice(), &["first", "second", "third"]);
}

#[test]
fn unsubscribed_listener_stops_firing() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    let count = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&count);
    let id = f.subscribe(ChangeKey::State(key("PHB")), move |_| {
        *sink.borrow_mut() += 1;
    });
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    assert!(f.unsubscribe(id));
    f.set_mark(&key("PHB"), Mark::Excluded).expect("set");
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn nest_and_meta_listeners_address_their_own_keys() {
    let mut f = source_filter();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    f.subscribe(ChangeKey::NestHidden(nest_name("Core")), move |event| {
        sink.borrow_mut().push(event.key());
    });
    let sink = Rc::clone(&events);
    f.subscribe(ChangeKey::Meta(MetaField::CombineBlue), move |event| {
        sink.borrow_mut().push(event.key());
    });
    f.toggle_nest_hidden(&nest_name("Core")).expect("toggle");
    f.cycle_combine(Axis::Blue);
    // Mark changes on other addresses stay silent.
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    assert_eq!(
        events.borrow().as_slice(),
        &[
            ChangeKey::NestHidden(nest_name("Core")),
            ChangeKey::Meta(MetaField::CombineBlue),
        ]
    );
}

// ===== Matching through the filter =====

#[test]
fn to_display_uses_live_marks_and_modes() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    f.add_item(item("XGE")).expect("add");
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    assert!(f.to_display(&[key("PHB")]));
    assert!(!f.to_display(&[key("XGE")]));
}

#[test]
fn to_display_with_evaluates_hypothetical_snapshot() {
    let mut f = Filter::new(facet("Source"));
    f.add_item(item("PHB")).expect("add");
    let hypothetical = FilterSnapshot::new(
        [(key("PHB"), Mark::Excluded)].into_iter().collect(),
        CombineMode::Or,
        CombineMode::Or,
    );
    // Live state passes, hypothetical suppresses; live state untouched.
    assert!(f.to_display(&[key("PHB")]));
    assert!(!f.to_display_with(&hypothetical, &[key("PHB")]));
    assert_eq!(f.mark(&key("PHB")), Mark::Ignored);
}

#[test]
fn match_context_reflects_umbrella_and_exemptions() {
    let mut f = Filter::new(facet("Source"))
        .with_umbrella([key("All")], [key("Homebrew")]);
    f.add_item(item("All")).expect("add");
    f.add_item(item("Reprinted").with_ignore_in_exclusion(true))
        .expect("add");
    let ctx = f.match_context();
    assert!(ctx.umbrella_items.contains(&key("All")));
    assert!(ctx.umbrella_excludes.contains(&key("Homebrew")));
    assert!(ctx.exclusion_exempt.contains(&key("Reprinted")));
}

// ===== Lookup =====

#[test]
fn resolve_item_ignore_case_matches_ascii_folding() {
    let f = source_filter();
    assert_eq!(
        f.resolve_item_ignore_case("phb").map(|i| i.key().clone()),
        Some(key("PHB"))
    );
    assert!(f.resolve_item_ignore_case("ghost").is_none());
}

// ===== Summary tag =====

#[test]
fn summary_tag_none_when_all_marks_at_default() {
    let f = source_filter();
    assert_eq!(f.summary_tag(), None);
}

#[test]
fn summary_tag_lists_required_plain_and_excluded_banged() {
    let mut f = source_filter();
    f.set_mark(&key("PHB"), Mark::Required).expect("set");
    f.set_mark(&key("XGE"), Mark::Excluded).expect("set");
    assert_eq!(f.summary_tag().as_deref(), Some("source=PHB;!XGE"));
}

#[test]
fn summary_tag_reflects_divergence_from_predicate_defaults() {
    let mut f = Filter::new(facet("Source")).with_select_default(|i| i.key().as_str() == "PHB");
    f.add_item(item("PHB")).expect("add");
    // Mark matches the default: nothing to report.
    assert_eq!(f.summary_tag(), None);
    f.set_mark(&key("PHB"), Mark::Ignored).expect("set");
    // Diverged, and the shorthand shows the *current* active marks (none).
    assert_eq!(f.summary_tag().as_deref(), Some("source="));
}
