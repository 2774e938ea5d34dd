use std::time::Duration;

use ninja_surfing::engine::engine::{KeyOutcome, LabelEngine, SessionState};
use ninja_surfing::error::SurfError;
use ninja_surfing::label::allocator::{LabelScheme, label};
use ninja_surfing::page::geometry::{Rect, Viewport};
use ninja_surfing::page::host::{Capture, PageHost};
use ninja_surfing::page::page_model::ElementAction;
use ninja_surfing::page::simulated::SimulatedPage;
use ninja_surfing::settings::settings::{
    ActivationPolicy, AppearanceSettings, EscapePolicy, Settings,
};
use web_time::Instant;

use crate::common::utils::{
    ROW_PX, active_engine, link_column, row, settings_with, settings_with_escape,
};

mod common;

// ============================================================================
// Activation lifecycle
// ============================================================================

#[test]
fn toggle_labels_visible_links_and_arms_listeners() {
    let (mut page, ids) = link_column(3);
    let mut engine = LabelEngine::default();

    let state = engine.toggle(&mut page).unwrap();

    assert_eq!(state, SessionState::Active);
    assert_eq!(engine.overlay_count(), 3);
    assert_eq!(page.overlay_count(), 3);
    assert_eq!(engine.label_of(ids[0]), Some("a"));
    assert_eq!(engine.label_of(ids[2]), Some("c"));
    assert!(page.is_captured(Capture::Keyboard));
    assert!(page.is_captured(Capture::Scroll));
    assert!(page.is_captured(Capture::Mutations));
}

#[test]
fn second_toggle_removes_everything() {
    let (mut page, _) = link_column(3);
    let mut engine = LabelEngine::default();

    engine.toggle(&mut page).unwrap();
    let state = engine.toggle(&mut page).unwrap();

    assert_eq!(state, SessionState::Inactive);
    assert_eq!(engine.overlay_count(), 0);
    assert_eq!(page.overlay_count(), 0);
    assert!(!page.is_captured(Capture::Keyboard));
    assert!(!page.is_captured(Capture::Scroll));
}

#[test]
fn page_without_clickables_activates_with_no_overlays() {
    let mut page = SimulatedPage::new(Viewport::default());
    page.add_element("div", row(0));
    page.add_element("p", row(1));

    let mut engine = LabelEngine::default();
    let report = engine.activate(&mut page).unwrap();

    assert!(engine.is_active());
    assert_eq!(report.candidates, 0);
    assert_eq!(page.overlay_count(), 0);
}

#[test]
fn badge_sits_above_element_center() {
    let mut page = SimulatedPage::new(Viewport::default());
    page.add_element("button", Rect::new(100.0, 200.0, 80.0, 30.0));

    let _engine = active_engine(&mut page, Settings::default());

    let badge = page.badges()[0];
    assert_eq!(badge.position.top, 200.0);
    assert_eq!(badge.position.left, 140.0);
}

#[test]
fn offscreen_elements_outside_buffer_get_no_label() {
    let mut page = SimulatedPage::new(Viewport::default());
    let near = page.add_element("a", Rect::new(10.0, 1150.0, 50.0, 20.0));
    let far = page.add_element("a", Rect::new(10.0, 3000.0, 50.0, 20.0));

    let engine = active_engine(&mut page, Settings::default());

    assert_eq!(engine.label_of(near), Some("a"));
    assert_eq!(engine.label_of(far), None);
    assert_eq!(page.overlay_count(), 1);
}

#[test]
fn label_slot_follows_candidate_order_even_when_earlier_slots_are_offscreen() {
    let mut page = SimulatedPage::new(Viewport::default());
    page.add_element("a", Rect::new(10.0, 5000.0, 50.0, 20.0));
    let visible = page.add_element("a", row(0));

    let engine = active_engine(&mut page, Settings::default());

    assert_eq!(engine.label_of(visible), Some("b"));
}

// ============================================================================
// Scroll stability
// ============================================================================

#[test]
fn three_hundred_links_keep_labels_while_scrolling() {
    let (mut page, ids) = link_column(300);
    let mut engine = active_engine(&mut page, Settings::default());

    // Window is [-400, 1200]: rows 0..=30
    assert_eq!(engine.overlay_count(), 31);
    assert_eq!(engine.label_of(ids[30]), Some("4a"));

    page.scroll_to(0.0, 100.0);
    let report = engine.refresh(&mut page).unwrap();

    assert_eq!(report.kept, 31);
    assert_eq!(report.placed, 2);
    assert_eq!(report.removed, 0);
    assert_eq!(engine.label_of(ids[0]), Some("a"));
    assert_eq!(engine.label_of(ids[31]), Some(label(31, LabelScheme::Default).as_str()));

    page.scroll_to(0.0, 4000.0);
    let report = engine.refresh(&mut page).unwrap();

    // Window is [3600, 5200]: rows 90..=130
    assert_eq!(report.removed, 33);
    assert_eq!(engine.overlay_count(), 41);
    assert_eq!(engine.label_of(ids[0]), None);
    assert_eq!(engine.label_of(ids[90]), Some("4g"));
    assert_eq!(page.overlay_count(), 41);
}

#[test]
fn kept_badges_follow_their_element() {
    let (mut page, ids) = link_column(2);
    let mut engine = active_engine(&mut page, Settings::default());

    page.move_element(ids[1], Rect::new(300.0, ROW_PX, 100.0, 20.0));
    engine.refresh(&mut page).unwrap();

    assert_eq!(engine.label_of(ids[1]), Some("b"));
    let moved = page.badges().into_iter().find(|b| b.label == "b").unwrap();
    assert_eq!(moved.position.left, 350.0);
}

#[test]
fn detached_element_loses_its_overlay() {
    let (mut page, ids) = link_column(3);
    let mut engine = active_engine(&mut page, Settings::default());

    page.detach(ids[1]);
    let report = engine.refresh(&mut page).unwrap();

    assert_eq!(report.removed, 1);
    assert_eq!(engine.label_of(ids[1]), None);
    assert_eq!(engine.element_for("b"), None);
    assert_eq!(page.overlay_count(), 2);
}

#[test]
fn reattached_element_is_labeled_again() {
    let (mut page, ids) = link_column(3);
    let mut engine = active_engine(&mut page, Settings::default());

    page.detach(ids[2]);
    engine.refresh(&mut page).unwrap();
    assert_eq!(engine.label_of(ids[2]), None);

    page.reattach(ids[2]);
    let report = engine.refresh(&mut page).unwrap();

    assert_eq!(report.placed, 1);
    assert_eq!(engine.label_of(ids[2]), Some("c"));
    let outcome = engine.on_key(&mut page, 'c').unwrap();
    assert!(matches!(outcome, KeyOutcome::Activated(ref a) if a.element == ids[2]));
    assert_eq!(page.clicked(), vec![ids[2]]);
}

#[test]
fn new_element_never_reuses_a_live_label() {
    let (mut page, ids) = link_column(3);
    let mut engine = active_engine(&mut page, Settings::default());

    // Removing the first link shifts every slot down by one
    page.detach(ids[0]);
    let late = page.add_element("a", row(3));
    engine.refresh(&mut page).unwrap();

    assert_eq!(engine.label_of(ids[1]), Some("b"));
    assert_eq!(engine.label_of(ids[2]), Some("c"));
    // Slot 2 is "c", already held by ids[2]
    assert_eq!(engine.label_of(late), None);

    let mut labels: Vec<String> = engine.labels().into_iter().map(|(l, _)| l).collect();
    labels.dedup();
    assert_eq!(labels.len(), engine.overlay_count());
}

// ============================================================================
// Collision suppression
// ============================================================================

#[test]
fn overlapping_badges_keep_only_the_upper_one() {
    let mut page = SimulatedPage::new(Viewport::default());
    let upper = page.add_element("a", Rect::new(10.0, 10.0, 100.0, 20.0));
    let lower = page.add_element("a", Rect::new(10.0, 14.0, 100.0, 20.0));

    let mut engine = LabelEngine::default();
    let report = engine.activate(&mut page).unwrap();

    assert_eq!(report.suppressed, 1);
    assert_eq!(engine.label_of(upper), Some("a"));
    assert_eq!(engine.label_of(lower), None);
    assert_eq!(page.overlay_count(), 1);
}

// ============================================================================
// Typing and activation
// ============================================================================

#[test]
fn typing_a_label_clicks_its_element_and_ends_session() {
    let (mut page, ids) = link_column(3);
    let mut engine = active_engine(&mut page, Settings::default());

    let outcome = engine.on_key(&mut page, 'c').unwrap();

    match outcome {
        KeyOutcome::Activated(activation) => {
            assert_eq!(activation.element, ids[2]);
            assert_eq!(activation.label.as_deref(), Some("c"));
            assert_eq!(activation.action, ElementAction::Click);
        }
        other => panic!("Expected activation, got {:?}", other),
    }
    assert_eq!(page.clicked(), vec![ids[2]]);
    assert!(!engine.is_active());
    assert_eq!(page.overlay_count(), 0);
}

#[test]
fn text_inputs_are_focused_not_clicked() {
    let mut page = SimulatedPage::new(Viewport::default());
    let field = page.add_input("search", row(0));
    let mut engine = active_engine(&mut page, Settings::default());

    let outcome = engine.on_key(&mut page, 'a').unwrap();

    assert!(matches!(outcome, KeyOutcome::Activated(ref a) if a.action == ElementAction::Focus));
    assert_eq!(page.focused(), Some(field));
    assert!(page.clicked().is_empty());
}

#[test]
fn checkbox_inputs_are_clicked() {
    let mut page = SimulatedPage::new(Viewport::default());
    let checkbox = page.add_input("checkbox", row(0));
    let mut engine = active_engine(&mut page, Settings::default());

    engine.on_key(&mut page, 'a').unwrap();

    assert_eq!(page.clicked(), vec![checkbox]);
}

#[test]
fn prefix_narrows_and_highlights_matching_badges() {
    let (mut page, ids) = link_column(30);
    let mut engine = active_engine(&mut page, Settings::default());

    let outcome = engine.on_key(&mut page, '2').unwrap();

    assert_eq!(outcome, KeyOutcome::Narrowed { matches: 1 });
    assert_eq!(engine.typed(), "2");
    let highlighted: Vec<&str> = page
        .badges()
        .into_iter()
        .filter(|b| b.typed > 0)
        .map(|b| b.label.as_str())
        .collect();
    assert_eq!(highlighted, vec!["2a"]);

    let outcome = engine.on_key(&mut page, 'a').unwrap();
    assert!(matches!(outcome, KeyOutcome::Activated(ref a) if a.element == ids[28]));
}

#[test]
fn unmatched_key_resets_buffer_and_keeps_session() {
    let (mut page, _) = link_column(3);
    let mut engine = active_engine(&mut page, Settings::default());

    engine.on_key(&mut page, 'z').unwrap();

    assert_eq!(engine.typed(), "");
    assert!(engine.is_active());
    assert_eq!(page.overlay_count(), 3);
    assert!(page.badges().iter().all(|b| b.typed == 0));
}

#[test]
fn keys_are_ignored_without_a_session() {
    let (mut page, _) = link_column(3);
    let mut engine = LabelEngine::default();

    assert_eq!(engine.on_key(&mut page, 'a').unwrap(), KeyOutcome::Ignored);
    assert!(page.clicked().is_empty());
}

#[test]
fn keystroke_blurs_the_focused_page_control() {
    let (mut page, ids) = link_column(30);
    let mut engine = active_engine(&mut page, Settings::default());
    page.set_focus(Some(ids[5]));

    engine.on_key(&mut page, '0').unwrap();

    assert_eq!(page.focused(), None);
}

#[test]
fn failing_click_reports_error_after_teardown() {
    let (mut page, ids) = link_column(3);
    page.set_click_fails(ids[0], true);
    let mut engine = active_engine(&mut page, Settings::default());

    let err = engine.on_key(&mut page, 'a').unwrap_err();

    assert!(matches!(err, SurfError::HostAction { element, .. } if element == ids[0]));
    assert!(!engine.is_active());
    assert_eq!(page.overlay_count(), 0);
}

// ============================================================================
// Confirmation policy
// ============================================================================

#[test]
fn non_default_scheme_waits_for_enter() {
    let (mut page, ids) = link_column(30);
    let settings = settings_with(LabelScheme::CharactersOnly, ActivationPolicy::ConfirmNonDefault);
    let mut engine = active_engine(&mut page, settings);

    engine.on_key(&mut page, 'a').unwrap();
    let outcome = engine.on_key(&mut page, 'b').unwrap();

    assert_eq!(
        outcome,
        KeyOutcome::AwaitingConfirmation {
            element: ids[27],
            label: "ab".into()
        }
    );
    assert!(page.clicked().is_empty());

    let outcome = engine.confirm(&mut page).unwrap();
    assert!(matches!(outcome, KeyOutcome::Activated(ref a) if a.element == ids[27]));
    assert_eq!(page.clicked(), vec![ids[27]]);
}

#[test]
fn immediate_policy_fires_unambiguous_match() {
    let (mut page, ids) = link_column(30);
    let settings = settings_with(LabelScheme::CharactersOnly, ActivationPolicy::Immediate);
    let mut engine = active_engine(&mut page, settings);

    engine.on_key(&mut page, 'a').unwrap();
    let outcome = engine.on_key(&mut page, 'c').unwrap();

    assert!(matches!(outcome, KeyOutcome::Activated(ref a) if a.element == ids[28]));
}

#[test]
fn exact_match_extended_by_others_waits_even_when_immediate() {
    let (mut page, ids) = link_column(30);
    let settings = settings_with(LabelScheme::CharactersOnly, ActivationPolicy::Immediate);
    let mut engine = active_engine(&mut page, settings);

    let outcome = engine.on_key(&mut page, 'a').unwrap();

    assert_eq!(
        outcome,
        KeyOutcome::AwaitingConfirmation {
            element: ids[0],
            label: "a".into()
        }
    );
    assert_eq!(engine.pending_confirmation(), Some(ids[0]));
}

#[test]
fn enter_without_exact_match_does_nothing() {
    let (mut page, _) = link_column(30);
    let mut engine = active_engine(&mut page, Settings::default());

    engine.on_key(&mut page, '1').unwrap();

    assert_eq!(engine.confirm(&mut page).unwrap(), KeyOutcome::Ignored);
    assert!(engine.is_active());
}

#[test]
fn numbers_only_labels_start_at_zero() {
    let (mut page, ids) = link_column(12);
    let settings = settings_with(LabelScheme::NumbersOnly, ActivationPolicy::ConfirmNonDefault);
    let engine = active_engine(&mut page, settings);

    assert_eq!(engine.label_of(ids[0]), Some("0"));
    assert_eq!(engine.label_of(ids[10]), Some("00"));
    assert_eq!(engine.label_of(ids[11]), Some("01"));
}

#[test]
fn scrolling_every_match_away_resets_buffer() {
    let (mut page, ids) = link_column(200);
    let mut engine = active_engine(
        &mut page,
        settings_with(LabelScheme::CharactersOnly, ActivationPolicy::ConfirmNonDefault),
    );

    let outcome = engine.on_key(&mut page, 'a').unwrap();
    assert!(matches!(outcome, KeyOutcome::AwaitingConfirmation { element, .. } if element == ids[0]));

    page.scroll_to(0.0, 5000.0);
    engine.refresh(&mut page).unwrap();

    assert_eq!(engine.label_of(ids[0]), None);
    assert!(engine.labels().iter().all(|(label, _)| !label.starts_with('a')));
    assert_eq!(engine.typed(), "");
    assert_eq!(engine.pending_confirmation(), None);

    assert_eq!(engine.confirm(&mut page).unwrap(), KeyOutcome::Ignored);
    assert!(page.clicked().is_empty());
}

#[test]
fn pending_element_scrolled_away_is_not_confirmed() {
    let (mut page, ids) = link_column(200);
    let mut engine = active_engine(
        &mut page,
        settings_with(LabelScheme::CharactersOnly, ActivationPolicy::ConfirmNonDefault),
    );
    engine.on_key(&mut page, 'a').unwrap();
    assert_eq!(engine.pending_confirmation(), Some(ids[0]));

    // Row 0 leaves the window, "aa" on row 26 stays
    page.scroll_to(0.0, 500.0);
    engine.refresh(&mut page).unwrap();

    assert_eq!(engine.label_of(ids[0]), None);
    assert_eq!(engine.label_of(ids[26]), Some("aa"));
    assert_eq!(engine.typed(), "a");
    assert_eq!(engine.pending_confirmation(), None);

    assert_eq!(engine.confirm(&mut page).unwrap(), KeyOutcome::Ignored);
    assert!(page.clicked().is_empty());

    let outcome = engine.on_key(&mut page, 'a').unwrap();
    assert!(matches!(outcome, KeyOutcome::AwaitingConfirmation { element, .. } if element == ids[26]));
}

// ============================================================================
// Focus-driven activation
// ============================================================================

#[test]
fn command_enter_clicks_focused_button() {
    let mut page = SimulatedPage::new(Viewport::default());
    let button = page.add_element("button", row(0));
    let mut engine = active_engine(&mut page, Settings::default());
    page.set_focus(Some(button));

    let activation = engine.activate_focused(&mut page).unwrap().unwrap();

    assert_eq!(activation.action, ElementAction::Click);
    assert_eq!(activation.label, None);
    assert_eq!(page.clicked(), vec![button]);
    assert!(engine.is_active());
}

#[test]
fn command_enter_focuses_other_elements() {
    let mut page = SimulatedPage::new(Viewport::default());
    let link = page.add_element("a", row(0));
    let mut engine = active_engine(&mut page, Settings::default());
    page.set_focus(Some(link));

    let activation = engine.activate_focused(&mut page).unwrap().unwrap();

    assert_eq!(activation.action, ElementAction::Focus);
    assert!(page.clicked().is_empty());
}

#[test]
fn command_enter_without_focus_is_a_no_op() {
    let (mut page, _) = link_column(2);
    let mut engine = active_engine(&mut page, Settings::default());

    assert_eq!(engine.activate_focused(&mut page).unwrap(), None);
}

// ============================================================================
// Escape and navigation
// ============================================================================

#[test]
fn escape_deactivates_by_default() {
    let (mut page, _) = link_column(3);
    let mut engine = active_engine(&mut page, settings_with_escape(EscapePolicy::Deactivate));
    engine.on_key(&mut page, 'x').unwrap();
    assert!(page.has_focus_sink());

    let state = engine.escape(&mut page);

    assert_eq!(state, SessionState::Inactive);
    assert_eq!(page.overlay_count(), 0);
    assert!(!page.is_captured(Capture::Keyboard));
    assert!(!page.has_focus_sink());
}

#[test]
fn escape_can_clear_without_ending_session() {
    let (mut page, _) = link_column(3);
    let mut engine = active_engine(&mut page, settings_with_escape(EscapePolicy::ClearOnly));
    engine.on_key(&mut page, 'x').unwrap();

    let state = engine.escape(&mut page);

    assert_eq!(state, SessionState::Active);
    assert_eq!(page.overlay_count(), 0);
    assert_eq!(engine.typed(), "");
    assert!(page.is_captured(Capture::Keyboard));
    assert!(page.has_focus_sink());
}

#[test]
fn navigation_clears_overlays_and_next_key_relabels() {
    let (mut page, ids) = link_column(3);
    let mut engine = active_engine(&mut page, Settings::default());

    engine.on_navigate(&mut page);
    assert!(engine.is_active());
    assert_eq!(page.overlay_count(), 0);

    let outcome = engine.on_key(&mut page, 'b').unwrap();
    assert!(matches!(outcome, KeyOutcome::Activated(ref a) if a.element == ids[1]));
}

// ============================================================================
// All-or-nothing placement
// ============================================================================

#[test]
fn failed_activation_leaves_no_overlays() {
    let (mut page, _) = link_column(5);
    page.fail_overlays_after(2);
    let mut engine = LabelEngine::default();

    let err = engine.activate(&mut page).unwrap_err();

    assert!(matches!(err, SurfError::OverlayCreate { .. }));
    assert_eq!(page.overlay_count(), 0);
    assert_eq!(engine.overlay_count(), 0);
    assert!(!engine.is_active());
    assert!(!page.is_captured(Capture::Keyboard));
}

#[test]
fn failed_refresh_keeps_previous_overlays() {
    let (mut page, ids) = link_column(3);
    let mut engine = active_engine(&mut page, Settings::default());
    let before = page.badge_labels();

    page.add_element("a", row(3));
    page.add_element("a", row(4));
    page.detach(ids[2]);
    page.fail_overlays_after(1);
    assert!(engine.refresh(&mut page).is_err());

    assert_eq!(page.badge_labels(), before);
    assert_eq!(engine.label_of(ids[2]), Some("c"));
    assert_eq!(engine.overlay_count(), 3);
}

// ============================================================================
// Scroll debounce
// ============================================================================

#[test]
fn scroll_burst_runs_one_placement_after_quiet_period() {
    let (mut page, ids) = link_column(300);
    let mut engine = active_engine(&mut page, Settings::default());
    let t0 = Instant::now();

    page.scroll_to(0.0, 4000.0);
    engine.on_scroll(t0);
    engine.on_scroll(t0 + Duration::from_millis(100));

    assert_eq!(engine.poll_scroll(&mut page, t0 + Duration::from_millis(200)).unwrap(), None);
    assert_eq!(engine.label_of(ids[0]), Some("a"));

    let report = engine
        .poll_scroll(&mut page, t0 + Duration::from_millis(250))
        .unwrap()
        .unwrap();
    assert_eq!(report.removed, 31);
    assert!(!engine.scroll_pending());
}

#[test]
fn only_the_latest_scroll_ticket_fires() {
    let (mut page, _) = link_column(3);
    let mut engine = active_engine(&mut page, Settings::default());
    let now = Instant::now();

    let first = engine.on_scroll(now).unwrap();
    let second = engine.on_scroll(now).unwrap();

    assert_eq!(engine.on_scroll_timer(&mut page, first).unwrap(), None);
    assert!(engine.on_scroll_timer(&mut page, second).unwrap().is_some());
    assert_eq!(engine.on_scroll_timer(&mut page, second).unwrap(), None);
}

#[test]
fn scroll_timer_after_deactivation_does_nothing() {
    let (mut page, _) = link_column(3);
    let mut engine = active_engine(&mut page, Settings::default());

    let ticket = engine.on_scroll(Instant::now()).unwrap();
    engine.deactivate(&mut page);

    assert_eq!(engine.on_scroll_timer(&mut page, ticket).unwrap(), None);
    assert_eq!(page.overlay_count(), 0);
    assert!(engine.on_scroll(Instant::now()).is_none());
}

// ============================================================================
// Settings updates
// ============================================================================

#[test]
fn appearance_update_restyles_live_overlays() {
    let (mut page, _) = link_column(2);
    let mut engine = active_engine(&mut page, Settings::default());

    let appearance = AppearanceSettings {
        background_color: "#00FF00".into(),
        ..AppearanceSettings::default()
    };
    engine.update_appearance(&mut page, appearance).unwrap();

    assert!(engine.is_active());
    assert_eq!(page.overlay_count(), 2);
    assert!(page.badges().iter().all(|b| b.style.background_color == "#00FF00"));
}

#[test]
fn appearance_update_while_inactive_only_stores_it() {
    let (mut page, _) = link_column(2);
    let mut engine = LabelEngine::default();

    let appearance = AppearanceSettings {
        font_size: "20px".into(),
        ..AppearanceSettings::default()
    };
    engine.update_appearance(&mut page, appearance).unwrap();

    assert_eq!(page.overlay_count(), 0);
    assert_eq!(engine.settings().appearance.font_size, "20px");

    engine.activate(&mut page).unwrap();
    assert!(page.badges().iter().all(|b| b.style.font_size == "20px"));
}

#[test]
fn host_view_and_engine_agree_on_overlay_count() {
    let (mut page, _) = link_column(40);
    let mut engine = active_engine(&mut page, Settings::default());

    for y in [0.0, 250.0, 900.0, 300.0] {
        page.scroll_to(0.0, y);
        engine.refresh(&mut page).unwrap();
        assert_eq!(engine.overlay_count(), page.overlay_count());
        assert_eq!(page.document_elements().len(), 40);
    }
}
