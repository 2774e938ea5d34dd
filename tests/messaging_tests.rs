use ninja_surfing::engine::engine::LabelEngine;
use ninja_surfing::label::allocator::LabelScheme;
use ninja_surfing::messaging::dispatch::Dispatcher;
use ninja_surfing::messaging::message::{AppearanceUpdate, Message, Response};
use ninja_surfing::settings::settings::{AppearanceSettings, PaddingTier, Settings};
use ninja_surfing::settings::store::{KEY_LABEL_SCHEME, MemoryStore};
use serde_json::json;

use crate::common::utils::{active_engine, link_column};

mod common;

// ============================================================================
// Message decoding
// ============================================================================

#[test]
fn messages_decode_by_action_tag() {
    let msg: Message = serde_json::from_value(json!({"action": "toggleLinkShortcuts"})).unwrap();
    assert_eq!(msg, Message::ToggleLinkShortcuts);

    let msg: Message = serde_json::from_value(json!({
        "action": "updateOverlayAppearance",
        "backgroundColor": "#FF0000",
        "padding": "large"
    }))
    .unwrap();
    match msg {
        Message::UpdateOverlayAppearance(update) => {
            assert_eq!(update.background_color.as_deref(), Some("#FF0000"));
            assert_eq!(update.padding, Some(PaddingTier::Large));
            assert_eq!(update.font_size, None);
        }
        other => panic!("Expected appearance update, got {:?}", other),
    }
}

#[test]
fn appearance_update_accepts_storage_key_names() {
    let update: AppearanceUpdate = serde_json::from_value(json!({
        "overlayBackgroundColor": "#010203",
        "overlayFontSize": "14px",
        "preferredOption": "numbers_only"
    }))
    .unwrap();
    assert_eq!(update.background_color.as_deref(), Some("#010203"));
    assert_eq!(update.font_size.as_deref(), Some("14px"));
    assert_eq!(update.label_scheme, Some(LabelScheme::NumbersOnly));
}

#[test]
fn empty_update_fields_keep_current_values() {
    let update = AppearanceUpdate {
        background_color: Some(String::new()),
        text_color: Some("#222222".into()),
        ..AppearanceUpdate::default()
    };
    let merged = update.apply(&AppearanceSettings::default());
    assert_eq!(merged.background_color, "#FFFF00");
    assert_eq!(merged.text_color, "#222222");
}

#[test]
fn responses_serialize_like_the_extension_expects() {
    assert_eq!(serde_json::to_value(Response::ok()).unwrap(), json!({"success": true}));
    assert_eq!(
        serde_json::to_value(Response::failed("Unknown action")).unwrap(),
        json!({"success": false, "error": "Unknown action"})
    );
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn toggle_message_starts_and_stops_session() {
    let (mut page, _) = link_column(3);
    let store = MemoryStore::new();
    let dispatcher = Dispatcher::new(&store);
    let mut engine = LabelEngine::default();

    let response = dispatcher.handle_json(&mut engine, &mut page, r#"{"action":"toggleLinkShortcuts"}"#);
    assert!(response.is_success());
    assert_eq!(page.overlay_count(), 3);

    dispatcher.handle(&mut engine, &mut page, Message::ToggleLinkShortcuts);
    assert!(!engine.is_active());
    assert_eq!(page.overlay_count(), 0);
}

#[test]
fn toggle_picks_up_stored_scheme() {
    let (mut page, ids) = link_column(3);
    let store = MemoryStore::new().with(KEY_LABEL_SCHEME, "numbers_only");
    let mut engine = LabelEngine::default();

    Dispatcher::new(&store).handle(&mut engine, &mut page, Message::ToggleLinkShortcuts);

    assert_eq!(engine.settings().label_scheme, LabelScheme::NumbersOnly);
    assert_eq!(engine.label_of(ids[0]), Some("0"));
}

#[test]
fn toggle_still_works_when_storage_is_unavailable() {
    let (mut page, _) = link_column(2);
    let store = MemoryStore::unavailable();
    let mut engine = LabelEngine::default();

    let response = Dispatcher::new(&store).handle(&mut engine, &mut page, Message::ToggleLinkShortcuts);

    assert!(response.is_success());
    assert!(engine.is_active());
    assert_eq!(engine.settings(), &Settings::default());
}

#[test]
fn toggle_on_takes_focus_from_page_control() {
    let (mut page, ids) = link_column(2);
    page.set_focus(Some(ids[1]));
    let store = MemoryStore::new();
    let mut engine = LabelEngine::default();

    Dispatcher::new(&store).handle(&mut engine, &mut page, Message::ToggleLinkShortcuts);

    assert!(engine.is_active());
    assert_eq!(page.focused(), None);
}

#[test]
fn toggle_off_leaves_focus_and_releases_sink() {
    let (mut page, ids) = link_column(2);
    let store = MemoryStore::new();
    let mut engine = active_engine(&mut page, Settings::default());
    engine.on_key(&mut page, 'z').unwrap();
    assert!(page.has_focus_sink());

    page.set_focus(Some(ids[0]));
    let response = Dispatcher::new(&store).handle(&mut engine, &mut page, Message::ToggleLinkShortcuts);

    assert!(response.is_success());
    assert!(!engine.is_active());
    assert_eq!(page.focused(), Some(ids[0]));
    assert!(!page.has_focus_sink());
}

#[test]
fn failed_toggle_reports_error() {
    let (mut page, _) = link_column(3);
    page.fail_overlays_after(0);
    let store = MemoryStore::new();
    let mut engine = LabelEngine::default();

    let response = Dispatcher::new(&store).handle(&mut engine, &mut page, Message::ToggleLinkShortcuts);

    assert!(!response.is_success());
    assert_eq!(page.overlay_count(), 0);
    assert!(!engine.is_active());
}

#[test]
fn appearance_message_rebuilds_live_overlays() {
    let (mut page, _) = link_column(2);
    let store = MemoryStore::new();
    let mut engine = active_engine(&mut page, Settings::default());

    let response = Dispatcher::new(&store).handle_json(
        &mut engine,
        &mut page,
        r##"{"action":"updateOverlayAppearance","backgroundColor":"#00FF00","fontSize":"18px"}"##,
    );

    assert!(response.is_success());
    assert!(engine.is_active());
    assert_eq!(page.overlay_count(), 2);
    for badge in page.badges() {
        assert_eq!(badge.style.background_color, "#00FF00");
        assert_eq!(badge.style.font_size, "18px");
    }
}

#[test]
fn get_current_settings_returns_snapshot() {
    let (mut page, _) = link_column(1);
    let store = MemoryStore::new();
    let mut engine = LabelEngine::default();

    let response = Dispatcher::new(&store).handle_json(
        &mut engine,
        &mut page,
        r#"{"action":"getCurrentSettings"}"#,
    );

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["backgroundColor"], "#FFFF00");
    assert_eq!(value["textColor"], "#000000");
    assert_eq!(value["padding"], "small");
    assert_eq!(value["labelScheme"], "default");
    assert!(matches!(response, Response::Settings(_)));
}

#[test]
fn unknown_action_is_rejected() {
    let (mut page, _) = link_column(1);
    let store = MemoryStore::new();
    let mut engine = LabelEngine::default();
    let dispatcher = Dispatcher::new(&store);

    for raw in [r#"{"action":"selfDestruct"}"#, r#"{"noAction":true}"#] {
        let response = dispatcher.handle_json(&mut engine, &mut page, raw);
        assert_eq!(response, Response::failed("Unknown action"));
    }
    assert!(!engine.is_active());
}

#[test]
fn malformed_json_is_rejected() {
    let (mut page, _) = link_column(1);
    let store = MemoryStore::new();
    let mut engine = LabelEngine::default();

    let response = Dispatcher::new(&store).handle_json(&mut engine, &mut page, "{not json");

    assert!(!response.is_success());
}
