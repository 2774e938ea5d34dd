use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, KeyboardEvent};
use web_time::Instant;

use crate::engine::debounce::ScrollTicket;
use crate::engine::engine::LabelEngine;
use crate::input::keys::KeyInput;
use crate::input::router::{Dispatched, dispatch};
use crate::messaging::dispatch::Dispatcher;
use crate::messaging::message::Message;
use crate::navigation::watcher::{NavigationSource, PageChangeWatcher};
use crate::page::host::Capture;
use crate::settings::settings::Settings;
use crate::settings::store::MemoryStore;
use crate::wasm::dom_host::DomHost;

/// Content-script entry point.
///
/// The JS glue owns the listeners: it attaches them while the matching
/// `wants*` getter is true and forwards events here. Storage is async in the
/// extension, so the glue pushes the latest stored values in with
/// `setStoredSettings` before forwarding a message.
#[wasm_bindgen]
pub struct NinjaSurfing {
    engine: LabelEngine,
    host: DomHost,
    watcher: PageChangeWatcher,
    store: MemoryStore,
}

#[wasm_bindgen]
impl NinjaSurfing {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<NinjaSurfing, JsValue> {
        let host = DomHost::new()?;
        let watcher = PageChangeWatcher::for_host(&host);
        Ok(Self {
            engine: LabelEngine::new(Settings::default()),
            host,
            watcher,
            store: MemoryStore::new(),
        })
    }

    /// Replace the stored-settings snapshot with a flat JSON object.
    #[wasm_bindgen(js_name = setStoredSettings)]
    pub fn set_stored_settings(&mut self, json: &str) -> Result<(), JsValue> {
        let values: BTreeMap<String, Value> =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.store = values
            .into_iter()
            .fold(MemoryStore::new(), |store, (k, v)| store.with(&k, v));
        Ok(())
    }

    /// Toolbar button or keyboard command. Returns whether a session is now active.
    pub fn toggle(&mut self) -> bool {
        let response = Dispatcher::new(&self.store).handle(
            &mut self.engine,
            &mut self.host,
            Message::ToggleLinkShortcuts,
        );
        if !response.is_success() {
            warn!(?response, "toggle failed");
        }
        self.engine.is_active()
    }

    /// Runtime message as JSON; returns the JSON response.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, raw: &str) -> String {
        let response = Dispatcher::new(&self.store).handle_json(&mut self.engine, &mut self.host, raw);
        serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"success":false,"error":"Unserializable response"}"#.to_string())
    }

    /// Capture-phase keydown. Returns whether the event was consumed.
    #[wasm_bindgen(js_name = handleKeydown)]
    pub fn handle_keydown(&mut self, event: &KeyboardEvent) -> bool {
        let target_is_text_input = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .is_some_and(|el| {
                let tag = el.tag_name().to_ascii_lowercase();
                (tag == "input" || tag == "textarea") && !DomHost::is_focus_sink(&el)
            });

        let input = KeyInput {
            key: event.key(),
            ctrl_key: event.ctrl_key(),
            meta_key: event.meta_key(),
            shift_key: event.shift_key(),
            alt_key: event.alt_key(),
            target_is_text_input,
        };

        match dispatch(&mut self.engine, &mut self.host, &input) {
            Ok((routed, outcome)) => {
                if routed.prevent_default {
                    event.prevent_default();
                }
                if routed.stop_propagation {
                    event.stop_propagation();
                }
                !matches!(outcome, Dispatched::Passthrough)
            }
            Err(e) => {
                warn!(error = %e, "keydown handling failed");
                true
            }
        }
    }

    /// Scroll event. Returns a ticket for `onScrollTimer`, or `undefined`.
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&mut self) -> Option<f64> {
        self.engine
            .on_scroll(Instant::now())
            .map(|ticket| ticket.0 as f64)
    }

    #[wasm_bindgen(js_name = onScrollTimer)]
    pub fn on_scroll_timer(&mut self, ticket: f64) {
        if let Err(e) = self
            .engine
            .on_scroll_timer(&mut self.host, ScrollTicket(ticket as u64))
        {
            warn!(error = %e, "scroll placement failed");
        }
    }

    /// Debounce wait the glue should pass to `setTimeout`.
    #[wasm_bindgen(js_name = scrollDebounceMs)]
    pub fn scroll_debounce_ms(&self) -> f64 {
        self.engine.settings().scroll_debounce_ms as f64
    }

    #[wasm_bindgen(js_name = onMutation)]
    pub fn on_mutation(&mut self) {
        self.watcher
            .signal(&mut self.host, NavigationSource::Mutation, &mut self.engine);
    }

    /// `kind` is `push`, `replace`, or `pop`.
    #[wasm_bindgen(js_name = onHistory)]
    pub fn on_history(&mut self, kind: &str) {
        let source = match kind {
            "push" => NavigationSource::PushState,
            "replace" => NavigationSource::ReplaceState,
            _ => NavigationSource::PopState,
        };
        self.watcher.signal(&mut self.host, source, &mut self.engine);
    }

    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.engine.is_active()
    }

    #[wasm_bindgen(getter, js_name = wantsKeyboard)]
    pub fn wants_keyboard(&self) -> bool {
        self.host.is_captured(Capture::Keyboard)
    }

    #[wasm_bindgen(getter, js_name = wantsScroll)]
    pub fn wants_scroll(&self) -> bool {
        self.host.is_captured(Capture::Scroll)
    }

    #[wasm_bindgen(getter, js_name = wantsMutations)]
    pub fn wants_mutations(&self) -> bool {
        self.host.is_captured(Capture::Mutations)
    }

    /// Page is going away.
    pub fn destroy(&mut self) {
        self.engine.deactivate(&mut self.host);
        self.host.release_focus_sink();
    }
}
