use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::engine::LabelEngine;
use crate::messaging::message::{
    ACTION_GET_SETTINGS, ACTION_TOGGLE, ACTION_UPDATE_APPEARANCE, CurrentSettings, Message, Response,
};
use crate::page::host::PageHost;
use crate::settings::store::{SettingsStore, load_settings};

/// Routes runtime messages to a page's [`LabelEngine`].
///
/// Holds the settings store so a toggle can pick up values changed on the
/// options page since the engine was created.
pub struct Dispatcher<'a> {
    store: &'a dyn SettingsStore,
}

impl<'a> Dispatcher<'a> {
    pub fn new(store: &'a dyn SettingsStore) -> Self {
        Self { store }
    }

    pub fn handle(
        &self,
        engine: &mut LabelEngine,
        host: &mut dyn PageHost,
        message: Message,
    ) -> Response {
        match message {
            Message::ToggleLinkShortcuts => {
                if !engine.is_active() {
                    // Whatever had focus would otherwise swallow the next keystrokes
                    host.blur_active();
                    self.reload(engine);
                }
                match engine.toggle(host) {
                    Ok(state) => {
                        debug!(?state, "toggled overlay session");
                        Response::ok()
                    }
                    Err(e) => {
                        warn!(error = %e, "toggle failed");
                        Response::failed(e)
                    }
                }
            }
            Message::UpdateOverlayAppearance(update) => {
                let mut settings = engine.settings().clone();
                settings.appearance = update.apply(&settings.appearance);
                if let Some(scheme) = update.label_scheme {
                    settings.label_scheme = scheme;
                }
                match engine.update_settings(host, settings) {
                    Ok(()) => Response::ok(),
                    Err(e) => {
                        warn!(error = %e, "appearance update failed");
                        Response::failed(e)
                    }
                }
            }
            Message::GetCurrentSettings => {
                let settings = engine.settings();
                Response::Settings(CurrentSettings::snapshot(
                    &settings.appearance,
                    settings.label_scheme,
                ))
            }
        }
    }

    /// Decode a raw JSON message and handle it.
    ///
    /// Unrecognized `action` values get `Unknown action`; a known action
    /// with unusable fields gets the decode error.
    pub fn handle_json(
        &self,
        engine: &mut LabelEngine,
        host: &mut dyn PageHost,
        raw: &str,
    ) -> Response {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => return Response::failed(format!("Malformed message: {}", e)),
        };

        let known = value
            .get("action")
            .and_then(Value::as_str)
            .is_some_and(is_known_action);
        if !known {
            debug!(message = %raw, "unknown action");
            return Response::failed("Unknown action");
        }

        match serde_json::from_value::<Message>(value) {
            Ok(message) => self.handle(engine, host, message),
            Err(e) => Response::failed(format!("Malformed message: {}", e)),
        }
    }

    fn reload(&self, engine: &mut LabelEngine) {
        match load_settings(self.store, engine.settings()) {
            Ok(settings) => engine.apply_settings(settings),
            Err(e) => warn!(error = %e, "settings unavailable, keeping current values"),
        }
    }
}

fn is_known_action(action: &str) -> bool {
    matches!(action, ACTION_TOGGLE | ACTION_UPDATE_APPEARANCE | ACTION_GET_SETTINGS)
}
