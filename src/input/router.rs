use tracing::debug;

use crate::engine::engine::{Activation, KeyOutcome, LabelEngine, SessionState};
use crate::error::SurfError;
use crate::input::keys::{KeyInput, normalize_char};
use crate::page::host::PageHost;

/// What a keydown means to the overlay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Leave the event to the page
    Passthrough,
    Escape,
    /// Ctrl/Cmd+Enter
    ActivateFocused,
    /// Plain Enter
    Confirm,
    Character(char),
    /// Captured, but not a label character
    Rejected,
}

/// A routing decision plus what the host must do to the native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutedKey {
    pub action: KeyAction,
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl RoutedKey {
    fn passthrough() -> Self {
        Self {
            action: KeyAction::Passthrough,
            prevent_default: false,
            stop_propagation: false,
        }
    }
}

/// Classify a keydown.
///
/// Nothing is captured unless a session is active, and typing inside a
/// text field always belongs to the page. Navigation keys have their default
/// scroll suppressed so the page stays put while a label is being typed.
pub fn route(event: &KeyInput, capturing: bool) -> RoutedKey {
    if !capturing || event.target_is_text_input {
        return RoutedKey::passthrough();
    }

    if event.key == "Escape" {
        return RoutedKey {
            action: KeyAction::Escape,
            prevent_default: false,
            stop_propagation: false,
        };
    }

    let action = if event.key == "Enter" && event.is_command() {
        KeyAction::ActivateFocused
    } else if event.key == "Enter" {
        KeyAction::Confirm
    } else {
        match normalize_char(&event.key) {
            Some(ch) => KeyAction::Character(ch),
            None => KeyAction::Rejected,
        }
    };

    RoutedKey {
        action,
        prevent_default: event.is_navigation(),
        stop_propagation: true,
    }
}

/// Result of handing one keydown to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Passthrough,
    Rejected,
    Key(KeyOutcome),
    Escaped(SessionState),
    Focused(Option<Activation>),
}

/// Route `event` and apply it to `engine`.
///
/// Returns the routing decision alongside the outcome so the host can
/// apply `prevent_default` / `stop_propagation` to the native event.
pub fn dispatch(
    engine: &mut LabelEngine,
    host: &mut dyn PageHost,
    event: &KeyInput,
) -> Result<(RoutedKey, Dispatched), SurfError> {
    let routed = route(event, engine.is_active());

    let outcome = match routed.action {
        KeyAction::Passthrough => Dispatched::Passthrough,
        KeyAction::Rejected => {
            debug!(key = %event.key, "rejected key");
            Dispatched::Rejected
        }
        KeyAction::Escape => Dispatched::Escaped(engine.escape(host)),
        KeyAction::ActivateFocused => Dispatched::Focused(engine.activate_focused(host)?),
        KeyAction::Confirm => Dispatched::Key(engine.confirm(host)?),
        KeyAction::Character(ch) => Dispatched::Key(engine.on_key(host, ch)?),
    };

    Ok((routed, outcome))
}
