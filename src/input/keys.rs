use serde::{Deserialize, Serialize};

use crate::label::alphabet::is_label_char;

/// Keys whose default action scrolls the page.
pub const NAVIGATION_KEYS: [&str; 6] = ["ArrowUp", "ArrowDown", "PageUp", "PageDown", "Home", "End"];

/// A keydown event as the host reports it (DOM `KeyboardEvent` fields).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInput {
    /// DOM `key` value: `"a"`, `"Enter"`, `"ArrowDown"`, ...
    pub key: String,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub alt_key: bool,
    /// Event target is an `input` or `textarea`
    #[serde(default)]
    pub target_is_text_input: bool,
}

impl KeyInput {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn in_text_input(mut self) -> Self {
        self.target_is_text_input = true;
        self
    }

    pub fn is_navigation(&self) -> bool {
        NAVIGATION_KEYS.contains(&self.key.as_str())
    }

    pub fn is_command(&self) -> bool {
        self.ctrl_key || self.meta_key
    }
}

/// The label character a `key` value stands for.
///
/// Accepts exactly one ASCII letter, digit, or label symbol; letters are
/// lowercased. Named keys (`"Shift"`, `"Tab"`) and everything else yield
/// `None`.
pub fn normalize_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let ch = ch.to_ascii_lowercase();
    is_label_char(ch).then_some(ch)
}
