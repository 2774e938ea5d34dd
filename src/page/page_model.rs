use std::fmt;

use serde::{Deserialize, Serialize};

use crate::page::geometry::Rect;

/// Opaque identity of a page element, issued by the host.
///
/// Two ids are equal iff they name the same node. Ids carry no meaning
/// beyond identity and are never reused by a host within one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque handle to a rendered overlay badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(pub u64);

/// What the host knows about one element at the time it is asked.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInfo {
    /// Lowercase tag name (`a`, `button`, `div`, ...)
    pub tag: String,
    /// `type` attribute for `input` elements
    pub input_type: Option<String>,
    /// Inline `style` declares `cursor: pointer`
    pub inline_pointer: bool,
    /// Computed `cursor` value
    pub cursor: Option<String>,
    /// A `:hover` rule switches the cursor to pointer
    pub hover_pointer: bool,
    /// Viewport-relative bounding box
    pub rect: Rect,
}

impl ElementInfo {
    /// Anchors and form controls.
    pub fn is_link_or_control(&self) -> bool {
        matches!(
            self.tag.as_str(),
            "a" | "input" | "select" | "option" | "button"
        )
    }

    pub fn has_pointer_cursor(&self) -> bool {
        self.cursor.as_deref() == Some("pointer") || self.hover_pointer
    }

    /// Controls that take keyboard focus rather than a click when activated.
    pub fn is_text_input(&self) -> bool {
        is_text_input(&self.tag, self.input_type.as_deref())
    }
}

/// Text-entry controls: `textarea` and textual `input` types.
pub fn is_text_input(tag: &str, input_type: Option<&str>) -> bool {
    match tag {
        "textarea" => true,
        "input" => match input_type.map(str::to_ascii_lowercase).as_deref() {
            None
            | Some("")
            | Some("text")
            | Some("email")
            | Some("password")
            | Some("search")
            | Some("number")
            | Some("tel")
            | Some("url")
            | Some("date")
            | Some("datetime-local")
            | Some("time")
            | Some("month")
            | Some("week") => true,

            // Buttons and choice inputs are clicked
            Some("submit")
            | Some("button")
            | Some("reset")
            | Some("image")
            | Some("checkbox")
            | Some("radio")
            | Some("file")
            | Some("color")
            | Some("range")
            | Some("hidden") => false,

            _ => true,
        },
        _ => false,
    }
}

/// How an activated element was acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementAction {
    Click,
    Focus,
}

impl fmt::Display for ElementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementAction::Click => write!(f, "click"),
            ElementAction::Focus => write!(f, "focus"),
        }
    }
}
