use serde::{Deserialize, Serialize};

use crate::label::allocator::LabelScheme;
use crate::settings::settings::{AppearanceSettings, PaddingTier};

pub const ACTION_TOGGLE: &str = "toggleLinkShortcuts";
pub const ACTION_UPDATE_APPEARANCE: &str = "updateOverlayAppearance";
pub const ACTION_GET_SETTINGS: &str = "getCurrentSettings";

/// A request delivered to the page, tagged by its `action` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Message {
    #[serde(rename = "toggleLinkShortcuts")]
    ToggleLinkShortcuts,

    #[serde(rename = "updateOverlayAppearance")]
    UpdateOverlayAppearance(AppearanceUpdate),

    #[serde(rename = "getCurrentSettings")]
    GetCurrentSettings,
}

/// Partial appearance change. Absent fields keep their current value.
///
/// Accepts both the options-page names (`backgroundColor`) and the
/// storage names (`overlayBackgroundColor`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceUpdate {
    #[serde(default, alias = "overlayBackgroundColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, alias = "overlayTextColor", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    #[serde(default, alias = "overlayFontSize", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,

    #[serde(default, alias = "overlayPadding", skip_serializing_if = "Option::is_none")]
    pub padding: Option<PaddingTier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_shadow: Option<String>,

    #[serde(default, alias = "preferredOption", skip_serializing_if = "Option::is_none")]
    pub label_scheme: Option<LabelScheme>,
}

impl AppearanceUpdate {
    /// Overlay the non-empty fields of this update on `base`.
    pub fn apply(&self, base: &AppearanceSettings) -> AppearanceSettings {
        fn pick(update: &Option<String>, current: &str) -> String {
            match update.as_deref() {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => current.to_string(),
            }
        }

        AppearanceSettings {
            background_color: pick(&self.background_color, &base.background_color),
            text_color: pick(&self.text_color, &base.text_color),
            font_size: pick(&self.font_size, &base.font_size),
            padding: self.padding.unwrap_or(base.padding),
            line_height: pick(&self.line_height, &base.line_height),
            font_weight: pick(&self.font_weight, &base.font_weight),
            text_shadow: pick(&self.text_shadow, &base.text_shadow),
        }
    }
}

/// Reply sent back to the message's sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Settings(CurrentSettings),
    Ack(Ack),
}

impl Response {
    pub fn ok() -> Self {
        Response::Ack(Ack {
            success: true,
            error: None,
        })
    }

    pub fn failed(error: impl ToString) -> Self {
        Response::Ack(Ack {
            success: false,
            error: Some(error.to_string()),
        })
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Ack(ack) => ack.success,
            Response::Settings(_) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Read-only appearance snapshot for `getCurrentSettings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSettings {
    pub background_color: String,
    pub text_color: String,
    pub font_size: String,
    pub padding: PaddingTier,
    pub line_height: String,
    pub font_weight: String,
    pub text_shadow: String,
    pub label_scheme: LabelScheme,
}

impl CurrentSettings {
    pub fn snapshot(appearance: &AppearanceSettings, scheme: LabelScheme) -> Self {
        Self {
            background_color: appearance.background_color.clone(),
            text_color: appearance.text_color.clone(),
            font_size: appearance.font_size.clone(),
            padding: appearance.padding,
            line_height: appearance.line_height.clone(),
            font_weight: appearance.font_weight.clone(),
            text_shadow: appearance.text_shadow.clone(),
            label_scheme: scheme,
        }
    }
}
