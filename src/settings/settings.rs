use serde::{Deserialize, Serialize};

use crate::label::allocator::LabelScheme;

// ============================================================================
// Appearance
// ============================================================================

/// Badge padding choice, mapped to a fixed pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingTier {
    #[serde(alias = "0px")]
    None,
    #[default]
    #[serde(alias = "2px")]
    Small,
    #[serde(alias = "4px")]
    Medium,
    #[serde(alias = "6px")]
    Large,
}

impl PaddingTier {
    pub fn pixels(&self) -> u8 {
        match self {
            PaddingTier::None => 0,
            PaddingTier::Small => 2,
            PaddingTier::Medium => 4,
            PaddingTier::Large => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceSettings {
    #[serde(default = "default_background")]
    pub background_color: String,

    #[serde(default = "default_text_color")]
    pub text_color: String,

    #[serde(default = "default_font_size")]
    pub font_size: String,

    #[serde(default)]
    pub padding: PaddingTier,

    #[serde(default = "default_line_height")]
    pub line_height: String,

    #[serde(default = "default_font_weight")]
    pub font_weight: String,

    #[serde(default = "default_text_shadow")]
    pub text_shadow: String,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            background_color: default_background(),
            text_color: default_text_color(),
            font_size: default_font_size(),
            padding: PaddingTier::default(),
            line_height: default_line_height(),
            font_weight: default_font_weight(),
            text_shadow: default_text_shadow(),
        }
    }
}

// ============================================================================
// Behavior switches
// ============================================================================

/// When an exactly typed label fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    /// Fire as soon as the buffer equals a label no other label extends
    Immediate,
    /// Like `Immediate` for the default scheme; other schemes wait for Enter
    #[default]
    ConfirmNonDefault,
}

/// What Escape does while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapePolicy {
    /// Remove overlays and end the session
    #[default]
    Deactivate,
    /// Remove overlays, keep the session (and key capture) active
    ClearOnly,
}

// ============================================================================
// Settings root
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub appearance: AppearanceSettings,

    #[serde(default)]
    pub label_scheme: LabelScheme,

    #[serde(default)]
    pub activation_policy: ActivationPolicy,

    #[serde(default)]
    pub escape_policy: EscapePolicy,

    /// Fraction of the viewport height kept labeled above and below
    #[serde(default = "default_viewport_buffer")]
    pub viewport_buffer: f64,

    #[serde(default = "default_scroll_debounce_ms")]
    pub scroll_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            appearance: AppearanceSettings::default(),
            label_scheme: LabelScheme::default(),
            activation_policy: ActivationPolicy::default(),
            escape_policy: EscapePolicy::default(),
            viewport_buffer: default_viewport_buffer(),
            scroll_debounce_ms: default_scroll_debounce_ms(),
        }
    }
}

impl Settings {
    /// Whether an exact match on `scheme` must be confirmed with Enter.
    pub fn requires_confirmation(&self) -> bool {
        match self.activation_policy {
            ActivationPolicy::Immediate => false,
            ActivationPolicy::ConfirmNonDefault => self.label_scheme != LabelScheme::Default,
        }
    }
}

// Serde default helpers
fn default_background() -> String { "#FFFF00".to_string() }
fn default_text_color() -> String { "#000000".to_string() }
fn default_font_size() -> String { "1rem".to_string() }
fn default_line_height() -> String { "1.3rem".to_string() }
fn default_font_weight() -> String { "500".to_string() }
fn default_text_shadow() -> String { "0 1px 1px rgba(0,0,0,0.1)".to_string() }
fn default_viewport_buffer() -> f64 { 0.5 }
fn default_scroll_debounce_ms() -> u64 { 150 }
