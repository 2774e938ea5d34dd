use crate::settings::settings::AppearanceSettings;

/// Color applied to the characters the user has already typed.
pub const TYPED_COLOR: &str = "#ff3366";

const ROOT_FONT_PX: f64 = 16.0;
const MIN_BADGE_WIDTH_PX: f64 = 20.0;
/// Average advance of a label glyph relative to the font size.
const GLYPH_ADVANCE: f64 = 0.6;

/// Resolved badge appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub background_color: String,
    pub text_color: String,
    pub font_size: String,
    pub padding_px: u8,
    pub line_height: String,
    pub font_weight: String,
    pub text_shadow: String,
}

impl OverlayStyle {
    pub fn from_appearance(appearance: &AppearanceSettings) -> Self {
        Self {
            background_color: appearance.background_color.clone(),
            text_color: appearance.text_color.clone(),
            font_size: appearance.font_size.clone(),
            padding_px: appearance.padding.pixels(),
            line_height: appearance.line_height.clone(),
            font_weight: appearance.font_weight.clone(),
            text_shadow: appearance.text_shadow.clone(),
        }
    }

    /// Inline CSS for the badge container. Position is set separately.
    pub fn css_text(&self) -> String {
        format!(
            "position: absolute; \
             background: linear-gradient(135deg, {bg} 0%, rgba(255,255,255,0.9) 100%); \
             color: {fg}; font-size: {size}; \
             padding-left: {pad}px; padding-right: {pad}px; \
             line-height: {lh}; border-radius: 4px; z-index: 2147483647; \
             pointer-events: none; \
             box-shadow: 0 2px 4px rgba(0,0,0,0.1), 0 0 1px rgba(0,0,0,0.1); \
             font-family: -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif; \
             font-weight: {weight}; letter-spacing: 0.5px; text-align: center; \
             min-width: {min}px; transform: translate(-50%, 0); \
             text-shadow: {shadow};",
            bg = self.background_color,
            fg = self.text_color,
            size = self.font_size,
            pad = self.padding_px,
            lh = self.line_height,
            weight = self.font_weight,
            min = MIN_BADGE_WIDTH_PX,
            shadow = self.text_shadow,
        )
    }

    /// Inline CSS for one glyph of a partially typed label.
    pub fn glyph_css(&self, typed: bool) -> String {
        if typed {
            format!(
                "color: {}; display: inline-block; transform: scale(1.1);",
                TYPED_COLOR
            )
        } else {
            format!("color: {}; display: inline-block;", self.text_color)
        }
    }

    pub fn font_px(&self) -> f64 {
        css_length_px(&self.font_size, ROOT_FONT_PX).unwrap_or(ROOT_FONT_PX)
    }

    pub fn line_height_px(&self) -> f64 {
        let font = self.font_px();
        css_length_px(&self.line_height, font).unwrap_or(font * 1.3)
    }

    /// Approximate rendered size of a badge for `label`.
    ///
    /// Used by hosts that do not lay text out themselves.
    pub fn estimated_size(&self, label: &str) -> (f64, f64) {
        let text = label.chars().count() as f64 * self.font_px() * GLYPH_ADVANCE;
        let width = (text + 2.0 * self.padding_px as f64).max(MIN_BADGE_WIDTH_PX);
        (width, self.line_height_px())
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from_appearance(&AppearanceSettings::default())
    }
}

/// Parse `12px`, `1.2rem`, `1.5em`, or a bare multiplier like `1.3`.
///
/// `em` and bare numbers scale `relative_to`; `rem` scales the root size.
pub fn css_length_px(value: &str, relative_to: f64) -> Option<f64> {
    let value = value.trim();
    if let Some(n) = value.strip_suffix("px") {
        n.trim().parse().ok()
    } else if let Some(n) = value.strip_suffix("rem") {
        n.trim().parse::<f64>().ok().map(|n| n * ROOT_FONT_PX)
    } else if let Some(n) = value.strip_suffix("em") {
        n.trim().parse::<f64>().ok().map(|n| n * relative_to)
    } else {
        value.parse::<f64>().ok().map(|n| n * relative_to)
    }
}
