use serde::{Deserialize, Serialize};

/// Axis-aligned box in CSS pixels.
///
/// Hosts report element boxes relative to the viewport (the
/// `getBoundingClientRect` convention); [`Rect::to_page`] shifts them into
/// page-absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Translate a viewport-relative box by the current scroll offset.
    pub fn to_page(&self, viewport: &Viewport) -> Rect {
        Rect {
            left: self.left + viewport.scroll_x,
            top: self.top + viewport.scroll_y,
            ..*self
        }
    }

    /// Overlap test with `buffer` pixels of slack on every side.
    ///
    /// Two boxes count as overlapping unless one is separated from the other
    /// by more than `buffer` along some axis.
    pub fn overlaps(&self, other: &Rect, buffer: f64) -> bool {
        !(self.right() + buffer < other.left
            || self.left > other.right() + buffer
            || self.bottom() + buffer < other.top
            || self.top > other.bottom() + buffer)
    }
}

/// Window size and scroll offset, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

/// Vertical page-coordinate band in which overlays are kept alive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleWindow {
    pub top: f64,
    pub bottom: f64,
}

impl VisibleWindow {
    /// Viewport extended by `buffer * height` above and below.
    pub fn around(viewport: &Viewport, buffer: f64) -> Self {
        let margin = viewport.height * buffer;
        Self {
            top: viewport.scroll_y - margin,
            bottom: viewport.scroll_y + viewport.height + margin,
        }
    }

    /// Whether a page-absolute vertical extent touches the window.
    pub fn intersects(&self, page_top: f64, page_bottom: f64) -> bool {
        page_bottom >= self.top && page_top <= self.bottom
    }
}

/// Where a badge is anchored, in page coordinates.
///
/// `left` is the horizontal center of the element; badges are drawn
/// centered on it (`translate(-50%, 0)`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BadgePosition {
    pub top: f64,
    pub left: f64,
}

impl BadgePosition {
    pub fn for_element(rect: &Rect, viewport: &Viewport) -> Self {
        Self {
            top: rect.top + viewport.scroll_y,
            left: rect.left + viewport.scroll_x + rect.width / 2.0,
        }
    }
}
