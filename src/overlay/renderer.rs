use crate::error::SurfError;
use crate::overlay::style::OverlayStyle;
use crate::page::geometry::{BadgePosition, Rect, Viewport};
use crate::page::host::PageHost;
use crate::page::page_model::OverlayHandle;

/// Everything a host needs to draw one badge.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub label: String,
    /// How many leading characters the user has already typed
    pub typed: usize,
    pub position: BadgePosition,
    pub style: OverlayStyle,
}

/// One character of a badge, flagged if already typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelGlyph {
    pub ch: char,
    pub typed: bool,
}

impl Badge {
    pub fn glyphs(&self) -> Vec<LabelGlyph> {
        self.label
            .chars()
            .enumerate()
            .map(|(i, ch)| LabelGlyph {
                ch,
                typed: i < self.typed,
            })
            .collect()
    }

    /// Rendered box in page coordinates, using the style's size estimate.
    pub fn estimated_page_rect(&self) -> Rect {
        let (width, height) = self.style.estimated_size(&self.label);
        Rect::new(
            self.position.left - width / 2.0,
            self.position.top,
            width,
            height,
        )
    }
}

/// A badge the engine has placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOverlay {
    pub handle: OverlayHandle,
    pub label: String,
    pub position: BadgePosition,
    pub typed: usize,
}

/// Draws, moves, highlights, and removes badges through a [`PageHost`].
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: OverlayStyle) {
        self.style = style;
    }

    fn badge(&self, label: &str, typed: usize, position: BadgePosition) -> Badge {
        Badge {
            label: label.to_string(),
            typed,
            position,
            style: self.style.clone(),
        }
    }

    /// Create a badge for an element whose viewport-relative box is `rect`.
    pub fn place(
        &self,
        host: &mut dyn PageHost,
        label: &str,
        rect: &Rect,
        viewport: &Viewport,
    ) -> Result<PlacedOverlay, SurfError> {
        let position = BadgePosition::for_element(rect, viewport);
        let handle = host.create_overlay(&self.badge(label, 0, position))?;
        Ok(PlacedOverlay {
            handle,
            label: label.to_string(),
            position,
            typed: 0,
        })
    }

    /// Move a badge to follow its element. No host call if nothing moved.
    pub fn reposition(
        &self,
        host: &mut dyn PageHost,
        overlay: &mut PlacedOverlay,
        rect: &Rect,
        viewport: &Viewport,
    ) {
        let position = BadgePosition::for_element(rect, viewport);
        if position != overlay.position {
            overlay.position = position;
            host.update_overlay(
                overlay.handle,
                &self.badge(&overlay.label, overlay.typed, position),
            );
        }
    }

    /// Mark the first `typed` characters of the badge as already entered.
    pub fn highlight(&self, host: &mut dyn PageHost, overlay: &mut PlacedOverlay, typed: usize) {
        let typed = typed.min(overlay.label.chars().count());
        if typed != overlay.typed {
            overlay.typed = typed;
            host.update_overlay(
                overlay.handle,
                &self.badge(&overlay.label, typed, overlay.position),
            );
        }
    }

    pub fn remove(&self, host: &mut dyn PageHost, overlay: &PlacedOverlay) {
        host.remove_overlay(overlay.handle);
    }
}
