use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::SurfError;
use crate::overlay::renderer::Badge;
use crate::page::geometry::{Rect, Viewport};
use crate::page::host::{Capture, PageHost};
use crate::page::page_model::{ElementAction, ElementId, ElementInfo, OverlayHandle};

// ============================================================================
// Fixture model
// ============================================================================

/// One element of a page fixture. `rect` is page-absolute.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementFixture {
    /// Explicit id; defaults to the position in the fixture
    #[serde(default)]
    pub id: Option<u64>,
    pub tag: String,
    #[serde(default)]
    pub input_type: Option<String>,
    pub rect: Rect,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub inline_pointer: bool,
    #[serde(default)]
    pub hover_pointer: bool,
    /// Clicking this element fails
    #[serde(default)]
    pub click_fails: bool,
}

/// A whole page: location, viewport, and elements in document order.
#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub elements: Vec<ElementFixture>,
}

fn default_path() -> String {
    "/".to_string()
}

// ============================================================================
// SimulatedPage
// ============================================================================

#[derive(Debug, Clone)]
struct SimElement {
    id: ElementId,
    tag: String,
    input_type: Option<String>,
    /// Page-absolute
    rect: Rect,
    cursor: Option<String>,
    inline_pointer: bool,
    hover_pointer: bool,
    click_fails: bool,
}

/// In-memory document implementing [`PageHost`].
///
/// Element boxes are stored page-absolute and reported viewport-relative,
/// so scrolling moves them the way a browser would. Overlay boxes are
/// sized with [`crate::overlay::style::OverlayStyle::estimated_size`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedPage {
    path: String,
    viewport: Viewport,
    elements: Vec<SimElement>,
    /// Removed from the document but still referenced
    detached: Vec<SimElement>,
    next_id: u64,
    overlays: BTreeMap<OverlayHandle, Badge>,
    next_overlay: u64,
    fail_overlays_after: Option<usize>,
    fail_next_overlay: bool,
    focused: Option<ElementId>,
    /// Hidden input holding focus while keys are captured
    focus_sink: bool,
    actions: Vec<(ElementId, ElementAction)>,
    captures: BTreeSet<Capture>,
}

impl SimulatedPage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            path: default_path(),
            viewport,
            ..Self::default()
        }
    }

    pub fn from_fixture(fixture: &PageFixture) -> Self {
        let mut page = Self::new(fixture.viewport);
        page.path = fixture.path.clone();
        for (index, el) in fixture.elements.iter().enumerate() {
            let id = ElementId(el.id.unwrap_or(index as u64));
            page.next_id = page.next_id.max(id.0 + 1);
            page.elements.push(SimElement {
                id,
                tag: el.tag.to_ascii_lowercase(),
                input_type: el.input_type.clone(),
                rect: el.rect,
                cursor: el.cursor.clone(),
                inline_pointer: el.inline_pointer,
                hover_pointer: el.hover_pointer,
                click_fails: el.click_fails,
            });
        }
        page
    }

    /// Append an element; `rect` is page-absolute.
    pub fn add_element(&mut self, tag: &str, rect: Rect) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.push(SimElement {
            id,
            tag: tag.to_ascii_lowercase(),
            input_type: None,
            rect,
            cursor: None,
            inline_pointer: false,
            hover_pointer: false,
            click_fails: false,
        });
        id
    }

    pub fn add_input(&mut self, input_type: &str, rect: Rect) -> ElementId {
        let id = self.add_element("input", rect);
        if let Some(el) = self.find_mut(id) {
            el.input_type = Some(input_type.to_string());
        }
        id
    }

    /// Non-interactive tag whose computed cursor is `pointer`.
    pub fn add_pointer_element(&mut self, tag: &str, rect: Rect) -> ElementId {
        let id = self.add_element(tag, rect);
        if let Some(el) = self.find_mut(id) {
            el.cursor = Some("pointer".to_string());
        }
        id
    }

    /// Remove an element from the document.
    pub fn detach(&mut self, id: ElementId) {
        if let Some(pos) = self.elements.iter().position(|el| el.id == id) {
            self.detached.push(self.elements.remove(pos));
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    /// Put a detached element back at the end of the document, same id.
    pub fn reattach(&mut self, id: ElementId) {
        if let Some(pos) = self.detached.iter().position(|el| el.id == id) {
            let el = self.detached.remove(pos);
            self.elements.push(el);
        }
    }

    pub fn move_element(&mut self, id: ElementId, rect: Rect) {
        if let Some(el) = self.find_mut(id) {
            el.rect = rect;
        }
    }

    pub fn set_click_fails(&mut self, id: ElementId, fails: bool) {
        if let Some(el) = self.find_mut(id) {
            el.click_fails = fails;
        }
    }

    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.viewport.scroll_x = x;
        self.viewport.scroll_y = y;
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_string();
    }

    /// Let `n` more overlays be created, then refuse the rest.
    pub fn fail_overlays_after(&mut self, n: usize) {
        self.fail_overlays_after = Some(n);
    }

    /// Refuse only the next overlay.
    pub fn fail_next_overlay(&mut self) {
        self.fail_next_overlay = true;
    }

    pub fn set_focus(&mut self, id: Option<ElementId>) {
        self.focused = id;
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Every badge currently drawn, in creation order.
    pub fn badges(&self) -> Vec<&Badge> {
        self.overlays.values().collect()
    }

    pub fn badge_labels(&self) -> Vec<String> {
        self.overlays.values().map(|b| b.label.clone()).collect()
    }

    /// Clicks and focus moves, oldest first.
    pub fn actions(&self) -> &[(ElementId, ElementAction)] {
        &self.actions
    }

    pub fn clicked(&self) -> Vec<ElementId> {
        self.actions
            .iter()
            .filter(|(_, a)| *a == ElementAction::Click)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    pub fn has_focus_sink(&self) -> bool {
        self.focus_sink
    }

    pub fn is_captured(&self, capture: Capture) -> bool {
        self.captures.contains(&capture)
    }

    fn find(&self, id: ElementId) -> Option<&SimElement> {
        self.elements.iter().find(|el| el.id == id)
    }

    fn find_mut(&mut self, id: ElementId) -> Option<&mut SimElement> {
        self.elements.iter_mut().find(|el| el.id == id)
    }

    fn record(&mut self, id: ElementId, action: ElementAction) -> Result<(), SurfError> {
        let el = self.find(id).ok_or_else(|| SurfError::HostAction {
            element: id,
            action: action.to_string(),
            reason: "element is no longer attached".into(),
        })?;

        if action == ElementAction::Click && el.click_fails {
            return Err(SurfError::HostAction {
                element: id,
                action: action.to_string(),
                reason: "click handler threw".into(),
            });
        }

        self.actions.push((id, action));
        if action == ElementAction::Focus {
            self.focused = Some(id);
        }
        Ok(())
    }
}

impl PageHost for SimulatedPage {
    fn document_elements(&self) -> Vec<ElementId> {
        self.elements.iter().map(|el| el.id).collect()
    }

    fn describe(&self, id: ElementId) -> Option<ElementInfo> {
        let el = self.find(id)?;
        Some(ElementInfo {
            tag: el.tag.clone(),
            input_type: el.input_type.clone(),
            inline_pointer: el.inline_pointer,
            cursor: el.cursor.clone(),
            hover_pointer: el.hover_pointer,
            rect: Rect {
                left: el.rect.left - self.viewport.scroll_x,
                top: el.rect.top - self.viewport.scroll_y,
                ..el.rect
            },
        })
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn location_path(&self) -> String {
        self.path.clone()
    }

    fn create_overlay(&mut self, badge: &Badge) -> Result<OverlayHandle, SurfError> {
        let refused = match self.fail_overlays_after {
            Some(0) => true,
            Some(remaining) => {
                self.fail_overlays_after = Some(remaining - 1);
                false
            }
            None => false,
        };
        if refused || std::mem::take(&mut self.fail_next_overlay) {
            return Err(SurfError::OverlayCreate {
                label: badge.label.clone(),
                reason: "document body unavailable".into(),
            });
        }

        let handle = OverlayHandle(self.next_overlay);
        self.next_overlay += 1;
        self.overlays.insert(handle, badge.clone());
        Ok(handle)
    }

    fn update_overlay(&mut self, handle: OverlayHandle, badge: &Badge) {
        if let Some(existing) = self.overlays.get_mut(&handle) {
            *existing = badge.clone();
        }
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        self.overlays.remove(&handle);
    }

    fn remove_all_overlays(&mut self) {
        self.overlays.clear();
    }

    fn overlay_rect(&self, handle: OverlayHandle) -> Option<Rect> {
        let page = self.overlays.get(&handle)?.estimated_page_rect();
        Some(Rect {
            left: page.left - self.viewport.scroll_x,
            top: page.top - self.viewport.scroll_y,
            ..page
        })
    }

    fn click(&mut self, id: ElementId) -> Result<(), SurfError> {
        self.record(id, ElementAction::Click)
    }

    fn focus(&mut self, id: ElementId) -> Result<(), SurfError> {
        self.record(id, ElementAction::Focus)
    }

    fn blur_active(&mut self) {
        self.focused = None;
        if self.captures.contains(&Capture::Keyboard) {
            self.focus_sink = true;
        }
    }

    fn active_element(&self) -> Option<ElementId> {
        self.focused
    }

    fn set_capture(&mut self, capture: Capture, armed: bool) {
        if armed {
            self.captures.insert(capture);
        } else {
            self.captures.remove(&capture);
            if capture == Capture::Keyboard {
                self.focus_sink = false;
            }
        }
    }
}
