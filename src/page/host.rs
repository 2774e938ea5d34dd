use crate::error::SurfError;
use crate::overlay::renderer::Badge;
use crate::page::geometry::{Rect, Viewport};
use crate::page::page_model::{ElementId, ElementInfo, OverlayHandle};

/// Listeners a session arms while overlays are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capture {
    Scroll,
    Keyboard,
    Mutations,
}

/// Narrow view of a live document.
///
/// The engine never touches a page except through this trait. The browser
/// binding implements it over `web-sys`; [`crate::page::simulated::SimulatedPage`]
/// implements it in memory.
pub trait PageHost {
    /// Every element currently attached to the document, in document order.
    fn document_elements(&self) -> Vec<ElementId>;

    /// Tag, cursor, and geometry for one element. `None` once detached.
    fn describe(&self, id: ElementId) -> Option<ElementInfo>;

    fn viewport(&self) -> Viewport;

    /// Path component of the current location.
    fn location_path(&self) -> String;

    fn create_overlay(&mut self, badge: &Badge) -> Result<OverlayHandle, SurfError>;

    /// Re-render an existing badge (new position or highlight).
    fn update_overlay(&mut self, handle: OverlayHandle, badge: &Badge);

    fn remove_overlay(&mut self, handle: OverlayHandle);

    /// Remove every badge this host ever drew, tracked or not.
    fn remove_all_overlays(&mut self);

    /// Rendered box of a badge, viewport-relative.
    fn overlay_rect(&self, handle: OverlayHandle) -> Option<Rect>;

    fn click(&mut self, id: ElementId) -> Result<(), SurfError>;

    fn focus(&mut self, id: ElementId) -> Result<(), SurfError>;

    /// Drop native focus so typed keys do not land in a page control.
    fn blur_active(&mut self);

    fn active_element(&self) -> Option<ElementId>;

    fn set_capture(&mut self, capture: Capture, armed: bool);
}
