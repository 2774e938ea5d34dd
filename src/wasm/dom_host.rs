use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use js_sys::WeakMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, Window};

use crate::error::SurfError;
use crate::overlay::renderer::Badge;
use crate::page::geometry::{Rect, Viewport};
use crate::page::host::{Capture, PageHost};
use crate::page::page_model::{ElementId, ElementInfo, OverlayHandle};

/// Attribute marking every badge this host creates.
pub const OVERLAY_ATTR: &str = "data-link-overlay";
/// Attribute marking the hidden input that takes focus away from the page.
pub const FOCUS_SINK_ATTR: &str = "data-link-overlay-sink";

/// Element identity. The weak map hangs ids off nodes without keeping them
/// alive; `elements` resolves ids back and is pruned on every scan.
struct Registry {
    ids: WeakMap,
    elements: HashMap<u64, Element>,
    next: u64,
}

impl Registry {
    fn id_for(&mut self, element: &Element) -> ElementId {
        if let Some(id) = self.ids.get(element).as_f64() {
            let id = id as u64;
            // A node pruned while detached keeps its id when reattached
            self.elements.entry(id).or_insert_with(|| element.clone());
            return ElementId(id);
        }
        let id = self.next;
        self.next += 1;
        self.ids.set(element, &JsValue::from_f64(id as f64));
        self.elements.insert(id, element.clone());
        ElementId(id)
    }
}

/// [`PageHost`] over the live DOM.
pub struct DomHost {
    window: Window,
    document: Document,
    registry: RefCell<Registry>,
    overlays: HashMap<OverlayHandle, HtmlElement>,
    next_overlay: u64,
    focus_sink: Option<HtmlInputElement>,
    captures: BTreeSet<Capture>,
}

impl DomHost {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self {
            window,
            document,
            registry: RefCell::new(Registry {
                ids: WeakMap::new(),
                elements: HashMap::new(),
                next: 0,
            }),
            overlays: HashMap::new(),
            next_overlay: 0,
            focus_sink: None,
            captures: BTreeSet::new(),
        })
    }

    pub fn is_captured(&self, capture: Capture) -> bool {
        self.captures.contains(&capture)
    }

    /// Whether `element` is the hidden focus sink.
    pub fn is_focus_sink(element: &Element) -> bool {
        element.has_attribute(FOCUS_SINK_ATTR)
    }

    /// Remove the focus sink from the document.
    pub fn release_focus_sink(&mut self) {
        if let Some(sink) = self.focus_sink.take() {
            sink.remove();
        }
    }

    fn element(&self, id: ElementId) -> Option<Element> {
        let element = self.registry.borrow().elements.get(&id.0).cloned()?;
        element.is_connected().then_some(element)
    }

    fn host_error(id: ElementId, action: &str, reason: impl Into<String>) -> SurfError {
        SurfError::HostAction {
            element: id,
            action: action.to_string(),
            reason: reason.into(),
        }
    }

    fn render(&self, node: &HtmlElement, badge: &Badge) {
        let css = format!(
            "{} top: {}px; left: {}px;",
            badge.style.css_text(),
            badge.position.top,
            badge.position.left
        );
        let _ = node.set_attribute("style", &css);

        let mut html = String::new();
        for glyph in badge.glyphs() {
            html.push_str(&format!(
                "<span style=\"{}\">{}</span>",
                badge.style.glyph_css(glyph.typed),
                escape_html(glyph.ch)
            ));
        }
        node.set_inner_html(&html);
    }

    fn ensure_focus_sink(&mut self) -> Option<HtmlInputElement> {
        if let Some(sink) = &self.focus_sink {
            if sink.is_connected() {
                return Some(sink.clone());
            }
        }
        let body = self.document.body()?;
        let sink: HtmlInputElement = self
            .document
            .create_element("input")
            .ok()?
            .dyn_into()
            .ok()?;
        let _ = sink.set_attribute(FOCUS_SINK_ATTR, "");
        let _ = sink.set_attribute(
            "style",
            "position: fixed; top: 0; left: 0; width: 1px; height: 1px; opacity: 0; pointer-events: none;",
        );
        sink.set_tab_index(-1);
        body.append_child(&sink).ok()?;
        self.focus_sink = Some(sink.clone());
        Some(sink)
    }
}

impl PageHost for DomHost {
    fn document_elements(&self) -> Vec<ElementId> {
        let Ok(nodes) = self.document.query_selector_all("*") else {
            return Vec::new();
        };

        let mut registry = self.registry.borrow_mut();
        registry.elements.retain(|_, el| el.is_connected());

        let mut ids = Vec::with_capacity(nodes.length() as usize);
        for i in 0..nodes.length() {
            let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            if element.has_attribute(OVERLAY_ATTR) || Self::is_focus_sink(&element) {
                continue;
            }
            ids.push(registry.id_for(&element));
        }
        ids
    }

    fn describe(&self, id: ElementId) -> Option<ElementInfo> {
        let element = self.element(id)?;
        let tag = element.tag_name().to_ascii_lowercase();
        let input_type = element
            .dyn_ref::<HtmlInputElement>()
            .map(|input| input.type_().to_ascii_lowercase());
        let inline_pointer = element.get_attribute("style").is_some_and(|style| {
            let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
            compact.to_ascii_lowercase().contains("cursor:pointer")
        });
        let cursor = self
            .window
            .get_computed_style(&element)
            .ok()
            .flatten()
            .and_then(|decl| decl.get_property_value("cursor").ok());
        let bounds = element.get_bounding_client_rect();

        Some(ElementInfo {
            tag,
            input_type,
            inline_pointer,
            cursor,
            // Stylesheet :hover rules are not visible through computed style
            hover_pointer: false,
            rect: Rect::new(bounds.left(), bounds.top(), bounds.width(), bounds.height()),
        })
    }

    fn viewport(&self) -> Viewport {
        let number = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport {
            width: number(self.window.inner_width()),
            height: number(self.window.inner_height()),
            scroll_x: self.window.scroll_x().unwrap_or(0.0),
            scroll_y: self.window.scroll_y().unwrap_or(0.0),
        }
    }

    fn location_path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn create_overlay(&mut self, badge: &Badge) -> Result<OverlayHandle, SurfError> {
        let fail = |reason: &str| SurfError::OverlayCreate {
            label: badge.label.clone(),
            reason: reason.to_string(),
        };

        let body = self
            .document
            .body()
            .ok_or_else(|| fail("document body unavailable"))?;
        let node: HtmlElement = self
            .document
            .create_element("span")
            .map_err(|_| fail("createElement failed"))?
            .dyn_into()
            .map_err(|_| fail("not an HTML element"))?;
        node.set_attribute(OVERLAY_ATTR, "")
            .map_err(|_| fail("setAttribute failed"))?;
        self.render(&node, badge);
        body.append_child(&node)
            .map_err(|_| fail("appendChild failed"))?;

        let handle = OverlayHandle(self.next_overlay);
        self.next_overlay += 1;
        self.overlays.insert(handle, node);
        Ok(handle)
    }

    fn update_overlay(&mut self, handle: OverlayHandle, badge: &Badge) {
        if let Some(node) = self.overlays.get(&handle) {
            self.render(node, badge);
        }
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        if let Some(node) = self.overlays.remove(&handle) {
            node.remove();
        }
    }

    fn remove_all_overlays(&mut self) {
        for (_, node) in self.overlays.drain() {
            node.remove();
        }
        let selector = format!("[{}]", OVERLAY_ATTR);
        if let Ok(strays) = self.document.query_selector_all(&selector) {
            for i in 0..strays.length() {
                if let Some(el) = strays.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    el.remove();
                }
            }
        }
    }

    fn overlay_rect(&self, handle: OverlayHandle) -> Option<Rect> {
        let bounds = self.overlays.get(&handle)?.get_bounding_client_rect();
        Some(Rect::new(bounds.left(), bounds.top(), bounds.width(), bounds.height()))
    }

    fn click(&mut self, id: ElementId) -> Result<(), SurfError> {
        let element = self
            .element(id)
            .ok_or_else(|| Self::host_error(id, "click", "element is no longer attached"))?;
        let html: &HtmlElement = element
            .dyn_ref()
            .ok_or_else(|| Self::host_error(id, "click", "not an HTML element"))?;
        html.click();
        Ok(())
    }

    fn focus(&mut self, id: ElementId) -> Result<(), SurfError> {
        let element = self
            .element(id)
            .ok_or_else(|| Self::host_error(id, "focus", "element is no longer attached"))?;
        let html: &HtmlElement = element
            .dyn_ref()
            .ok_or_else(|| Self::host_error(id, "focus", "not an HTML element"))?;
        html.focus()
            .map_err(|e| Self::host_error(id, "focus", format!("{:?}", e)))
    }

    fn blur_active(&mut self) {
        if let Some(active) = self.document.active_element() {
            if Self::is_focus_sink(&active) {
                return;
            }
            if let Some(html) = active.dyn_ref::<HtmlElement>() {
                let _ = html.blur();
            }
        }
        // The sink only exists while keys are captured
        if !self.is_captured(Capture::Keyboard) {
            return;
        }
        if let Some(sink) = self.ensure_focus_sink() {
            let _ = sink.focus();
        }
    }

    fn active_element(&self) -> Option<ElementId> {
        let active = self.document.active_element()?;
        if Self::is_focus_sink(&active) || self.document.body().is_some_and(|b| *b == active) {
            return None;
        }
        Some(self.registry.borrow_mut().id_for(&active))
    }

    fn set_capture(&mut self, capture: Capture, armed: bool) {
        if armed {
            self.captures.insert(capture);
        } else {
            self.captures.remove(&capture);
            if capture == Capture::Keyboard {
                self.release_focus_sink();
            }
        }
    }
}

fn escape_html(ch: char) -> String {
    match ch {
        '<' => "&lt;".to_string(),
        '>' => "&gt;".to_string(),
        '&' => "&amp;".to_string(),
        '"' => "&quot;".to_string(),
        other => other.to_string(),
    }
}
