use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use web_time::Instant;

use crate::engine::debounce::{Debouncer, ScrollTicket};
use crate::engine::mapping::LabelMap;
use crate::error::SurfError;
use crate::label::allocator::label;
use crate::overlay::collision;
use crate::overlay::renderer::{OverlayRenderer, PlacedOverlay};
use crate::overlay::style::OverlayStyle;
use crate::page::geometry::{Rect, VisibleWindow};
use crate::page::host::{Capture, PageHost};
use crate::page::page_model::{ElementAction, ElementId, ElementInfo};
use crate::scan::scanner::scan_described;
use crate::settings::settings::{AppearanceSettings, EscapePolicy, Settings};

// ============================================================================
// Engine state and outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Inactive,
    Active,
}

/// An element the engine clicked or focused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    pub element: ElementId,
    /// Label that selected it; `None` for focus-driven activation
    pub label: Option<String>,
    pub action: ElementAction,
}

/// What one accepted keystroke did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// No session, or nothing to confirm
    Ignored,
    /// Buffer is a strict prefix of `matches` live labels
    Narrowed { matches: usize },
    /// Buffer matched nothing and was cleared
    Reset,
    /// Buffer equals a label but activation waits for Enter
    AwaitingConfirmation { element: ElementId, label: String },
    Activated(Activation),
}

/// Counters from one placement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlacementReport {
    pub candidates: usize,
    pub placed: usize,
    pub kept: usize,
    pub removed: usize,
    pub suppressed: usize,
    /// Candidates in view that got no label (capacity or label clash)
    pub skipped: usize,
}

// ============================================================================
// LabelEngine
// ============================================================================

/// Owns one page's overlay session.
///
/// All page access goes through the `&mut dyn PageHost` passed into each
/// call; the engine itself holds only the label mapping, the typed buffer,
/// and settings. Every call runs to completion, so the mapping is never
/// observed half-updated.
#[derive(Debug)]
pub struct LabelEngine {
    state: SessionState,
    settings: Settings,
    renderer: OverlayRenderer,
    map: LabelMap,
    typed: String,
    pending: Option<ElementId>,
    debouncer: Debouncer,
}

impl LabelEngine {
    pub fn new(settings: Settings) -> Self {
        let renderer = OverlayRenderer::new(OverlayStyle::from_appearance(&settings.appearance));
        let debouncer = Debouncer::new(Duration::from_millis(settings.scroll_debounce_ms));
        Self {
            state: SessionState::Inactive,
            settings,
            renderer,
            map: LabelMap::new(),
            typed: String::new(),
            pending: None,
            debouncer,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn overlay_count(&self) -> usize {
        self.map.len()
    }

    pub fn label_of(&self, element: ElementId) -> Option<&str> {
        self.map.label_of(element)
    }

    pub fn element_for(&self, label: &str) -> Option<ElementId> {
        self.map.element_for(label)
    }

    /// Live `(label, element)` pairs in label order.
    pub fn labels(&self) -> Vec<(String, ElementId)> {
        self.map.labels()
    }

    pub fn pending_confirmation(&self) -> Option<ElementId> {
        self.pending
    }

    pub fn scroll_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Replace settings without touching the page.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.renderer
            .set_style(OverlayStyle::from_appearance(&settings.appearance));
        self.debouncer
            .set_wait(Duration::from_millis(settings.scroll_debounce_ms));
        self.settings = settings;
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Flip between inactive and active.
    pub fn toggle(&mut self, host: &mut dyn PageHost) -> Result<SessionState, SurfError> {
        self.cleanup(host);
        match self.state {
            SessionState::Inactive => {
                self.activate(host)?;
            }
            SessionState::Active => self.deactivate(host),
        }
        Ok(self.state)
    }

    /// Start a session: arm listeners and label everything in view.
    ///
    /// If the first placement pass fails the session is left inactive.
    pub fn activate(&mut self, host: &mut dyn PageHost) -> Result<PlacementReport, SurfError> {
        self.cleanup(host);
        self.state = SessionState::Active;
        host.set_capture(Capture::Scroll, true);
        host.set_capture(Capture::Keyboard, true);
        host.set_capture(Capture::Mutations, true);

        match self.refresh(host) {
            Ok(report) => {
                info!(scheme = %self.settings.label_scheme, placed = report.placed, "overlay session started");
                Ok(report)
            }
            Err(e) => {
                self.deactivate(host);
                Err(e)
            }
        }
    }

    /// End the session: disarm listeners and remove every overlay.
    pub fn deactivate(&mut self, host: &mut dyn PageHost) {
        self.cleanup(host);
        self.debouncer.cancel();
        host.set_capture(Capture::Scroll, false);
        host.set_capture(Capture::Keyboard, false);
        host.set_capture(Capture::Mutations, false);
        if self.state == SessionState::Active {
            info!("overlay session ended");
        }
        self.state = SessionState::Inactive;
    }

    /// Remove all overlays and forget every label and typed character.
    pub fn cleanup(&mut self, host: &mut dyn PageHost) {
        for overlay in self.map.drain() {
            self.renderer.remove(host, &overlay);
        }
        host.remove_all_overlays();
        self.typed.clear();
        self.pending = None;
    }

    /// The page navigated: drop everything but stay in the current state.
    pub fn on_navigate(&mut self, host: &mut dyn PageHost) {
        debug!(active = self.is_active(), "navigation observed, clearing overlays");
        self.cleanup(host);
    }

    /// Escape pressed during a session.
    pub fn escape(&mut self, host: &mut dyn PageHost) -> SessionState {
        match self.settings.escape_policy {
            EscapePolicy::Deactivate => self.deactivate(host),
            EscapePolicy::ClearOnly => self.cleanup(host),
        }
        self.state
    }

    /// New appearance; live overlays are rebuilt with it.
    pub fn update_appearance(
        &mut self,
        host: &mut dyn PageHost,
        appearance: AppearanceSettings,
    ) -> Result<(), SurfError> {
        let mut settings = self.settings.clone();
        settings.appearance = appearance;
        self.update_settings(host, settings)
    }

    pub fn update_settings(
        &mut self,
        host: &mut dyn PageHost,
        settings: Settings,
    ) -> Result<(), SurfError> {
        self.apply_settings(settings);
        if self.is_active() {
            self.cleanup(host);
            self.refresh(host)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------------

    /// Record a scroll event. Returns the ticket a timer-driven host should
    /// hand back to [`LabelEngine::on_scroll_timer`] after the debounce wait.
    pub fn on_scroll(&mut self, now: Instant) -> Option<ScrollTicket> {
        if !self.is_active() {
            return None;
        }
        Some(self.debouncer.schedule(now))
    }

    /// Run the pending placement pass if its debounce deadline has passed.
    pub fn poll_scroll(
        &mut self,
        host: &mut dyn PageHost,
        now: Instant,
    ) -> Result<Option<PlacementReport>, SurfError> {
        if !self.debouncer.take_due(now) || !self.is_active() {
            return Ok(None);
        }
        self.refresh(host).map(Some)
    }

    /// Timer callback for a ticket issued by [`LabelEngine::on_scroll`].
    /// Superseded tickets and tickets firing after deactivation do nothing.
    pub fn on_scroll_timer(
        &mut self,
        host: &mut dyn PageHost,
        ticket: ScrollTicket,
    ) -> Result<Option<PlacementReport>, SurfError> {
        if !self.debouncer.take_ticket(ticket) || !self.is_active() {
            return Ok(None);
        }
        self.refresh(host).map(Some)
    }

    // ------------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------------

    /// Rescan and bring overlays in line with the visible window.
    ///
    /// New overlays are created before anything is removed; if the host
    /// rejects one, the overlays created so far are taken down again and the
    /// previous mapping stays as it was.
    pub fn refresh(&mut self, host: &mut dyn PageHost) -> Result<PlacementReport, SurfError> {
        let candidates = scan_described(host);
        let viewport = host.viewport();
        let window = VisibleWindow::around(&viewport, self.settings.viewport_buffer);
        let scheme = self.settings.label_scheme;

        let mut report = PlacementReport {
            candidates: candidates.len(),
            ..PlacementReport::default()
        };

        let live: HashSet<ElementId> = candidates.iter().map(|(id, _)| *id).collect();
        let mut kept: Vec<(ElementId, Rect)> = Vec::new();
        let mut leaving: Vec<ElementId> = Vec::new();
        let mut in_view: Vec<(usize, ElementId, Rect)> = Vec::new();

        for (index, (id, info)) in candidates.iter().enumerate() {
            let page = info.rect.to_page(&viewport);
            let visible = window.intersects(page.top, page.bottom());
            match (visible, self.map.contains(*id)) {
                (true, true) => kept.push((*id, info.rect)),
                (true, false) => in_view.push((index, *id, info.rect)),
                (false, true) => leaving.push(*id),
                (false, false) => {}
            }
        }

        // Labels still owned after this pass; new labels must avoid them
        let mut reserved: HashSet<String> = kept
            .iter()
            .filter_map(|(id, _)| self.map.label_of(*id).map(str::to_string))
            .collect();

        let mut planned: Vec<(ElementId, String, Rect)> = Vec::new();
        for (index, id, rect) in in_view {
            let text = label(index, scheme);
            if text.is_empty() || !reserved.insert(text.clone()) {
                report.skipped += 1;
                continue;
            }
            planned.push((id, text, rect));
        }

        let mut created: Vec<(ElementId, PlacedOverlay)> = Vec::with_capacity(planned.len());
        for (id, text, rect) in &planned {
            match self.renderer.place(host, text, rect, &viewport) {
                Ok(overlay) => created.push((*id, overlay)),
                Err(e) => {
                    warn!(error = %e, "placement pass aborted, rolling back");
                    for (_, overlay) in &created {
                        self.renderer.remove(host, overlay);
                    }
                    return Err(e);
                }
            }
        }

        // Commit
        for overlay in self.map.retain_live(&live) {
            self.renderer.remove(host, &overlay);
            report.removed += 1;
        }
        for id in leaving {
            if let Some(overlay) = self.map.remove(id) {
                self.renderer.remove(host, &overlay);
                report.removed += 1;
            }
        }
        for (id, rect) in &kept {
            if let Some(overlay) = self.map.get_mut(*id) {
                self.renderer.reposition(host, overlay, rect, &viewport);
            }
        }
        report.kept = kept.len();
        report.placed = created.len();
        for (id, overlay) in created {
            self.map.insert(id, overlay);
        }

        report.suppressed = self.suppress_collisions(host, &candidates);

        let reset = self.drop_stale_input();
        if reset || !self.typed.is_empty() {
            self.highlight_matches(host);
        }

        debug!(
            candidates = report.candidates,
            placed = report.placed,
            kept = report.kept,
            removed = report.removed,
            suppressed = report.suppressed,
            skipped = report.skipped,
            "placement pass"
        );
        Ok(report)
    }

    /// Forget typed input that no longer leads anywhere after a pass.
    ///
    /// A pending element must still carry its badge, and the buffer must
    /// still prefix some live label. Returns whether the buffer was cleared.
    fn drop_stale_input(&mut self) -> bool {
        if self.pending.is_some_and(|element| !self.map.contains(element)) {
            debug!("pending element lost its overlay");
            self.pending = None;
        }
        if self.typed.is_empty() || !self.map.with_prefix(&self.typed).is_empty() {
            return false;
        }
        debug!(typed = %self.typed, "no live label left for buffer, resetting");
        self.typed.clear();
        self.pending = None;
        true
    }

    fn suppress_collisions(
        &mut self,
        host: &mut dyn PageHost,
        candidates: &[(ElementId, ElementInfo)],
    ) -> usize {
        let boxes: Vec<(ElementId, Rect)> = candidates
            .iter()
            .filter_map(|(id, _)| {
                let overlay = self.map.get(*id)?;
                host.overlay_rect(overlay.handle).map(|rect| (*id, rect))
            })
            .collect();

        let suppressed = collision::resolve(&boxes);
        for id in &suppressed {
            if let Some(overlay) = self.map.remove(*id) {
                self.renderer.remove(host, &overlay);
            }
        }
        suppressed.len()
    }

    // ------------------------------------------------------------------------
    // Keystrokes
    // ------------------------------------------------------------------------

    /// Feed one accepted label character.
    pub fn on_key(&mut self, host: &mut dyn PageHost, ch: char) -> Result<KeyOutcome, SurfError> {
        if !self.is_active() {
            return Ok(KeyOutcome::Ignored);
        }

        host.blur_active();
        if self.map.is_empty() {
            self.refresh(host)?;
        }

        self.typed.push(ch);
        let matches = self.map.with_prefix(&self.typed);

        if matches.is_empty() {
            debug!(typed = %self.typed, "no label matches, resetting buffer");
            self.typed.clear();
            self.pending = None;
            self.highlight_matches(host);
            return Ok(KeyOutcome::Reset);
        }

        self.highlight_matches(host);

        let Some(element) = self.map.element_for(&self.typed) else {
            self.pending = None;
            return Ok(KeyOutcome::Narrowed {
                matches: matches.len(),
            });
        };

        let label = self.typed.clone();
        if self.settings.requires_confirmation() || matches.len() > 1 {
            debug!(%label, "exact match awaiting confirmation");
            self.pending = Some(element);
            return Ok(KeyOutcome::AwaitingConfirmation { element, label });
        }

        self.fire(host, element, Some(label)).map(KeyOutcome::Activated)
    }

    /// Enter pressed: activate the exact match held for confirmation.
    pub fn confirm(&mut self, host: &mut dyn PageHost) -> Result<KeyOutcome, SurfError> {
        if !self.is_active() {
            return Ok(KeyOutcome::Ignored);
        }
        let Some(element) = self.pending.take() else {
            return Ok(KeyOutcome::Ignored);
        };
        let label = self.map.label_of(element).map(str::to_string);
        self.fire(host, element, label).map(KeyOutcome::Activated)
    }

    /// Ctrl/Cmd+Enter: act on whatever holds native focus, ignoring labels.
    ///
    /// Buttons and form fields are clicked; anything else is focused.
    pub fn activate_focused(
        &mut self,
        host: &mut dyn PageHost,
    ) -> Result<Option<Activation>, SurfError> {
        let Some(element) = host.active_element() else {
            return Ok(None);
        };
        let clickable = host
            .describe(element)
            .is_some_and(|info| matches!(info.tag.as_str(), "button" | "input" | "textarea"));

        let action = if clickable {
            host.click(element)?;
            ElementAction::Click
        } else {
            host.focus(element)?;
            ElementAction::Focus
        };

        Ok(Some(Activation {
            element,
            label: None,
            action,
        }))
    }

    /// Tear the session down, then click or focus `element`.
    ///
    /// The session is already inactive when the host acts, so a failing
    /// click leaves no overlays behind.
    fn fire(
        &mut self,
        host: &mut dyn PageHost,
        element: ElementId,
        label: Option<String>,
    ) -> Result<Activation, SurfError> {
        let action = match host.describe(element) {
            Some(info) if info.is_text_input() => ElementAction::Focus,
            _ => ElementAction::Click,
        };

        self.deactivate(host);
        info!(%element, ?label, %action, "activating element");

        match action {
            ElementAction::Focus => host.focus(element)?,
            ElementAction::Click => host.click(element)?,
        }

        Ok(Activation {
            element,
            label,
            action,
        })
    }

    /// Redraw every overlay so that its typed prefix is highlighted.
    fn highlight_matches(&mut self, host: &mut dyn PageHost) {
        let typed_len = self.typed.chars().count();
        for element in self.map.elements() {
            if let Some(overlay) = self.map.get_mut(element) {
                let n = if overlay.label.starts_with(self.typed.as_str()) {
                    typed_len
                } else {
                    0
                };
                self.renderer.highlight(host, overlay, n);
            }
        }
    }
}

impl Default for LabelEngine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
