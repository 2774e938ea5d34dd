#![allow(dead_code)]

use std::path::PathBuf;

use ninja_surfing::engine::engine::LabelEngine;
use ninja_surfing::label::allocator::LabelScheme;
use ninja_surfing::page::geometry::{Rect, Viewport};
use ninja_surfing::page::page_model::ElementId;
use ninja_surfing::page::simulated::SimulatedPage;
use ninja_surfing::settings::settings::{ActivationPolicy, EscapePolicy, Settings};

/// Vertical distance between stacked test links; far enough apart that
/// their badges never collide.
pub const ROW_PX: f64 = 40.0;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// 1280x800 page with `count` links stacked `ROW_PX` apart.
pub fn link_column(count: usize) -> (SimulatedPage, Vec<ElementId>) {
    let mut page = SimulatedPage::new(Viewport::default());
    let ids = (0..count)
        .map(|i| page.add_element("a", row(i)))
        .collect();
    (page, ids)
}

/// Page-absolute box of row `i` in a link column.
pub fn row(i: usize) -> Rect {
    Rect::new(10.0, i as f64 * ROW_PX, 100.0, 20.0)
}

pub fn settings_with(scheme: LabelScheme, policy: ActivationPolicy) -> Settings {
    Settings {
        label_scheme: scheme,
        activation_policy: policy,
        ..Settings::default()
    }
}

pub fn settings_with_escape(escape: EscapePolicy) -> Settings {
    Settings {
        escape_policy: escape,
        ..Settings::default()
    }
}

/// Engine already activated on `page`.
pub fn active_engine(page: &mut SimulatedPage, settings: Settings) -> LabelEngine {
    let mut engine = LabelEngine::new(settings);
    engine.activate(page).expect("activation should succeed");
    engine
}
