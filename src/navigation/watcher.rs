use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::engine::LabelEngine;
use crate::page::host::PageHost;

/// Which mechanism noticed a possible navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationSource {
    /// A batch of structural DOM mutations
    #[default]
    Mutation,
    /// `history.pushState` was called
    PushState,
    /// `history.replaceState` was called
    ReplaceState,
    /// `popstate` fired
    PopState,
}

impl NavigationSource {
    /// History writes count as navigation even when the path is unchanged.
    fn always_navigates(&self) -> bool {
        matches!(self, NavigationSource::PushState | NavigationSource::ReplaceState)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEvent {
    pub from: String,
    pub to: String,
    pub source: NavigationSource,
}

/// Receives navigation notifications from a [`PageChangeWatcher`].
pub trait NavigationListener {
    fn on_navigation(&mut self, host: &mut dyn PageHost, event: &NavigationEvent);
}

impl NavigationListener for LabelEngine {
    fn on_navigation(&mut self, host: &mut dyn PageHost, _event: &NavigationEvent) {
        self.on_navigate(host);
    }
}

/// Best-effort single-page-app navigation detector.
///
/// Compares the location path seen on each signal with the last one.
/// Nothing guarantees that every navigation produces a signal.
#[derive(Debug, Clone)]
pub struct PageChangeWatcher {
    last_path: String,
}

impl PageChangeWatcher {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            last_path: initial_path.into(),
        }
    }

    /// Start from the host's current location.
    pub fn for_host(host: &dyn PageHost) -> Self {
        Self::new(host.location_path())
    }

    pub fn last_path(&self) -> &str {
        &self.last_path
    }

    /// Decide whether `current_path` observed via `source` is a navigation.
    pub fn observe(&mut self, current_path: &str, source: NavigationSource) -> Option<NavigationEvent> {
        if current_path == self.last_path && !source.always_navigates() {
            return None;
        }

        let event = NavigationEvent {
            from: std::mem::replace(&mut self.last_path, current_path.to_string()),
            to: current_path.to_string(),
            source,
        };
        debug!(from = %event.from, to = %event.to, ?source, "navigation detected");
        Some(event)
    }

    /// Read the host location and notify `listener` if it navigated.
    pub fn signal(
        &mut self,
        host: &mut dyn PageHost,
        source: NavigationSource,
        listener: &mut dyn NavigationListener,
    ) -> Option<NavigationEvent> {
        let path = host.location_path();
        let event = self.observe(&path, source)?;
        listener.on_navigation(host, &event);
        Some(event)
    }
}
