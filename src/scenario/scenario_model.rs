use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::navigation::watcher::NavigationSource;
use crate::page::simulated::PageFixture;
use crate::settings::settings::Settings;

/// A scripted overlay session against a simulated page.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Human-readable name for this scenario
    pub name: String,

    /// Engine settings before any stored values are applied
    #[serde(default)]
    pub settings: Settings,

    /// Flat extension storage, read on every toggle
    #[serde(default)]
    pub storage: BTreeMap<String, Value>,

    pub page: PageFixture,

    /// Ordered list of steps to execute
    pub steps: Vec<ScenarioStep>,
}

/// A single scenario step: either an input to the engine or an assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Same effect as the toolbar button / keyboard command
    Toggle,

    /// One keydown
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
        #[serde(default)]
        in_text_input: bool,
    },

    /// One keydown per character
    Type { text: String },

    /// Scroll the page and report a scroll event
    Scroll {
        y: f64,
        #[serde(default)]
        x: f64,
    },

    /// Move the debounce clock forward
    Advance { ms: u64 },

    /// Change the location path and signal the watcher
    Navigate {
        path: String,
        #[serde(default)]
        source: NavigationSource,
    },

    /// Deliver a runtime message (the JSON body, `action` included)
    Message { body: Value },

    /// The next overlay the page is asked to create fails
    FailNextOverlay,

    ExpectActive { expected: bool },

    ExpectOverlayCount { expected: usize },

    ExpectLabel { element: u64, label: String },

    ExpectNoOverlay { element: u64 },

    ExpectClicked { element: u64 },

    /// `element: null` expects nothing focused
    ExpectFocused { element: Option<u64> },

    ExpectBuffer { expected: String },

    /// The most recent input step returned an error
    ExpectError {
        #[serde(default)]
        contains: Option<String>,
    },
}

impl ScenarioStep {
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            ScenarioStep::ExpectActive { .. }
                | ScenarioStep::ExpectOverlayCount { .. }
                | ScenarioStep::ExpectLabel { .. }
                | ScenarioStep::ExpectNoOverlay { .. }
                | ScenarioStep::ExpectClicked { .. }
                | ScenarioStep::ExpectFocused { .. }
                | ScenarioStep::ExpectBuffer { .. }
                | ScenarioStep::ExpectError { .. }
        )
    }

    /// Variant name for reports.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioStep::Toggle => "Toggle",
            ScenarioStep::Key { .. } => "Key",
            ScenarioStep::Type { .. } => "Type",
            ScenarioStep::Scroll { .. } => "Scroll",
            ScenarioStep::Advance { .. } => "Advance",
            ScenarioStep::Navigate { .. } => "Navigate",
            ScenarioStep::Message { .. } => "Message",
            ScenarioStep::FailNextOverlay => "FailNextOverlay",
            ScenarioStep::ExpectActive { .. } => "ExpectActive",
            ScenarioStep::ExpectOverlayCount { .. } => "ExpectOverlayCount",
            ScenarioStep::ExpectLabel { .. } => "ExpectLabel",
            ScenarioStep::ExpectNoOverlay { .. } => "ExpectNoOverlay",
            ScenarioStep::ExpectClicked { .. } => "ExpectClicked",
            ScenarioStep::ExpectFocused { .. } => "ExpectFocused",
            ScenarioStep::ExpectBuffer { .. } => "ExpectBuffer",
            ScenarioStep::ExpectError { .. } => "ExpectError",
        }
    }
}

/// Result of evaluating a single assertion step.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssertionResult {
    /// Step index (0-based)
    pub step_index: usize,

    /// Assertion variant name
    pub assertion: String,

    pub passed: bool,

    /// Actual value found (for debugging failed assertions)
    pub actual: Option<String>,

    /// Human-readable failure message
    pub message: Option<String>,
}

/// An error returned by an input step.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StepError {
    pub step_index: usize,
    pub message: String,
    /// Acknowledged by an `expect_error` step right after it
    pub expected: bool,
}

/// Result of running a complete scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: String,

    /// All assertions passed and every step error was expected
    pub passed: bool,

    pub steps_run: usize,

    pub assertion_results: Vec<AssertionResult>,

    /// Errors returned by input steps
    pub step_errors: Vec<StepError>,

    /// Set when the scenario could not run at all
    pub error: Option<String>,
}

impl ScenarioResult {
    /// A scenario that failed before its first step.
    pub fn load_failure(name: &str, error: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            steps_run: 0,
            assertion_results: Vec::new(),
            step_errors: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}
