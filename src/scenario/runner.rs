use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};
use web_time::Instant;

use crate::engine::engine::{KeyOutcome, LabelEngine, PlacementReport};
use crate::error::SurfError;
use crate::input::keys::KeyInput;
use crate::input::router::{Dispatched, dispatch};
use crate::messaging::dispatch::Dispatcher;
use crate::messaging::message::{Message, Response};
use crate::navigation::watcher::PageChangeWatcher;
use crate::page::page_model::ElementId;
use crate::page::simulated::SimulatedPage;
use crate::scenario::scenario_model::{
    AssertionResult, Scenario, ScenarioResult, ScenarioStep, StepError,
};
use crate::settings::store::MemoryStore;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

// ============================================================================
// Loading
// ============================================================================

pub fn load_scenario(path: &Path) -> Result<Scenario, SurfError> {
    let content = std::fs::read_to_string(path).map_err(|e| SurfError::ScenarioLoad {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(|e| SurfError::ScenarioParse {
        path: path.display().to_string(),
        source: e,
    })
}

/// `path` itself, or every `.yaml`/`.yml` file directly inside it, sorted.
pub fn scenario_files(path: &Path) -> Result<Vec<PathBuf>, SurfError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)
        .map_err(|e| SurfError::ScenarioLoad {
            path: path.display().to_string(),
            source: e,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    files.sort();
    Ok(files)
}

// ============================================================================
// Runner
// ============================================================================

/// Live objects for one scenario run.
struct Session {
    page: SimulatedPage,
    engine: LabelEngine,
    store: MemoryStore,
    watcher: PageChangeWatcher,
    clock: Instant,
}

/// What an input step produced, for the trace.
enum StepOutput {
    Nothing,
    Key(KeyOutcome),
    Placement(PlacementReport),
}

/// Executes a [`Scenario`] step by step against a [`SimulatedPage`].
pub struct ScenarioRunner;

impl ScenarioRunner {
    pub fn run(scenario: &Scenario, tracer: &TraceLogger) -> ScenarioResult {
        let page = SimulatedPage::from_fixture(&scenario.page);
        let store = scenario
            .storage
            .iter()
            .fold(MemoryStore::new(), |store, (k, v)| store.with(k, v.clone()));
        let mut session = Session {
            watcher: PageChangeWatcher::for_host(&page),
            page,
            engine: LabelEngine::new(scenario.settings.clone()),
            store,
            clock: Instant::now(),
        };

        info!(name = %scenario.name, steps = scenario.steps.len(), "running scenario");

        let mut assertion_results = Vec::new();
        let mut step_errors: Vec<StepError> = Vec::new();
        let mut last_error: Option<String> = None;

        for (i, step) in scenario.steps.iter().enumerate() {
            if step.is_assertion() {
                let result = Self::evaluate(step, i, &session, last_error.as_deref());
                // An error counts as expected once an expect_error step sees it
                if matches!(step, ScenarioStep::ExpectError { .. }) && last_error.is_some() {
                    if let Some(err) = step_errors.last_mut() {
                        err.expected = true;
                    }
                }
                assertion_results.push(result);
                continue;
            }

            let mut event = TraceEvent::now(i as u64, &session.engine).with_event(step.name());
            match Self::execute(step, &mut session) {
                Ok(output) => {
                    last_error = None;
                    event = match output {
                        StepOutput::Key(outcome) => event.with_outcome(&outcome),
                        StepOutput::Placement(report) => event.with_placement(report),
                        StepOutput::Nothing => event,
                    };
                }
                Err(e) => {
                    debug!(step = i, error = %e, "step returned an error");
                    event = event.with_error(&e);
                    last_error = Some(e.to_string());
                    step_errors.push(StepError {
                        step_index: i,
                        message: e.to_string(),
                        expected: false,
                    });
                }
            }
            tracer.log(&event);
        }

        let passed = assertion_results.iter().all(|r| r.passed)
            && step_errors.iter().all(|e| e.expected);

        ScenarioResult {
            name: scenario.name.clone(),
            passed,
            steps_run: scenario.steps.len(),
            assertion_results,
            step_errors,
            error: None,
        }
    }

    /// Load and run one file; load errors become a failed result.
    pub fn run_file(path: &Path, tracer: &TraceLogger) -> ScenarioResult {
        match load_scenario(path) {
            Ok(scenario) => Self::run(&scenario, tracer),
            Err(e) => ScenarioResult::load_failure(&path.display().to_string(), e),
        }
    }

    fn execute(step: &ScenarioStep, s: &mut Session) -> Result<StepOutput, SurfError> {
        match step {
            ScenarioStep::Toggle => {
                let response = Dispatcher::new(&s.store).handle(
                    &mut s.engine,
                    &mut s.page,
                    Message::ToggleLinkShortcuts,
                );
                into_result(response).map(|_| StepOutput::Nothing)
            }

            ScenarioStep::Key {
                key,
                ctrl,
                meta,
                in_text_input,
            } => {
                let event = KeyInput {
                    key: key.clone(),
                    ctrl_key: *ctrl,
                    meta_key: *meta,
                    target_is_text_input: *in_text_input,
                    ..KeyInput::default()
                };
                Self::press(s, &event)
            }

            ScenarioStep::Type { text } => {
                let mut last = StepOutput::Nothing;
                for ch in text.chars() {
                    last = Self::press(s, &KeyInput::new(&ch.to_string()))?;
                }
                Ok(last)
            }

            ScenarioStep::Scroll { y, x } => {
                s.page.scroll_to(*x, *y);
                s.engine.on_scroll(s.clock);
                Ok(StepOutput::Nothing)
            }

            ScenarioStep::Advance { ms } => {
                s.clock += Duration::from_millis(*ms);
                Ok(match s.engine.poll_scroll(&mut s.page, s.clock)? {
                    Some(report) => StepOutput::Placement(report),
                    None => StepOutput::Nothing,
                })
            }

            ScenarioStep::Navigate { path, source } => {
                s.page.set_path(path);
                s.watcher.signal(&mut s.page, *source, &mut s.engine);
                Ok(StepOutput::Nothing)
            }

            ScenarioStep::Message { body } => {
                let response = Dispatcher::new(&s.store).handle_json(
                    &mut s.engine,
                    &mut s.page,
                    &body.to_string(),
                );
                into_result(response).map(|_| StepOutput::Nothing)
            }

            ScenarioStep::FailNextOverlay => {
                s.page.fail_next_overlay();
                Ok(StepOutput::Nothing)
            }

            // Assertions are evaluated by the caller
            _ => Ok(StepOutput::Nothing),
        }
    }

    fn press(s: &mut Session, event: &KeyInput) -> Result<StepOutput, SurfError> {
        let (_, dispatched) = dispatch(&mut s.engine, &mut s.page, event)?;
        Ok(match dispatched {
            Dispatched::Key(outcome) => StepOutput::Key(outcome),
            _ => StepOutput::Nothing,
        })
    }

    fn evaluate(
        step: &ScenarioStep,
        step_index: usize,
        s: &Session,
        last_error: Option<&str>,
    ) -> AssertionResult {
        let check = |passed: bool, actual: String, message: String| AssertionResult {
            step_index,
            assertion: step.name().to_string(),
            passed,
            actual: Some(actual),
            message: if passed { None } else { Some(message) },
        };

        match step {
            ScenarioStep::ExpectActive { expected } => {
                let active = s.engine.is_active();
                check(
                    active == *expected,
                    active.to_string(),
                    format!("expected active={}", expected),
                )
            }

            ScenarioStep::ExpectOverlayCount { expected } => {
                let engine_count = s.engine.overlay_count();
                let page_count = s.page.overlay_count();
                check(
                    engine_count == *expected && page_count == *expected,
                    format!("engine={} page={}", engine_count, page_count),
                    format!("expected {} overlays", expected),
                )
            }

            ScenarioStep::ExpectLabel { element, label } => {
                let actual = s.engine.label_of(ElementId(*element));
                check(
                    actual == Some(label.as_str()),
                    format!("{:?}", actual),
                    format!("element {} should carry label '{}'", element, label),
                )
            }

            ScenarioStep::ExpectNoOverlay { element } => {
                let actual = s.engine.label_of(ElementId(*element));
                check(
                    actual.is_none(),
                    format!("{:?}", actual),
                    format!("element {} should have no overlay", element),
                )
            }

            ScenarioStep::ExpectClicked { element } => {
                let clicked = s.page.clicked();
                check(
                    clicked.contains(&ElementId(*element)),
                    format!("{:?}", clicked),
                    format!("element {} was not clicked", element),
                )
            }

            ScenarioStep::ExpectFocused { element } => {
                let focused = s.page.focused();
                check(
                    focused == element.map(ElementId),
                    format!("{:?}", focused),
                    format!("expected focus on {:?}", element),
                )
            }

            ScenarioStep::ExpectBuffer { expected } => {
                let typed = s.engine.typed();
                check(
                    typed == expected,
                    typed.to_string(),
                    format!("expected buffer '{}'", expected),
                )
            }

            ScenarioStep::ExpectError { contains } => {
                let passed = match (last_error, contains) {
                    (Some(err), Some(needle)) => err.contains(needle.as_str()),
                    (Some(_), None) => true,
                    (None, _) => false,
                };
                check(
                    passed,
                    format!("{:?}", last_error),
                    match contains {
                        Some(needle) => format!("expected an error containing '{}'", needle),
                        None => "expected the previous step to fail".to_string(),
                    },
                )
            }

            other => AssertionResult {
                step_index,
                assertion: other.name().to_string(),
                passed: false,
                actual: None,
                message: Some("not an assertion".to_string()),
            },
        }
    }
}

fn into_result(response: Response) -> Result<Response, SurfError> {
    match response {
        Response::Ack(ack) if !ack.success => Err(SurfError::Message(
            ack.error.unwrap_or_else(|| "request failed".to_string()),
        )),
        other => Ok(other),
    }
}
