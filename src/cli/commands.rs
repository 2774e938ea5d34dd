use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};
use web_time::Instant;

use crate::cli::config::AppConfig;
use crate::error::SurfError;
use crate::label::allocator::{LabelScheme, label};
use crate::scenario::report::{SuiteReport, format_console_report};
use crate::scenario::runner::{ScenarioRunner, scenario_files};
use crate::settings::settings::Settings;
use crate::settings::store::{SETTINGS_KEYS, SettingsStore, YamlFileStore, load_settings};
use crate::trace::logger::TraceLogger;

// ============================================================================
// labels subcommand
// ============================================================================

/// `index<TAB>label` lines for `count` elements starting at `start`.
///
/// Stops early once the scheme runs out of labels.
pub fn cmd_labels(count: usize, scheme: LabelScheme, start: usize) -> String {
    let mut out = String::new();
    for index in start..start.saturating_add(count) {
        let text = label(index, scheme);
        if text.is_empty() {
            break;
        }
        out.push_str(&format!("{}\t{}\n", index, text));
    }
    out
}

// ============================================================================
// run subcommand
// ============================================================================

/// Run scenarios and return the report text and whether all passed.
pub fn cmd_run(scenario_path: &str, trace: Option<&str>) -> Result<(String, bool), SurfError> {
    let files = scenario_files(Path::new(scenario_path))?;

    if files.is_empty() {
        warn!(path = scenario_path, "no scenarios found");
        return Ok((String::new(), true));
    }

    info!(count = files.len(), "running scenarios");

    let tracer = match trace {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    let start = Instant::now();
    let results: Vec<_> = files
        .iter()
        .map(|path| ScenarioRunner::run_file(path, &tracer))
        .collect();
    let duration = start.elapsed().as_millis();

    let report = SuiteReport::from_results(scenario_path, results).with_duration(duration);
    Ok((format_console_report(&report), report.all_passed()))
}

// ============================================================================
// settings subcommand
// ============================================================================

/// Config settings with the configured store applied on top.
pub fn resolve_settings(config: &AppConfig) -> Result<Settings, SurfError> {
    match &config.storage {
        Some(path) => load_settings(&YamlFileStore::new(path), &config.settings),
        None => Ok(config.settings.clone()),
    }
}

/// Parse `KEY=VALUE` pairs in storage key format.
///
/// Values that read as JSON (numbers, booleans, quoted strings) keep that
/// type; anything else is stored as a plain string.
pub fn parse_assignments(pairs: &[String]) -> Result<BTreeMap<String, Value>, SurfError> {
    let mut values = BTreeMap::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| SurfError::Settings(format!("expected KEY=VALUE, got '{}'", pair)))?;
        let key = key.trim();
        if !SETTINGS_KEYS.contains(&key) {
            return Err(SurfError::Settings(format!("unknown settings key '{}'", key)));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        values.insert(key.to_string(), value);
    }
    Ok(values)
}

/// Apply `assignments` to the configured store, then print the resolved settings.
pub fn cmd_settings(config: &AppConfig, assignments: &[String]) -> Result<String, SurfError> {
    if !assignments.is_empty() {
        let path = config.storage.as_deref().ok_or_else(|| {
            SurfError::Settings("no storage file configured, set `storage` in the config".to_string())
        })?;
        let values = parse_assignments(assignments)?;
        info!(path, keys = values.len(), "writing stored settings");
        YamlFileStore::new(path).set(values)?;
    }

    let settings = resolve_settings(config)?;
    serde_yaml::to_string(&settings).map_err(|e| SurfError::SettingsParse {
        context: "resolved settings".to_string(),
        source: e,
    })
}
