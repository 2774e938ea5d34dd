use serde::Serialize;

use crate::scenario::scenario_model::ScenarioResult;

// ============================================================================
// Suite report
// ============================================================================

/// Aggregated results of several scenario runs.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite_name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn from_results(suite_name: &str, results: Vec<ScenarioResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed: total - passed,
            duration_ms: None,
            results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

// ============================================================================
// Console reporter
// ============================================================================

/// Format a suite report for terminal output.
///
/// ```text
/// === Scenarios: fixtures ===
///
/// ✓ PASS  Activate by label (6 steps, 3 assertions)
/// ✗ FAIL  Scroll keeps labels (4 steps, 2 assertions)
///     [FAIL] Step 3: ExpectLabel: element 7 should carry label 'b'
///
/// === Results: 1 passed, 1 failed (2 total) ===
/// ```
pub fn format_console_report(report: &SuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Scenarios: {} ===\n\n", report.suite_name));

    for result in &report.results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };

        out.push_str(&format!(
            "{}  {} ({} steps, {} assertions)\n",
            marker,
            result.name,
            result.steps_run,
            result.assertion_results.len()
        ));

        if let Some(ref error) = result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }

        if !result.passed {
            for err in result.step_errors.iter().filter(|e| !e.expected) {
                out.push_str(&format!(
                    "    [ERROR] Step {}: {}\n",
                    err.step_index, err.message
                ));
            }
            for ar in result.assertion_results.iter().filter(|a| !a.passed) {
                let detail = ar.message.as_deref().unwrap_or("assertion failed");
                let actual = ar
                    .actual
                    .as_deref()
                    .map(|a| format!(" (actual: {})", a))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "    [FAIL] Step {}: {}: {}{}\n",
                    ar.step_index, ar.assertion, detail, actual
                ));
            }
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }

    out.push_str(" ===\n");
    out
}
