use serde::Serialize;
use sha1::{Digest, Sha1};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::engine::engine::{KeyOutcome, LabelEngine, PlacementReport};

/// One step of an overlay session, written as a JSONL line.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub step: u64,

    pub session_state: String,
    pub typed: String,
    pub label_count: usize,

    /// SHA-1 over the live `label=element` pairs, in label order
    pub labels_fingerprint: String,

    pub event: Option<String>,
    pub outcome: Option<String>,
    pub placement: Option<PlacementReport>,
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(step: u64, engine: &LabelEngine) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            step,
            session_state: format!("{:?}", engine.state()),
            typed: engine.typed().to_string(),
            label_count: engine.overlay_count(),
            labels_fingerprint: labels_fingerprint(engine),
            event: None,
            outcome: None,
            placement: None,
            error: None,
        }
    }

    pub fn with_event(mut self, event: impl ToString) -> Self {
        self.event = Some(event.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: &KeyOutcome) -> Self {
        self.outcome = Some(format!("{:?}", outcome));
        self
    }

    pub fn with_placement(mut self, report: PlacementReport) -> Self {
        self.placement = Some(report);
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Stable digest of the engine's label mapping.
///
/// Two runs that assign the same labels to the same elements produce the
/// same fingerprint regardless of timing.
pub fn labels_fingerprint(engine: &LabelEngine) -> String {
    let mut hasher = Sha1::new();
    for (label, element) in engine.labels() {
        hasher.update(label.as_bytes());
        hasher.update(b"=");
        hasher.update(element.0.to_le_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
