use std::fmt;

use crate::page::page_model::ElementId;

#[derive(Debug)]
pub enum SurfError {
    /// Settings store could not be read or written
    Settings(String),

    /// A stored settings payload did not deserialize
    SettingsParse { context: String, source: serde_yaml::Error },

    /// Incoming message was malformed or carried an unknown action
    Message(String),

    /// Clicking or focusing an element failed inside the host
    HostAction { element: ElementId, action: String, reason: String },

    /// Host refused to create an overlay badge
    OverlayCreate { label: String, reason: String },

    /// Scenario file could not be read
    ScenarioLoad { path: String, source: std::io::Error },

    /// Scenario file was not valid YAML for the scenario model
    ScenarioParse { path: String, source: serde_yaml::Error },

    /// Generic I/O failure (trace files, config output)
    Io(std::io::Error),
}

impl fmt::Display for SurfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfError::Settings(msg) => {
                write!(f, "Settings store error: {}", msg)
            }
            SurfError::SettingsParse { context, source } => {
                write!(f, "Settings parse error ({}): {}", context, source)
            }
            SurfError::Message(msg) => {
                write!(f, "Message error: {}", msg)
            }
            SurfError::HostAction { element, action, reason } => {
                write!(f, "Failed to {} element {}: {}", action, element, reason)
            }
            SurfError::OverlayCreate { label, reason } => {
                write!(f, "Failed to create overlay '{}': {}", label, reason)
            }
            SurfError::ScenarioLoad { path, source } => {
                write!(f, "Failed to read scenario {}: {}", path, source)
            }
            SurfError::ScenarioParse { path, source } => {
                write!(f, "Invalid scenario {}: {}", path, source)
            }
            SurfError::Io(source) => {
                write!(f, "I/O error: {}", source)
            }
        }
    }
}

impl std::error::Error for SurfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SurfError::SettingsParse { source, .. } => Some(source),
            SurfError::ScenarioLoad { source, .. } => Some(source),
            SurfError::ScenarioParse { source, .. } => Some(source),
            SurfError::Io(source) => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SurfError {
    fn from(err: std::io::Error) -> Self {
        SurfError::Io(err)
    }
}
