use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::SurfError;
use crate::settings::settings::Settings;

// ============================================================================
// Storage keys (flat, as the extension's sync storage holds them)
// ============================================================================

pub const KEY_BACKGROUND_COLOR: &str = "overlayBackgroundColor";
pub const KEY_TEXT_COLOR: &str = "overlayTextColor";
pub const KEY_FONT_SIZE: &str = "overlayFontSize";
pub const KEY_PADDING: &str = "overlayPadding";
pub const KEY_LABEL_SCHEME: &str = "preferredOption";
pub const KEY_ACTIVATION_POLICY: &str = "activationPolicy";
pub const KEY_ESCAPE_POLICY: &str = "escapePolicy";

pub const SETTINGS_KEYS: [&str; 7] = [
    KEY_BACKGROUND_COLOR,
    KEY_TEXT_COLOR,
    KEY_FONT_SIZE,
    KEY_PADDING,
    KEY_LABEL_SCHEME,
    KEY_ACTIVATION_POLICY,
    KEY_ESCAPE_POLICY,
];

/// Key-value settings storage owned by the extension, not the engine.
pub trait SettingsStore {
    /// Values for the requested keys. Missing keys are simply absent.
    fn get(&self, keys: &[&str]) -> Result<BTreeMap<String, Value>, SurfError>;

    fn set(&mut self, values: BTreeMap<String, Value>) -> Result<(), SurfError>;
}

/// Resolve stored values on top of `base`.
///
/// Values that fail to deserialize are logged and skipped; only a failing
/// store is an error.
pub fn load_settings(store: &dyn SettingsStore, base: &Settings) -> Result<Settings, SurfError> {
    let values = store.get(&SETTINGS_KEYS)?;
    let mut settings = base.clone();

    for (key, value) in &values {
        match key.as_str() {
            KEY_BACKGROUND_COLOR => apply(key, value, &mut settings.appearance.background_color),
            KEY_TEXT_COLOR => apply(key, value, &mut settings.appearance.text_color),
            KEY_FONT_SIZE => apply(key, value, &mut settings.appearance.font_size),
            KEY_PADDING => apply(key, value, &mut settings.appearance.padding),
            KEY_LABEL_SCHEME => apply(key, value, &mut settings.label_scheme),
            KEY_ACTIVATION_POLICY => apply(key, value, &mut settings.activation_policy),
            KEY_ESCAPE_POLICY => apply(key, value, &mut settings.escape_policy),
            _ => {}
        }
    }

    Ok(settings)
}

fn apply<T: DeserializeOwned>(key: &str, value: &Value, slot: &mut T) {
    // Empty strings mean "unset" in extension storage
    if value.as_str() == Some("") || value.is_null() {
        return;
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => *slot = parsed,
        Err(e) => warn!(key, error = %e, "ignoring malformed stored setting"),
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store, also able to simulate an unavailable backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails.
    pub fn unavailable() -> Self {
        Self {
            values: BTreeMap::new(),
            unavailable: true,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<BTreeMap<String, Value>, SurfError> {
        if self.unavailable {
            return Err(SurfError::Settings("storage unavailable".into()));
        }
        Ok(keys
            .iter()
            .filter_map(|k| self.values.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    fn set(&mut self, values: BTreeMap<String, Value>) -> Result<(), SurfError> {
        if self.unavailable {
            return Err(SurfError::Settings("storage unavailable".into()));
        }
        self.values.extend(values);
        Ok(())
    }
}

// ============================================================================
// YamlFileStore
// ============================================================================

/// Flat YAML mapping on disk. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct YamlFileStore {
    path: PathBuf,
}

impl YamlFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>, SurfError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(SurfError::Settings(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_yaml::from_str(&content).map_err(|e| SurfError::SettingsParse {
            context: self.path.display().to_string(),
            source: e,
        })
    }
}

impl SettingsStore for YamlFileStore {
    fn get(&self, keys: &[&str]) -> Result<BTreeMap<String, Value>, SurfError> {
        let mut all = self.read_all()?;
        Ok(keys
            .iter()
            .filter_map(|k| all.remove(*k).map(|v| (k.to_string(), v)))
            .collect())
    }

    fn set(&mut self, values: BTreeMap<String, Value>) -> Result<(), SurfError> {
        let mut all = self.read_all()?;
        all.extend(values);
        let yaml = serde_yaml::to_string(&all).map_err(|e| SurfError::SettingsParse {
            context: self.path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&self.path, yaml)
            .map_err(|e| SurfError::Settings(format!("cannot write {}: {}", self.path.display(), e)))
    }
}
