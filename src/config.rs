use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Placement of top-level blocks after a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub origin_x: f64,
    pub origin_y: f64,
    pub spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: 20.0,
            origin_y: 20.0,
            spacing: 80.0,
        }
    }
}

/// Tunables for scanning, generation and the editor synchronization loop.
///
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```json
/// { "debounce_ms": 500, "layout": { "spacing": 120 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period after the last keystroke before a text edit is committed.
    pub debounce_ms: u64,
    /// Upper bound for the visual loading indicator.
    pub loading_timeout_ms: u64,
    /// Spaces per indentation level; also the width a tab counts for.
    pub indent_width: usize,
    pub comment_marker: char,
    /// Emit the import preamble when generating text.
    pub generate_imports: bool,
    pub layout: LayoutConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            loading_timeout_ms: 5000,
            indent_width: 4,
            comment_marker: '#',
            generate_imports: true,
            layout: LayoutConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }
}
