//! History persistence settings from TOML (`[history]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw history configuration.
///
/// # Example
///
/// ```toml
/// [history]
/// enabled = true
/// path = "/tmp/roundtable-history.jsonl"   # optional override
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHistoryConfig {
    /// Persist finished sessions to the JSONL history file
    pub enabled: bool,
    /// Override the history file location
    pub path: Option<PathBuf>,
}

impl Default for FileHistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl FileHistoryConfig {
    /// Resolved history file path: the configured override, or
    /// `<platform data dir>/roundtable/history.jsonl`.
    ///
    /// `None` when no override is set and the platform has no data
    /// directory; callers should skip persistence in that case.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            return Some(path.clone());
        }
        dirs::data_dir().map(|dir| dir.join("roundtable").join("history.jsonl"))
    }
}
