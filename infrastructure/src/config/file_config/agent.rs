//! Agent fleet entries from TOML (`[[agents]]` tables)

use super::ConfigIssue;
use serde::{Deserialize, Serialize};

/// One configured agent backend.
///
/// # Example
///
/// ```toml
/// [[agents]]
/// id = "claude"
/// command = ["claude", "-p"]      # argv; the prompt is appended at invoke time
/// capabilities = ["reasoning"]
/// enabled = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Unique agent identifier, used in results and logs
    pub id: String,
    /// Argv vector for the process adapter
    pub command: Vec<String>,
    /// Capability tags driving selection affinity
    pub capabilities: Vec<String>,
    /// Disabled agents are never registered
    pub enabled: bool,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            command: Vec::new(),
            capabilities: Vec::new(),
            enabled: true,
        }
    }
}

impl FileAgentConfig {
    /// Build an enabled entry, mainly for the default fleet and tests.
    pub fn new(
        id: impl Into<String>,
        command: impl IntoIterator<Item = impl Into<String>>,
        capabilities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            command: command.into_iter().map(Into::into).collect(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            enabled: true,
        }
    }

    /// Check this entry for problems the process adapter cannot work around.
    pub fn validate(&self, index: usize) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.id.trim().is_empty() {
            issues.push(ConfigIssue::error(
                format!("agents[{}].id", index),
                "agent id is empty",
            ));
        }

        match self.command.first() {
            None => {
                issues.push(ConfigIssue::error(
                    format!("agents[{}].command", index),
                    "command is empty",
                ));
            }
            Some(program) if program.trim().is_empty() => {
                issues.push(ConfigIssue::error(
                    format!("agents[{}].command", index),
                    "command program name is empty",
                ));
            }
            Some(_) => {}
        }

        issues
    }
}
