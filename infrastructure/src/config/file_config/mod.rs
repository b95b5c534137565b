//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of `roundtable.toml`. The
//! `[discussion]` section deserializes straight into [`DiscussionParams`];
//! the agent fleet (`[[agents]]`) and history settings (`[history]`) have
//! their own raw types here.

mod agent;
mod history;

pub use agent::FileAgentConfig;
pub use history::FileHistoryConfig;

use roundtable_application::DiscussionParams;
use serde::{Deserialize, Serialize};

/// How serious a validation finding is.
///
/// `Error` entries describe configuration the wiring layer cannot use
/// (the offending agent is skipped); `Warning` entries are odd but
/// workable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One problem found while validating a [`FileConfig`].
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending field, e.g. `discussion.max_rounds`.
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub(crate) fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}: {}", tag, self.field, self.message)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Discussion loop tuning (`[discussion]`)
    pub discussion: DiscussionParams,
    /// The agent fleet (`[[agents]]`)
    pub agents: Vec<FileAgentConfig>,
    /// Session history persistence (`[history]`)
    pub history: FileHistoryConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            discussion: DiscussionParams::default(),
            agents: Self::default_fleet(),
            history: FileHistoryConfig::default(),
        }
    }
}

impl FileConfig {
    /// The out-of-the-box agent fleet: common AI CLIs invoked in
    /// non-interactive print mode. Binaries that are not installed fail
    /// their availability probe and are skipped by selection, so the
    /// default fleet is safe on any machine.
    pub fn default_fleet() -> Vec<FileAgentConfig> {
        vec![
            FileAgentConfig::new("claude", ["claude", "-p"], ["reasoning"]),
            FileAgentConfig::new("codex", ["codex", "exec"], ["code"]),
            FileAgentConfig::new("gemini", ["gemini", "-p"], ["research"]),
            FileAgentConfig::new("ollama", ["ollama", "run", "llama3"], ["local"]),
        ]
    }

    /// Agents that should actually be registered.
    pub fn enabled_agents(&self) -> impl Iterator<Item = &FileAgentConfig> {
        self.agents.iter().filter(|agent| agent.enabled)
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Collects every finding instead of failing on the first: range
    /// checks on the `[discussion]` thresholds, per-agent id/command
    /// checks, duplicate agent ids, and a fleet-level sanity check.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.validate_discussion());

        for (index, agent) in self.agents.iter().enumerate() {
            issues.extend(agent.validate(index));
        }

        // Duplicate ids: every occurrence after the first is flagged.
        let mut seen = std::collections::BTreeSet::new();
        for (index, agent) in self.agents.iter().enumerate() {
            if !agent.id.trim().is_empty() && !seen.insert(agent.id.as_str()) {
                issues.push(ConfigIssue::error(
                    format!("agents[{}].id", index),
                    format!("duplicate agent id '{}'", agent.id),
                ));
            }
        }

        if self.enabled_agents().next().is_none() {
            issues.push(ConfigIssue::warning(
                "agents",
                "no enabled agents configured, sessions cannot dispatch",
            ));
        }

        issues
    }

    fn validate_discussion(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let d = &self.discussion;

        if d.max_rounds == 0 {
            issues.push(ConfigIssue::warning(
                "discussion.max_rounds",
                "0 is treated as 1",
            ));
        }
        if !(0.0..=1.0).contains(&d.consensus_threshold) {
            issues.push(ConfigIssue::warning(
                "discussion.consensus_threshold",
                format!("{} is outside [0, 1] and will be clamped", d.consensus_threshold),
            ));
        }
        if !(0.0..=1.0).contains(&d.similarity_threshold) {
            issues.push(ConfigIssue::warning(
                "discussion.similarity_threshold",
                format!(
                    "{} is outside [0, 1], conflict detection degenerates",
                    d.similarity_threshold
                ),
            ));
        }
        if !(d.per_agent_timeout_secs > 0.0 && d.per_agent_timeout_secs.is_finite()) {
            issues.push(ConfigIssue::warning(
                "discussion.per_agent_timeout_secs",
                "not a positive finite number, every dispatch times out instantly",
            ));
        }
        if d.max_delay_secs < d.base_delay_secs {
            issues.push(ConfigIssue::warning(
                "discussion.max_delay_secs",
                "below base_delay_secs, every retry delay is capped at max_delay_secs",
            ));
        }
        if d.circuit_failure_threshold == 0 {
            issues.push(ConfigIssue::warning(
                "discussion.circuit_failure_threshold",
                "0 opens the breaker on the first failure",
            ));
        }
        if !(d.probe_timeout_secs > 0.0 && d.probe_timeout_secs.is_finite()) {
            issues.push(ConfigIssue::warning(
                "discussion.probe_timeout_secs",
                "not a positive finite number, every availability probe fails",
            ));
        }

        issues
    }
}
