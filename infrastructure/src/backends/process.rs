//! Process-spawning agent backend
//!
//! [`ProcessBackend`] wraps any external CLI as an agent. The configured
//! argv is spawned with the prompt appended as the final argument; stdout
//! becomes the response text. No backend-specific protocol logic lives
//! here, which is what lets the fleet be pure configuration.

use async_trait::async_trait;
use roundtable_application::{AgentBackend, BackendError, InvokeOptions};
use roundtable_domain::{AgentId, text::first_line};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::config::FileAgentConfig;

/// Maximum response size kept from a backend process (1 MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Agent backed by an external command-line program.
///
/// Invocation runs `command... <prompt>` with stdin closed and
/// `NO_COLOR=1`/`TERM=dumb` in the environment so interactive CLIs answer
/// in plain print mode. The child is killed when the invocation future is
/// dropped, so an abandoned dispatch never leaks a process.
pub struct ProcessBackend {
    id: AgentId,
    command: Vec<String>,
    capability_tags: Vec<String>,
}

impl ProcessBackend {
    pub fn new(
        id: impl Into<AgentId>,
        command: Vec<String>,
        capability_tags: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            command,
            capability_tags,
        }
    }

    /// Build a backend from a validated fleet entry.
    pub fn from_config(config: &FileAgentConfig) -> Self {
        Self::new(
            config.id.as_str(),
            config.command.clone(),
            config.capabilities.clone(),
        )
    }

    fn program(&self) -> Option<&str> {
        self.command
            .first()
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }
}

#[async_trait]
impl AgentBackend for ProcessBackend {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn capability_tags(&self) -> &[String] {
        &self.capability_tags
    }

    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<String, BackendError> {
        let Some(program) = self.program() else {
            return Err(BackendError::Unavailable(
                "no command configured".to_string(),
            ));
        };

        debug!("Spawning {} for agent {}", program, self.id);

        let mut cmd = Command::new(program);
        cmd.args(&self.command[1..])
            .arg(prompt)
            .env("NO_COLOR", "1")
            .env("TERM", "dumb")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                BackendError::Unavailable(format!("{} is not installed", program))
            }
            _ => BackendError::Transport(format!("failed to spawn {}: {}", program, e)),
        })?;

        // On timeout the output future is dropped and kill_on_drop reaps
        // the child.
        let output = match tokio::time::timeout(options.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(BackendError::Transport(format!(
                    "failed to read {} output: {}",
                    program, e
                )));
            }
            Err(_) => {
                return Err(BackendError::Transport(format!(
                    "{} gave no response within {:.1}s",
                    program,
                    options.timeout.as_secs_f64()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = match first_line(&stderr) {
                "" => "no error output",
                line => line,
            };
            let code = output.status.code().unwrap_or(-1);
            return Err(BackendError::Transport(format!(
                "{} exited with code {}: {}",
                program, code, detail
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        if text.is_empty() {
            return Err(BackendError::Declined(format!(
                "{} produced no output",
                program
            )));
        }

        Ok(truncate_response(text))
    }

    async fn check_available(&self) -> bool {
        self.program()
            .is_some_and(|program| which::which(program).is_ok())
    }
}

fn truncate_response(text: &str) -> String {
    if text.len() <= MAX_OUTPUT_SIZE {
        return text.to_string();
    }
    let mut cut = MAX_OUTPUT_SIZE;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut truncated = text[..cut].to_string();
    truncated.push_str("\n... (output truncated)");
    truncated
}
