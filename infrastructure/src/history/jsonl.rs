//! JSONL file sink for finished discussion sessions.
//!
//! Each recorded session becomes a single self-contained JSON line:
//! timestamp, prompt, task profile, per-round summaries, and the synthesis
//! when one was produced. Append-only, so one file accumulates a history
//! across runs.

use roundtable_application::HistorySink;
use roundtable_domain::{DiscussionContext, SynthesisResult};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// History sink that appends one JSON object per session.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record
/// and on `Drop`. Write failures are logged and swallowed; persistence
/// never fails a discussion that already produced an answer.
pub struct JsonlHistorySink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlHistorySink {
    /// Open the sink, creating the file (and parent directories) if they
    /// don't exist. Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create history directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open history file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn session_record(
    context: &DiscussionContext,
    synthesis: Option<&SynthesisResult>,
) -> serde_json::Value {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let profile = context.task_profile();

    let rounds: Vec<serde_json::Value> = context
        .rounds()
        .iter()
        .map(|round| {
            let agents: Vec<&str> = round
                .successful_responses()
                .map(|(id, _)| id.as_str())
                .collect();
            serde_json::json!({
                "round": round.round_index,
                "successes": round.success_count(),
                "failures": round.errors.len(),
                "attempts": round.attempts.len(),
                "agents": agents,
            })
        })
        .collect();

    serde_json::json!({
        "timestamp": timestamp,
        "prompt": context.prompt(),
        "category": profile.category,
        "complexity": profile.complexity,
        "complexity_level": profile.complexity_level(),
        "keywords": profile.keywords,
        "rounds": rounds,
        "synthesis": synthesis,
    })
}

impl HistorySink for JsonlHistorySink {
    fn record(&self, context: &DiscussionContext, synthesis: Option<&SynthesisResult>) {
        let record = session_record(context, synthesis);
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writeln!(writer, "{}", line) {
                warn!(
                    "Could not append to history file {}: {}",
                    self.path.display(),
                    e
                );
                return;
            }
            // Flush per record, sessions must survive an unclean exit
            if let Err(e) = writer.flush() {
                warn!("Could not flush history file {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for JsonlHistorySink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use roundtable_domain::{
        AgentId, DispatchAttempt, DispatchOutcome, RoundResult, TaskCategory, TaskProfile,
    };
    use std::collections::BTreeSet;
    use std::io::Read;

    fn finished_context() -> DiscussionContext {
        let profile = TaskProfile {
            category: TaskCategory::Code,
            complexity: 0.5,
            keywords: vec!["parser".to_string()],
            recommended_agent_count: 2,
            recommended_rounds: 1,
        };
        let mut context = DiscussionContext::new("Write a parser", profile, 1);

        let mut round = RoundResult::new(1);
        round.absorb(
            &AgentId::new("alpha"),
            vec![DispatchAttempt::new(
                "alpha",
                1,
                Utc::now(),
                Utc::now(),
                DispatchOutcome::success("Use a recursive descent parser."),
            )],
        );
        round.record_error(&AgentId::new("beta"), "timed out");
        context.append_round(round);
        context
    }

    fn synthesis() -> SynthesisResult {
        SynthesisResult {
            summary: "Use a recursive descent parser.".to_string(),
            consensus: true,
            contributing_agents: BTreeSet::from([AgentId::new("alpha")]),
            key_points: vec![],
        }
    }

    #[test]
    fn test_sink_writes_valid_session_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let sink = JsonlHistorySink::new(&path).unwrap();

        let context = finished_context();
        let result = synthesis();
        sink.record(&context, Some(&result));
        drop(sink);

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 1);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert!(value.get("timestamp").is_some());
        assert_eq!(value["prompt"], "Write a parser");
        assert_eq!(value["category"], "code");
        assert_eq!(value["rounds"][0]["round"], 1);
        assert_eq!(value["rounds"][0]["successes"], 1);
        assert_eq!(value["rounds"][0]["failures"], 1);
        assert_eq!(value["rounds"][0]["agents"][0], "alpha");
        assert_eq!(value["synthesis"]["consensus"], true);
        assert_eq!(
            value["synthesis"]["summary"],
            "Use a recursive descent parser."
        );
    }

    #[test]
    fn test_sink_records_exhausted_session_without_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let sink = JsonlHistorySink::new(&path).unwrap();

        let context = finished_context();
        sink.record(&context, None);
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert!(value["synthesis"].is_null());
    }

    #[test]
    fn test_sink_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let context = finished_context();

        for _ in 0..2 {
            let sink = JsonlHistorySink::new(&path).unwrap();
            sink.record(&context, None);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim().lines().count(), 2);
    }

    #[test]
    fn test_sink_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("history.jsonl");
        let sink = JsonlHistorySink::new(&path);
        assert!(sink.is_some());
        assert!(path.parent().unwrap().exists());
    }
}
