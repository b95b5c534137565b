//! Dispatch attempt records

use crate::agent::id::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a dispatch attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Process or network level transport failure.
    Transport,
    /// The backend rate limited the request.
    RateLimited,
    /// The backend explicitly declined to answer.
    Declined,
    /// The backend rejected the input as malformed.
    InvalidInput,
    /// The backend reported itself unavailable.
    Unavailable,
    /// The session was cancelled while the attempt was in flight.
    Cancelled,
}

impl FailureKind {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FailureKind::Transport | FailureKind::RateLimited)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::Transport => "transport",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::Declined => "declined",
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::Unavailable => "unavailable",
            FailureKind::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Terminal result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The backend produced a response.
    Success { text: String },
    /// The backend failed with a classified reason.
    Failure {
        #[serde(rename = "failure_kind")]
        kind: FailureKind,
        message: String,
    },
    /// The per-attempt deadline elapsed first.
    TimedOut,
}

impl DispatchOutcome {
    /// Build a successful outcome.
    pub fn success(text: impl Into<String>) -> Self {
        DispatchOutcome::Success { text: text.into() }
    }

    /// Build a failed outcome.
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        DispatchOutcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success { .. })
    }

    /// Whether retrying may succeed. Timeouts are transient; failures
    /// defer to their kind; successes are final.
    pub fn is_transient(&self) -> bool {
        match self {
            DispatchOutcome::Success { .. } => false,
            DispatchOutcome::TimedOut => true,
            DispatchOutcome::Failure { kind, .. } => kind.is_transient(),
        }
    }

    /// Response text, if successful.
    pub fn text(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Success { text } => Some(text),
            _ => None,
        }
    }

    /// Human-readable reason, if not successful.
    pub fn reason(&self) -> Option<String> {
        match self {
            DispatchOutcome::Success { .. } => None,
            DispatchOutcome::TimedOut => Some("timed out".to_string()),
            DispatchOutcome::Failure { kind, message } => {
                Some(format!("{}: {}", kind, message))
            }
        }
    }
}

/// One entry in the append-only dispatch log.
///
/// Immutable once written; the coordinator records one per attempt,
/// including every retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchAttempt {
    /// Agent the attempt was issued to.
    pub agent_id: AgentId,
    /// 1-indexed attempt number within the logical dispatch.
    pub attempt_number: u32,
    /// When the attempt started.
    pub started_at: DateTime<Utc>,
    /// When the attempt reached a terminal outcome.
    pub finished_at: DateTime<Utc>,
    /// Terminal outcome.
    pub outcome: DispatchOutcome,
}

impl DispatchAttempt {
    /// Record an attempt with explicit timestamps.
    pub fn new(
        agent_id: impl Into<AgentId>,
        attempt_number: u32,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        outcome: DispatchOutcome,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            attempt_number,
            started_at,
            finished_at,
            outcome,
        }
    }

    /// Record an attempt that started at `started_at` and finished now.
    pub fn finished_now(
        agent_id: impl Into<AgentId>,
        attempt_number: u32,
        started_at: DateTime<Utc>,
        outcome: DispatchOutcome,
    ) -> Self {
        Self::new(agent_id, attempt_number, started_at, Utc::now(), outcome)
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Wall-clock duration of the attempt in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
