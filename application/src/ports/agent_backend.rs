//! Agent capability port
//!
//! The minimal contract every external AI backend must satisfy: invoke with
//! a deadline, report availability, report identity. Implementations
//! (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use roundtable_domain::{AgentId, FailureKind};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a backend invocation.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("request declined: {0}")]
    Declined(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Failure kind recorded in the dispatch log.
    pub fn kind(&self) -> FailureKind {
        match self {
            BackendError::Transport(_) => FailureKind::Transport,
            BackendError::RateLimited(_) => FailureKind::RateLimited,
            BackendError::Declined(_) => FailureKind::Declined,
            BackendError::InvalidInput(_) => FailureKind::InvalidInput,
            BackendError::Unavailable(_) => FailureKind::Unavailable,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }

    /// The bare message, without the kind prefix `Display` adds.
    pub fn message(&self) -> &str {
        match self {
            BackendError::Transport(m)
            | BackendError::RateLimited(m)
            | BackendError::Declined(m)
            | BackendError::InvalidInput(m)
            | BackendError::Unavailable(m) => m,
        }
    }
}

/// Options accompanying a single invocation attempt.
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    /// Deadline for this attempt. The coordinator enforces it from the
    /// outside; adapters should also bound themselves by it where they can
    /// (e.g. process wait timeouts) so cancelled work stops promptly.
    pub timeout: Duration,
}

impl InvokeOptions {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

/// Uniform invoke capability over one external AI backend.
///
/// Implementations must be cheap to share (`Arc`) and safe to call
/// concurrently; the orchestrator never serializes calls to different
/// agents through each other.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Unique agent id, stable for the process lifetime.
    fn id(&self) -> &AgentId;

    /// Declared capability tags used for affinity scoring.
    fn capability_tags(&self) -> &[String];

    /// Send a prompt and await the response text.
    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<String, BackendError>;

    /// Short bounded probe: is the backend reachable right now?
    ///
    /// Must not block longer than the registry's probe timeout; the
    /// registry enforces that deadline from the outside regardless.
    async fn check_available(&self) -> bool;
}
