//! Discussion parameters for orchestration loop control.
//!
//! [`DiscussionParams`] groups the static parameters that control the
//! round loop in [`RunDiscussionUseCase`](crate::use_cases::run_discussion::RunDiscussionUseCase):
//! round and consensus limits, dispatch timeouts, retry backoff, and
//! circuit breaker thresholds. These are application-layer concerns, not
//! domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orchestration loop control parameters.
///
/// Durations are stored as fractional seconds so the whole struct stays
/// trivially serializable; use the accessor methods to obtain [`Duration`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscussionParams {
    /// Hard ceiling on discussion rounds, regardless of task profile.
    pub max_rounds: usize,
    /// Agreement score at or above which the discussion stops early.
    pub consensus_threshold: f64,
    /// Pairwise similarity below which two responses count as conflicting.
    pub similarity_threshold: f64,
    /// Timeout for a single invocation attempt against one agent.
    pub per_agent_timeout_secs: f64,
    /// Retries after the first attempt, for transient failures only.
    pub max_retries: u32,
    /// Base delay before the first retry; doubles each retry.
    pub base_delay_secs: f64,
    /// Ceiling on the exponential retry delay.
    pub max_delay_secs: f64,
    /// Add up to 25% random jitter to each retry delay.
    pub retry_jitter: bool,
    /// Consecutive failures that trip an agent's circuit breaker open.
    pub circuit_failure_threshold: u32,
    /// How long an open breaker blocks dispatches before probing again.
    pub circuit_open_duration_secs: f64,
    /// How long a cached availability probe result stays fresh.
    pub availability_ttl_secs: f64,
    /// Timeout for a single availability probe.
    pub probe_timeout_secs: f64,
}

impl Default for DiscussionParams {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            consensus_threshold: 0.7,
            similarity_threshold: 0.35,
            per_agent_timeout_secs: 60.0,
            max_retries: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30.0,
            retry_jitter: true,
            circuit_failure_threshold: 5,
            circuit_open_duration_secs: 30.0,
            availability_ttl_secs: 30.0,
            probe_timeout_secs: 2.0,
        }
    }
}

impl DiscussionParams {
    /// Total attempts per logical dispatch: the first try plus retries.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn per_agent_timeout(&self) -> Duration {
        secs(self.per_agent_timeout_secs)
    }

    pub fn base_delay(&self) -> Duration {
        secs(self.base_delay_secs)
    }

    pub fn max_delay(&self) -> Duration {
        secs(self.max_delay_secs)
    }

    pub fn circuit_open_duration(&self) -> Duration {
        secs(self.circuit_open_duration_secs)
    }

    pub fn availability_ttl(&self) -> Duration {
        secs(self.availability_ttl_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        secs(self.probe_timeout_secs)
    }

    // ==================== Builder Methods ====================

    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn with_consensus_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_per_agent_timeout(mut self, timeout: Duration) -> Self {
        self.per_agent_timeout_secs = timeout.as_secs_f64();
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay_secs = delay.as_secs_f64();
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay_secs = delay.as_secs_f64();
        self
    }

    pub fn with_retry_jitter(mut self, jitter: bool) -> Self {
        self.retry_jitter = jitter;
        self
    }

    pub fn with_circuit_failure_threshold(mut self, threshold: u32) -> Self {
        self.circuit_failure_threshold = threshold;
        self
    }

    pub fn with_circuit_open_duration(mut self, duration: Duration) -> Self {
        self.circuit_open_duration_secs = duration.as_secs_f64();
        self
    }

    pub fn with_availability_ttl(mut self, ttl: Duration) -> Self {
        self.availability_ttl_secs = ttl.as_secs_f64();
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout_secs = timeout.as_secs_f64();
        self
    }
}

// Duration::from_secs_f64 panics on NaN, infinite, and oversized values.
// Finite positives are capped at a day; everything else maps to zero.
fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value.min(86_400.0))
    } else {
        Duration::ZERO
    }
}
