//! Retry policy with exponential backoff
//!
//! Wraps a logical dispatch to one agent: attempts run until one succeeds,
//! fails permanently, or the attempt budget is spent. Only transient
//! outcomes (transport errors, rate limits, timeouts) are retried. Every
//! attempt is recorded, so the returned log doubles as the audit trail for
//! the round result.

use crate::config::DiscussionParams;
use chrono::Utc;
use roundtable_domain::{AgentId, DispatchAttempt, DispatchOutcome};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Caps the doubling exponent so the shift below cannot overflow.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Exponential backoff schedule for one logical dispatch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    /// New policy without jitter. `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            jitter: false,
        }
    }

    pub fn from_params(params: &DiscussionParams) -> Self {
        Self::new(
            params.max_attempts(),
            params.base_delay(),
            params.max_delay(),
        )
        .with_jitter(params.retry_jitter)
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay applied after failed attempt `attempt_number` (1-indexed):
    /// `base * 2^(n-1)` capped at `max_delay`, plus up to 25% jitter.
    pub fn delay_for(&self, attempt_number: u32) -> Duration {
        let delay = self.base_delay_for(attempt_number);
        if self.jitter {
            delay.mul_f64(1.0 + rand::random::<f64>() * 0.25)
        } else {
            delay
        }
    }

    fn base_delay_for(&self, attempt_number: u32) -> Duration {
        let exponent = attempt_number.max(1).saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Upper bound on total backoff time for a full dispatch, jitter
    /// margin included. Used to size round deadlines.
    pub fn backoff_budget(&self) -> Duration {
        let total: Duration = (1..self.max_attempts).map(|n| self.base_delay_for(n)).sum();
        if self.jitter { total.mul_f64(1.25) } else { total }
    }

    /// Run one logical dispatch against `operation`, retrying transient
    /// outcomes with backoff. Returns the full attempt log, oldest first;
    /// the last entry is the terminal outcome.
    ///
    /// `operation` receives the 1-indexed attempt number. Cancelling
    /// `cancel` skips any remaining backoff wait and stops retrying; the
    /// in-flight attempt itself is expected to observe the same token.
    pub async fn dispatch<F, Fut>(
        &self,
        agent_id: &AgentId,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Vec<DispatchAttempt>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = DispatchOutcome>,
    {
        let mut attempts = Vec::with_capacity(1);
        for number in 1..=self.max_attempts {
            let started_at = Utc::now();
            let outcome = operation(number).await;
            let retryable = outcome.is_transient();
            let attempt =
                DispatchAttempt::finished_now(agent_id.clone(), number, started_at, outcome);
            let terminal = attempt.is_success() || !retryable;
            attempts.push(attempt);

            if terminal || number == self.max_attempts {
                break;
            }
            let delay = self.delay_for(number);
            debug!(
                "Agent {} attempt {}/{} failed transiently, retrying in {:?}",
                agent_id,
                number,
                self.max_attempts,
                delay
            );
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        attempts
    }
}
