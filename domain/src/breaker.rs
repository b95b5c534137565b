//! Per-agent circuit breaker
//!
//! Guards dispatch to one unreliable backend. Repeated consecutive failures
//! open the circuit and block dispatch for a cooldown window; after the
//! window a single probe attempt decides whether the circuit closes again.
//!
//! The breaker itself is a plain single-owner state machine. Callers that
//! share one across tasks wrap it in a mutex; breakers for different agents
//! never share a lock.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, dispatch allowed.
    Closed,
    /// Too many consecutive failures, all dispatch blocked.
    Open,
    /// Cooldown elapsed, exactly one trial dispatch permitted.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        };
        write!(f, "{}", s)
    }
}

/// Failure-rate state machine for a single agent.
///
/// Transitions:
/// - `Closed` → `Open` after `failure_threshold` consecutive failures
/// - `Open` → `HalfOpen` once `open_duration` has elapsed (observed lazily)
/// - `HalfOpen` → `Closed` on probe success, back to `Open` on probe failure
///
/// # Example
///
/// ```
/// use roundtable_domain::breaker::{CircuitBreaker, CircuitState};
/// use std::time::Duration;
///
/// let mut breaker = CircuitBreaker::new(2, Duration::from_secs(30));
/// breaker.record_failure();
/// breaker.record_failure();
/// assert_eq!(breaker.state(), CircuitState::Open);
/// assert!(!breaker.try_acquire());
/// ```
#[derive(Debug)]
pub struct CircuitBreaker {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
    failure_threshold: u32,
    open_duration: Duration,
}

impl CircuitBreaker {
    /// Create a closed breaker. A zero threshold is treated as one.
    pub fn new(failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            probe_in_flight: false,
            failure_threshold: failure_threshold.max(1),
            open_duration,
        }
    }

    /// Current state, applying the lazy `Open` → `HalfOpen` transition when
    /// the cooldown window has elapsed.
    pub fn state(&mut self) -> CircuitState {
        if self.state == CircuitState::Open
            && let Some(opened_at) = self.opened_at
            && opened_at.elapsed() >= self.open_duration
        {
            self.state = CircuitState::HalfOpen;
            self.probe_in_flight = false;
        }
        self.state
    }

    /// Ask permission to dispatch.
    ///
    /// `Closed` always permits. `HalfOpen` permits exactly one probe until
    /// its outcome is recorded. `Open` refuses.
    pub fn try_acquire(&mut self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if self.probe_in_flight {
                    false
                } else {
                    self.probe_in_flight = true;
                    true
                }
            }
        }
    }

    /// Record a successful dispatch outcome.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.probe_in_flight = false;
        self.opened_at = None;
        self.state = CircuitState::Closed;
    }

    /// Record a failed or timed-out dispatch outcome.
    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        match self.state() {
            CircuitState::Closed => {
                if self.consecutive_failures >= self.failure_threshold {
                    self.trip();
                }
            }
            // Probe failed: back to Open with a fresh cooldown timer.
            CircuitState::HalfOpen => self.trip(),
            // Already open (deadline bookkeeping can race a lazy transition);
            // leave the existing cooldown timer alone.
            CircuitState::Open => {}
        }
    }

    fn trip(&mut self) {
        self.state = CircuitState::Open;
        self.opened_at = Some(Instant::now());
        self.probe_in_flight = false;
    }

    /// Number of consecutive failures since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// When the breaker last opened, if it is currently open.
    pub fn opened_at(&self) -> Option<Instant> {
        self.opened_at
    }

    /// Force the breaker back to `Closed` with counters cleared.
    pub fn reset(&mut self) {
        self.record_success();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32) -> CircuitBreaker {
        CircuitBreaker::new(threshold, Duration::from_millis(10))
    }

    #[test]
    fn test_starts_closed() {
        let mut b = breaker(3);
        assert_eq!(b.state(), CircuitState::Closed);
        assert!(b.try_acquire());
    }

    #[test]
    fn test_opens_at_failure_threshold() {
        let mut b = breaker(3);
        b.record_failure();
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Closed);
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Open);
        assert!(!b.try_acquire());
        assert_eq!(b.consecutive_failures(), 3);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let mut b = breaker(3);
        b.record_failure();
        b.record_failure();
        b.record_success();
        assert_eq!(b.consecutive_failures(), 0);
        b.record_failure();
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Closed);
    }

    #[test]
    fn test_open_blocks_until_cooldown_elapses() {
        let mut b = breaker(1);
        b.record_failure();
        assert!(!b.try_acquire());
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(b.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn test_half_open_permits_exactly_one_probe() {
        let mut b = breaker(1);
        b.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert!(b.try_acquire());
        assert!(!b.try_acquire());
        assert!(!b.try_acquire());
    }

    #[test]
    fn test_probe_success_closes_circuit() {
        let mut b = breaker(1);
        b.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert!(b.try_acquire());
        b.record_success();
        assert_eq!(b.state(), CircuitState::Closed);
        assert!(b.try_acquire());
    }

    #[test]
    fn test_probe_failure_reopens_with_fresh_timer() {
        let mut b = breaker(1);
        b.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert!(b.try_acquire());
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Open);
        assert!(!b.try_acquire());
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(b.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn test_zero_threshold_treated_as_one() {
        let mut b = breaker(0);
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Open);
    }

    #[test]
    fn test_reset_closes_and_clears() {
        let mut b = breaker(1);
        b.record_failure();
        b.reset();
        assert_eq!(b.state(), CircuitState::Closed);
        assert_eq!(b.consecutive_failures(), 0);
    }
}
