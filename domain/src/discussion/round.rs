//! Per-round dispatch results

use crate::agent::id::AgentId;
use crate::discussion::attempt::DispatchAttempt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One agent's terminal failure within a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundError {
    pub agent_id: AgentId,
    pub reason: String,
}

impl RoundError {
    pub fn new(agent_id: impl Into<AgentId>, reason: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of one synchronized dispatch wave.
///
/// Keyed by agent id so the result is independent of completion order.
/// Every dispatched agent lands in exactly one of `responses` (terminal
/// success) or `errors` (terminal failure or timeout); `attempts` keeps the
/// full append-only log including retries. Never mutated after the round
/// closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RoundResult {
    /// 1-based round number.
    pub round_index: usize,
    /// Latest (terminal, successful) attempt per agent.
    pub responses: BTreeMap<AgentId, DispatchAttempt>,
    /// Terminal failures, in the order they were recorded.
    pub errors: Vec<RoundError>,
    /// Every attempt made during the round, including retries.
    pub attempts: Vec<DispatchAttempt>,
}

impl RoundResult {
    /// Start an empty result for the given round number.
    pub fn new(round_index: usize) -> Self {
        Self {
            round_index,
            responses: BTreeMap::new(),
            errors: Vec::new(),
            attempts: Vec::new(),
        }
    }

    /// Fold one agent's complete attempt log into the round.
    ///
    /// The last attempt decides where the agent lands: `responses` on
    /// success, `errors` otherwise. An empty log (dispatch produced no
    /// attempts) still counts as an error so accounting stays complete.
    pub fn absorb(&mut self, agent_id: &AgentId, attempts: Vec<DispatchAttempt>) {
        match attempts.last() {
            None => {
                self.errors
                    .push(RoundError::new(agent_id.clone(), "dispatch produced no attempts"));
            }
            Some(last) if last.is_success() => {
                self.responses.insert(agent_id.clone(), last.clone());
            }
            Some(last) => {
                let reason = last
                    .outcome
                    .reason()
                    .unwrap_or_else(|| "failed".to_string());
                self.errors.push(RoundError::new(agent_id.clone(), reason));
            }
        }
        self.attempts.extend(attempts);
    }

    /// Record an agent that never produced an attempt (breaker refused,
    /// deadline hit before completion).
    pub fn record_error(&mut self, agent_id: &AgentId, reason: impl Into<String>) {
        self.errors.push(RoundError::new(agent_id.clone(), reason));
    }

    /// Successful (agent, text) pairs in agent id order.
    pub fn successful_responses(&self) -> impl Iterator<Item = (&AgentId, &str)> {
        self.responses
            .iter()
            .filter_map(|(id, attempt)| attempt.outcome.text().map(|text| (id, text)))
    }

    /// Number of agents with a successful response.
    pub fn success_count(&self) -> usize {
        self.responses.len()
    }

    /// Number of agents accounted for in this round.
    pub fn dispatched_count(&self) -> usize {
        self.responses.len() + self.errors.len()
    }

    /// True when every dispatched agent failed.
    pub fn is_exhausted(&self) -> bool {
        self.responses.is_empty() && !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::attempt::{DispatchOutcome, FailureKind};
    use chrono::Utc;

    fn attempt(agent: &str, number: u32, outcome: DispatchOutcome) -> DispatchAttempt {
        DispatchAttempt::new(agent, number, Utc::now(), Utc::now(), outcome)
    }

    #[test]
    fn test_absorb_success_lands_in_responses() {
        let mut round = RoundResult::new(1);
        let id = AgentId::new("claude");
        round.absorb(
            &id,
            vec![
                attempt("claude", 1, DispatchOutcome::TimedOut),
                attempt("claude", 2, DispatchOutcome::success("answer")),
            ],
        );
        assert_eq!(round.success_count(), 1);
        assert!(round.errors.is_empty());
        assert_eq!(round.attempts.len(), 2);
        assert_eq!(round.responses[&id].attempt_number, 2);
    }

    #[test]
    fn test_absorb_failure_lands_in_errors() {
        let mut round = RoundResult::new(1);
        let id = AgentId::new("codex");
        round.absorb(
            &id,
            vec![attempt(
                "codex",
                1,
                DispatchOutcome::failure(FailureKind::Declined, "refused"),
            )],
        );
        assert_eq!(round.success_count(), 0);
        assert_eq!(round.errors.len(), 1);
        assert!(round.errors[0].reason.contains("declined"));
        assert!(round.is_exhausted());
    }

    #[test]
    fn test_empty_attempt_log_still_accounted() {
        let mut round = RoundResult::new(1);
        let id = AgentId::new("gemini");
        round.absorb(&id, vec![]);
        assert_eq!(round.dispatched_count(), 1);
    }

    #[test]
    fn test_full_accounting() {
        let mut round = RoundResult::new(2);
        round.absorb(
            &AgentId::new("a"),
            vec![attempt("a", 1, DispatchOutcome::success("x"))],
        );
        round.absorb(&AgentId::new("b"), vec![attempt("b", 1, DispatchOutcome::TimedOut)]);
        round.record_error(&AgentId::new("c"), "circuit open");
        assert_eq!(round.dispatched_count(), 3);
        assert_eq!(round.success_count(), 1);
        assert_eq!(round.errors.len(), 2);
    }

    #[test]
    fn test_successful_responses_in_id_order() {
        let mut round = RoundResult::new(1);
        round.absorb(
            &AgentId::new("zeta"),
            vec![attempt("zeta", 1, DispatchOutcome::success("z"))],
        );
        round.absorb(
            &AgentId::new("alpha"),
            vec![attempt("alpha", 1, DispatchOutcome::success("a"))],
        );
        let ids: Vec<&str> = round
            .successful_responses()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }
}
