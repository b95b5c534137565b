//! Multi-agent discussion use case
//!
//! Coordinates one discussion session end to end: analyze the prompt,
//! select agents, fan out dispatches round by round, detect conflicts,
//! and synthesize a final answer. Rounds are synchronized: every dispatch
//! settles (response, terminal failure, or timeout) before the shared
//! context advances, so agents never observe a half-written round.

use crate::config::DiscussionParams;
use crate::ports::agent_backend::{AgentBackend, InvokeOptions};
use crate::ports::history::{HistorySink, NoHistorySink};
use crate::ports::progress::{DiscussionProgress, NoProgress};
use crate::registry::AgentRegistry;
use crate::retry::RetryPolicy;
use chrono::Utc;
use roundtable_domain::{
    AgentId, AgentSelector, ConflictDetector, ConflictReport, DiscussionContext, DispatchAttempt,
    DispatchOutcome, FailureKind, RoundResult, SimilarityStrategy, SynthesisResult, Synthesizer,
    TaskAnalyzer,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Slack added to the round deadline beyond the worst-case dispatch time.
const ROUND_GRACE: Duration = Duration::from_millis(500);

/// Input for the discussion use case.
#[derive(Debug, Clone)]
pub struct RunDiscussionInput {
    /// The user's prompt.
    pub prompt: String,
    /// Overrides the round count recommended by task analysis. Still
    /// capped by the configured round ceiling.
    pub rounds_override: Option<usize>,
    /// Overrides the agent count recommended by task analysis.
    pub agent_count_override: Option<usize>,
}

impl RunDiscussionInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            rounds_override: None,
            agent_count_override: None,
        }
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds_override = Some(rounds);
        self
    }

    pub fn with_agent_count(mut self, count: usize) -> Self {
        self.agent_count_override = Some(count);
        self
    }
}

/// Result of a completed discussion.
#[derive(Debug, Clone)]
pub struct DiscussionOutcome {
    /// Synthesized final answer.
    pub synthesis: SynthesisResult,
    /// Conflict report over the final round.
    pub conflicts: ConflictReport,
    /// Full session state, including every round and attempt.
    pub context: DiscussionContext,
}

/// Errors from the discussion use case.
///
/// The exhausted and cancelled variants carry the partial session so the
/// caller can inspect or persist whatever was collected before the end.
#[derive(Error, Debug)]
pub enum RunDiscussionError {
    #[error("no agents registered")]
    NoAgents,

    #[error("all agents exhausted without a successful response")]
    AllAgentsExhausted { context: Box<DiscussionContext> },

    #[error("discussion cancelled")]
    Cancelled { context: Box<DiscussionContext> },
}

impl RunDiscussionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunDiscussionError::Cancelled { .. })
    }

    /// Partial session state, when the session got far enough to have one.
    pub fn partial_context(&self) -> Option<&DiscussionContext> {
        match self {
            RunDiscussionError::NoAgents => None,
            RunDiscussionError::AllAgentsExhausted { context }
            | RunDiscussionError::Cancelled { context } => Some(context),
        }
    }
}

/// Use case: run a multi-agent discussion for a single prompt.
pub struct RunDiscussionUseCase {
    registry: Arc<AgentRegistry>,
    params: DiscussionParams,
    analyzer: TaskAnalyzer,
    selector: AgentSelector,
    detector: ConflictDetector,
    synthesizer: Synthesizer,
    history: Arc<dyn HistorySink>,
    cancellation_token: Option<CancellationToken>,
}

impl RunDiscussionUseCase {
    pub fn new(registry: Arc<AgentRegistry>, params: DiscussionParams) -> Self {
        let detector = ConflictDetector::with_threshold(params.similarity_threshold);
        let synthesizer = Synthesizer::new(params.consensus_threshold);
        Self {
            registry,
            analyzer: TaskAnalyzer::default(),
            selector: AgentSelector::default(),
            detector,
            synthesizer,
            history: Arc::new(NoHistorySink),
            cancellation_token: None,
            params,
        }
    }

    /// Persist finished sessions to the given sink.
    pub fn with_history(mut self, history: Arc<dyn HistorySink>) -> Self {
        self.history = history;
        self
    }

    /// Set the cancellation token for cooperative cancellation.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Replace the default selector (custom affinity tables).
    pub fn with_selector(mut self, selector: AgentSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Replace the default analyzer.
    pub fn with_analyzer(mut self, analyzer: TaskAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Swap the similarity strategy used for conflict detection.
    pub fn with_similarity_strategy(mut self, strategy: Box<dyn SimilarityStrategy>) -> Self {
        self.detector = ConflictDetector::new(strategy, self.params.similarity_threshold);
        self
    }

    /// Execute the discussion without progress notifications.
    pub async fn execute(
        &self,
        input: RunDiscussionInput,
    ) -> Result<DiscussionOutcome, RunDiscussionError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the discussion with progress notifications.
    pub async fn execute_with_progress(
        &self,
        input: RunDiscussionInput,
        progress: &dyn DiscussionProgress,
    ) -> Result<DiscussionOutcome, RunDiscussionError> {
        if self.registry.is_empty() {
            return Err(RunDiscussionError::NoAgents);
        }

        let mut profile = self.analyzer.analyze(&input.prompt);
        if let Some(count) = input.agent_count_override {
            profile.recommended_agent_count = count.max(1);
        }
        info!(
            "Prompt classified as {} (complexity {:.2}), targeting {} agent(s)",
            profile.category, profile.complexity, profile.recommended_agent_count
        );
        progress.on_analyzed(&profile);

        let ceiling = self.params.max_rounds.max(1);
        let session_rounds = input
            .rounds_override
            .unwrap_or(profile.recommended_rounds)
            .min(ceiling);
        let mut context = DiscussionContext::new(input.prompt.clone(), profile, session_rounds);
        let mut conflicts = ConflictReport::unanimous();

        while context.has_rounds_remaining() {
            if self.is_cancelled() {
                return Err(RunDiscussionError::Cancelled {
                    context: Box::new(context),
                });
            }

            self.registry.refresh_availability().await;
            let candidates = self
                .selector
                .select(context.task_profile(), &self.registry.snapshot());
            progress.on_agents_selected(&candidates);
            if candidates.is_empty() {
                if context.has_any_success() {
                    info!(
                        "No eligible agents remain, synthesizing from {} completed round(s)",
                        context.round_cursor()
                    );
                    break;
                }
                warn!("No eligible agents remain and no responses were collected");
                self.history.record(&context, None);
                return Err(RunDiscussionError::AllAgentsExhausted {
                    context: Box::new(context),
                });
            }

            let round = self.run_round(&context, &candidates, progress).await;
            progress.on_round_complete(&round);
            conflicts = self.detector.detect(&round);
            progress.on_conflicts_detected(&conflicts);

            // Agreement over an all-failed round is vacuous, never consensus.
            let consensus_reached = round.success_count() > 0
                && conflicts.agreement_score >= self.synthesizer.consensus_threshold();
            context.append_round(round);

            if self.is_cancelled() {
                return Err(RunDiscussionError::Cancelled {
                    context: Box::new(context),
                });
            }
            if consensus_reached {
                info!(
                    "Consensus reached after round {} (agreement {:.2})",
                    context.round_cursor(),
                    conflicts.agreement_score
                );
                break;
            }
        }

        if !context.has_any_success() {
            self.history.record(&context, None);
            return Err(RunDiscussionError::AllAgentsExhausted {
                context: Box::new(context),
            });
        }

        let synthesis = self.synthesizer.synthesize(&context, &conflicts);
        progress.on_synthesis_ready(&synthesis);
        self.history.record(&context, Some(&synthesis));
        Ok(DiscussionOutcome {
            synthesis,
            conflicts,
            context,
        })
    }

    /// Run one synchronized dispatch wave over the candidate agents.
    ///
    /// Every candidate is accounted for exactly once in the returned round:
    /// breaker refusals become errors without touching the breaker, settled
    /// dispatches are absorbed with their full attempt log, and anything
    /// still pending at the round deadline is recorded as timed out.
    async fn run_round(
        &self,
        context: &DiscussionContext,
        candidates: &[AgentId],
        progress: &dyn DiscussionProgress,
    ) -> RoundResult {
        let round_index = context.round_cursor() + 1;
        info!(
            "Starting round {}/{} with {} agent(s)",
            round_index,
            context.max_rounds(),
            candidates.len()
        );
        progress.on_round_start(round_index, context.max_rounds(), candidates.len());

        let mut result = RoundResult::new(round_index);
        let round_started = Utc::now();
        let round_prompt = Arc::new(context.build_round_prompt());
        let policy = RetryPolicy::from_params(&self.params);
        let attempt_timeout = self.params.per_agent_timeout();
        let session_token = self.cancellation_token.clone().unwrap_or_default();

        let mut join_set: JoinSet<(AgentId, Vec<DispatchAttempt>)> = JoinSet::new();
        let mut pending: BTreeSet<AgentId> = BTreeSet::new();

        for agent_id in candidates {
            let Some(backend) = self.registry.backend(agent_id) else {
                result.record_error(agent_id, "agent not registered");
                continue;
            };
            // A refused dispatch never reaches the backend, so the breaker
            // is not updated for it.
            if !self.registry.try_acquire(agent_id) {
                debug!("Circuit breaker refused dispatch to {}", agent_id);
                result.record_error(agent_id, "circuit breaker open");
                continue;
            }
            pending.insert(agent_id.clone());

            let agent_id = agent_id.clone();
            let prompt = Arc::clone(&round_prompt);
            let policy = policy.clone();
            let token = session_token.child_token();
            join_set.spawn(async move {
                let options = InvokeOptions::new(attempt_timeout);
                let attempts = policy
                    .dispatch(&agent_id, &token, |_| {
                        let backend = Arc::clone(&backend);
                        let prompt = Arc::clone(&prompt);
                        let options = options.clone();
                        let token = token.clone();
                        async move {
                            tokio::select! {
                                _ = token.cancelled() => DispatchOutcome::failure(
                                    FailureKind::Cancelled,
                                    "session cancelled",
                                ),
                                invoked = tokio::time::timeout(
                                    options.timeout,
                                    backend.invoke(&prompt, &options),
                                ) => match invoked {
                                    Ok(Ok(text)) => DispatchOutcome::success(text),
                                    Ok(Err(e)) => DispatchOutcome::failure(e.kind(), e.message()),
                                    Err(_) => DispatchOutcome::TimedOut,
                                },
                            }
                        }
                    })
                    .await;
                (agent_id, attempts)
            });
        }

        let deadline_at = tokio::time::Instant::now() + round_deadline(&policy, attempt_timeout);
        while !join_set.is_empty() {
            match tokio::time::timeout_at(deadline_at, join_set.join_next()).await {
                Ok(Some(Ok((agent_id, attempts)))) => {
                    let success = attempts.last().is_some_and(|a| a.is_success());
                    self.registry.record_outcome(&agent_id, success);
                    progress.on_agent_complete(round_index, &agent_id, success);
                    if success {
                        info!(
                            "Agent {} responded in round {} after {} attempt(s)",
                            agent_id,
                            round_index,
                            attempts.len()
                        );
                    } else if let Some(reason) =
                        attempts.last().and_then(|a| a.outcome.reason())
                    {
                        warn!("Agent {} failed in round {}: {}", agent_id, round_index, reason);
                    }
                    pending.remove(&agent_id);
                    result.absorb(&agent_id, attempts);
                }
                Ok(Some(Err(e))) => {
                    warn!("Task join error: {}", e);
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        "Round {} deadline elapsed with {} dispatch(es) still pending",
                        round_index,
                        pending.len()
                    );
                    join_set.abort_all();
                    while join_set.join_next().await.is_some() {}
                    break;
                }
            }
        }

        // Anything that never settled (round deadline, task failure) is
        // recorded as timed out and counts against the agent's breaker.
        for agent_id in pending {
            self.registry.record_outcome(&agent_id, false);
            progress.on_agent_complete(round_index, &agent_id, false);
            result.absorb(
                &agent_id,
                vec![DispatchAttempt::finished_now(
                    agent_id.clone(),
                    1,
                    round_started,
                    DispatchOutcome::TimedOut,
                )],
            );
        }
        result
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|t| t.is_cancelled())
    }
}

/// Worst case for one logical dispatch: every attempt runs to its timeout
/// with full backoff in between, plus grace for scheduling.
fn round_deadline(policy: &RetryPolicy, attempt_timeout: Duration) -> Duration {
    attempt_timeout
        .saturating_mul(policy.max_attempts())
        .saturating_add(policy.backoff_budget())
        .saturating_add(ROUND_GRACE)
}
