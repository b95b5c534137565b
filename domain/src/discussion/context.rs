//! Shared discussion state across rounds

use crate::agent::id::AgentId;
use crate::discussion::round::RoundResult;
use crate::task::profile::TaskProfile;
use crate::text::truncate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-response excerpt cap when rebuilding the discussion transcript.
const EXCERPT_CHARS: usize = 500;
/// Overall transcript budget handed back to agents in later rounds.
const TRANSCRIPT_BUDGET: usize = 4000;

/// Mutable, round-indexed state for one discussion session.
///
/// Exclusively owned by the coordinator for the session's lifetime: only it
/// appends rounds, and only after all dispatches in the round have settled.
/// At session end the context is handed to the caller (and optionally the
/// history sink) intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionContext {
    prompt: String,
    task_profile: TaskProfile,
    rounds: Vec<RoundResult>,
    max_rounds: usize,
    round_cursor: usize,
}

impl DiscussionContext {
    /// Open a session for a prompt. `max_rounds` is the hard ceiling; a
    /// zero is promoted to one so a session can always run.
    pub fn new(prompt: impl Into<String>, task_profile: TaskProfile, max_rounds: usize) -> Self {
        Self {
            prompt: prompt.into(),
            task_profile,
            rounds: Vec::new(),
            max_rounds: max_rounds.max(1),
            round_cursor: 0,
        }
    }

    // ==================== Accessors ====================

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn task_profile(&self) -> &TaskProfile {
        &self.task_profile
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    /// Number of completed rounds.
    pub fn round_cursor(&self) -> usize {
        self.round_cursor
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// The most recently completed round.
    pub fn final_round(&self) -> Option<&RoundResult> {
        self.rounds.last()
    }

    /// Whether another round may start.
    pub fn has_rounds_remaining(&self) -> bool {
        self.round_cursor < self.max_rounds
    }

    /// True when any round produced at least one successful response.
    pub fn has_any_success(&self) -> bool {
        self.rounds.iter().any(|r| r.success_count() > 0)
    }

    /// Agents with at least one success anywhere in the session.
    pub fn contributing_agents(&self) -> BTreeSet<AgentId> {
        self.rounds
            .iter()
            .flat_map(|r| r.responses.keys().cloned())
            .collect()
    }

    // ==================== Mutation ====================

    /// Append a completed round and advance the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the round ceiling has already been reached; the
    /// coordinator checks `has_rounds_remaining` before dispatching.
    pub fn append_round(&mut self, round: RoundResult) {
        assert!(
            self.round_cursor < self.max_rounds,
            "round cursor may not exceed max_rounds"
        );
        self.rounds.push(round);
        self.round_cursor += 1;
    }

    // ==================== Round prompts ====================

    /// Prompt handed to agents for the upcoming round.
    ///
    /// Round one is the user prompt verbatim. Later rounds append a
    /// transcript of prior responses (bounded excerpts, most recent rounds
    /// kept when the budget runs out) and ask agents to revise.
    pub fn build_round_prompt(&self) -> String {
        if self.rounds.is_empty() {
            return self.prompt.clone();
        }

        let mut blocks: Vec<String> = Vec::new();
        let mut used = 0usize;
        for round in self.rounds.iter().rev() {
            let mut block = format!("Round {} responses:\n", round.round_index);
            for (agent, text) in round.successful_responses() {
                block.push_str(&format!(
                    "\n--- {} ---\n{}\n",
                    agent,
                    truncate(text, EXCERPT_CHARS)
                ));
            }
            let len = block.chars().count();
            if used + len > TRANSCRIPT_BUDGET && !blocks.is_empty() {
                break;
            }
            used += len;
            blocks.push(block);
        }
        blocks.reverse();

        format!(
            "{}\n\nThis is round {} of a multi-agent discussion on the question above.\n\n{}\n\
             Considering the responses above, provide your own revised answer. \
             Note explicitly where you disagree.",
            self.prompt,
            self.round_cursor + 1,
            blocks.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::attempt::{DispatchAttempt, DispatchOutcome};
    use crate::task::profile::{TaskCategory, TaskProfile};
    use chrono::Utc;

    fn profile() -> TaskProfile {
        TaskProfile {
            category: TaskCategory::General,
            complexity: 0.2,
            keywords: vec![],
            recommended_agent_count: 2,
            recommended_rounds: 2,
        }
    }

    fn round_with_success(index: usize, agent: &str, text: &str) -> RoundResult {
        let mut round = RoundResult::new(index);
        round.absorb(
            &AgentId::new(agent),
            vec![DispatchAttempt::new(
                agent,
                1,
                Utc::now(),
                Utc::now(),
                DispatchOutcome::success(text),
            )],
        );
        round
    }

    #[test]
    fn test_first_round_prompt_is_raw_prompt() {
        let context = DiscussionContext::new("What is ownership?", profile(), 3);
        assert_eq!(context.build_round_prompt(), "What is ownership?");
    }

    #[test]
    fn test_later_round_prompt_includes_transcript() {
        let mut context = DiscussionContext::new("What is ownership?", profile(), 3);
        context.append_round(round_with_success(1, "claude", "Ownership is about moves."));
        let prompt = context.build_round_prompt();
        assert!(prompt.starts_with("What is ownership?"));
        assert!(prompt.contains("round 2"));
        assert!(prompt.contains("--- claude ---"));
        assert!(prompt.contains("Ownership is about moves."));
    }

    #[test]
    fn test_transcript_excerpts_truncated() {
        let mut context = DiscussionContext::new("q", profile(), 3);
        let long = "x".repeat(2000);
        context.append_round(round_with_success(1, "claude", &long));
        let prompt = context.build_round_prompt();
        assert!(!prompt.contains(&long));
        assert!(prompt.contains(&"x".repeat(400)));
    }

    #[test]
    fn test_cursor_advances_and_caps() {
        let mut context = DiscussionContext::new("q", profile(), 2);
        assert!(context.has_rounds_remaining());
        context.append_round(round_with_success(1, "a", "t"));
        context.append_round(round_with_success(2, "b", "t"));
        assert_eq!(context.round_cursor(), 2);
        assert!(!context.has_rounds_remaining());
    }

    #[test]
    #[should_panic(expected = "round cursor")]
    fn test_append_past_ceiling_panics() {
        let mut context = DiscussionContext::new("q", profile(), 1);
        context.append_round(round_with_success(1, "a", "t"));
        context.append_round(round_with_success(2, "b", "t"));
    }

    #[test]
    fn test_contributing_agents_across_rounds() {
        let mut context = DiscussionContext::new("q", profile(), 3);
        context.append_round(round_with_success(1, "claude", "t"));
        context.append_round(round_with_success(2, "codex", "t"));
        let agents = context.contributing_agents();
        assert!(agents.contains(&AgentId::new("claude")));
        assert!(agents.contains(&AgentId::new("codex")));
        assert_eq!(agents.len(), 2);
    }

    #[test]
    fn test_zero_max_rounds_promoted_to_one() {
        let context = DiscussionContext::new("q", profile(), 0);
        assert_eq!(context.max_rounds(), 1);
    }
}
