//! Progress notification port
//!
//! Defines the interface for reporting progress during a discussion.

use roundtable_domain::{AgentId, ConflictReport, RoundResult, SynthesisResult, TaskProfile};

/// Callback for progress updates while a discussion runs
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait DiscussionProgress: Send + Sync {
    /// Called when prompt analysis completes
    fn on_analyzed(&self, profile: &TaskProfile);

    /// Called when a discussion round starts
    fn on_round_start(&self, round_index: usize, max_rounds: usize, agent_count: usize);

    /// Called when one agent finishes its dispatch within a round
    fn on_agent_complete(&self, round_index: usize, agent_id: &AgentId, success: bool);

    /// Called when a round settles with full accounting
    fn on_round_complete(&self, round: &RoundResult);

    // ==================== Optional Callbacks ====================

    /// Called with the agents chosen for the next round, best first.
    fn on_agents_selected(&self, _agents: &[AgentId]) {}

    /// Called after conflict detection over the latest round.
    fn on_conflicts_detected(&self, _report: &ConflictReport) {}

    /// Called once the final synthesis is ready.
    fn on_synthesis_ready(&self, _synthesis: &SynthesisResult) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DiscussionProgress for NoProgress {
    fn on_analyzed(&self, _profile: &TaskProfile) {}
    fn on_round_start(&self, _round_index: usize, _max_rounds: usize, _agent_count: usize) {}
    fn on_agent_complete(&self, _round_index: usize, _agent_id: &AgentId, _success: bool) {}
    fn on_round_complete(&self, _round: &RoundResult) {}
}
