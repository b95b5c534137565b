//! Plain text progress output for discussion sessions

use roundtable_application::DiscussionProgress;
use roundtable_domain::{AgentId, ConflictReport, RoundResult, SynthesisResult, TaskProfile};

/// Prints one line per orchestration milestone to stderr, keeping stdout
/// clean for the synthesized answer.
pub struct ConsoleProgress;

impl DiscussionProgress for ConsoleProgress {
    fn on_analyzed(&self, profile: &TaskProfile) {
        eprintln!(
            "-> Task: {} ({}, complexity {:.2})",
            profile.category,
            profile.complexity_level(),
            profile.complexity
        );
    }

    fn on_round_start(&self, round_index: usize, max_rounds: usize, agent_count: usize) {
        eprintln!(
            "-> Round {}/{} ({} agent(s))",
            round_index, max_rounds, agent_count
        );
    }

    fn on_agent_complete(&self, _round_index: usize, agent_id: &AgentId, success: bool) {
        if success {
            eprintln!("   v {}", agent_id);
        } else {
            eprintln!("   x {} (failed)", agent_id);
        }
    }

    fn on_round_complete(&self, round: &RoundResult) {
        eprintln!(
            "   round {} settled: {}/{} succeeded",
            round.round_index,
            round.success_count(),
            round.dispatched_count()
        );
    }

    fn on_agents_selected(&self, agents: &[AgentId]) {
        let names: Vec<&str> = agents.iter().map(|id| id.as_str()).collect();
        eprintln!("-> Agents: {}", names.join(", "));
    }

    fn on_conflicts_detected(&self, report: &ConflictReport) {
        if report.has_conflicts() {
            eprintln!(
                "   agreement {:.2}, {} conflicting pair(s)",
                report.agreement_score,
                report.conflicting_pairs.len()
            );
        } else {
            eprintln!("   agreement {:.2}", report.agreement_score);
        }
    }

    fn on_synthesis_ready(&self, _synthesis: &SynthesisResult) {
        eprintln!("-> Synthesizing final answer");
    }
}
