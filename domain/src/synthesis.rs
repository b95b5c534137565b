//! Response synthesis
//!
//! Folds the collected rounds into a final combined answer. Never blocks
//! on or re-invokes agents; everything here works over already-recorded
//! `RoundResult`s.

use crate::agent::id::AgentId;
use crate::conflict::report::ConflictReport;
use crate::discussion::context::DiscussionContext;
use crate::discussion::round::RoundResult;
use crate::text::truncate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Cap on extracted key points.
const MAX_KEY_POINTS: usize = 10;
/// Cap on the summary length.
const SUMMARY_CHARS: usize = 500;

/// Terminal artifact of a discussion session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// Leading answer text drawn from the final round.
    pub summary: String,
    /// Whether the final round's agreement cleared the consensus threshold.
    pub consensus: bool,
    /// Every agent with at least one success across the session.
    pub contributing_agents: BTreeSet<AgentId>,
    /// Deduplicated bullet and numbered lines from final-round responses.
    pub key_points: Vec<String>,
}

/// Pure fold from a finished context to a [`SynthesisResult`].
#[derive(Debug, Clone)]
pub struct Synthesizer {
    consensus_threshold: f64,
}

impl Synthesizer {
    pub fn new(consensus_threshold: f64) -> Self {
        Self {
            consensus_threshold: consensus_threshold.clamp(0.0, 1.0),
        }
    }

    pub fn consensus_threshold(&self) -> f64 {
        self.consensus_threshold
    }

    /// Combine the session's responses.
    ///
    /// Key points and summary come from the last round that produced any
    /// success; consensus comes from the final round's agreement score.
    pub fn synthesize(
        &self,
        context: &DiscussionContext,
        final_report: &ConflictReport,
    ) -> SynthesisResult {
        let source_round = context
            .rounds()
            .iter()
            .rev()
            .find(|round| round.success_count() > 0);

        let summary = source_round.map(lead_summary).unwrap_or_default();
        let key_points = source_round.map(extract_key_points).unwrap_or_default();

        SynthesisResult {
            summary,
            consensus: final_report.agreement_score >= self.consensus_threshold,
            contributing_agents: context.contributing_agents(),
            key_points,
        }
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(0.7)
    }
}

/// First paragraph of the first (by agent id) successful response.
fn lead_summary(round: &RoundResult) -> String {
    let Some((_, text)) = round.successful_responses().next() else {
        return String::new();
    };
    let paragraph = text
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .unwrap_or("");
    truncate(paragraph, SUMMARY_CHARS)
}

/// Bullet / numbered lines across all successful responses, deduplicated
/// case-insensitively, in agent id order.
fn extract_key_points(round: &RoundResult) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut points = Vec::new();

    for (_, text) in round.successful_responses() {
        for line in text.lines() {
            let Some(point) = key_point_line(line) else {
                continue;
            };
            if seen.insert(point.to_lowercase()) {
                points.push(point.to_string());
            }
            if points.len() == MAX_KEY_POINTS {
                return points;
            }
        }
    }
    points
}

/// Strip a bullet or numbered-list marker; `None` for plain lines.
fn key_point_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            let rest = rest.trim();
            return (!rest.is_empty()).then_some(rest);
        }
    }
    // Numbered markers: "1. point" or "2) point".
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let after = &trimmed[digits..];
        if let Some(rest) = after.strip_prefix(". ").or_else(|| after.strip_prefix(") ")) {
            let rest = rest.trim();
            return (!rest.is_empty()).then_some(rest);
        }
    }
    None
}
