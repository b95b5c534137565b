//! Pairwise conflict detection between agent responses

use crate::agent::id::AgentId;
use crate::conflict::similarity::{SimilarityStrategy, TokenOverlap};
use crate::discussion::round::RoundResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default similarity below which a pair counts as conflicting.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.35;

/// Unordered pair of agent ids; construction normalizes the order so
/// `{a, b}` and `{b, a}` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentPair(AgentId, AgentId);

impl AgentPair {
    pub fn new(a: impl Into<AgentId>, b: impl Into<AgentId>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        &self.0 == id || &self.1 == id
    }
}

impl std::fmt::Display for AgentPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.0, self.1)
    }
}

/// Disagreement summary for one round.
///
/// Derived and recomputed per round; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Pairs whose responses fell below the similarity threshold.
    pub conflicting_pairs: BTreeSet<AgentPair>,
    /// 1 − conflicting pairs ÷ total pairs; 1.0 with fewer than two
    /// successful responses.
    pub agreement_score: f64,
    /// One line per flagged pair.
    pub notes: Vec<String>,
}

impl ConflictReport {
    /// Report for a round with fewer than two successful responses.
    pub fn unanimous() -> Self {
        Self {
            conflicting_pairs: BTreeSet::new(),
            agreement_score: 1.0,
            notes: Vec::new(),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicting_pairs.is_empty()
    }
}

/// Compares successful responses of a round pairwise.
pub struct ConflictDetector {
    strategy: Box<dyn SimilarityStrategy>,
    threshold: f64,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(Box::new(TokenOverlap), DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl ConflictDetector {
    /// Detector with a custom strategy and threshold.
    pub fn new(strategy: Box<dyn SimilarityStrategy>, threshold: f64) -> Self {
        Self {
            strategy,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Detector with the default token-overlap strategy and a custom
    /// threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self::new(Box::new(TokenOverlap), threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score every pair of successful responses in the round.
    ///
    /// Symmetric by construction: responses are compared as an unordered
    /// set, so reordering agents never changes the report.
    pub fn detect(&self, round: &RoundResult) -> ConflictReport {
        let responses: Vec<(&AgentId, &str)> = round.successful_responses().collect();
        if responses.len() < 2 {
            return ConflictReport::unanimous();
        }

        let mut conflicting_pairs = BTreeSet::new();
        let mut notes = Vec::new();
        let mut total_pairs = 0usize;

        for i in 0..responses.len() {
            for j in (i + 1)..responses.len() {
                total_pairs += 1;
                let (agent_a, text_a) = responses[i];
                let (agent_b, text_b) = responses[j];
                let score = self.strategy.similarity(text_a, text_b);
                if score < self.threshold {
                    notes.push(format!(
                        "{} and {} diverge: similarity {:.2} below {:.2}",
                        agent_a, agent_b, score, self.threshold
                    ));
                    conflicting_pairs.insert(AgentPair::new(agent_a.clone(), agent_b.clone()));
                }
            }
        }

        let agreement_score = 1.0 - conflicting_pairs.len() as f64 / total_pairs as f64;
        ConflictReport {
            conflicting_pairs,
            agreement_score,
            notes,
        }
    }
}
