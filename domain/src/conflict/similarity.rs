//! Response similarity strategies

use crate::text::tokenize;
use std::collections::HashSet;

/// Pluggable similarity heuristic between two response texts.
///
/// Implementations must be deterministic and symmetric
/// (`similarity(a, b) == similarity(b, a)`), returning a score in [0, 1].
pub trait SimilarityStrategy: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Jaccard overlap of the lowercased alphanumeric token sets.
///
/// Cheap and stance-agnostic: two answers sharing most of their vocabulary
/// score high even when phrased differently.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlap;

impl SimilarityStrategy for TokenOverlap {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let set_a: HashSet<String> = tokenize(a).into_iter().collect();
        let set_b: HashSet<String> = tokenize(b).into_iter().collect();
        if set_a.is_empty() && set_b.is_empty() {
            return 1.0;
        }
        if set_a.is_empty() || set_b.is_empty() {
            return 0.0;
        }
        let intersection = set_a.intersection(&set_b).count() as f64;
        let union = set_a.union(&set_b).count() as f64;
        intersection / union
    }
}
