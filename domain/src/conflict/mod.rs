//! Disagreement detection between agent responses

pub mod report;
pub mod similarity;

pub use report::{AgentPair, ConflictDetector, ConflictReport, DEFAULT_SIMILARITY_THRESHOLD};
pub use similarity::{SimilarityStrategy, TokenOverlap};
