//! Domain layer for roundtable
//!
//! Core types and deterministic logic for orchestrating a multi-agent
//! discussion. No I/O, no async, no dependencies on the application or
//! infrastructure layers.
//!
//! # Core Concepts
//!
//! - **Task analysis**: a prompt is classified once into a [`TaskProfile`]
//!   (category, complexity, recommended discussion size).
//! - **Selection**: agents are ranked by category affinity weighted by
//!   availability and circuit state.
//! - **Rounds**: each round fans the prompt out to the selected agents;
//!   results accumulate in a [`DiscussionContext`].
//! - **Conflict & synthesis**: responses are compared pairwise for
//!   disagreement, then folded into a final [`SynthesisResult`].
//!
//! Everything here is total: classification, scoring, conflict detection,
//! and synthesis never fail. Fallible operations (dispatch, config, I/O)
//! live in the outer layers.

pub mod agent;
pub mod breaker;
pub mod conflict;
pub mod discussion;
pub mod synthesis;
pub mod task;
pub mod text;

// Re-export commonly used types
pub use agent::{AffinityTable, AgentDescriptor, AgentId, AgentSelector};
pub use breaker::{CircuitBreaker, CircuitState};
pub use conflict::{
    AgentPair, ConflictDetector, ConflictReport, DEFAULT_SIMILARITY_THRESHOLD, SimilarityStrategy,
    TokenOverlap,
};
pub use discussion::{
    DiscussionContext, DispatchAttempt, DispatchOutcome, FailureKind, RoundError, RoundResult,
};
pub use synthesis::{SynthesisResult, Synthesizer};
pub use task::{ComplexityLevel, TaskAnalyzer, TaskCategory, TaskProfile};
