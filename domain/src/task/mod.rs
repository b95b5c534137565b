//! Prompt classification
//!
//! Turns a free-text prompt into a [`TaskProfile`]: category, complexity,
//! keywords, and discussion sizing recommendations.

pub mod analyzer;
pub mod profile;

pub use analyzer::TaskAnalyzer;
pub use profile::{ComplexityLevel, TaskCategory, TaskProfile};
