//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration file loading, the process-spawning
//! agent backend, and the JSONL session history sink.

pub mod backends;
pub mod config;
pub mod history;

// Re-export commonly used types
pub use backends::ProcessBackend;
pub use config::{
    ConfigError, ConfigIssue, ConfigLoader, FileAgentConfig, FileConfig, FileHistoryConfig,
    Severity,
};
pub use history::JsonlHistorySink;
