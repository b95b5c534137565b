//! Application layer for roundtable
//!
//! This crate contains the discussion use case, port definitions, the agent
//! registry, retry policy, and application configuration. It depends only
//! on the domain layer.

pub mod config;
pub mod ports;
pub mod registry;
pub mod retry;
pub mod use_cases;

// Re-export commonly used types
pub use config::DiscussionParams;
pub use ports::{
    agent_backend::{AgentBackend, BackendError, InvokeOptions},
    history::{HistorySink, NoHistorySink},
    progress::{DiscussionProgress, NoProgress},
};
pub use registry::AgentRegistry;
pub use retry::RetryPolicy;
pub use use_cases::run_discussion::{
    DiscussionOutcome, RunDiscussionError, RunDiscussionInput, RunDiscussionUseCase,
};
