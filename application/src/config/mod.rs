//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases
//! behave: [`DiscussionParams`] carries the orchestration loop tuning
//! (rounds, timeouts, retries, breakers).

pub mod discussion_params;

pub use discussion_params::DiscussionParams;
