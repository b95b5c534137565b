//! Discussion session state
//!
//! Dispatch attempts, per-round results, and the shared context the
//! coordinator threads through a multi-round session.

pub mod attempt;
pub mod context;
pub mod round;

pub use attempt::{DispatchAttempt, DispatchOutcome, FailureKind};
pub use context::DiscussionContext;
pub use round::{RoundError, RoundResult};
