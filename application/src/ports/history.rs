//! Session history port
//!
//! Defines the interface for persisting finished discussions.

use roundtable_domain::{DiscussionContext, SynthesisResult};

/// Sink for completed discussion sessions
///
/// Recording is infallible by contract: implementations handle their own
/// errors (log and continue) so persistence problems never fail a
/// discussion that already produced an answer.
pub trait HistorySink: Send + Sync {
    /// Record a finished session.
    ///
    /// `synthesis` is `None` when the session ended without a successful
    /// response to synthesize from.
    fn record(&self, context: &DiscussionContext, synthesis: Option<&SynthesisResult>);
}

/// No-op sink for when history persistence is not needed
pub struct NoHistorySink;

impl HistorySink for NoHistorySink {
    fn record(&self, _context: &DiscussionContext, _synthesis: Option<&SynthesisResult>) {}
}
