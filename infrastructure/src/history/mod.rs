//! Session history adapters
//!
//! Implementations of the application's `HistorySink` port.

mod jsonl;

pub use jsonl::JsonlHistorySink;
