//! Agent identity, capability snapshots, and selection

pub mod affinity;
pub mod descriptor;
pub mod id;
pub mod selector;

pub use affinity::AffinityTable;
pub use descriptor::AgentDescriptor;
pub use id::AgentId;
pub use selector::AgentSelector;
