//! Agent backend adapters
//!
//! Implementations of the application's `AgentBackend` port. The only
//! shipped adapter spawns external CLI processes; the fleet is declared
//! entirely in configuration.

mod process;

pub use process::ProcessBackend;
