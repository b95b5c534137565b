//! Configuration file loading for roundtable
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./roundtable.toml` or `./.roundtable.toml`
//! 3. User level: `<platform config dir>/roundtable/roundtable.toml`
//! 4. Default values

mod file_config;
mod loader;

pub use file_config::{ConfigIssue, FileAgentConfig, FileConfig, FileHistoryConfig, Severity};
pub use loader::{ConfigError, ConfigLoader};
