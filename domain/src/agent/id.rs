//! Agent identifier value object

use serde::{Deserialize, Serialize};

/// Unique identifier for one external AI backend agent.
///
/// Registration order matters elsewhere (selection tie-breaking), so the id
/// itself is just an opaque, ordered string. `Ord` lets round results key
/// their response maps by agent id deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_display() {
        let id = AgentId::new("claude");
        assert_eq!(id.to_string(), "claude");
        assert_eq!(id.as_str(), "claude");
    }

    #[test]
    fn test_agent_id_ordering() {
        let mut ids = vec![AgentId::new("gemini"), AgentId::new("claude")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "claude");
    }
}
