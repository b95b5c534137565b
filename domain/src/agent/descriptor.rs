//! Selector-facing agent snapshot

use crate::agent::id::AgentId;
use crate::breaker::CircuitState;
use serde::{Deserialize, Serialize};

/// Point-in-time view of one registered agent.
///
/// Produced by the registry for selection and scoring. Availability comes
/// from the TTL cache, the circuit state from the agent's breaker; both may
/// be slightly stale, which the selector tolerates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique agent id.
    pub id: AgentId,
    /// Declared capability tags (e.g. "code", "reasoning", "research").
    pub capability_tags: Vec<String>,
    /// Last observed availability.
    pub available: bool,
    /// Current circuit breaker state.
    pub circuit: CircuitState,
}

impl AgentDescriptor {
    /// Create a descriptor for an available agent with a closed breaker.
    pub fn new(id: impl Into<AgentId>, capability_tags: Vec<String>) -> Self {
        Self {
            id: id.into(),
            capability_tags,
            available: true,
            circuit: CircuitState::Closed,
        }
    }

    /// Set the availability flag.
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Set the circuit state.
    pub fn with_circuit(mut self, circuit: CircuitState) -> Self {
        self.circuit = circuit;
        self
    }

    /// Multiplier applied to the affinity score during selection:
    /// 0 when unavailable or the breaker is open, 0.5 during a half-open
    /// probe window, 1 when healthy.
    pub fn availability_factor(&self) -> f64 {
        if !self.available {
            return 0.0;
        }
        match self.circuit {
            CircuitState::Open => 0.0,
            CircuitState::HalfOpen => 0.5,
            CircuitState::Closed => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_factor() {
        let healthy = AgentDescriptor::new("a", vec![]);
        assert_eq!(healthy.availability_factor(), 1.0);

        let probing = AgentDescriptor::new("b", vec![]).with_circuit(CircuitState::HalfOpen);
        assert_eq!(probing.availability_factor(), 0.5);

        let open = AgentDescriptor::new("c", vec![]).with_circuit(CircuitState::Open);
        assert_eq!(open.availability_factor(), 0.0);

        let down = AgentDescriptor::new("d", vec![]).with_available(false);
        assert_eq!(down.availability_factor(), 0.0);
    }
}
