//! Agent selection and scoring

use crate::agent::affinity::AffinityTable;
use crate::agent::descriptor::AgentDescriptor;
use crate::agent::id::AgentId;
use crate::task::profile::TaskProfile;
use std::cmp::Ordering;

/// Ranks registered agents for a task.
///
/// Score = category affinity × availability factor. Agents scoring zero
/// (unavailable or breaker open) are excluded; the rest are ranked
/// descending with ties kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct AgentSelector {
    affinity: AffinityTable,
}

impl AgentSelector {
    /// Create a selector over a custom affinity table.
    pub fn new(affinity: AffinityTable) -> Self {
        Self { affinity }
    }

    /// Score of one agent for the profile's category.
    pub fn score(&self, descriptor: &AgentDescriptor, profile: &TaskProfile) -> f64 {
        self.affinity.affinity(descriptor, profile.category) * descriptor.availability_factor()
    }

    /// Pick up to `profile.recommended_agent_count` agents from the
    /// registry snapshot, in rank order. The snapshot slice is expected in
    /// registration order; may return fewer agents than requested, or none
    /// when the whole fleet is unavailable.
    pub fn select(&self, profile: &TaskProfile, registry: &[AgentDescriptor]) -> Vec<AgentId> {
        let mut scored: Vec<(f64, &AgentDescriptor)> = registry
            .iter()
            .map(|descriptor| (self.score(descriptor, profile), descriptor))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // Stable sort: equal scores keep registration order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(profile.recommended_agent_count);
        scored
            .into_iter()
            .map(|(_, descriptor)| descriptor.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::CircuitState;
    use crate::task::profile::TaskCategory;

    fn profile(category: TaskCategory, count: usize) -> TaskProfile {
        TaskProfile {
            category,
            complexity: 0.5,
            keywords: vec![],
            recommended_agent_count: count,
            recommended_rounds: 2,
        }
    }

    fn fleet() -> Vec<AgentDescriptor> {
        vec![
            AgentDescriptor::new("claude", vec!["reasoning".into()]),
            AgentDescriptor::new("codex", vec!["code".into()]),
            AgentDescriptor::new("gemini", vec!["research".into()]),
            AgentDescriptor::new("ollama", vec!["local".into()]),
        ]
    }

    #[test]
    fn test_code_task_prefers_code_tag() {
        let selector = AgentSelector::default();
        let picked = selector.select(&profile(TaskCategory::Code, 2), &fleet());
        assert_eq!(picked[0], AgentId::new("codex"));
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_research_task_prefers_research_tag() {
        let selector = AgentSelector::default();
        let picked = selector.select(&profile(TaskCategory::Research, 1), &fleet());
        assert_eq!(picked, vec![AgentId::new("gemini")]);
    }

    #[test]
    fn test_open_breaker_excluded() {
        let selector = AgentSelector::default();
        let registry = vec![
            AgentDescriptor::new("claude", vec!["reasoning".into()])
                .with_circuit(CircuitState::Open),
            AgentDescriptor::new("codex", vec!["code".into()]),
        ];
        let picked = selector.select(&profile(TaskCategory::Code, 2), &registry);
        assert_eq!(picked, vec![AgentId::new("codex")]);
    }

    #[test]
    fn test_half_open_ranks_below_closed() {
        let selector = AgentSelector::default();
        // Same tag so affinity matches; the half-open agent is halved.
        let registry = vec![
            AgentDescriptor::new("first", vec!["code".into()])
                .with_circuit(CircuitState::HalfOpen),
            AgentDescriptor::new("second", vec!["code".into()]),
        ];
        let picked = selector.select(&profile(TaskCategory::Code, 2), &registry);
        assert_eq!(picked[0], AgentId::new("second"));
        assert_eq!(picked[1], AgentId::new("first"));
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let selector = AgentSelector::default();
        let registry = vec![
            AgentDescriptor::new("alpha", vec!["code".into()]),
            AgentDescriptor::new("beta", vec!["code".into()]),
            AgentDescriptor::new("gamma", vec!["code".into()]),
        ];
        let picked = selector.select(&profile(TaskCategory::Code, 3), &registry);
        assert_eq!(
            picked,
            vec![
                AgentId::new("alpha"),
                AgentId::new("beta"),
                AgentId::new("gamma"),
            ]
        );
    }

    #[test]
    fn test_fully_unavailable_fleet_returns_empty() {
        let selector = AgentSelector::default();
        let registry = vec![
            AgentDescriptor::new("claude", vec!["reasoning".into()]).with_available(false),
            AgentDescriptor::new("codex", vec!["code".into()]).with_circuit(CircuitState::Open),
        ];
        let picked = selector.select(&profile(TaskCategory::Code, 2), &registry);
        assert!(picked.is_empty());
    }

    #[test]
    fn test_returns_fewer_when_fewer_eligible() {
        let selector = AgentSelector::default();
        let registry = vec![AgentDescriptor::new("codex", vec!["code".into()])];
        let picked = selector.select(&profile(TaskCategory::Code, 4), &registry);
        assert_eq!(picked.len(), 1);
    }
}
