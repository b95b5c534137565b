//! Static affinity weights for agent selection

use crate::agent::descriptor::AgentDescriptor;
use crate::agent::id::AgentId;
use crate::task::profile::TaskCategory;
use std::collections::HashMap;

/// Weight used when neither a tag entry nor an agent override matches.
const DEFAULT_WEIGHT: f64 = 0.6;

/// Per-category affinity weights, keyed by capability tag with optional
/// per-agent overrides.
///
/// An agent's affinity for a category is the highest weight among its
/// declared tags, unless an explicit override for that agent exists.
/// Weights live in [0, 1].
#[derive(Debug, Clone)]
pub struct AffinityTable {
    tag_weights: HashMap<String, HashMap<TaskCategory, f64>>,
    agent_overrides: HashMap<AgentId, HashMap<TaskCategory, f64>>,
    default_weight: f64,
}

impl Default for AffinityTable {
    /// Standard table covering the common capability tags.
    fn default() -> Self {
        use TaskCategory::*;
        let mut table = Self::empty(DEFAULT_WEIGHT);
        for (category, weight) in [
            (Code, 0.95),
            (Debug, 0.90),
            (Design, 0.75),
            (Research, 0.60),
            (Explain, 0.70),
            (General, 0.70),
            (SimpleChat, 0.60),
        ] {
            table.set_tag_weight("code", category, weight);
        }
        for (category, weight) in [
            (Code, 0.85),
            (Debug, 0.85),
            (Design, 0.95),
            (Research, 0.85),
            (Explain, 0.95),
            (General, 0.90),
            (SimpleChat, 0.90),
        ] {
            table.set_tag_weight("reasoning", category, weight);
        }
        for (category, weight) in [
            (Code, 0.60),
            (Debug, 0.55),
            (Design, 0.70),
            (Research, 0.95),
            (Explain, 0.85),
            (General, 0.75),
            (SimpleChat, 0.70),
        ] {
            table.set_tag_weight("research", category, weight);
        }
        for (category, weight) in [
            (Code, 0.60),
            (Debug, 0.55),
            (Design, 0.50),
            (Research, 0.50),
            (Explain, 0.65),
            (General, 0.65),
            (SimpleChat, 0.80),
        ] {
            table.set_tag_weight("local", category, weight);
        }
        table
    }
}

impl AffinityTable {
    /// Table with no entries; every lookup resolves to `default_weight`.
    pub fn empty(default_weight: f64) -> Self {
        Self {
            tag_weights: HashMap::new(),
            agent_overrides: HashMap::new(),
            default_weight,
        }
    }

    /// Set the weight for one capability tag and category.
    pub fn set_tag_weight(&mut self, tag: impl Into<String>, category: TaskCategory, weight: f64) {
        self.tag_weights
            .entry(tag.into())
            .or_default()
            .insert(category, weight.clamp(0.0, 1.0));
    }

    /// Builder form of [`set_tag_weight`](Self::set_tag_weight).
    pub fn with_tag_weight(
        mut self,
        tag: impl Into<String>,
        category: TaskCategory,
        weight: f64,
    ) -> Self {
        self.set_tag_weight(tag, category, weight);
        self
    }

    /// Override the weight for one specific agent and category. Overrides
    /// win over tag lookups.
    pub fn with_agent_weight(
        mut self,
        agent: impl Into<AgentId>,
        category: TaskCategory,
        weight: f64,
    ) -> Self {
        self.agent_overrides
            .entry(agent.into())
            .or_default()
            .insert(category, weight.clamp(0.0, 1.0));
        self
    }

    /// Affinity of an agent for a task category.
    pub fn affinity(&self, descriptor: &AgentDescriptor, category: TaskCategory) -> f64 {
        if let Some(overrides) = self.agent_overrides.get(&descriptor.id)
            && let Some(weight) = overrides.get(&category)
        {
            return *weight;
        }

        descriptor
            .capability_tags
            .iter()
            .filter_map(|tag| self.tag_weights.get(tag)?.get(&category))
            .copied()
            .fold(None, |best: Option<f64>, w| {
                Some(best.map_or(w, |b| b.max(w)))
            })
            .unwrap_or(self.default_weight)
    }
}
