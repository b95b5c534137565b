//! Task profile value objects

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Task categories a prompt can be classified into.
///
/// Ordered by tie-break priority: when a prompt matches several keyword
/// sets equally, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCategory {
    Debug,
    Code,
    Design,
    Research,
    Explain,
    General,
    SimpleChat,
}

impl TaskCategory {
    /// Get the string identifier for this category.
    pub fn as_str(&self) -> &str {
        match self {
            TaskCategory::Debug => "debug",
            TaskCategory::Code => "code",
            TaskCategory::Design => "design",
            TaskCategory::Research => "research",
            TaskCategory::Explain => "explain",
            TaskCategory::General => "general",
            TaskCategory::SimpleChat => "simple_chat",
        }
    }

    /// All categories that compete during keyword classification, in
    /// tie-break priority order. `SimpleChat` is decided separately.
    pub fn classifiable() -> [TaskCategory; 6] {
        [
            TaskCategory::Debug,
            TaskCategory::Code,
            TaskCategory::Design,
            TaskCategory::Research,
            TaskCategory::Explain,
            TaskCategory::General,
        ]
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(TaskCategory::Debug),
            "code" => Ok(TaskCategory::Code),
            "design" => Ok(TaskCategory::Design),
            "research" => Ok(TaskCategory::Research),
            "explain" => Ok(TaskCategory::Explain),
            "general" => Ok(TaskCategory::General),
            "simple_chat" => Ok(TaskCategory::SimpleChat),
            other => Err(format!("unknown task category: {}", other)),
        }
    }
}

impl Serialize for TaskCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Complexity buckets derived from the [0,1] complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    /// Bucket a complexity score: low below 0.34, medium below 0.67,
    /// high otherwise.
    pub fn from_score(score: f64) -> Self {
        if score < 0.34 {
            ComplexityLevel::Low
        } else if score < 0.67 {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::High
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComplexityLevel::Low => "low",
            ComplexityLevel::Medium => "medium",
            ComplexityLevel::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Classification of one top-level prompt.
///
/// Derived once per prompt by the [`TaskAnalyzer`](crate::task::TaskAnalyzer)
/// and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProfile {
    /// Detected category.
    pub category: TaskCategory,
    /// Complexity score in [0, 1].
    pub complexity: f64,
    /// Representative prompt keywords, at most five, in prompt order.
    pub keywords: Vec<String>,
    /// How many agents the discussion should involve.
    pub recommended_agent_count: usize,
    /// How many rounds the discussion should run.
    pub recommended_rounds: usize,
}

impl TaskProfile {
    /// Complexity bucket for this profile.
    pub fn complexity_level(&self) -> ComplexityLevel {
        ComplexityLevel::from_score(self.complexity)
    }

    /// Whether this prompt is casual chat rather than a task.
    pub fn is_simple_chat(&self) -> bool {
        self.category == TaskCategory::SimpleChat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for category in TaskCategory::classifiable() {
            let parsed: TaskCategory = category.as_str().parse().unwrap();
            assert_eq!(category, parsed);
        }
        let chat: TaskCategory = "simple_chat".parse().unwrap();
        assert_eq!(chat, TaskCategory::SimpleChat);
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!("poetry".parse::<TaskCategory>().is_err());
    }

    #[test]
    fn test_complexity_level_buckets() {
        assert_eq!(ComplexityLevel::from_score(0.0), ComplexityLevel::Low);
        assert_eq!(ComplexityLevel::from_score(0.33), ComplexityLevel::Low);
        assert_eq!(ComplexityLevel::from_score(0.34), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_score(0.66), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_score(0.67), ComplexityLevel::High);
        assert_eq!(ComplexityLevel::from_score(1.0), ComplexityLevel::High);
    }

    #[test]
    fn test_complexity_level_ordering() {
        assert!(ComplexityLevel::Low < ComplexityLevel::Medium);
        assert!(ComplexityLevel::Medium < ComplexityLevel::High);
    }
}
