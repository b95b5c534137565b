//! Rule-based task analysis
//!
//! Classifies a free-text prompt into a [`TaskProfile`] without any network
//! or agent calls. Deterministic: the same prompt always yields the same
//! profile.

use crate::task::profile::{ComplexityLevel, TaskCategory, TaskProfile};
use crate::text::tokenize;

/// Keyword sets per classifiable category, checked against the lowercased
/// token set of the prompt.
fn category_keywords(category: TaskCategory) -> &'static [&'static str] {
    match category {
        TaskCategory::Debug => &[
            "fix", "error", "bug", "debug", "exception", "traceback", "crash",
            "broken", "fails", "failing", "panic", "stacktrace", "segfault",
        ],
        TaskCategory::Code => &[
            "code", "implement", "function", "refactor", "write", "class",
            "method", "api", "script", "compile", "library", "module",
        ],
        TaskCategory::Design => &[
            "design", "architecture", "architect", "structure", "pattern",
            "schema", "interface", "scalable", "database", "tradeoff",
        ],
        TaskCategory::Research => &[
            "research", "compare", "comparison", "versus", "investigate",
            "evaluate", "benchmark", "alternatives", "survey", "options",
        ],
        TaskCategory::Explain => &[
            "explain", "what", "how", "why", "describe", "understand",
            "meaning", "clarify", "documentation",
        ],
        // General has no keywords; it is the fallback.
        TaskCategory::General | TaskCategory::SimpleChat => &[],
    }
}

/// Words dropped before keyword extraction.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "from", "what", "how",
    "why", "can", "you", "your", "please", "would", "could", "should",
    "about", "are", "was", "were", "have", "has", "had", "will", "not",
    "but", "all", "any", "our", "out", "into", "when", "where", "which",
];

/// Markers whose stacking suggests a multi-part request.
const CONJUNCTIONS: &[&str] = &["and", "then", "also", "additionally", "plus", "furthermore"];

/// Word-count ceiling treated as "full length" when scoring complexity.
const LENGTH_CEILING: f64 = 60.0;
/// Keyword-hit ceiling treated as "full signal" when scoring complexity.
const SIGNAL_CEILING: f64 = 6.0;
/// Maximum keywords carried on a profile.
const MAX_KEYWORDS: usize = 5;

/// Rule-based prompt classifier.
///
/// # Example
///
/// ```
/// use roundtable_domain::task::{TaskAnalyzer, TaskCategory};
///
/// let analyzer = TaskAnalyzer::default();
/// let profile = analyzer.analyze("Fix this null pointer exception in my code");
/// assert_eq!(profile.category, TaskCategory::Debug);
/// ```
#[derive(Debug, Clone)]
pub struct TaskAnalyzer {
    /// Prompts at or below this many tokens with no keyword signal are
    /// treated as casual chat.
    simple_chat_max_tokens: usize,
}

impl Default for TaskAnalyzer {
    fn default() -> Self {
        Self {
            simple_chat_max_tokens: 3,
        }
    }
}

impl TaskAnalyzer {
    /// Create an analyzer with a custom simple-chat token threshold.
    pub fn new(simple_chat_max_tokens: usize) -> Self {
        Self {
            simple_chat_max_tokens,
        }
    }

    /// Classify a prompt. Total: every input yields a profile.
    pub fn analyze(&self, prompt: &str) -> TaskProfile {
        let tokens = tokenize(prompt);
        if tokens.is_empty() {
            // Explicit fallback for empty or non-text input.
            return TaskProfile {
                category: TaskCategory::General,
                complexity: 0.0,
                keywords: Vec::new(),
                recommended_agent_count: recommended_agents(TaskCategory::General, ComplexityLevel::Low),
                recommended_rounds: recommended_rounds(TaskCategory::General, ComplexityLevel::Low),
            };
        }

        let (category, total_hits) = self.classify(&tokens);
        let complexity = self.score_complexity(prompt, &tokens, total_hits);
        let level = ComplexityLevel::from_score(complexity);

        TaskProfile {
            category,
            complexity,
            keywords: extract_keywords(&tokens),
            recommended_agent_count: recommended_agents(category, level),
            recommended_rounds: recommended_rounds(category, level),
        }
    }

    /// Pick the category with the most keyword hits; ties keep the earlier
    /// (higher-priority) category. Returns the winning category and the
    /// total hit count across all sets.
    fn classify(&self, tokens: &[String]) -> (TaskCategory, usize) {
        let mut best = TaskCategory::General;
        let mut best_hits = 0usize;
        let mut total_hits = 0usize;

        for category in TaskCategory::classifiable() {
            let hits = category_keywords(category)
                .iter()
                .filter(|kw| tokens.iter().any(|t| t == *kw))
                .count();
            total_hits += hits;
            if hits > best_hits {
                best = category;
                best_hits = hits;
            }
        }

        if best_hits == 0 {
            if tokens.len() <= self.simple_chat_max_tokens {
                return (TaskCategory::SimpleChat, 0);
            }
            return (TaskCategory::General, 0);
        }
        (best, total_hits)
    }

    /// Linear weighting of normalized length, keyword density, and
    /// multi-part indicators. Bounded to [0, 1].
    fn score_complexity(&self, prompt: &str, tokens: &[String], total_hits: usize) -> f64 {
        let length = (tokens.len() as f64 / LENGTH_CEILING).min(1.0);
        let signal = (total_hits as f64 / SIGNAL_CEILING).min(1.0);
        let multipart = if has_multipart_indicators(prompt, tokens) {
            1.0
        } else {
            0.0
        };
        (length * 0.45 + signal * 0.35 + multipart * 0.20).clamp(0.0, 1.0)
    }
}

/// Detects numbered lists and stacked conjunctions.
fn has_multipart_indicators(prompt: &str, tokens: &[String]) -> bool {
    let numbered = prompt.lines().any(|line| {
        let trimmed = line.trim_start();
        let mut chars = trimmed.chars();
        matches!(
            (chars.next(), chars.next()),
            (Some(d), Some('.' | ')')) if d.is_ascii_digit()
        )
    });
    if numbered {
        return true;
    }
    let stacked = CONJUNCTIONS
        .iter()
        .filter(|c| tokens.iter().any(|t| t == *c))
        .count();
    stacked >= 2
}

/// First few meaningful tokens, order-preserving and deduplicated.
fn extract_keywords(tokens: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in tokens {
        if token.len() <= 2 || STOPWORDS.contains(&token.as_str()) {
            continue;
        }
        if !keywords.contains(token) {
            keywords.push(token.clone());
        }
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}

/// Agent count per category and complexity level. Monotonic non-decreasing
/// in the level.
fn recommended_agents(category: TaskCategory, level: ComplexityLevel) -> usize {
    if category == TaskCategory::SimpleChat {
        return 1;
    }
    match level {
        ComplexityLevel::Low => 2,
        ComplexityLevel::Medium => 3,
        ComplexityLevel::High => 4,
    }
}

/// Round count per category and complexity level. Monotonic non-decreasing
/// in the level.
fn recommended_rounds(category: TaskCategory, level: ComplexityLevel) -> usize {
    if category == TaskCategory::SimpleChat {
        return 1;
    }
    match level {
        ComplexityLevel::Low => 1,
        ComplexityLevel::Medium => 2,
        ComplexityLevel::High => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> TaskAnalyzer {
        TaskAnalyzer::default()
    }

    #[test]
    fn test_debug_prompt_classified() {
        let profile = analyzer().analyze("Fix this null pointer exception in my code");
        assert_eq!(profile.category, TaskCategory::Debug);
        assert!(profile.complexity >= 0.0 && profile.complexity <= 1.0);
        assert!(profile.keywords.contains(&"fix".to_string()));
    }

    #[test]
    fn test_code_prompt_classified() {
        let profile = analyzer().analyze("Implement a function that parses a config file");
        assert_eq!(profile.category, TaskCategory::Code);
    }

    #[test]
    fn test_design_prompt_classified() {
        let profile = analyzer().analyze("Design the architecture for a scalable message queue");
        assert_eq!(profile.category, TaskCategory::Design);
    }

    #[test]
    fn test_research_prompt_classified() {
        let profile = analyzer().analyze("Compare and evaluate the alternatives for job scheduling");
        assert_eq!(profile.category, TaskCategory::Research);
    }

    #[test]
    fn test_explain_prompt_classified() {
        let profile = analyzer().analyze("Explain the meaning of ownership to me");
        assert_eq!(profile.category, TaskCategory::Explain);
    }

    #[test]
    fn test_debug_beats_code_on_tie_priority() {
        // One debug hit and one code hit: priority order resolves to debug.
        let profile = analyzer().analyze("there is a bug in the code somewhere deep");
        assert_eq!(profile.category, TaskCategory::Debug);
    }

    #[test]
    fn test_short_prompt_without_signal_is_simple_chat() {
        let profile = analyzer().analyze("hi");
        assert_eq!(profile.category, TaskCategory::SimpleChat);
        assert_eq!(profile.recommended_agent_count, 1);
        assert_eq!(profile.recommended_rounds, 1);
    }

    #[test]
    fn test_short_prompt_with_signal_is_not_simple_chat() {
        let profile = analyzer().analyze("fix bug");
        assert_eq!(profile.category, TaskCategory::Debug);
    }

    #[test]
    fn test_empty_prompt_falls_back_to_general() {
        let profile = analyzer().analyze("");
        assert_eq!(profile.category, TaskCategory::General);
        assert_eq!(profile.complexity, 0.0);
        assert!(profile.keywords.is_empty());

        let whitespace = analyzer().analyze("   \n\t  ");
        assert_eq!(whitespace.category, TaskCategory::General);
    }

    #[test]
    fn test_long_unrecognized_prompt_is_general() {
        let profile = analyzer().analyze("tell me something interesting regarding penguins today");
        assert_eq!(profile.category, TaskCategory::General);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let prompt = "Refactor the parser and then also write tests, plus update docs";
        let a = analyzer().analyze(prompt);
        let b = analyzer().analyze(prompt);
        assert_eq!(a, b);
    }

    #[test]
    fn test_complexity_bounded_for_noise_input() {
        let noise = "@@@@ #### $$$$ %%%%";
        let profile = analyzer().analyze(noise);
        assert!(profile.complexity >= 0.0 && profile.complexity <= 1.0);
    }

    #[test]
    fn test_complexity_grows_with_length_and_structure() {
        let short = analyzer().analyze("fix bug");
        let long = analyzer().analyze(
            "Fix the error in the parser and then refactor the module. \
             1. reproduce the crash 2. add a failing test 3. patch the bug \
             and also update the error handling so the exception is logged \
             with enough detail to debug future failures across the api",
        );
        assert!(long.complexity > short.complexity);
        assert!(long.complexity <= 1.0);
    }

    #[test]
    fn test_recommendations_monotonic_in_complexity() {
        let low = analyzer().analyze("fix bug");
        let high = analyzer().analyze(
            "Fix the error in the parser and then refactor the module. \
             1. reproduce the crash 2. add a failing test 3. patch the bug \
             and also update the error handling so the exception is logged \
             with enough detail to debug future failures across the api",
        );
        assert!(low.recommended_agent_count <= high.recommended_agent_count);
        assert!(low.recommended_rounds <= high.recommended_rounds);
    }

    #[test]
    fn test_keywords_capped_and_deduplicated() {
        let profile = analyzer().analyze(
            "refactor refactor refactor the parser module parser tokens buffers caches queues",
        );
        assert!(profile.keywords.len() <= 5);
        let unique: std::collections::HashSet<_> = profile.keywords.iter().collect();
        assert_eq!(unique.len(), profile.keywords.len());
    }
}
