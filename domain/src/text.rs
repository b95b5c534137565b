//! Small text helpers shared by the analyzer, conflict detection, and
//! synthesis. All deterministic, no allocation surprises.

/// Lowercase a text and split it into alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Truncate to at most `max_chars` characters, marking the cut with `...`.
///
/// Counts characters, not bytes, so multi-byte input never splits a
/// code point.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// First non-empty line of a text, trimmed.
pub fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_on_non_alphanumeric() {
        let tokens = tokenize("Fix this: null-pointer exception!");
        assert_eq!(
            tokens,
            vec!["fix", "this", "null", "pointer", "exception"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n\t ").is_empty());
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_text() {
        let out = truncate("abcdefghij", 8);
        assert_eq!(out, "abcde...");
        assert_eq!(out.chars().count(), 8);
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let out = truncate("日本語のテキストです", 6);
        assert_eq!(out.chars().count(), 6);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\n\n  summary here\nrest"), "summary here");
        assert_eq!(first_line(""), "");
    }
}
