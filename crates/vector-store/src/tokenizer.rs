use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9_]+").unwrap_or_else(|err| unreachable!("word regex: {err}"))
});

/// Lowercase word tokens; every run of other characters is a separator.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

/// Token count used by the length filter (plain whitespace split).
#[must_use]
pub fn count_whitespace_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_punctuation_and_lowercases() {
        assert_eq!(
            tokenize("Write a SQL query: SELECT *, snake_case!"),
            vec!["write", "a", "sql", "query", "select", "snake_case"]
        );
    }

    #[test]
    fn non_ascii_runs_are_separators() {
        assert_eq!(tokenize("naïve café"), vec!["na", "ve", "caf"]);
        assert!(tokenize("   ...  ").is_empty());
    }

    #[test]
    fn whitespace_count_ignores_repeated_spaces() {
        assert_eq!(count_whitespace_tokens("  one\ttwo \n three  "), 3);
        assert_eq!(count_whitespace_tokens(""), 0);
    }
}
