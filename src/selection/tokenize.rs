/// Minimum token length kept; shorter runs ("a", "to", "id") are noise.
const MIN_TOKEN_LEN: usize = 3;

/// Lowercase `text` and split it into runs of `[a-z0-9]`, dropping tokens of
/// two characters or fewer. Order and duplicates are preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("GET /Users/{userId}/Orders"),
            vec!["get", "users", "userid", "orders"]
        );
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(tokenize("a to id add"), vec!["add"]);
    }

    #[test]
    fn test_tokenize_splits_on_non_ascii() {
        assert_eq!(tokenize("café_menu v2"), vec!["caf", "menu"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("!!! ??").is_empty());
    }
}
