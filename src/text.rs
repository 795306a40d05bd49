//! Small text helpers shared by the scraping, summarization and model layers.

/// Truncate a string to a maximum number of characters.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Collapse every whitespace run into a single space and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

/// Number of characters (not bytes).
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Hello, world!", 5), "Hello");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("éèà", 2), "éè");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Hello   world  \n\t  test  "), "Hello world test");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_char_len_counts_chars() {
        assert_eq!(char_len("été"), 3);
    }
}
