//! Text helpers shared by the listing and article extractors

/// Minimum length (in characters) of meaningful text
pub const MIN_MEANINGFUL_CHARS: usize = 10;

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if `text` is worth keeping as a headline
///
/// After whitespace collapsing the text must be at least
/// `MIN_MEANINGFUL_CHARS` long and contain an alphanumeric character. This
/// filters image-only anchors, "more" links, and decorative separators.
pub fn is_meaningful(text: &str) -> bool {
    let collapsed = collapse_whitespace(text);
    collapsed.chars().count() >= MIN_MEANINGFUL_CHARS
        && collapsed.chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_is_meaningful() {
        assert!(is_meaningful("Harga beras naik lagi"));
        assert!(is_meaningful("  Headline\n   with   spaces "));

        assert!(!is_meaningful(""));
        assert!(!is_meaningful("More"));
        assert!(!is_meaningful("   \n  "));
        assert!(!is_meaningful("----------------"));
    }

    #[test]
    fn test_meaningful_counts_characters_not_bytes() {
        // 9 multibyte characters fall short even though they exceed 10 bytes
        assert!(!is_meaningful("éééééééé1"));
        assert!(is_meaningful("éééééééé12"));
    }
}
