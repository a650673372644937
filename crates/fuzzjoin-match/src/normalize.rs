//! Key normalization.

/// Normalizes key text for comparison.
///
/// - Converts to lowercase
/// - Replaces every non-alphanumeric character with a space
/// - Collapses whitespace runs and trims
///
/// ```
/// use fuzzjoin_match::normalize_key;
///
/// assert_eq!(normalize_key("  SMITH,  Jon-Paul "), "smith jon paul");
/// ```
pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True for keys that carry no comparable text.
pub fn is_empty_key(key: &str) -> bool {
    key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_case() {
        assert_eq!(normalize_key("O'Brien & Sons, Ltd."), "o brien sons ltd");
        assert_eq!(normalize_key("ÉCOLE Müller"), "école müller");
        assert_eq!(normalize_key("a\t\tb\nc"), "a b c");
    }

    #[test]
    fn punctuation_only_keys_become_empty() {
        assert_eq!(normalize_key(" -- / "), "");
        assert!(is_empty_key(&normalize_key("...")));
        assert!(is_empty_key("   "));
        assert!(!is_empty_key(" x "));
    }
}
