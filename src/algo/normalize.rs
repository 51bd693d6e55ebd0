use std::sync::LazyLock;

use regex::Regex;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("static pattern compiles"));

/// Lower-case, replace every non letter/digit/whitespace char with a space,
/// collapse whitespace runs and trim.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lower = text.to_lowercase();
    let spaced = NON_WORD.replace_all(&lower, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize`] for a field that may be missing.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize("Oil prices SURGE, again!  (Reuters)"),
            "oil prices surge again reuters"
        );
    }

    #[test]
    fn punctuation_becomes_a_separator() {
        assert_eq!(normalize("U.S.-China talks"), "u s china talks");
        assert_eq!(normalize("snake_case"), "snake case");
    }

    #[test]
    fn keeps_unicode_letters_and_digits() {
        assert_eq!(normalize("Zürich 2026: Ökonomie"), "zürich 2026 ökonomie");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  a \t\n b   "), "a b");
    }

    #[test]
    fn empty_and_absent() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!! ---"), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some("Hi.")), "hi");
    }
}
