//! Word normalization for comparison
//!
//! Comparison keys are only ever used to decide whether two words are "the
//! same word". Callers keep the original text for display.

/// Equivalent spellings. The first member of each group is the canonical form.
const EQUIVALENCE_GROUPS: &[&[&str]] = &[
    // Abbreviations and titles
    &["vs", "versus"],
    &["mr", "mister"],
    &["mrs", "missus"],
    &["ms", "miz"],
    &["dr", "doctor"],
    &["st", "saint"],
    &["ave", "avenue"],
    &["blvd", "boulevard"],
    &["jr", "junior"],
    &["sr", "senior"],
    &["sgt", "sergeant"],
    &["capt", "captain"],
    &["lt", "lieutenant"],
    &["prof", "professor"],
    &["rev", "reverend"],
    &["etc", "etcetera"],
    &["ok", "okay"],
    // Single-token contractions
    &["can't", "cannot"],
    // Numbers
    &["0", "zero"],
    &["1", "one"],
    &["2", "two"],
    &["3", "three"],
    &["4", "four"],
    &["5", "five"],
    &["6", "six"],
    &["7", "seven"],
    &["8", "eight"],
    &["9", "nine"],
    &["10", "ten"],
    &["11", "eleven"],
    &["12", "twelve"],
    &["13", "thirteen"],
    &["14", "fourteen"],
    &["15", "fifteen"],
    &["16", "sixteen"],
    &["17", "seventeen"],
    &["18", "eighteen"],
    &["19", "nineteen"],
    &["20", "twenty"],
    &["1st", "first"],
    &["2nd", "second"],
    &["3rd", "third"],
    // British / American spellings
    &["color", "colour"],
    &["colors", "colours"],
    &["favorite", "favourite"],
    &["gray", "grey"],
    &["center", "centre"],
    &["theater", "theatre"],
    &["neighbor", "neighbour"],
    &["neighbors", "neighbours"],
    &["honor", "honour"],
    &["behavior", "behaviour"],
    &["mom", "mum"],
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || c == '-'
}

/// Lowercase a word and strip leading/trailing punctuation.
///
/// Apostrophes and hyphens survive so that contractions and compounds keep
/// their shape. Curly apostrophes are folded to ASCII first.
pub fn normalize_word(text: &str) -> String {
    let lower = text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
    lower.trim_matches(|c: char| !is_word_char(c)).to_string()
}

/// Map an already-normalized word to the canonical member of its
/// equivalence group. Words without an equivalence are returned unchanged.
pub fn canonical_form(normalized: &str) -> String {
    EQUIVALENCE_GROUPS
        .iter()
        .find(|group| group.contains(&normalized))
        .map(|group| group[0].to_string())
        .unwrap_or_else(|| normalized.to_string())
}

/// The key every comparison in the workspace uses.
pub fn comparison_key(text: &str) -> String {
    canonical_form(&normalize_word(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_edges_only() {
        assert_eq!(normalize_word("Hello,"), "hello");
        assert_eq!(normalize_word("\"Don't!\""), "don't");
        assert_eq!(normalize_word("well-known."), "well-known");
        assert_eq!(normalize_word("...,"), "");
    }

    #[test]
    fn test_curly_apostrophe_folds() {
        assert_eq!(normalize_word("Don\u{2019}t"), "don't");
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(canonical_form("mister"), "mr");
        assert_eq!(canonical_form("mr"), "mr");
        assert_eq!(canonical_form("seven"), "7");
        assert_eq!(canonical_form("dragon"), "dragon");
    }

    #[test]
    fn test_comparison_key_equates_spellings() {
        assert_eq!(comparison_key("Colour."), comparison_key("color"));
        assert_eq!(comparison_key("Mr."), comparison_key("Mister"));
        assert_ne!(comparison_key("happy"), comparison_key("hefty"));
    }
}
