//! Reference passage tokens
//!
//! The passage is tokenized once per attempt. The ordered tokens feed the
//! aligner and the proper-noun check; the unordered key set feeds the
//! reference veto and ghost detection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::normalize::{canonical_form, comparison_key, normalize_word};

/// Abbreviations whose trailing period does not end a sentence.
const TITLE_ABBREVIATIONS: &[&str] = &["mr", "mrs", "ms", "dr", "st", "jr", "sr", "prof", "capt"];

/// Why a reference token is treated as a proper noun
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProperNounSource {
    /// Tagged by an external natural-language annotation
    NlAnnotation,
    /// Capitalized mid-sentence and never seen lowercase in the passage
    Capitalization,
}

/// One word of the reference passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceToken {
    /// Position in the token sequence
    pub position: usize,
    /// Text as printed in the passage (punctuation included)
    pub display: String,
    /// Comparison key
    pub key: String,
    /// First word of a sentence
    pub sentence_initial: bool,
    /// Proper-noun signal, if any
    pub proper_noun: Option<ProperNounSource>,
}

impl ReferenceToken {
    pub fn is_proper_noun(&self) -> bool {
        self.proper_noun.is_some()
    }

    /// Lowercased display text without edge punctuation
    pub fn normalized(&self) -> String {
        normalize_word(&self.display)
    }
}

/// Tokenized reference passage with its membership set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferencePassage {
    tokens: Vec<ReferenceToken>,
    keys: HashSet<String>,
}

impl ReferencePassage {
    /// Tokenize a passage using only the capitalization heuristic.
    pub fn from_text(text: &str) -> Self {
        Self::with_proper_nouns(text, std::iter::empty::<&str>())
    }

    /// Tokenize a passage, treating every word in `nl_proper_nouns` as a
    /// proper noun regardless of capitalization.
    pub fn with_proper_nouns<I, S>(text: &str, nl_proper_nouns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let annotated: HashSet<String> = nl_proper_nouns
            .into_iter()
            .map(|w| comparison_key(w.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();

        let pieces = split_display_tokens(text);

        // Words that appear lowercase anywhere are not names
        let lowercase_seen: HashSet<String> = pieces
            .iter()
            .filter(|p| !starts_uppercase(&p.display))
            .map(|p| comparison_key(&p.display))
            .collect();

        let mut tokens = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let key = comparison_key(&piece.display);
            if key.is_empty() {
                continue;
            }

            let proper_noun = if annotated.contains(&key) {
                Some(ProperNounSource::NlAnnotation)
            } else if starts_uppercase(&piece.display)
                && !piece.sentence_initial
                && !lowercase_seen.contains(&key)
                && !TITLE_ABBREVIATIONS.contains(&key.as_str())
            {
                Some(ProperNounSource::Capitalization)
            } else {
                None
            };

            tokens.push(ReferenceToken {
                position: tokens.len(),
                display: piece.display,
                key,
                sentence_initial: piece.sentence_initial,
                proper_noun,
            });
        }

        let keys = tokens.iter().map(|t| t.key.clone()).collect();
        Self { tokens, keys }
    }

    pub fn tokens(&self) -> &[ReferenceToken] {
        &self.tokens
    }

    pub fn token(&self, position: usize) -> Option<&ReferenceToken> {
        self.tokens.get(position)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Membership test on a comparison key
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Unordered set of comparison keys
    pub fn word_set(&self) -> &HashSet<String> {
        &self.keys
    }

    /// Comparison keys in passage order
    pub fn ordered_keys(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.key.as_str())
    }
}

struct DisplayPiece {
    display: String,
    sentence_initial: bool,
}

fn starts_uppercase(display: &str) -> bool {
    display
        .chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(|c| c.is_uppercase())
}

fn ends_sentence(display: &str) -> bool {
    let trimmed = display.trim_end_matches(['"', '\'', ')', '\u{201D}', '\u{2019}']);
    if !trimmed.ends_with(['.', '!', '?']) {
        return false;
    }
    let word = canonical_form(&normalize_word(trimmed));
    !TITLE_ABBREVIATIONS.contains(&word.as_str())
}

/// Whitespace tokens with line-break hyphens rejoined and compound hyphens
/// split into separate words.
fn split_display_tokens(text: &str) -> Vec<DisplayPiece> {
    let raw: Vec<&str> = text.split_whitespace().collect();

    // "spread-" + "sheet" -> "spreadsheet"
    let mut joined: Vec<String> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let token = raw[i];
        if normalize_word(token).ends_with('-') && i + 1 < raw.len() {
            let head = token.trim_end_matches(|c: char| c == '-' || !c.is_alphanumeric());
            joined.push(format!("{}{}", head, raw[i + 1]));
            i += 2;
        } else {
            joined.push(token.to_string());
            i += 1;
        }
    }

    let mut pieces = Vec::with_capacity(joined.len());
    let mut sentence_start = true;
    for token in joined {
        let parts: Vec<&str> = token.split('-').filter(|p| !p.is_empty()).collect();
        for (k, part) in parts.iter().enumerate() {
            pieces.push(DisplayPiece {
                display: part.to_string(),
                sentence_initial: sentence_start && k == 0,
            });
        }
        sentence_start = ends_sentence(&token);
    }

    pieces
}
