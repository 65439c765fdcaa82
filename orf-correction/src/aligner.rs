//! Reference alignment
//!
//! Alignment is normally provided by an external collaborator through
//! [`ReferenceAligner`]. [`GradedAligner`] is a global (Needleman-Wunsch)
//! aligner whose mismatch penalty shrinks as the two words look more alike,
//! so a near-miss pairs with its reference word instead of splitting into an
//! omission plus an insertion.

use orf_text::{comparison_key, levenshtein_ratio, normalize_word, ReferencePassage};

use crate::alignment::AlignmentEntry;

const EPSILON: f64 = 1e-9;

/// Produces the typed alignment of spoken words against the passage
pub trait ReferenceAligner {
    fn align(&self, reference: &ReferencePassage, hypothesis: &[&str]) -> Vec<AlignmentEntry>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradedAligner {
    pub match_score: f64,
    pub gap_penalty: f64,
    /// Scaled by `1 - similarity` for differing words
    pub mismatch_penalty: f64,
}

impl Default for GradedAligner {
    fn default() -> Self {
        Self {
            match_score: 2.0,
            gap_penalty: -1.0,
            mismatch_penalty: -1.5,
        }
    }
}

impl GradedAligner {
    fn pair_score(&self, reference: &str, hypothesis: &str) -> f64 {
        if reference == hypothesis {
            self.match_score
        } else {
            self.mismatch_penalty * (1.0 - levenshtein_ratio(reference, hypothesis))
        }
    }
}

impl ReferenceAligner for GradedAligner {
    fn align(&self, reference: &ReferencePassage, hypothesis: &[&str]) -> Vec<AlignmentEntry> {
        let ref_keys: Vec<&str> = reference.tokens().iter().map(|t| t.key.as_str()).collect();
        let pieces = split_hypothesis(hypothesis);
        let hyp_keys: Vec<String> = pieces.iter().map(|p| comparison_key(p.text)).collect();
        let n = ref_keys.len();
        let m = hyp_keys.len();

        // score[i][j]: best alignment of the first i reference and j spoken words
        let mut score = vec![vec![0.0_f64; m + 1]; n + 1];
        for (i, row) in score.iter_mut().enumerate() {
            row[0] = self.gap_penalty * i as f64;
        }
        for j in 0..=m {
            score[0][j] = self.gap_penalty * j as f64;
        }
        for i in 1..=n {
            for j in 1..=m {
                let diagonal = score[i - 1][j - 1] + self.pair_score(ref_keys[i - 1], &hyp_keys[j - 1]);
                let omission = score[i - 1][j] + self.gap_penalty;
                let insertion = score[i][j - 1] + self.gap_penalty;
                score[i][j] = diagonal.max(omission).max(insertion);
            }
        }

        let ref_text = |i: usize| {
            reference
                .token(i)
                .map(|t| t.normalized())
                .unwrap_or_default()
        };
        let hyp_text = |j: usize| normalize_word(pieces[j].text);

        // Trace back from the end. Insertion wins ties so that surplus copies
        // of a repeated word land after the copy that matched.
        let mut entries = Vec::with_capacity(n.max(m));
        let (mut i, mut j) = (n, m);
        while i > 0 || j > 0 {
            let here = score[i][j];

            if j > 0 && (i == 0 || (here - (score[i][j - 1] + self.gap_penalty)).abs() < EPSILON) {
                entries.push(AlignmentEntry::insertion(hyp_text(j - 1), pieces[j - 1].index));
                j -= 1;
                continue;
            }

            if i > 0 && j > 0 {
                let pair = self.pair_score(ref_keys[i - 1], &hyp_keys[j - 1]);
                if (here - (score[i - 1][j - 1] + pair)).abs() < EPSILON {
                    let entry = if ref_keys[i - 1] == hyp_keys[j - 1] {
                        AlignmentEntry::correct(ref_text(i - 1), i - 1, hyp_text(j - 1), pieces[j - 1].index)
                    } else {
                        AlignmentEntry::substitution(ref_text(i - 1), i - 1, hyp_text(j - 1), pieces[j - 1].index)
                    };
                    entries.push(entry);
                    i -= 1;
                    j -= 1;
                    continue;
                }
            }

            entries.push(AlignmentEntry::omission(ref_text(i - 1), i - 1));
            i -= 1;
        }

        entries.reverse();
        entries
    }
}

/// One aligned unit of a spoken word
struct HypothesisPiece<'a> {
    text: &'a str,
    /// Index of the spoken word it came from
    index: usize,
}

/// Split spoken words on internal hyphens the way passage tokens are split.
/// A word with no text between hyphens stays whole.
fn split_hypothesis<'a>(hypothesis: &[&'a str]) -> Vec<HypothesisPiece<'a>> {
    let mut pieces = Vec::with_capacity(hypothesis.len());
    for (index, &word) in hypothesis.iter().enumerate() {
        let before = pieces.len();
        pieces.extend(
            word.split('-')
                .filter(|part| !normalize_word(part).is_empty())
                .map(|text| HypothesisPiece { text, index }),
        );
        if pieces.len() == before {
            pieces.push(HypothesisPiece { text: word, index });
        }
    }
    pieces
}
