//! Temporal-semantic word association between the two engines
//!
//! Each vocabulary-engine word looks for a partner among the unused
//! timing-engine words in three passes of decreasing strictness:
//!
//! 1. **Semantic anchoring**: same text, start times within the anchor
//!    window, indices within the index window.
//! 2. **Extended semantic** (pass 1.5): same text and index window, but the
//!    intervals only need to overlap (with jitter). Keeps pass 2 from pairing
//!    a drifted copy of the same word with an unrelated neighbour.
//! 3. **Temporal scavenging**: any text, overlapping intervals.
//!
//! The first candidate that satisfies a pass wins. This is greedy, not an
//! optimal assignment.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EnsembleError, Result};
use crate::word::{EngineRole, MatchKind, RawWord};

/// Matcher thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Vocabulary words shorter than this are dropped as phantoms (default: 10ms)
    pub phantom_min_duration_ms: i64,

    /// Maximum start-to-start gap for semantic anchoring (default: 500ms)
    pub anchor_window_ms: i64,

    /// Maximum index distance for both semantic passes (default: 7)
    pub max_index_distance: usize,

    /// Candidate interval expansion on each side (default: 50ms)
    pub jitter_ms: i64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            phantom_min_duration_ms: 10,
            anchor_window_ms: 500,
            max_index_distance: 7,
            jitter_ms: 50,
        }
    }
}

impl MatcherConfig {
    pub fn phantom_min_duration(mut self, ms: i64) -> Self {
        self.phantom_min_duration_ms = ms;
        self
    }

    pub fn anchor_window(mut self, ms: i64) -> Self {
        self.anchor_window_ms = ms;
        self
    }

    pub fn max_index_distance(mut self, distance: usize) -> Self {
        self.max_index_distance = distance;
        self
    }

    pub fn jitter(mut self, ms: i64) -> Self {
        self.jitter_ms = ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.phantom_min_duration_ms < 0 {
            return Err(EnsembleError::config("phantom_min_duration_ms must not be negative"));
        }

        if self.anchor_window_ms < 0 {
            return Err(EnsembleError::config("anchor_window_ms must not be negative"));
        }

        if self.jitter_ms < 0 {
            return Err(EnsembleError::config("jitter_ms must not be negative"));
        }

        Ok(())
    }
}

/// A successful pairing: candidate index and the pass that found it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub index: usize,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Default)]
pub struct TemporalSemanticMatcher {
    config: MatcherConfig,
}

impl TemporalSemanticMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Vocabulary-engine word too short to have any acoustic basis
    pub fn is_phantom(&self, word: &RawWord) -> bool {
        word.role == EngineRole::Vocabulary
            && word.duration_ms() < self.config.phantom_min_duration_ms
    }

    /// Drop phantom insertions. Returns the kept words and the dropped count.
    pub fn remove_phantoms(&self, words: &[RawWord]) -> (Vec<RawWord>, usize) {
        let kept: Vec<RawWord> = words
            .iter()
            .filter(|w| !self.is_phantom(w))
            .cloned()
            .collect();
        let dropped = words.len() - kept.len();
        (kept, dropped)
    }

    /// Find a timing-engine partner for `word` (at `index` in the vocabulary
    /// sequence) among `candidates` not yet in `used`.
    pub fn find_match(
        &self,
        word: &RawWord,
        index: usize,
        candidates: &[RawWord],
        used: &HashSet<usize>,
    ) -> Option<Match> {
        let key = word.key();
        let unused = || {
            candidates
                .iter()
                .enumerate()
                .filter(|(j, _)| !used.contains(j))
        };
        let near_index = |j: usize| index.abs_diff(j) <= self.config.max_index_distance;

        // Pass 1: semantic anchoring
        let anchored = unused().find(|(j, c)| {
            near_index(*j)
                && word.start_ms.abs_diff(c.start_ms) <= self.config.anchor_window_ms.unsigned_abs()
                && c.key() == key
        });
        if let Some((j, _)) = anchored {
            return Some(Match {
                index: j,
                kind: MatchKind::Semantic,
            });
        }

        // Pass 1.5: same text, relaxed to interval overlap
        let extended = unused().find(|(j, c)| {
            near_index(*j) && self.overlaps(word, c) && c.key() == key
        });
        if let Some((j, _)) = extended {
            return Some(Match {
                index: j,
                kind: MatchKind::ExtendedSemantic,
            });
        }

        // Pass 2: temporal scavenging
        unused()
            .find(|(_, c)| self.overlaps(word, c))
            .map(|(j, _)| Match {
                index: j,
                kind: MatchKind::Temporal,
            })
    }

    /// `[start, end]` of `word` against the jitter-expanded interval of `candidate`
    fn overlaps(&self, word: &RawWord, candidate: &RawWord) -> bool {
        let start = word
            .start_ms
            .max(candidate.start_ms.saturating_sub(self.config.jitter_ms));
        let end = word
            .end_ms
            .min(candidate.end_ms.saturating_add(self.config.jitter_ms));
        start < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str, start: i64, end: i64) -> RawWord {
        RawWord::new(text, start, end, EngineRole::Vocabulary)
    }

    fn t(text: &str, start: i64, end: i64) -> RawWord {
        RawWord::new(text, start, end, EngineRole::Timing)
    }

    #[test]
    fn test_phantom_filter() {
        let matcher = TemporalSemanticMatcher::default();
        let words = vec![v("the", 2000, 2004), v("dog", 2100, 2400)];
        let (kept, dropped) = matcher.remove_phantoms(&words);
        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "dog");
        // Timing words are never phantoms
        assert!(!matcher.is_phantom(&t("the", 2000, 2004)));
    }

    #[test]
    fn test_semantic_anchor_takes_first_satisfying() {
        let matcher = TemporalSemanticMatcher::default();
        let candidates = vec![t("dog", 900, 1000), t("dog", 1010, 1300)];
        let m = matcher
            .find_match(&v("Dog", 1000, 1300), 0, &candidates, &HashSet::new())
            .unwrap();
        assert_eq!(m, Match { index: 0, kind: MatchKind::Semantic });
    }

    #[test]
    fn test_semantic_respects_index_window() {
        let matcher = TemporalSemanticMatcher::default();
        let mut candidates: Vec<RawWord> = (0..9).map(|i| t("x", i * 10_000, i * 10_000 + 100)).collect();
        candidates.push(t("dog", 1000, 1300));
        // Candidate index 9 is 9 away from query index 0
        let m = matcher.find_match(&v("dog", 1000, 1300), 0, &candidates, &HashSet::new());
        assert_eq!(m, Some(Match { index: 9, kind: MatchKind::Temporal }));
    }

    #[test]
    fn test_extended_semantic_beats_temporal_neighbour() {
        let matcher = TemporalSemanticMatcher::default();
        // Unrelated word overlaps first, same word overlaps later with a
        // start gap larger than the anchor window
        let candidates = vec![t("cat", 1000, 1900), t("elephant", 1600, 2200)];
        let m = matcher
            .find_match(&v("elephant", 1000, 2000), 0, &candidates, &HashSet::new())
            .unwrap();
        assert_eq!(m, Match { index: 1, kind: MatchKind::ExtendedSemantic });
    }

    #[test]
    fn test_temporal_uses_jitter() {
        let matcher = TemporalSemanticMatcher::default();
        // Candidate ends 30ms before the query starts; jitter bridges it
        let candidates = vec![t("happy", 900, 970)];
        let m = matcher.find_match(&v("hefty", 1000, 1400), 0, &candidates, &HashSet::new());
        assert_eq!(m, Some(Match { index: 0, kind: MatchKind::Temporal }));

        let far = vec![t("happy", 800, 900)];
        assert_eq!(matcher.find_match(&v("hefty", 1000, 1400), 0, &far, &HashSet::new()), None);
    }

    #[test]
    fn test_used_candidates_skipped() {
        let matcher = TemporalSemanticMatcher::default();
        let candidates = vec![t("dog", 1000, 1300)];
        let used: HashSet<usize> = [0].into_iter().collect();
        assert_eq!(matcher.find_match(&v("dog", 1000, 1300), 0, &candidates, &used), None);
    }

    #[test]
    fn test_extreme_times_do_not_overflow() {
        let matcher = TemporalSemanticMatcher::default();

        let wide = v("moon", i64::MIN, i64::MAX);
        assert!(!matcher.is_phantom(&wide));
        assert!(matcher.is_phantom(&v("moon", i64::MAX, i64::MIN)));

        let candidates = vec![
            t("dog", i64::MAX, i64::MAX),
            t("moon", i64::MIN + 1000, i64::MIN + 2000),
        ];
        let m = matcher.find_match(&v("dog", 0, 300), 0, &candidates, &HashSet::new());
        assert_eq!(m, None);

        let m = matcher.find_match(&wide, 0, &candidates, &HashSet::new());
        assert_eq!(m, Some(Match { index: 1, kind: MatchKind::ExtendedSemantic }));
    }

    #[test]
    fn test_config_validation() {
        assert!(MatcherConfig::default().validate().is_ok());
        assert!(MatcherConfig::default().jitter(-1).validate().is_err());
        assert!(MatcherConfig::default().anchor_window(-5).validate().is_err());
    }
}
