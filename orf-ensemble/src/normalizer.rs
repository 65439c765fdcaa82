//! Post-merge cleanup of the fused sequence
//!
//! Two passes over the time-sorted merged words, in order:
//!
//! 1. Duplicate collapse. Per-engine clock drift can leave the same word
//!    unmatched on both sides, producing adjacent copies.
//! 2. Morphological prefix absorption. A student sounding out "un... nerved"
//!    should not be charged with an inserted word.
//!
//! Entries are replaced, never edited in place.

use serde::{Deserialize, Serialize};

use crate::error::{EnsembleError, Result};
use crate::word::{DedupInfo, MergedWord, MorphBreak, WordSource};

/// Prefix fragments that may be absorbed into the following word.
/// Standalone words such as "in" or "over" are not listed.
pub const MORPHOLOGICAL_PREFIXES: &[&str] = &[
    "re", "un", "dis", "pre", "mis", "non", "sub", "de", "anti", "semi", "trans", "inter", "ex",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostMergeConfig {
    /// Largest silence between a prefix and the word it belongs to (default: 3000ms)
    pub max_prefix_gap_ms: i64,

    /// Keep every `Both` entry of a duplicate run instead of collapsing to one
    pub keep_corroborated_repeats: bool,
}

impl Default for PostMergeConfig {
    fn default() -> Self {
        Self {
            max_prefix_gap_ms: 3000,
            keep_corroborated_repeats: false,
        }
    }
}

impl PostMergeConfig {
    pub fn max_prefix_gap(mut self, ms: i64) -> Self {
        self.max_prefix_gap_ms = ms;
        self
    }

    pub fn keep_corroborated_repeats(mut self, keep: bool) -> Self {
        self.keep_corroborated_repeats = keep;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_prefix_gap_ms < 0 {
            return Err(EnsembleError::config("max_prefix_gap_ms must not be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapseRecord {
    pub text: String,
    pub start_ms: i64,
    pub kept_source: WordSource,
    pub removed_count: usize,
    pub removed_sources: Vec<WordSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorptionRecord {
    pub prefix: String,
    pub word: String,
    pub gap_ms: i64,
    pub prefix_source: WordSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMergeTrace {
    pub collapsed: Vec<CollapseRecord>,
    pub absorbed: Vec<AbsorptionRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct PostMergeNormalizer {
    config: PostMergeConfig,
}

impl PostMergeNormalizer {
    pub fn new(config: PostMergeConfig) -> Self {
        Self { config }
    }

    /// Run both passes. `words` must already be sorted by start time.
    pub fn normalize(&self, words: &[MergedWord]) -> (Vec<MergedWord>, PostMergeTrace) {
        let (collapsed, collapse_log) = self.collapse_duplicates(words);
        let (absorbed, absorb_log) = self.absorb_prefixes(&collapsed);
        (
            absorbed,
            PostMergeTrace {
                collapsed: collapse_log,
                absorbed: absorb_log,
            },
        )
    }

    pub fn collapse_duplicates(&self, words: &[MergedWord]) -> (Vec<MergedWord>, Vec<CollapseRecord>) {
        let mut output = Vec::with_capacity(words.len());
        let mut records = Vec::new();

        let mut start = 0;
        while start < words.len() {
            let key = words[start].key();
            let mut end = start + 1;
            // Words with no comparable text never form a run
            if !key.is_empty() {
                while end < words.len() && words[end].key() == key {
                    end += 1;
                }
            }

            let run = &words[start..end];
            if run.len() == 1 {
                output.push(run[0].clone());
            } else {
                let (survivors, record) = self.collapse_run(run);
                output.extend(survivors);
                records.push(record);
            }
            start = end;
        }

        (output, records)
    }

    fn collapse_run(&self, run: &[MergedWord]) -> (Vec<MergedWord>, CollapseRecord) {
        let corroborated = run.iter().filter(|w| w.source == WordSource::Both).count();

        let keep: Vec<usize> = if self.config.keep_corroborated_repeats && corroborated > 0 {
            (0..run.len())
                .filter(|&i| run[i].source == WordSource::Both)
                .collect()
        } else {
            // Highest rank wins; ties go to the earliest entry
            let best = (0..run.len()).fold(0, |best, i| {
                if run[i].source.rank() > run[best].source.rank() {
                    i
                } else {
                    best
                }
            });
            vec![best]
        };

        let removed_sources: Vec<WordSource> = (0..run.len())
            .filter(|i| !keep.contains(i))
            .map(|i| run[i].source)
            .collect();

        let mut survivors: Vec<MergedWord> = keep.iter().map(|&i| run[i].clone()).collect();
        if let Some(first) = survivors.first_mut() {
            first.provenance.dedup = Some(DedupInfo {
                removed_count: removed_sources.len(),
                removed_sources: removed_sources.clone(),
            });
        }

        let kept = &run[keep[0]];
        let record = CollapseRecord {
            text: kept.text.clone(),
            start_ms: kept.start_ms,
            kept_source: kept.source,
            removed_count: removed_sources.len(),
            removed_sources,
        };

        (survivors, record)
    }

    pub fn absorb_prefixes(&self, words: &[MergedWord]) -> (Vec<MergedWord>, Vec<AbsorptionRecord>) {
        let mut output = Vec::with_capacity(words.len());
        let mut records = Vec::new();

        let mut i = 0;
        while i < words.len() {
            let current = &words[i];
            if let Some(next) = words.get(i + 1) {
                if let Some(prefix) = self.absorbable_prefix(current, next) {
                    let gap_ms = next.start_ms.saturating_sub(current.end_ms);

                    let mut merged = next.clone();
                    merged.start_ms = current.start_ms;
                    merged.provenance.morph_break = Some(MorphBreak {
                        prefix: prefix.clone(),
                        gap_ms,
                        prefix_source: current.source,
                        original_start_ms: next.start_ms,
                    });

                    records.push(AbsorptionRecord {
                        prefix,
                        word: next.text.clone(),
                        gap_ms,
                        prefix_source: current.source,
                    });
                    output.push(merged);
                    i += 2;
                    continue;
                }
            }

            output.push(current.clone());
            i += 1;
        }

        (output, records)
    }

    /// The prefix key when `current` should be folded into `next`
    fn absorbable_prefix(&self, current: &MergedWord, next: &MergedWord) -> Option<String> {
        let key = current.key();
        let prefix = key.trim_matches('-');
        if !MORPHOLOGICAL_PREFIXES.contains(&prefix) {
            return None;
        }

        let gap = next.start_ms.saturating_sub(current.end_ms);
        if gap < 0 || gap > self.config.max_prefix_gap_ms {
            return None;
        }

        let next_key = next.key();
        // Either next starts with the prefix or prefix + next is longer than
        // the prefix; both hold exactly when next has text
        (!next_key.is_empty()).then(|| prefix.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::Provenance;

    fn word(text: &str, start: i64, end: i64, source: WordSource) -> MergedWord {
        MergedWord {
            text: text.to_string(),
            start_ms: start,
            end_ms: end,
            confidence: None,
            source,
            provenance: Provenance::default(),
        }
    }

    #[test]
    fn test_collapse_prefers_timing_over_vocabulary() {
        let normalizer = PostMergeNormalizer::default();
        let words = vec![
            word("ran", 1000, 1200, WordSource::VocabularyOnly),
            word("ran", 1900, 2100, WordSource::TimingOnly),
        ];
        let (out, records) = normalizer.collapse_duplicates(&words);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, WordSource::TimingOnly);
        assert_eq!(out[0].start_ms, 1900);

        let dedup = out[0].provenance.dedup.as_ref().unwrap();
        assert_eq!(dedup.removed_count, 1);
        assert_eq!(dedup.removed_sources, vec![WordSource::VocabularyOnly]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_collapse_ties_keep_earliest() {
        let normalizer = PostMergeNormalizer::default();
        let words = vec![
            word("the", 100, 200, WordSource::Both),
            word("The", 300, 400, WordSource::Both),
            word("the", 500, 600, WordSource::VocabularyOnly),
        ];
        let (out, _) = normalizer.collapse_duplicates(&words);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_ms, 100);
        assert_eq!(out[0].provenance.dedup.as_ref().unwrap().removed_count, 2);
    }

    #[test]
    fn test_keep_corroborated_repeats() {
        let normalizer =
            PostMergeNormalizer::new(PostMergeConfig::default().keep_corroborated_repeats(true));
        let words = vec![
            word("the", 100, 200, WordSource::Both),
            word("the", 300, 400, WordSource::VocabularyOnly),
            word("the", 500, 600, WordSource::Both),
        ];
        let (out, records) = normalizer.collapse_duplicates(&words);
        let starts: Vec<i64> = out.iter().map(|w| w.start_ms).collect();
        assert_eq!(starts, vec![100, 500]);
        assert_eq!(records[0].removed_sources, vec![WordSource::VocabularyOnly]);
    }

    #[test]
    fn test_punctuation_only_words_never_collapse() {
        let normalizer = PostMergeNormalizer::default();
        let words = vec![
            word("...", 100, 200, WordSource::TimingOnly),
            word("...", 300, 400, WordSource::TimingOnly),
        ];
        let (out, records) = normalizer.collapse_duplicates(&words);
        assert_eq!(out.len(), 2);
        assert!(records.is_empty());
    }

    #[test]
    fn test_prefix_absorption() {
        let normalizer = PostMergeNormalizer::default();
        let words = vec![
            word("un", 2700, 3000, WordSource::VocabularyOnly),
            word("nerved", 3050, 3600, WordSource::Both),
        ];
        let (out, records) = normalizer.absorb_prefixes(&words);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "nerved");
        assert_eq!(out[0].start_ms, 2700);

        let morph = out[0].provenance.morph_break.as_ref().unwrap();
        assert_eq!(morph.prefix, "un");
        assert_eq!(morph.gap_ms, 50);
        assert_eq!(morph.prefix_source, WordSource::VocabularyOnly);
        assert_eq!(morph.original_start_ms, 3050);
        assert_eq!(records[0].word, "nerved");
    }

    #[test]
    fn test_prefix_not_absorbed_across_long_gap_or_overlap() {
        let normalizer = PostMergeNormalizer::default();
        let far = vec![
            word("re", 0, 300, WordSource::Both),
            word("turned", 3400, 3800, WordSource::Both),
        ];
        assert_eq!(normalizer.absorb_prefixes(&far).0.len(), 2);

        let overlapping = vec![
            word("re", 0, 300, WordSource::Both),
            word("turned", 250, 700, WordSource::Both),
        ];
        assert_eq!(normalizer.absorb_prefixes(&overlapping).0.len(), 2);
    }

    #[test]
    fn test_prefix_needs_a_following_word_with_text() {
        let normalizer = PostMergeNormalizer::default();
        let words = vec![
            word("re", 1000, 1200, WordSource::VocabularyOnly),
            word("...", 1300, 1400, WordSource::TimingOnly),
        ];
        let (out, records) = normalizer.absorb_prefixes(&words);
        assert_eq!(out.len(), 2);
        assert!(records.is_empty());

        // A following word that does not start with the prefix still absorbs it
        let words = vec![
            word("dis", 1000, 1200, WordSource::VocabularyOnly),
            word("appeared", 1300, 1900, WordSource::Both),
        ];
        assert_eq!(normalizer.absorb_prefixes(&words).1.len(), 1);
    }

    #[test]
    fn test_ordinary_words_untouched() {
        let normalizer = PostMergeNormalizer::default();
        let words = vec![
            word("in", 0, 200, WordSource::Both),
            word("the", 250, 400, WordSource::Both),
            word("house", 450, 800, WordSource::Both),
        ];
        let (out, trace) = normalizer.normalize(&words);
        assert_eq!(out, words);
        assert_eq!(trace, PostMergeTrace::default());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = PostMergeNormalizer::default();
        let words = vec![
            word("un", 2700, 3000, WordSource::VocabularyOnly),
            word("nerved", 3050, 3600, WordSource::Both),
            word("nerved", 3700, 4000, WordSource::TimingOnly),
        ];
        let (once, _) = normalizer.normalize(&words);
        let (twice, trace) = normalizer.normalize(&once);
        assert_eq!(once, twice);
        assert!(trace.collapsed.is_empty());
        assert!(trace.absorbed.is_empty());
    }
}
