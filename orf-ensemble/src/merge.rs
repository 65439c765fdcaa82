//! Two-engine merge: phantom filter, matching, fusion, ordering, post-merge

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fuser::{fuse, Pairing};
use crate::matcher::{MatcherConfig, TemporalSemanticMatcher};
use crate::normalizer::{PostMergeConfig, PostMergeNormalizer, PostMergeTrace};
use crate::word::{MatchKind, MergedWord, RawWord, VetoReason};

/// One disagreeing pair and how the reference resolved it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VetoRecord {
    pub vocabulary_text: String,
    pub timing_text: String,
    pub chosen_text: String,
    pub reason: VetoReason,
    pub applied: bool,
    pub start_ms: i64,
}

/// Structured account of a merge, for the caller to log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeTrace {
    pub phantoms_dropped: usize,
    pub semantic_matches: usize,
    pub extended_semantic_matches: usize,
    pub temporal_matches: usize,
    pub vocabulary_only: usize,
    pub timing_only: usize,
    pub vetoes: Vec<VetoRecord>,
    pub post_merge: PostMergeTrace,
}

impl MergeTrace {
    pub fn matched(&self) -> usize {
        self.semantic_matches + self.extended_semantic_matches + self.temporal_matches
    }

    pub fn vetoes_applied(&self) -> usize {
        self.vetoes.iter().filter(|v| v.applied).count()
    }

    fn count_match(&mut self, kind: MatchKind) {
        match kind {
            MatchKind::Semantic => self.semantic_matches += 1,
            MatchKind::ExtendedSemantic => self.extended_semantic_matches += 1,
            MatchKind::Temporal => self.temporal_matches += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Sorted by start time
    pub words: Vec<MergedWord>,
    pub trace: MergeTrace,
}

/// Reconciles the two engine transcripts of one reading attempt
#[derive(Debug, Clone, Default)]
pub struct EnsembleMerger {
    matcher: TemporalSemanticMatcher,
    normalizer: PostMergeNormalizer,
}

impl EnsembleMerger {
    pub fn new(matcher: MatcherConfig, post_merge: PostMergeConfig) -> Result<Self> {
        matcher.validate()?;
        post_merge.validate()?;

        Ok(Self {
            matcher: TemporalSemanticMatcher::new(matcher),
            normalizer: PostMergeNormalizer::new(post_merge),
        })
    }

    /// Match and fuse without post-merge cleanup. Output is sorted by start
    /// time (stable, so vocabulary order breaks ties).
    pub fn fuse_engines(
        &self,
        vocabulary: &[RawWord],
        timing: &[RawWord],
        reference: &HashSet<String>,
    ) -> (Vec<MergedWord>, MergeTrace) {
        let mut trace = MergeTrace::default();

        let (vocabulary, dropped) = self.matcher.remove_phantoms(vocabulary);
        trace.phantoms_dropped = dropped;

        let mut used = HashSet::new();
        let mut merged = Vec::with_capacity(vocabulary.len() + timing.len());

        for (index, word) in vocabulary.iter().enumerate() {
            let pairing = match self.matcher.find_match(word, index, timing, &used) {
                Some(found) => {
                    used.insert(found.index);
                    trace.count_match(found.kind);
                    Pairing::Matched {
                        vocabulary: word,
                        timing: &timing[found.index],
                        kind: found.kind,
                    }
                }
                None => {
                    trace.vocabulary_only += 1;
                    Pairing::VocabularyOnly(word)
                }
            };

            let fused = fuse(pairing, reference);
            if let Pairing::Matched {
                vocabulary, timing, ..
            } = pairing
            {
                if let Some(reason) = fused.provenance.veto_reason {
                    trace.vetoes.push(VetoRecord {
                        vocabulary_text: vocabulary.text.clone(),
                        timing_text: timing.text.clone(),
                        chosen_text: fused.text.clone(),
                        reason,
                        applied: fused.provenance.veto_applied,
                        start_ms: fused.start_ms,
                    });
                }
            }
            merged.push(fused);
        }

        for (j, word) in timing.iter().enumerate() {
            if !used.contains(&j) {
                trace.timing_only += 1;
                merged.push(fuse(Pairing::TimingOnly(word), reference));
            }
        }

        merged.sort_by_key(|w| w.start_ms);
        (merged, trace)
    }

    /// Full merge: fusion followed by duplicate collapse and prefix absorption
    pub fn merge(
        &self,
        vocabulary: &[RawWord],
        timing: &[RawWord],
        reference: &HashSet<String>,
    ) -> MergeOutcome {
        let (fused, mut trace) = self.fuse_engines(vocabulary, timing, reference);
        let (words, post_merge) = self.normalizer.normalize(&fused);
        trace.post_merge = post_merge;

        MergeOutcome { words, trace }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::{EngineRole, WordSource};

    #[test]
    fn test_unmatched_timing_words_become_timing_only() {
        let merger = EnsembleMerger::default();
        let vocabulary = vec![RawWord::new("the", 0, 200, EngineRole::Vocabulary)];
        let timing = vec![
            RawWord::new("the", 10, 190, EngineRole::Timing),
            RawWord::new("cat", 300, 600, EngineRole::Timing),
        ];
        let (words, trace) = merger.fuse_engines(&vocabulary, &timing, &HashSet::new());
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].source, WordSource::Both);
        assert_eq!(words[1].source, WordSource::TimingOnly);
        assert_eq!(trace.semantic_matches, 1);
        assert_eq!(trace.timing_only, 1);
    }

    #[test]
    fn test_output_sorted_by_start() {
        let merger = EnsembleMerger::default();
        let vocabulary = vec![RawWord::new("zebra", 5000, 5400, EngineRole::Vocabulary)];
        let timing = vec![RawWord::new("a", 100, 200, EngineRole::Timing)];
        let (words, _) = merger.fuse_engines(&vocabulary, &timing, &HashSet::new());
        let starts: Vec<i64> = words.iter().map(|w| w.start_ms).collect();
        assert_eq!(starts, vec![100, 5000]);
    }

    #[test]
    fn test_veto_records_include_unapplied() {
        let merger = EnsembleMerger::default();
        let vocabulary = vec![RawWord::new("house", 0, 400, EngineRole::Vocabulary)];
        let timing = vec![RawWord::new("horse", 20, 420, EngineRole::Timing)];
        let (_, trace) = merger.fuse_engines(&vocabulary, &timing, &HashSet::new());
        assert_eq!(trace.vetoes.len(), 1);
        assert!(!trace.vetoes[0].applied);
        assert_eq!(trace.vetoes_applied(), 0);
        assert_eq!(trace.matched(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(EnsembleMerger::new(MatcherConfig::default().jitter(-10), PostMergeConfig::default()).is_err());
        assert!(EnsembleMerger::new(
            MatcherConfig::default(),
            PostMergeConfig::default().max_prefix_gap(-1)
        )
        .is_err());
    }
}
