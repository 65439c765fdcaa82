//! Ghost word flagging over the merged sequence

use orf_ensemble::{MergedWord, WordSource};
use orf_text::ReferencePassage;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{GhostConfig, SpeechSegment, VadResult};

/// Error text reported when VAD produced nothing and gave no reason
pub const NO_VAD_SEGMENTS: &str = "No VAD segments";

/// Why detection did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostSkip {
    VadUnavailable,
    NoReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostReport {
    pub ghost_count: usize,
    pub has_ghost_sequence: bool,
    /// Positions in the merged sequence
    pub ghost_indices: Vec<usize>,
    pub longest_ghost_run: usize,
    pub vad_error: Option<String>,
    pub skipped: Option<GhostSkip>,
}

impl GhostReport {
    fn skipped(reason: GhostSkip, vad_error: Option<String>) -> Self {
        Self {
            vad_error,
            skipped: Some(reason),
            ..Self::default()
        }
    }

    pub fn is_ghost(&self, index: usize) -> bool {
        self.ghost_indices.contains(&index)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GhostWordFilter {
    config: GhostConfig,
}

impl GhostWordFilter {
    pub fn new(config: GhostConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GhostConfig {
        &self.config
    }

    /// Flag vocabulary-only passage words with no VAD support.
    ///
    /// Never fails: unusable VAD or an empty passage produce an empty report
    /// saying why.
    pub fn flag(
        &self,
        words: &[MergedWord],
        vad: Option<&VadResult>,
        reference: &ReferencePassage,
        audio_duration_ms: i64,
    ) -> GhostReport {
        let segments = match vad.and_then(VadResult::usable_segments) {
            Some(segments) => segments,
            None => {
                let message = vad
                    .and_then(|v| v.error.clone())
                    .unwrap_or_else(|| NO_VAD_SEGMENTS.to_string());
                return GhostReport::skipped(GhostSkip::VadUnavailable, Some(message));
            }
        };

        if reference.is_empty() {
            return GhostReport::skipped(GhostSkip::NoReference, None);
        }

        let mut report = GhostReport::default();
        let mut run = 0;

        for (index, word) in words.iter().enumerate() {
            if self.is_ghost(word, segments, reference, audio_duration_ms) {
                report.ghost_indices.push(index);
                run += 1;
                report.longest_ghost_run = report.longest_ghost_run.max(run);
            } else {
                run = 0;
            }
        }

        report.ghost_count = report.ghost_indices.len();
        report.has_ghost_sequence = report.longest_ghost_run >= self.config.sequence_threshold;
        report
    }

    fn is_ghost(
        &self,
        word: &MergedWord,
        segments: &[SpeechSegment],
        reference: &ReferencePassage,
        audio_duration_ms: i64,
    ) -> bool {
        if word.source != WordSource::VocabularyOnly {
            return false;
        }

        // Only passage words can be read-along hallucinations
        if !reference.contains(&word.key()) {
            return false;
        }

        if self.at_edge(word, audio_duration_ms) {
            return false;
        }

        let overlap = segments
            .iter()
            .map(|seg| seg.overlap_ms(word.start_ms, word.end_ms))
            .max()
            .unwrap_or(0);

        overlap < self.required_overlap(word)
    }

    fn at_edge(&self, word: &MergedWord, audio_duration_ms: i64) -> bool {
        word.start_ms < self.config.edge_tolerance_ms
            || word.end_ms > audio_duration_ms.saturating_sub(self.config.edge_tolerance_ms)
    }

    fn required_overlap(&self, word: &MergedWord) -> i64 {
        if word.duration_ms() < self.config.short_word_duration_ms {
            self.config.overlap_short_word_ms
        } else {
            self.config.overlap_default_ms
        }
    }
}
