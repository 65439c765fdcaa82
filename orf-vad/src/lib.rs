//! Ghost word detection grounded in voice-activity evidence
//!
//! The vocabulary engine sometimes "reads along" with the passage and emits
//! words the student never said. Such a word is only suspicious when the
//! timing engine did not hear it, it appears in the passage, and the VAD saw
//! no speech where it supposedly was.
//!
//! VAD itself is an external collaborator; this crate only consumes its
//! segments.
//!
//! # Example
//!
//! ```
//! use orf_ensemble::{MergedWord, Provenance, WordSource};
//! use orf_text::ReferencePassage;
//! use orf_vad::{GhostWordFilter, SpeechSegment, VadResult};
//!
//! let words = vec![MergedWord {
//!     text: "dragon".to_string(),
//!     start_ms: 5000,
//!     end_ms: 5300,
//!     confidence: None,
//!     source: WordSource::VocabularyOnly,
//!     provenance: Provenance::default(),
//! }];
//! let vad = VadResult::with_segments(vec![SpeechSegment::new(1000, 3000)], 8000);
//! let reference = ReferencePassage::from_text("the dragon slept");
//!
//! let report = GhostWordFilter::default().flag(&words, Some(&vad), &reference, 8000);
//! assert_eq!(report.ghost_count, 1);
//! assert_eq!(report.ghost_indices, vec![0]);
//! ```

mod error;
mod ghost;

use serde::{Deserialize, Serialize};

pub use error::{Result, VadError};
pub use ghost::{GhostReport, GhostSkip, GhostWordFilter, NO_VAD_SEGMENTS};

/// A span of detected speech, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSegment {
    pub start: i64,
    pub end: i64,
}

impl SpeechSegment {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Length of the intersection with `[start, end]`, 0 when disjoint
    pub fn overlap_ms(&self, start: i64, end: i64) -> i64 {
        let from = self.start.max(start);
        let to = self.end.min(end);
        if from < to {
            to.saturating_sub(from)
        } else {
            0
        }
    }
}

/// VAD output as handed over by the collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VadResult {
    #[serde(default)]
    pub segments: Option<Vec<SpeechSegment>>,

    #[serde(default)]
    pub duration_ms: i64,

    #[serde(default)]
    pub error: Option<String>,
}

impl VadResult {
    pub fn with_segments(segments: Vec<SpeechSegment>, duration_ms: i64) -> Self {
        Self {
            segments: Some(segments),
            duration_ms,
            error: None,
        }
    }

    pub fn failed<S: Into<String>>(error: S) -> Self {
        Self {
            segments: None,
            duration_ms: 0,
            error: Some(error.into()),
        }
    }

    /// Segments if the result is usable for ghost detection
    pub fn usable_segments(&self) -> Option<&[SpeechSegment]> {
        if self.error.is_some() {
            return None;
        }
        self.segments.as_deref()
    }
}

/// Ghost detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostConfig {
    /// Words this close to either end of the recording are never flagged (default: 300ms)
    pub edge_tolerance_ms: i64,

    /// Required VAD overlap for normal words (default: 50ms)
    pub overlap_default_ms: i64,

    /// Required VAD overlap for short words (default: 30ms)
    pub overlap_short_word_ms: i64,

    /// Words shorter than this count as short (default: 200ms)
    pub short_word_duration_ms: i64,

    /// Consecutive ghosts that make an escalated sequence (default: 5)
    pub sequence_threshold: usize,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            edge_tolerance_ms: 300,
            overlap_default_ms: 50,
            overlap_short_word_ms: 30,
            short_word_duration_ms: 200,
            sequence_threshold: 5,
        }
    }
}

impl GhostConfig {
    pub fn edge_tolerance(mut self, ms: i64) -> Self {
        self.edge_tolerance_ms = ms;
        self
    }

    pub fn overlap_default(mut self, ms: i64) -> Self {
        self.overlap_default_ms = ms;
        self
    }

    pub fn overlap_short_word(mut self, ms: i64) -> Self {
        self.overlap_short_word_ms = ms;
        self
    }

    pub fn short_word_duration(mut self, ms: i64) -> Self {
        self.short_word_duration_ms = ms;
        self
    }

    pub fn sequence_threshold(mut self, count: usize) -> Self {
        self.sequence_threshold = count;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.edge_tolerance_ms < 0 {
            return Err(VadError::config("edge_tolerance_ms must not be negative"));
        }

        if self.overlap_default_ms <= 0 || self.overlap_short_word_ms <= 0 {
            return Err(VadError::config("Required overlaps must be positive"));
        }

        if self.overlap_short_word_ms > self.overlap_default_ms {
            return Err(VadError::config(
                "overlap_short_word_ms must not exceed overlap_default_ms",
            ));
        }

        if self.short_word_duration_ms <= 0 {
            return Err(VadError::config("short_word_duration_ms must be positive"));
        }

        if self.sequence_threshold == 0 {
            return Err(VadError::config("sequence_threshold must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_overlap() {
        let seg = SpeechSegment::new(1000, 3000);
        assert_eq!(seg.overlap_ms(2900, 3200), 100);
        assert_eq!(seg.overlap_ms(3000, 3200), 0);
        assert_eq!(seg.overlap_ms(5000, 5300), 0);
        assert_eq!(seg.overlap_ms(500, 4000), 2000);

        let everything = SpeechSegment::new(i64::MIN, i64::MAX);
        assert_eq!(everything.overlap_ms(i64::MIN, i64::MAX), i64::MAX);
    }

    #[test]
    fn test_usable_segments() {
        assert!(VadResult::default().usable_segments().is_none());
        assert!(VadResult::failed("model not loaded").usable_segments().is_none());

        let mut errored = VadResult::with_segments(vec![SpeechSegment::new(0, 10)], 100);
        errored.error = Some("partial".to_string());
        assert!(errored.usable_segments().is_none());

        let empty = VadResult::with_segments(Vec::new(), 100);
        assert_eq!(empty.usable_segments(), Some(&[][..]));
    }

    #[test]
    fn test_vad_result_from_json() {
        let vad: VadResult = serde_json::from_str(
            r#"{"segments": [{"start": 100, "end": 900}], "durationMs": 1200}"#,
        )
        .unwrap();
        assert_eq!(vad.segments.as_ref().unwrap().len(), 1);
        assert_eq!(vad.duration_ms, 1200);
        assert_eq!(vad.error, None);
    }

    #[test]
    fn test_config_validation() {
        assert!(GhostConfig::default().validate().is_ok());
        assert!(GhostConfig::default().edge_tolerance(-1).validate().is_err());
        assert!(GhostConfig::default().overlap_default(0).validate().is_err());
        assert!(GhostConfig::default().overlap_short_word(80).validate().is_err());
        assert!(GhostConfig::default().short_word_duration(0).validate().is_err());
        assert!(GhostConfig::default().sequence_threshold(0).validate().is_err());
    }
}
