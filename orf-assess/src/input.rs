//! Assessment request and response documents

use orf_correction::{AlignmentEntry, RepeatEvent};
use orf_ensemble::MergedWord;
use orf_metrics::TraceEvent;
use orf_vad::{GhostReport, VadResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Everything collected for one reading attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentInput {
    #[serde(default)]
    pub reference_text: String,

    /// Vocabulary engine response, in any supported engine shape
    #[serde(default)]
    pub vocabulary: Option<Value>,

    /// Timing engine response, in any supported engine shape
    #[serde(default)]
    pub timing: Option<Value>,

    #[serde(default)]
    pub vad: Option<VadResult>,

    /// Recording length; falls back to the VAD duration
    #[serde(default)]
    pub audio_duration_ms: Option<i64>,

    /// Words tagged as proper nouns by an NL service
    #[serde(default)]
    pub proper_nouns: Vec<String>,

    /// Repeat events from a diagnostics collaborator; detected when absent
    #[serde(default)]
    pub repeats: Option<Vec<RepeatEvent>>,

    #[serde(default)]
    pub attempt_id: Option<Uuid>,
}

impl AssessmentInput {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Explicit duration, else the VAD's, else the end of the last word
    pub fn audio_duration_ms(&self, words: &[MergedWord]) -> i64 {
        self.audio_duration_ms
            .or_else(|| {
                self.vad
                    .as_ref()
                    .map(|v| v.duration_ms)
                    .filter(|&d| d > 0)
            })
            .unwrap_or_else(|| words.iter().map(|w| w.end_ms).max().unwrap_or(0))
    }
}

/// Result handed to scoring and rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentOutput {
    pub attempt_id: Uuid,
    pub merged_words: Vec<MergedWord>,
    pub ghost_report: GhostReport,
    pub alignment: Vec<AlignmentEntry>,
    pub trace: Vec<TraceEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use orf_vad::SpeechSegment;

    #[test]
    fn test_minimal_input() {
        let input = AssessmentInput::from_json(r#"{"referenceText": "the dog"}"#).unwrap();
        assert_eq!(input.reference_text, "the dog");
        assert!(input.vocabulary.is_none());
        assert!(input.repeats.is_none());
        assert!(input.proper_nouns.is_empty());
    }

    #[test]
    fn test_full_input() {
        let input = AssessmentInput::from_json(
            r#"{
                "referenceText": "Then Hermione smiled.",
                "vocabulary": [{"word": "Hermione", "startTime": "1.0s", "endTime": "1.6s"}],
                "timing": {"results": []},
                "vad": {"segments": [{"start": 900, "end": 1700}], "durationMs": 3000},
                "properNouns": ["hermione"],
                "repeats": [{"kind": "word_repeat", "startIndex": 4, "count": 2}],
                "attemptId": "67e55044-10b1-426f-9247-bb680e5fe0c8"
            }"#,
        )
        .unwrap();
        assert!(input.vocabulary.is_some());
        assert_eq!(input.vad.as_ref().unwrap().segments.as_ref().unwrap()[0], SpeechSegment::new(900, 1700));
        assert_eq!(input.repeats.as_ref().unwrap()[0].start_index, 4);
        assert_eq!(input.audio_duration_ms(&[]), 3000);
        assert!(input.attempt_id.is_some());
    }

    #[test]
    fn test_duration_fallbacks() {
        let mut input = AssessmentInput {
            audio_duration_ms: Some(5000),
            vad: Some(VadResult::with_segments(Vec::new(), 4000)),
            ..AssessmentInput::default()
        };
        assert_eq!(input.audio_duration_ms(&[]), 5000);

        input.audio_duration_ms = None;
        assert_eq!(input.audio_duration_ms(&[]), 4000);

        input.vad = None;
        assert_eq!(input.audio_duration_ms(&[]), 0);
    }
}
