//! Word models shared by every ensemble stage

use std::fmt;

use orf_text::comparison_key;
use serde::{Deserialize, Serialize};

/// Which ASR engine produced a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineRole {
    /// Rich vocabulary (proper nouns, rare words), unreliable timing and confidence
    Vocabulary,
    /// Accurate acoustic boundaries and confidence, narrower vocabulary
    Timing,
}

impl fmt::Display for EngineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineRole::Vocabulary => write!(f, "vocabulary"),
            EngineRole::Timing => write!(f, "timing"),
        }
    }
}

/// One word exactly as an engine reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWord {
    pub text: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub confidence: Option<f64>,
    pub role: EngineRole,
}

impl RawWord {
    pub fn new<S: Into<String>>(text: S, start_ms: i64, end_ms: i64, role: EngineRole) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
            confidence: None,
            role,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Comparison key of the word text
    pub fn key(&self) -> String {
        comparison_key(&self.text)
    }
}

/// Which engines contributed a merged word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordSource {
    Both,
    VocabularyOnly,
    TimingOnly,
}

impl WordSource {
    /// Trust rank used when collapsing duplicates (higher wins)
    pub fn rank(self) -> u8 {
        match self {
            WordSource::Both => 3,
            WordSource::TimingOnly => 2,
            WordSource::VocabularyOnly => 1,
        }
    }
}

impl fmt::Display for WordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordSource::Both => write!(f, "both"),
            WordSource::VocabularyOnly => write!(f, "vocabulary_only"),
            WordSource::TimingOnly => write!(f, "timing_only"),
        }
    }
}

/// Matcher pass that paired two words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Pass 1: same text, close start times, close indices
    Semantic,
    /// Pass 1.5: same text, overlapping intervals, close indices
    ExtendedSemantic,
    /// Pass 2: overlapping intervals, any text
    Temporal,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Semantic => write!(f, "semantic"),
            MatchKind::ExtendedSemantic => write!(f, "extended_semantic"),
            MatchKind::Temporal => write!(f, "temporal"),
        }
    }
}

/// Outcome of the reference veto for a disagreeing pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VetoReason {
    /// Only the timing word is in the passage; vocabulary engine likely hallucinated
    TimingInReference,
    /// Only the vocabulary word is in the passage; its vocabulary caught what timing missed
    VocabularyInReference,
    /// Neither word is in the passage; kept as a reading substitution
    NeitherInReference,
    /// Both words are in the passage; kept as a reading substitution
    BothInReference,
}

impl VetoReason {
    /// Whether the reference actually overrode the default text choice
    pub fn is_applied(self) -> bool {
        matches!(
            self,
            VetoReason::TimingInReference | VetoReason::VocabularyInReference
        )
    }
}

impl fmt::Display for VetoReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VetoReason::TimingInReference => {
                write!(f, "timing word is in the reference, vocabulary word is not")
            }
            VetoReason::VocabularyInReference => {
                write!(f, "vocabulary word is in the reference, timing word is not")
            }
            VetoReason::NeitherInReference => {
                write!(f, "neither word is in the reference, kept as reading substitution")
            }
            VetoReason::BothInReference => {
                write!(f, "both words are in the reference, kept as reading substitution")
            }
        }
    }
}

/// Record of duplicates folded into a surviving word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupInfo {
    pub removed_count: usize,
    pub removed_sources: Vec<WordSource>,
}

/// Record of a morphological prefix absorbed into the following word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorphBreak {
    pub prefix: String,
    pub gap_ms: i64,
    pub prefix_source: WordSource,
    /// Start time the word had before absorbing the prefix
    pub original_start_ms: i64,
}

/// Audit trail of how a merged word was produced. Never used for scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub match_kind: Option<MatchKind>,
    pub veto_applied: bool,
    pub veto_reason: Option<VetoReason>,
    pub raw_vocabulary: Option<RawWord>,
    pub raw_timing: Option<RawWord>,
    pub dedup: Option<DedupInfo>,
    pub morph_break: Option<MorphBreak>,
}

/// One word of the reconciled transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedWord {
    pub text: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub confidence: Option<f64>,
    pub source: WordSource,
    pub provenance: Provenance,
}

impl MergedWord {
    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Comparison key of the resolved text
    pub fn key(&self) -> String {
        comparison_key(&self.text)
    }
}
