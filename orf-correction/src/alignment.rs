//! Typed alignment entries
//!
//! One entry per aligner decision. Entries that cover a reference token
//! (`Correct`, `Substitution`, `Omission`) always number exactly as many as
//! the passage has tokens; `Insertion` and `SelfCorrection` are additive.

use orf_text::ProperNounSource;
use serde::{Deserialize, Serialize};

/// Evidence that a proper-noun substitution was a real attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forgiveness {
    /// Similarity between reference and pronunciation, in percent
    pub phonetic_ratio: u8,
    pub source: ProperNounSource,
    /// Concatenated pronunciation when following fragments were absorbed
    pub combined_pronunciation: Option<String>,
    pub absorbed_fragments: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AlignmentEntry {
    Correct {
        #[serde(rename = "ref")]
        reference: String,
        ref_index: usize,
        #[serde(rename = "hyp")]
        hypothesis: String,
        hyp_index: usize,
    },
    Substitution {
        #[serde(rename = "ref")]
        reference: String,
        ref_index: usize,
        #[serde(rename = "hyp")]
        hypothesis: String,
        hyp_index: usize,
        #[serde(default)]
        forgiveness: Option<Forgiveness>,
    },
    Omission {
        #[serde(rename = "ref")]
        reference: String,
        ref_index: usize,
    },
    Insertion {
        #[serde(rename = "hyp")]
        hypothesis: String,
        hyp_index: usize,
        #[serde(default)]
        part_of_forgiven: bool,
    },
    SelfCorrection {
        #[serde(rename = "hyp")]
        hypothesis: String,
        hyp_index: usize,
    },
}

impl AlignmentEntry {
    pub fn correct<R: Into<String>, H: Into<String>>(reference: R, ref_index: usize, hypothesis: H, hyp_index: usize) -> Self {
        Self::Correct {
            reference: reference.into(),
            ref_index,
            hypothesis: hypothesis.into(),
            hyp_index,
        }
    }

    pub fn substitution<R: Into<String>, H: Into<String>>(reference: R, ref_index: usize, hypothesis: H, hyp_index: usize) -> Self {
        Self::Substitution {
            reference: reference.into(),
            ref_index,
            hypothesis: hypothesis.into(),
            hyp_index,
            forgiveness: None,
        }
    }

    pub fn omission<R: Into<String>>(reference: R, ref_index: usize) -> Self {
        Self::Omission {
            reference: reference.into(),
            ref_index,
        }
    }

    pub fn insertion<H: Into<String>>(hypothesis: H, hyp_index: usize) -> Self {
        Self::Insertion {
            hypothesis: hypothesis.into(),
            hyp_index,
            part_of_forgiven: false,
        }
    }

    /// Reference word, for entries that cover one
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Correct { reference, .. }
            | Self::Substitution { reference, .. }
            | Self::Omission { reference, .. } => Some(reference),
            Self::Insertion { .. } | Self::SelfCorrection { .. } => None,
        }
    }

    pub fn ref_index(&self) -> Option<usize> {
        match self {
            Self::Correct { ref_index, .. }
            | Self::Substitution { ref_index, .. }
            | Self::Omission { ref_index, .. } => Some(*ref_index),
            Self::Insertion { .. } | Self::SelfCorrection { .. } => None,
        }
    }

    /// Spoken word, for entries that consumed one
    pub fn hypothesis(&self) -> Option<&str> {
        match self {
            Self::Correct { hypothesis, .. }
            | Self::Substitution { hypothesis, .. }
            | Self::Insertion { hypothesis, .. }
            | Self::SelfCorrection { hypothesis, .. } => Some(hypothesis),
            Self::Omission { .. } => None,
        }
    }

    pub fn hyp_index(&self) -> Option<usize> {
        match self {
            Self::Correct { hyp_index, .. }
            | Self::Substitution { hyp_index, .. }
            | Self::Insertion { hyp_index, .. }
            | Self::SelfCorrection { hyp_index, .. } => Some(*hyp_index),
            Self::Omission { .. } => None,
        }
    }

    pub fn covers_reference(&self) -> bool {
        self.ref_index().is_some()
    }

    pub fn consumes_hypothesis(&self) -> bool {
        !matches!(self, Self::Omission { .. })
    }

    pub fn is_insertion(&self) -> bool {
        matches!(self, Self::Insertion { .. })
    }

    pub fn forgiveness(&self) -> Option<&Forgiveness> {
        match self {
            Self::Substitution { forgiveness, .. } => forgiveness.as_ref(),
            _ => None,
        }
    }

    pub fn is_forgiven(&self) -> bool {
        self.forgiveness().is_some()
    }
}

/// Number of entries covering a reference token
pub fn reference_coverage(entries: &[AlignmentEntry]) -> usize {
    entries.iter().filter(|e| e.covers_reference()).count()
}
