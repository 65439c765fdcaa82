//! Trust hierarchy field selection and reference veto
//!
//! Timestamps and confidence always come from the timing engine when it
//! contributed. Text comes from the vocabulary engine unless the passage says
//! otherwise.

use std::collections::HashSet;

use crate::word::{MatchKind, MergedWord, Provenance, RawWord, VetoReason, WordSource};

/// What the matcher produced for one output slot
#[derive(Debug, Clone, Copy)]
pub enum Pairing<'a> {
    Matched {
        vocabulary: &'a RawWord,
        timing: &'a RawWord,
        kind: MatchKind,
    },
    VocabularyOnly(&'a RawWord),
    TimingOnly(&'a RawWord),
}

/// Decide the veto outcome for two disagreeing keys
pub fn veto_reason(vocabulary_key: &str, timing_key: &str, reference: &HashSet<String>) -> VetoReason {
    match (reference.contains(vocabulary_key), reference.contains(timing_key)) {
        (false, true) => VetoReason::TimingInReference,
        (true, false) => VetoReason::VocabularyInReference,
        (true, true) => VetoReason::BothInReference,
        (false, false) => VetoReason::NeitherInReference,
    }
}

/// Resolve one pairing into a merged word. `reference` holds passage
/// comparison keys and may be empty.
pub fn fuse(pairing: Pairing<'_>, reference: &HashSet<String>) -> MergedWord {
    match pairing {
        Pairing::Matched {
            vocabulary,
            timing,
            kind,
        } => {
            let vocabulary_key = vocabulary.key();
            let timing_key = timing.key();

            let (text, veto) = if vocabulary_key == timing_key {
                (vocabulary.text.clone(), None)
            } else {
                let reason = veto_reason(&vocabulary_key, &timing_key, reference);
                let text = match reason {
                    VetoReason::TimingInReference => timing.text.clone(),
                    _ => vocabulary.text.clone(),
                };
                (text, Some(reason))
            };

            MergedWord {
                text,
                start_ms: timing.start_ms,
                end_ms: timing.end_ms,
                confidence: timing.confidence,
                source: WordSource::Both,
                provenance: Provenance {
                    match_kind: Some(kind),
                    veto_applied: veto.is_some_and(VetoReason::is_applied),
                    veto_reason: veto,
                    raw_vocabulary: Some(vocabulary.clone()),
                    raw_timing: Some(timing.clone()),
                    ..Provenance::default()
                },
            }
        }
        Pairing::VocabularyOnly(vocabulary) => MergedWord {
            text: vocabulary.text.clone(),
            start_ms: vocabulary.start_ms,
            end_ms: vocabulary.end_ms,
            confidence: None,
            source: WordSource::VocabularyOnly,
            provenance: Provenance {
                raw_vocabulary: Some(vocabulary.clone()),
                ..Provenance::default()
            },
        },
        Pairing::TimingOnly(timing) => MergedWord {
            text: timing.text.clone(),
            start_ms: timing.start_ms,
            end_ms: timing.end_ms,
            confidence: timing.confidence,
            source: WordSource::TimingOnly,
            provenance: Provenance {
                raw_timing: Some(timing.clone()),
                ..Provenance::default()
            },
        },
    }
}
