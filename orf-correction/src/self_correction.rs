//! Self-correction reclassification
//!
//! A student who repeats a word while fixing it should not be charged with
//! an insertion for the repeat.

use crate::alignment::AlignmentEntry;
use crate::repeats::RepeatEvent;

/// Turn insertions that are repeat extras into `SelfCorrection` entries.
///
/// Returns the new sequence and the spoken-word indices that were
/// reclassified. Nothing else changes.
pub fn reclassify_self_corrections(
    entries: &[AlignmentEntry],
    repeats: &[RepeatEvent],
) -> (Vec<AlignmentEntry>, Vec<usize>) {
    if repeats.iter().all(|r| r.extras().is_empty()) {
        return (entries.to_vec(), Vec::new());
    }

    let mut reclassified = Vec::new();

    let output = entries
        .iter()
        .map(|entry| match entry {
            AlignmentEntry::Insertion { hypothesis, hyp_index, .. }
                if repeats.iter().any(|r| r.is_extra(*hyp_index)) =>
            {
                // Hyphen pieces of one spoken word share its index
                if reclassified.last() != Some(hyp_index) {
                    reclassified.push(*hyp_index);
                }
                AlignmentEntry::SelfCorrection {
                    hypothesis: hypothesis.clone(),
                    hyp_index: *hyp_index,
                }
            }
            _ => entry.clone(),
        })
        .collect();

    (output, reclassified)
}
