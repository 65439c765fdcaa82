//! Repeat detection over the spoken word stream
//!
//! Repeat events normally come from an external diagnostics collaborator.
//! [`detect_repeats`] fills in when the caller has none.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use orf_text::comparison_key;
use serde::{Deserialize, Serialize};

use crate::alignment::AlignmentEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatKind {
    WordRepeat,
    PhraseRepeat,
}

/// A repeated word or two-word phrase in the spoken stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatEvent {
    pub kind: RepeatKind,
    /// Spoken-word index of the first occurrence
    pub start_index: usize,
    /// Run length for word repeats, phrase length (2) for phrase repeats
    pub count: usize,
}

impl RepeatEvent {
    pub fn word(start_index: usize, count: usize) -> Self {
        Self {
            kind: RepeatKind::WordRepeat,
            start_index,
            count,
        }
    }

    pub fn phrase(start_index: usize) -> Self {
        Self {
            kind: RepeatKind::PhraseRepeat,
            start_index,
            count: 2,
        }
    }

    /// Spoken-word indices that are surplus copies. Events come from
    /// callers, so bounds saturate instead of overflowing.
    pub fn extras(&self) -> Range<usize> {
        let start = self.start_index;
        match self.kind {
            RepeatKind::WordRepeat => start.saturating_add(1)..start.saturating_add(self.count),
            // Two-word phrases only
            RepeatKind::PhraseRepeat => start.saturating_add(2)..start.saturating_add(4),
        }
    }

    pub fn is_extra(&self, index: usize) -> bool {
        self.extras().contains(&index)
    }
}

/// Find phrase repeats, then word repeats, in `spoken`.
///
/// A repeat is not reported when the alignment pairs the copies with
/// consecutive reference words that are themselves equal ("had had").
pub fn detect_repeats(spoken: &[&str], alignment: &[AlignmentEntry]) -> Vec<RepeatEvent> {
    let words: Vec<String> = spoken.iter().map(|w| comparison_key(w)).collect();

    // spoken index -> reference index, for entries that pair the two
    let hyp_to_ref: HashMap<usize, usize> = alignment
        .iter()
        .filter_map(|e| match e {
            AlignmentEntry::Correct { ref_index, hyp_index, .. }
            | AlignmentEntry::Substitution { ref_index, hyp_index, .. } => Some((*hyp_index, *ref_index)),
            _ => None,
        })
        .collect();
    let ref_keys: HashMap<usize, String> = alignment
        .iter()
        .filter_map(|e| Some((e.ref_index()?, comparison_key(e.reference()?))))
        .collect();

    // Copies at spoken a and b mirror reference words exactly `offset` apart
    let in_passage = |a: usize, b: usize, offset: usize| match (hyp_to_ref.get(&a), hyp_to_ref.get(&b)) {
        (Some(&ra), Some(&rb)) => rb == ra + offset && ref_keys.get(&ra) == ref_keys.get(&rb),
        _ => false,
    };

    let mut events = Vec::new();
    let mut used = HashSet::new();

    for i in 0..words.len().saturating_sub(3) {
        if used.contains(&i) {
            continue;
        }
        if words[i] == words[i + 2] && words[i + 1] == words[i + 3] {
            let legitimate = in_passage(i, i + 2, 2) && {
                let (r1, r3) = (hyp_to_ref.get(&(i + 1)), hyp_to_ref.get(&(i + 3)));
                matches!((r1, r3), (Some(a), Some(b)) if ref_keys.get(a) == ref_keys.get(b))
            };
            if legitimate {
                continue;
            }
            events.push(RepeatEvent::phrase(i));
            used.extend(i..i + 4);
        }
    }

    let mut i = 0;
    while i + 1 < words.len() {
        if used.contains(&i) || words[i] != words[i + 1] || in_passage(i, i + 1, 1) {
            i += 1;
            continue;
        }

        let mut end = i + 1;
        while end < words.len() && words[end] == words[i] && !used.contains(&end) {
            end += 1;
        }
        events.push(RepeatEvent::word(i, end - i));
        used.extend(i..end);
        i = end;
    }

    events
}
