//! Proper-noun forgiveness
//!
//! Children often pronounce unfamiliar names close enough that a listener
//! would accept them, and ASR splits the attempt into common words
//! ("her" + "my" + "own" for "Hermione"). A proper-noun substitution whose
//! pronunciation, optionally joined with the insertions that follow it,
//! is phonetically close to the name is forgiven.

use orf_text::{levenshtein_ratio, normalize_word, ProperNounSource, ReferencePassage};
use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentEntry, Forgiveness};
use crate::error::{CorrectionError, Result};

/// Lowest similarity that may ever be forgiven
pub const MIN_FORGIVENESS_RATIO: f64 = 0.40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgivenessConfig {
    pub enabled: bool,
    /// Similarity needed for forgiveness (default: 0.40)
    pub min_ratio: f64,
}

impl Default for ForgivenessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_ratio: MIN_FORGIVENESS_RATIO,
        }
    }
}

impl ForgivenessConfig {
    pub fn min_ratio(mut self, ratio: f64) -> Self {
        self.min_ratio = ratio;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_FORGIVENESS_RATIO..=1.0).contains(&self.min_ratio) {
            return Err(CorrectionError::config(format!(
                "min_ratio must be between {MIN_FORGIVENESS_RATIO} and 1.0"
            )));
        }
        Ok(())
    }
}

/// One forgiven substitution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgivenessRecord {
    pub ref_index: usize,
    pub reference: String,
    pub pronunciation: String,
    pub phonetic_ratio: u8,
    pub source: ProperNounSource,
    pub absorbed_fragments: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProperNounForgiver {
    config: ForgivenessConfig,
}

/// Best pronunciation found for one substitution
struct Candidate {
    ratio: f64,
    pronunciation: String,
    fragments: usize,
}

impl ProperNounForgiver {
    pub fn new(config: ForgivenessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Forgive close proper-noun substitutions. Omissions are never
    /// forgiven and an empty passage disables the pass.
    pub fn forgive(
        &self,
        entries: &[AlignmentEntry],
        reference: &ReferencePassage,
    ) -> (Vec<AlignmentEntry>, Vec<ForgivenessRecord>) {
        let mut output = entries.to_vec();
        let mut log = Vec::new();
        if !self.config.enabled || reference.is_empty() {
            return (output, log);
        }

        for position in 0..entries.len() {
            let AlignmentEntry::Substitution { reference: ref_word, ref_index, hypothesis, .. } = &entries[position] else {
                continue;
            };
            let Some(source) = reference.token(*ref_index).and_then(|t| t.proper_noun) else {
                continue;
            };

            let target = normalize_word(ref_word);
            let best = best_pronunciation(&target, hypothesis, &entries[position + 1..]);
            if best.ratio < self.config.min_ratio {
                continue;
            }

            let phonetic_ratio = (best.ratio * 100.0).round() as u8;
            let forgiveness = Forgiveness {
                phonetic_ratio,
                source,
                combined_pronunciation: (best.fragments > 0).then(|| best.pronunciation.clone()),
                absorbed_fragments: best.fragments,
            };

            if let AlignmentEntry::Substitution { forgiveness: slot, .. } = &mut output[position] {
                *slot = Some(forgiveness);
            }
            for absorbed in &mut output[position + 1..=position + best.fragments] {
                if let AlignmentEntry::Insertion { part_of_forgiven, .. } = absorbed {
                    *part_of_forgiven = true;
                }
            }

            log.push(ForgivenessRecord {
                ref_index: *ref_index,
                reference: ref_word.clone(),
                pronunciation: best.pronunciation,
                phonetic_ratio,
                source,
                absorbed_fragments: best.fragments,
            });
        }

        (output, log)
    }
}

/// Grow the pronunciation through the insertions that immediately follow,
/// keeping the combination most similar to `target`. Ties keep fewer
/// fragments.
fn best_pronunciation(target: &str, spoken: &str, following: &[AlignmentEntry]) -> Candidate {
    let mut combined = normalize_word(spoken);
    let mut best = Candidate {
        ratio: levenshtein_ratio(target, &combined),
        pronunciation: combined.clone(),
        fragments: 0,
    };

    let fragments = following.iter().map_while(|entry| match entry {
        AlignmentEntry::Insertion { hypothesis, .. } => Some(hypothesis),
        _ => None,
    });
    for (count, fragment) in fragments.enumerate() {
        combined.push_str(&normalize_word(fragment));
        let ratio = levenshtein_ratio(target, &combined);
        if ratio > best.ratio {
            best = Candidate {
                ratio,
                pronunciation: combined.clone(),
                fragments: count + 1,
            };
        }
    }

    best
}
