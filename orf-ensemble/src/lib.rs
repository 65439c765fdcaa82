//! Reconciliation of two disagreeing ASR transcripts of one reading
//!
//! The vocabulary engine knows rare words and proper nouns but invents
//! timing and confidence. The timing engine has accurate acoustic boundaries
//! and confidence but a narrower vocabulary. This crate pairs their words,
//! picks each field from the engine that is trusted for it, and lets the
//! reference passage break text disagreements.
//!
//! # Stages
//!
//! - **Phantom filter**: vocabulary words under 10ms are dropped
//! - **Matching**: greedy three-pass pairing (semantic, extended semantic, temporal)
//! - **Fusion**: trust hierarchy plus reference veto
//! - **Post-merge**: duplicate collapse and prefix absorption
//!
//! Every stage is pure and returns a structured trace instead of logging.
//!
//! # Example
//!
//! ```
//! use orf_ensemble::{EngineRole, EnsembleMerger, RawWord, WordSource};
//! use orf_text::ReferencePassage;
//!
//! let reference = ReferencePassage::from_text("the happy dog");
//! let vocabulary = vec![RawWord::new("Hefty", 1000, 1400, EngineRole::Vocabulary)];
//! let timing = vec![RawWord::new("happy", 1020, 1420, EngineRole::Timing).with_confidence(0.81)];
//!
//! let merger = EnsembleMerger::default();
//! let outcome = merger.merge(&vocabulary, &timing, reference.word_set());
//!
//! assert_eq!(outcome.words[0].text, "happy");
//! assert_eq!(outcome.words[0].source, WordSource::Both);
//! assert!(outcome.words[0].provenance.veto_applied);
//! ```

mod error;
mod fuser;
mod matcher;
mod merge;
mod normalizer;
pub mod wire;
mod word;

pub use error::{EnsembleError, Result};
pub use fuser::{fuse, veto_reason, Pairing};
pub use matcher::{Match, MatcherConfig, TemporalSemanticMatcher};
pub use merge::{EnsembleMerger, MergeOutcome, MergeTrace, VetoRecord};
pub use normalizer::{
    AbsorptionRecord, CollapseRecord, PostMergeConfig, PostMergeNormalizer, PostMergeTrace,
    MORPHOLOGICAL_PREFIXES,
};
pub use wire::{engine_words_from_value, parse_engine_response, EngineResponse};
pub use word::{
    DedupInfo, EngineRole, MatchKind, MergedWord, MorphBreak, Provenance, RawWord, VetoReason,
    WordSource,
};
