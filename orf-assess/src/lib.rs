//! Oral reading fluency assessment
//!
//! Reconciles two speech engines' transcripts of a child reading a known
//! passage, flags hallucinated words, aligns the result against the passage
//! and applies the reading-specific corrections:
//!
//! 1. [`orf_ensemble`]: phantom removal, matching, reference veto, post-merge cleanup
//! 2. [`orf_vad`]: ghost words with no acoustic support
//! 3. [`orf_correction`]: alignment, self-corrections, proper-noun forgiveness
//!
//! [`AssessmentPipeline`] runs every stage and collects [`orf_metrics`] trace
//! events for the debug log.
//!
//! ```
//! use orf_assess::{AssessConfig, AssessmentInput, AssessmentPipeline};
//! use orf_correction::AlignmentEntry;
//!
//! let pipeline = AssessmentPipeline::new(&AssessConfig::default()).unwrap();
//! let input = AssessmentInput::from_json(r#"{
//!     "referenceText": "the cat sat",
//!     "vocabulary": [
//!         {"word": "the", "startTime": "0.0s", "endTime": "0.2s"},
//!         {"word": "cat", "startTime": "0.3s", "endTime": "0.6s"},
//!         {"word": "sat", "startTime": "0.7s", "endTime": "1.0s"}
//!     ]
//! }"#).unwrap();
//!
//! let output = pipeline.run(&input);
//! assert_eq!(output.merged_words.len(), 3);
//! assert!(output
//!     .alignment
//!     .iter()
//!     .all(|e| matches!(e, AlignmentEntry::Correct { .. })));
//! ```

pub mod config;
pub mod input;
pub mod pipeline;

pub use config::AssessConfig;
pub use input::{AssessmentInput, AssessmentOutput};
pub use pipeline::AssessmentPipeline;
