//! Post-alignment correction passes
//!
//! The aligner compares what the student said with the passage. Two passes
//! then remove penalties that reflect ASR artifacts or good reading
//! behaviour rather than reading errors:
//!
//! - [`reclassify_self_corrections`]: repeat extras become `SelfCorrection`
//! - [`ProperNounForgiver`]: close attempts at names are forgiven
//!
//! Both passes are pure. They return a new entry sequence and leave the
//! reference coverage untouched.
//!
//! ```
//! use orf_correction::{
//!     reclassify_self_corrections, reference_coverage, AlignmentEntry, GradedAligner,
//!     ReferenceAligner, RepeatEvent,
//! };
//! use orf_text::ReferencePassage;
//!
//! let reference = ReferencePassage::from_text("the dog ran");
//! let spoken = ["the", "dog", "dog", "ran"];
//! let alignment = GradedAligner::default().align(&reference, &spoken);
//!
//! let (corrected, indices) = reclassify_self_corrections(&alignment, &[RepeatEvent::word(1, 2)]);
//! assert_eq!(indices, vec![2]);
//! assert!(matches!(corrected[2], AlignmentEntry::SelfCorrection { .. }));
//! assert_eq!(reference_coverage(&corrected), reference.len());
//! ```

mod aligner;
mod alignment;
mod error;
mod forgiveness;
mod repeats;
mod self_correction;

pub use aligner::{GradedAligner, ReferenceAligner};
pub use alignment::{reference_coverage, AlignmentEntry, Forgiveness};
pub use error::{CorrectionError, Result};
pub use forgiveness::{ForgivenessConfig, ForgivenessRecord, ProperNounForgiver, MIN_FORGIVENESS_RATIO};
pub use repeats::{detect_repeats, RepeatEvent, RepeatKind};
pub use self_correction::reclassify_self_corrections;
