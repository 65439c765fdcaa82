//! Text primitives for oral reading fluency assessment
//!
//! Everything that compares words across engines, passages and alignments
//! goes through this crate:
//!
//! - [`normalize`]: comparison keys (case fold, punctuation strip,
//!   equivalent spellings). Display text is never modified.
//! - [`reference`]: the tokenized reference passage, its membership set and
//!   the proper-noun signal per token.
//! - [`similarity`]: Levenshtein distance and the normalized ratio used as
//!   the phonetic similarity score.
//!
//! ```
//! use orf_text::{comparison_key, ReferencePassage};
//!
//! let passage = ReferencePassage::from_text("Mr. Brown met Hermione.");
//! assert!(passage.contains(&comparison_key("mister")));
//! assert!(passage.tokens()[3].is_proper_noun());
//! ```

pub mod normalize;
pub mod reference;
pub mod similarity;

pub use normalize::{canonical_form, comparison_key, normalize_word};
pub use reference::{ProperNounSource, ReferencePassage, ReferenceToken};
pub use similarity::{levenshtein, levenshtein_ratio};
