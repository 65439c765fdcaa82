//! Telemetry for the assessment pipeline
//!
//! Stages return structured traces; this crate turns them into
//! [`TraceEvent`]s and appends them to a JSONL debug log, one
//! [`TraceRecord`] per line.

pub mod events;
pub mod log;

pub use events::{TraceEvent, TraceRecord};
pub use log::TraceLog;
