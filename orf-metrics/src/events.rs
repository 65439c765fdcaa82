//! Per-stage telemetry events

use chrono::{DateTime, Utc};
use orf_correction::{ForgivenessRecord, RepeatEvent};
use orf_ensemble::{AbsorptionRecord, CollapseRecord, MergeTrace, VetoRecord};
use orf_vad::{GhostReport, GhostSkip};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary records emitted while assessing one attempt
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TraceEvent {
    /// Matcher pass counts
    MatchSummary {
        phantoms_dropped: usize,
        semantic: usize,
        extended_semantic: usize,
        temporal: usize,
        vocabulary_only: usize,
        timing_only: usize,
        vetoes_applied: usize,
    },

    /// A disagreeing pair resolved by the reference
    Veto(VetoRecord),

    /// Duplicate collapse and prefix absorption
    PostMerge {
        collapses: Vec<CollapseRecord>,
        absorptions: Vec<AbsorptionRecord>,
    },

    /// Ghost detection outcome
    GhostSummary {
        ghost_count: usize,
        ghost_indices: Vec<usize>,
        has_ghost_sequence: bool,
        vad_error: Option<String>,
        skipped: Option<GhostSkip>,
    },

    /// Alignment coverage
    AlignmentSummary {
        reference_words: usize,
        spoken_words: usize,
        entries: usize,
    },

    /// Repeat extras reclassified as self-corrections
    SelfCorrections {
        repeats: Vec<RepeatEvent>,
        reclassified: Vec<usize>,
    },

    /// A forgiven proper-noun substitution
    Forgiveness(ForgivenessRecord),
}

impl TraceEvent {
    /// Match summary, one event per veto, and the post-merge record
    pub fn from_merge(trace: &MergeTrace) -> Vec<TraceEvent> {
        let mut events = vec![TraceEvent::MatchSummary {
            phantoms_dropped: trace.phantoms_dropped,
            semantic: trace.semantic_matches,
            extended_semantic: trace.extended_semantic_matches,
            temporal: trace.temporal_matches,
            vocabulary_only: trace.vocabulary_only,
            timing_only: trace.timing_only,
            vetoes_applied: trace.vetoes_applied(),
        }];

        events.extend(trace.vetoes.iter().cloned().map(TraceEvent::Veto));
        events.push(TraceEvent::PostMerge {
            collapses: trace.post_merge.collapsed.clone(),
            absorptions: trace.post_merge.absorbed.clone(),
        });
        events
    }

    pub fn from_ghost_report(report: &GhostReport) -> TraceEvent {
        TraceEvent::GhostSummary {
            ghost_count: report.ghost_count,
            ghost_indices: report.ghost_indices.clone(),
            has_ghost_sequence: report.has_ghost_sequence,
            vad_error: report.vad_error.clone(),
            skipped: report.skipped,
        }
    }

    /// Short name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            TraceEvent::MatchSummary { .. } => "match_summary",
            TraceEvent::Veto(_) => "veto",
            TraceEvent::PostMerge { .. } => "post_merge",
            TraceEvent::GhostSummary { .. } => "ghost_summary",
            TraceEvent::AlignmentSummary { .. } => "alignment_summary",
            TraceEvent::SelfCorrections { .. } => "self_corrections",
            TraceEvent::Forgiveness(_) => "forgiveness",
        }
    }
}

/// One line of the trace log
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraceRecord {
    pub attempt_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub event: TraceEvent,
}

impl TraceRecord {
    pub fn new(attempt_id: Uuid, event: TraceEvent) -> Self {
        Self {
            attempt_id,
            recorded_at: Utc::now(),
            event,
        }
    }

    /// Convert record to JSON string with newline
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}
