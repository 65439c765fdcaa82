//! Assessment pipeline orchestration
//!
//! Engine outputs → ensemble merge → ghost detection → alignment →
//! self-correction → proper-noun forgiveness. Every stage is synchronous and
//! pure; this module logs stage summaries and collects trace events.

use anyhow::{Context, Result};
use orf_correction::{
    detect_repeats, reclassify_self_corrections, reference_coverage, GradedAligner,
    ProperNounForgiver, ReferenceAligner,
};
use orf_ensemble::{engine_words_from_value, EngineRole, EnsembleMerger, RawWord};
use orf_metrics::{TraceEvent, TraceLog, TraceRecord};
use orf_text::ReferencePassage;
use orf_vad::GhostWordFilter;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AssessConfig;
use crate::input::{AssessmentInput, AssessmentOutput};

pub struct AssessmentPipeline {
    merger: EnsembleMerger,
    ghost_filter: GhostWordFilter,
    aligner: Box<dyn ReferenceAligner>,
    forgiver: ProperNounForgiver,
}

impl AssessmentPipeline {
    pub fn new(config: &AssessConfig) -> Result<Self> {
        let merger = EnsembleMerger::new(config.matcher.clone(), config.post_merge.clone())
            .context("Failed to configure ensemble merger")?;
        let ghost_filter = GhostWordFilter::new(config.ghost.clone())
            .context("Failed to configure ghost filter")?;
        let forgiver = ProperNounForgiver::new(config.forgiveness.clone())
            .context("Failed to configure proper-noun forgiveness")?;

        Ok(Self {
            merger,
            ghost_filter,
            aligner: Box::new(GradedAligner::default()),
            forgiver,
        })
    }

    /// Replace the default aligner
    pub fn with_aligner(mut self, aligner: Box<dyn ReferenceAligner>) -> Self {
        self.aligner = aligner;
        self
    }

    /// Assess one attempt. Never fails: missing or malformed collaborator
    /// results degrade the affected stage only.
    pub fn run(&self, input: &AssessmentInput) -> AssessmentOutput {
        let attempt_id = input.attempt_id.unwrap_or_else(Uuid::new_v4);
        let reference = ReferencePassage::with_proper_nouns(&input.reference_text, &input.proper_nouns);
        debug!("Attempt {}: {} reference words", attempt_id, reference.len());

        let vocabulary = engine_words(input.vocabulary.as_ref(), EngineRole::Vocabulary);
        let timing = engine_words(input.timing.as_ref(), EngineRole::Timing);
        if vocabulary.is_empty() || timing.is_empty() {
            warn!(
                "Only one engine result available ({} vocabulary, {} timing words), passing through",
                vocabulary.len(),
                timing.len()
            );
        }

        // Ensemble merge
        let merged = self.merger.merge(&vocabulary, &timing, reference.word_set());
        let mut trace = TraceEvent::from_merge(&merged.trace);
        info!(
            "Merged {} words: {} matched ({} semantic, {} extended, {} temporal), {} vocabulary-only, {} timing-only, {} phantoms dropped",
            merged.words.len(),
            merged.trace.matched(),
            merged.trace.semantic_matches,
            merged.trace.extended_semantic_matches,
            merged.trace.temporal_matches,
            merged.trace.vocabulary_only,
            merged.trace.timing_only,
            merged.trace.phantoms_dropped
        );
        for veto in &merged.trace.vetoes {
            debug!("Veto '{}' vs '{}' -> '{}': {}", veto.vocabulary_text, veto.timing_text, veto.chosen_text, veto.reason);
        }
        if !merged.trace.post_merge.collapsed.is_empty() || !merged.trace.post_merge.absorbed.is_empty() {
            info!(
                "Post-merge: {} duplicate runs collapsed, {} prefixes absorbed",
                merged.trace.post_merge.collapsed.len(),
                merged.trace.post_merge.absorbed.len()
            );
        }

        // Ghost detection
        let audio_duration_ms = input.audio_duration_ms(&merged.words);
        let ghost_report = self.ghost_filter.flag(
            &merged.words,
            input.vad.as_ref(),
            &reference,
            audio_duration_ms,
        );
        match (&ghost_report.skipped, &ghost_report.vad_error) {
            (Some(skip), Some(error)) => warn!("Ghost detection skipped ({:?}): {}", skip, error),
            (Some(skip), None) => info!("Ghost detection skipped ({:?})", skip),
            (None, _) if ghost_report.has_ghost_sequence => warn!(
                "Ghost sequence detected: {} ghosts, longest run {}",
                ghost_report.ghost_count, ghost_report.longest_ghost_run
            ),
            (None, _) => info!("Ghost detection: {} ghosts", ghost_report.ghost_count),
        }
        trace.push(TraceEvent::from_ghost_report(&ghost_report));

        // Alignment
        let spoken: Vec<&str> = merged.words.iter().map(|w| w.text.as_str()).collect();
        let alignment = self.aligner.align(&reference, &spoken);
        trace.push(TraceEvent::AlignmentSummary {
            reference_words: reference.len(),
            spoken_words: spoken.len(),
            entries: alignment.len(),
        });
        let coverage = reference_coverage(&alignment);
        if coverage != reference.len() {
            warn!("Aligner covered {} of {} reference words", coverage, reference.len());
        }

        // Self-correction
        let repeats = match &input.repeats {
            Some(repeats) => repeats.clone(),
            None => detect_repeats(&spoken, &alignment),
        };
        let (alignment, reclassified) = reclassify_self_corrections(&alignment, &repeats);
        if !reclassified.is_empty() {
            info!("Reclassified {} insertions as self-corrections", reclassified.len());
        }
        trace.push(TraceEvent::SelfCorrections { repeats, reclassified });

        // Proper-noun forgiveness
        let (alignment, forgiven) = self.forgiver.forgive(&alignment, &reference);
        for record in &forgiven {
            info!(
                "Forgave '{}' as '{}' ({}% similar, {} fragments)",
                record.reference, record.pronunciation, record.phonetic_ratio, record.absorbed_fragments
            );
        }
        trace.extend(forgiven.into_iter().map(TraceEvent::Forgiveness));

        AssessmentOutput {
            attempt_id,
            merged_words: merged.words,
            ghost_report,
            alignment,
            trace,
        }
    }

    /// Append the output's trace events to `log`
    pub fn record(&self, output: &AssessmentOutput, log: &TraceLog) -> Result<()> {
        let records: Vec<TraceRecord> = output
            .trace
            .iter()
            .cloned()
            .map(|event| TraceRecord::new(output.attempt_id, event))
            .collect();

        log.append(&records)
            .with_context(|| format!("Failed to record trace for attempt {}", output.attempt_id))
    }
}

/// Parse one engine payload, treating anything unusable as no result
fn engine_words(payload: Option<&Value>, role: EngineRole) -> Vec<RawWord> {
    let Some(value) = payload else {
        return Vec::new();
    };

    match engine_words_from_value(value.clone(), role) {
        Ok(words) => words,
        Err(e) => {
            warn!("Ignoring {} engine result: {}", role, e);
            Vec::new()
        }
    }
}
