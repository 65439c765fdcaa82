//! Merge throughput on a passage-sized attempt
//!
//! Run with: cargo bench -p orf-ensemble

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use orf_ensemble::{EngineRole, EnsembleMerger, RawWord};
use orf_text::ReferencePassage;

const PASSAGE: &str = "Once upon a time a small brown dog lived near the edge of a quiet \
    village. Every morning the dog walked to the river and watched the boats drift past. \
    One day Hermione saw the dog and decided to follow it all the way home.";

/// Both engines read the passage; every seventh timing word is misheard and
/// the timing clock drifts by 30ms.
fn engine_outputs(repeats: usize) -> (Vec<RawWord>, Vec<RawWord>) {
    let words: Vec<&str> = PASSAGE.split_whitespace().collect();
    let mut vocabulary = Vec::new();
    let mut timing = Vec::new();

    for round in 0..repeats {
        for (i, word) in words.iter().enumerate() {
            let start = ((round * words.len() + i) as i64) * 350;
            vocabulary.push(RawWord::new(*word, start, start + 300, EngineRole::Vocabulary));

            let heard = if i % 7 == 3 { "uh" } else { word };
            timing.push(
                RawWord::new(heard, start + 30, start + 320, EngineRole::Timing).with_confidence(0.8),
            );
        }
    }

    (vocabulary, timing)
}

fn bench_merge(c: &mut Criterion) {
    let reference = ReferencePassage::from_text(PASSAGE);
    let merger = EnsembleMerger::default();

    let mut group = c.benchmark_group("EnsembleMerger::merge");
    for repeats in [1usize, 4, 16] {
        let (vocabulary, timing) = engine_outputs(repeats);
        group.bench_with_input(BenchmarkId::from_parameter(vocabulary.len()), &repeats, |b, _| {
            b.iter(|| {
                merger.merge(
                    black_box(&vocabulary),
                    black_box(&timing),
                    reference.word_set(),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
