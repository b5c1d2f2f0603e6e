//! Benchmarks for ladder_models.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ladder_core::types::{Features, TierMap};
use ladder_models::choice::choice_shares;
use ladder_models::presets;
use ladder_models::segments::Segment;

fn benchmark_choice_shares(c: &mut Criterion) {
    let ladder = TierMap::new(9.99, 19.99, 49.99);
    let features = Features::default();
    let blend = presets::example_blend();

    c.bench_function("choice_shares_blend", |b| {
        b.iter(|| choice_shares(black_box(&ladder), &features, &blend, None))
    });

    let refs = TierMap::new(10.0, 20.0, 50.0);
    let anchored: Vec<Segment> = blend
        .iter()
        .cloned()
        .map(|s| s.with_anchoring(0.05, 2.0))
        .collect();

    c.bench_function("choice_shares_anchored", |b| {
        b.iter(|| choice_shares(black_box(&ladder), &features, &anchored, Some(&refs)))
    });
}

fn benchmark_segment_counts(c: &mut Criterion) {
    let ladder = TierMap::new(9.99, 19.99, 49.99);
    let features = Features::default();
    let mut group = c.benchmark_group("choice_shares_segments");

    for count in [1usize, 2, 4, 8] {
        let segments: Vec<Segment> = (0..count)
            .map(|i| Segment::new(1.0 / count as f64, -0.05 - 0.01 * i as f64, 0.2, 0.1, 0.4))
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &segments,
            |b, segments| b.iter(|| choice_shares(black_box(&ladder), &features, segments, None)),
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_choice_shares, benchmark_segment_counts);
criterion_main!(benches);
