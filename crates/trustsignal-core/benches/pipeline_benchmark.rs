// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Criterion benchmark suite for the trust-signal composition pipeline.
//!
//! Benchmarks cover:
//!
//! - Temporal decay across record ages
//! - Trust assessment and grading
//! - Full seven-layer evaluation, cold and through the memoization cache
//! - A dense grid of records re-evaluated on one tick
//!
//! Run with: `cargo bench --bench pipeline_benchmark`

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use trustsignal_core::{
    cache::{InMemoryCache, ParamsCache},
    decay::TemporalDecayEngine,
    status::aggregate_health,
    trust::TrustScoreCalculator,
    types::{AgentPersona, DomainOverlay, EmergencyOverride, Impact, TrustGrade, TrustMathematics},
    CompositionPipeline, EvaluationContext, MotionPreference, SourceRecord,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn sample_math(index: usize) -> TrustMathematics {
    TrustMathematics {
        confidence_score: (index % 101) as f64,
        witness_count: (index % 7) as i64,
        deviation_sigma: (index % 5) as f64 * 0.5,
        exceeds_threshold: index % 13 == 0,
        trust_grade: TrustGrade::Good,
    }
}

/// A record exercising every layer at once.
fn fully_loaded_record() -> SourceRecord {
    let mut record = SourceRecord::new("decision-bench", now() - Duration::seconds(75));
    record.trust_math = Some(sample_math(42));
    record.agent = Some(AgentPersona::Governor);
    record.impact = Some(Impact::High);
    record.domain = Some(DomainOverlay::Enforcement);
    record
}

fn grid(size: usize) -> Vec<SourceRecord> {
    let personas = [
        AgentPersona::Operations,
        AgentPersona::Markets,
        AgentPersona::Sentinel,
        AgentPersona::Governor,
    ];
    (0..size)
        .map(|index| {
            let mut record =
                SourceRecord::new(format!("record-{index:05}"), now() - Duration::seconds((index * 7) as i64));
            record.trust_math = Some(sample_math(index));
            record.agent = Some(personas[index % personas.len()]);
            record.is_in_maintenance = Some(index % 50 == 0);
            record
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Decay benchmark
// ---------------------------------------------------------------------------

fn decay_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("temporal_decay");
    let engine = TemporalDecayEngine::default();

    for age in [0.0, 45.0, 600.0, 86_400.0] {
        group.bench_with_input(BenchmarkId::new("decay", age as u64), &age, |bencher, &age| {
            bencher.iter(|| black_box(engine.decay(black_box(92.0), black_box(age))));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Trust benchmark
// ---------------------------------------------------------------------------

fn trust_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("trust_assessment");
    let calculator = TrustScoreCalculator::default();
    let math = sample_math(77);

    group.bench_function("assess", |bencher| {
        bencher.iter(|| black_box(calculator.assess(black_box(&math))));
    });

    group.bench_function("grade_sweep", |bencher| {
        bencher.iter(|| {
            for score in 0..=100 {
                black_box(calculator.grade(black_box(score as f64)));
            }
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Full evaluation benchmark
// ---------------------------------------------------------------------------

fn evaluation_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("composition");
    let pipeline = CompositionPipeline::default();
    let record = fully_loaded_record();

    let contexts = [
        ("full_motion", EvaluationContext::at(now())),
        ("reduced_motion", EvaluationContext::at(now()).with_motion(MotionPreference::Reduced)),
        ("emergency", EvaluationContext::at(now()).with_emergency(EmergencyOverride::ACTIVE)),
    ];
    for (name, ctx) in contexts {
        group.bench_function(BenchmarkId::new("evaluate", name), |bencher| {
            bencher.iter(|| black_box(pipeline.evaluate(black_box(&record), black_box(&ctx))));
        });
    }

    group.bench_function("evaluate_breakdown", |bencher| {
        let ctx = EvaluationContext::at(now());
        bencher.iter(|| black_box(pipeline.evaluate_breakdown(black_box(&record), black_box(&ctx))));
    });

    group.bench_function("evaluate_cached_hit", |bencher| {
        let ctx = EvaluationContext::at(now());
        let mut cache = InMemoryCache::new();
        pipeline.evaluate_cached(&record, &ctx, &mut cache);
        bencher.iter(|| black_box(pipeline.evaluate_cached(black_box(&record), black_box(&ctx), &mut cache)));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Grid benchmark
// ---------------------------------------------------------------------------

/// One re-evaluation tick over a dense display: every record evaluated,
/// the stale cache window evicted, and the grid health summarised.
fn grid_tick_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("grid_tick");
    let pipeline = CompositionPipeline::default();

    for size in [100usize, 1_000] {
        let records = grid(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |bencher, records| {
            let mut cache = InMemoryCache::new();
            let ctx = EvaluationContext::at(now());
            bencher.iter(|| {
                cache.evict_before(ctx.now.timestamp_millis());
                let statuses: Vec<_> = records
                    .iter()
                    .map(|record| Some(pipeline.evaluate_cached(record, &ctx, &mut cache).operational_status))
                    .collect();
                black_box(aggregate_health(&statuses))
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Criterion harness
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    decay_benchmark,
    trust_benchmark,
    evaluation_benchmark,
    grid_tick_benchmark,
);

criterion_main!(benches);
