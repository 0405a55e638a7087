//! Simulation benchmarks for sect_core.
//!
//! Run with: `cargo bench -p sect_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sect_core::prelude::*;
use sect_test_utils::fixtures;

/// Per-frame ticks on a state with every queue busy.
pub fn tick_benchmark(c: &mut Criterion) {
    let Ok(state) = fixtures::busy_state(7) else {
        return;
    };

    c.bench_function("tick_16ms_busy", |b| {
        b.iter(|| tick(black_box(&state), black_box(16.0)))
    });

    c.bench_function("tick_60s_of_frames", |b| {
        b.iter_batched(
            || state.clone(),
            |mut s| {
                for _ in 0..3_750 {
                    if let Ok(t) = tick(&s, 16.0) {
                        s = t.into_state();
                    }
                }
                s
            },
            BatchSize::SmallInput,
        )
    });
}

/// Catch-up over a capped eight hour absence.
pub fn offline_benchmark(c: &mut Criterion) {
    let Ok(state) = fixtures::busy_state(7) else {
        return;
    };

    c.bench_function("offline_8h", |b| {
        b.iter(|| offline_progress(black_box(&state), 0, black_box(8 * 3_600_000)))
    });
}

/// JSON save and binary snapshot encoding.
pub fn persistence_benchmark(c: &mut Criterion) {
    let Ok(state) = fixtures::busy_state(7) else {
        return;
    };
    let Ok(raw) = serialize(&state, 0) else {
        return;
    };

    c.bench_function("save_serialize", |b| b.iter(|| serialize(black_box(&state), 0)));
    c.bench_function("save_deserialize", |b| b.iter(|| deserialize(black_box(&raw))));
    c.bench_function("state_hash", |b| b.iter(|| black_box(&state).state_hash()));
}

criterion_group!(benches, tick_benchmark, offline_benchmark, persistence_benchmark);
criterion_main!(benches);
