//! Criterion benchmarks for full ticks of the reference pipeline.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use kestrel_bench::{crowded_frame, reference_engine, scripted_input};
use kestrel_systems::Frame;

fn bench_tick(c: &mut Criterion, name: &str, initial: Frame, workers: usize) {
    let mut engine = reference_engine(initial, workers).unwrap();
    let mut t = 0u64;

    // Warm up: one tick so the spawn queue and lights are populated.
    engine.execute_tick(&scripted_input(t));

    c.bench_function(name, |b| {
        b.iter(|| {
            t += 1;
            let metrics = engine.execute_tick(&scripted_input(t));
            black_box(metrics.total_us);
        });
    });
}

fn bench_tick_empty(c: &mut Criterion) {
    bench_tick(c, "tick_empty_sequential", Frame::new(42), 0);
}

fn bench_tick_crowded_sequential(c: &mut Criterion) {
    bench_tick(c, "tick_crowded_sequential", crowded_frame(42), 0);
}

fn bench_tick_crowded_parallel(c: &mut Criterion) {
    bench_tick(c, "tick_crowded_4_workers", crowded_frame(42), 4);
}

fn bench_render_interpolation(c: &mut Criterion) {
    let mut engine = reference_engine(crowded_frame(42), 0).unwrap();
    engine.execute_tick(&scripted_input(0));

    c.bench_function("render_interpolate_crowded", |b| {
        b.iter(|| {
            let frame = engine.interpolate(&scripted_input(1), 0.5);
            black_box(frame.player.position);
        });
    });
}

fn bench_1000_ticks(c: &mut Criterion) {
    c.bench_function("1000_ticks_from_seed", |b| {
        b.iter(|| {
            let mut engine = reference_engine(Frame::new(7), 0).unwrap();
            for t in 0..1000 {
                engine.execute_tick(&scripted_input(t));
            }
            black_box(engine.current().score);
        });
    });
}

criterion_group!(
    benches,
    bench_tick_empty,
    bench_tick_crowded_sequential,
    bench_tick_crowded_parallel,
    bench_render_interpolation,
    bench_1000_ticks
);
criterion_main!(benches);
