//! Criterion micro-benchmarks for sparse and dense pool churn.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use kestrel_arena::{DensePool, DoubleBuffer, Handle, ObjectPool};
use kestrel_bench::crowded_frame;

const SLOTS: usize = 512;

fn bench_sparse_add_remove(c: &mut Criterion) {
    let mut pool: ObjectPool<u64, SLOTS> = ObjectPool::new();
    let mut handles = vec![Handle::NONE; SLOTS];

    c.bench_function("sparse_fill_and_drain_512", |b| {
        b.iter(|| {
            for (i, h) in handles.iter_mut().enumerate() {
                pool.add(h, i as u64);
            }
            for h in handles.iter_mut() {
                pool.remove(h);
            }
            black_box(pool.len());
        });
    });
}

fn bench_sparse_keep_alive(c: &mut Criterion) {
    let mut pool: ObjectPool<u64, SLOTS> = ObjectPool::new();
    let mut handles = vec![Handle::NONE; SLOTS / 2];
    for (i, h) in handles.iter_mut().enumerate() {
        pool.add(h, i as u64);
    }
    let mut tick = 0u64;

    c.bench_function("sparse_refresh_256", |b| {
        b.iter(|| {
            tick += 1;
            for h in handles.iter_mut() {
                pool.add(h, tick);
            }
            pool.retain(|&last, _| last == tick);
            black_box(pool.len());
        });
    });
}

fn bench_dense_churn(c: &mut Criterion) {
    let mut pool: DensePool<[f32; 4], SLOTS> = DensePool::new();

    c.bench_function("dense_push_then_cull_half_512", |b| {
        b.iter(|| {
            for i in 0..SLOTS {
                pool.push([i as f32; 4]);
            }
            pool.retain(|v| v[0] as usize % 2 == 0);
            pool.clear();
            black_box(pool.len());
        });
    });
}

fn bench_frame_ping_pong(c: &mut Criterion) {
    let mut buffer = DoubleBuffer::new(crowded_frame(42));

    c.bench_function("frame_stage_and_publish", |b| {
        b.iter(|| {
            let staging = buffer.stage();
            staging.next.score = staging.current.score + 1;
            buffer.swap();
            black_box(buffer.current().score);
        });
    });
}

criterion_group!(
    benches,
    bench_sparse_add_remove,
    bench_sparse_keep_alive,
    bench_dense_churn,
    bench_frame_ping_pong
);
criterion_main!(benches);
