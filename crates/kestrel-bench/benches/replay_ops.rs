//! Criterion benchmarks for frame encoding, hashing, and difference streams.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use kestrel_bench::{crowded_frame, scripted_input};
use kestrel_core::{bit_eq, Encode, TickId};
use kestrel_replay::{frame_hash, DifferenceReader, DifferenceWriter};
use kestrel_systems::{Frame, FrameInput};

const TICKS: u64 = 10_000;

fn recorded() -> (Vec<u8>, Vec<u8>) {
    let frame = crowded_frame(42);
    let mut writer = DifferenceWriter::new(frame.clone(), FrameInput::default());
    for t in 0..TICKS {
        writer.update(TickId(t), &scripted_input(t));
    }
    let mut end = frame;
    end.tick = TickId(TICKS);
    let (mut header, mut frames) = (Vec::new(), Vec::new());
    writer.write_to(&mut header, &mut frames, &end).unwrap();
    (header, frames)
}

fn bench_encode_frame(c: &mut Criterion) {
    let frame = crowded_frame(42);
    c.bench_function("encode_crowded_frame", |b| {
        b.iter(|| black_box(frame.to_bytes().len()));
    });
}

fn bench_frame_hash(c: &mut Criterion) {
    let frame = crowded_frame(42);
    c.bench_function("hash_crowded_frame", |b| {
        b.iter(|| black_box(frame_hash(&frame)));
    });
}

fn bench_bit_eq(c: &mut Criterion) {
    let a = crowded_frame(42);
    let b2 = a.clone();
    c.bench_function("bit_eq_crowded_frame", |b| {
        b.iter(|| black_box(bit_eq(&a, &b2)));
    });
}

fn bench_record_10k(c: &mut Criterion) {
    c.bench_function("record_10k_ticks", |b| {
        b.iter(|| black_box(recorded()));
    });
}

fn bench_replay_10k(c: &mut Criterion) {
    let (header, frames) = recorded();
    c.bench_function("replay_10k_ticks", |b| {
        b.iter(|| {
            let mut reader = DifferenceReader::<Frame, FrameInput>::from_readers(
                header.as_slice(),
                frames.as_slice(),
            )
            .unwrap();
            let mut fired = 0u32;
            for t in 0..TICKS {
                if let Some(input) = reader.update(TickId(t)) {
                    fired += u32::from(input.fire != 0);
                }
            }
            black_box(fired);
        });
    });
}

criterion_group!(
    benches,
    bench_encode_frame,
    bench_frame_hash,
    bench_bit_eq,
    bench_record_10k,
    bench_replay_10k
);
criterion_main!(benches);
