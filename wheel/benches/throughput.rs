//! Throughput of the three hot-path operations: scheduling, advancing, and
//! draining a wheel carrying a large population of pending timeouts.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use wheel::Wheel;

fn bench_start(c: &mut Criterion) {
    let mut group = c.benchmark_group("start");

    for size in [100, 1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut w: Wheel<u64> = Wheel::new();
                for i in 0..size {
                    black_box(w.start(i as u64, i as u64));
                }
                black_box(w);
            });
        });
    }

    group.finish();
}

fn bench_advance_fully_populated(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_fully_populated");

    for size in [100, 1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut w: Wheel<u64> = Wheel::new();
                    for i in 0..size {
                        w.start(i as u64, i as u64);
                    }
                    w
                },
                |mut w| {
                    black_box(w.advance(size as u64));
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_next_expired_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_expired_drain");

    for size in [100, 1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut w: Wheel<u64> = Wheel::new();
                    for i in 0..size {
                        w.start(i as u64, i as u64);
                    }
                    w.drain_all();
                    w
                },
                |mut w| {
                    while let Some(v) = w.next_expired() {
                        black_box(v);
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    for concurrent in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(concurrent as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(concurrent),
            &concurrent,
            |b, &concurrent| {
                b.iter_batched(
                    || {
                        let mut w: Wheel<u64> = Wheel::new();
                        for i in 0..concurrent {
                            w.start(i as u64 + 1_000, i as u64);
                        }
                        w
                    },
                    |mut w| {
                        for i in 0..1_000u64 {
                            let h = w.start(i + 500, i);
                            black_box(w.stop(h));
                        }
                        black_box(w);
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    throughput,
    bench_start,
    bench_advance_fully_populated,
    bench_next_expired_drain,
    bench_churn,
);
criterion_main!(throughput);
