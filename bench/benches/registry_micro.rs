//! Registry microbenchmarks using Criterion.
//!
//! These benchmarks measure individual registry operations in isolation:
//! - Subscribe (first subscriber vs. growing an aggregate by union)
//! - Publish (fanout with and without payload, unknown event)
//! - Unsubscribe (single member vs. whole aggregate)

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rusty_bus_bench::fixture::Fixture;

// =============================================================================
// Subscribe Benchmarks
// =============================================================================

fn bench_subscribe(c: &mut Criterion) {
    let mut group = c.benchmark_group("subscribe");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        // One collection holding every widget
        group.bench_with_input(BenchmarkId::new("all_at_once", count), &count, |b, &n| {
            b.iter_batched(
                || Fixture::new(n),
                |fixture| {
                    fixture.subscribe_all("e");
                    black_box(fixture)
                },
                BatchSize::SmallInput,
            );
        });

        // One subscribe per widget, aggregate grows by union
        group.bench_with_input(BenchmarkId::new("one_by_one", count), &count, |b, &n| {
            b.iter_batched(
                || Fixture::new(n),
                |fixture| {
                    fixture.subscribe_each("e");
                    black_box(fixture)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// Publish Benchmarks
// =============================================================================

fn bench_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        let fixture = Fixture::new(count);
        fixture.subscribe_all("e");

        group.bench_with_input(BenchmarkId::new("no_payload", count), &count, |b, _| {
            b.iter(|| black_box(fixture.registry.publish(black_box("e"))));
        });

        group.bench_with_input(BenchmarkId::new("payload", count), &count, |b, _| {
            b.iter(|| black_box(fixture.registry.publish_with(black_box("e"), &[1, 2, 3])));
        });
    }

    // Lookup miss only
    let fixture = Fixture::new(1);
    fixture.subscribe_all("e");
    group.bench_function("unknown_event", |b| {
        b.iter(|| black_box(fixture.registry.publish(black_box("missing"))));
    });

    group.finish();
}

// =============================================================================
// Unsubscribe Benchmarks
// =============================================================================

fn bench_unsubscribe(c: &mut Criterion) {
    let mut group = c.benchmark_group("unsubscribe");

    for count in [100, 1_000, 10_000] {
        // Remove a single member from a large aggregate
        group.bench_with_input(BenchmarkId::new("single_member", count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let fixture = Fixture::new(n);
                    fixture.subscribe_all("e");
                    let target = fixture.collection([fixture.widgets[n / 2]]);
                    (fixture, target)
                },
                |(fixture, target)| {
                    black_box(fixture.registry.unsubscribe(&target, "e"));
                    fixture
                },
                BatchSize::SmallInput,
            );
        });

        // Remove everything, dropping the event
        group.bench_with_input(BenchmarkId::new("whole_aggregate", count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let fixture = Fixture::new(n);
                    fixture.subscribe_all("e");
                    let target = fixture.collection(fixture.widgets.iter().copied());
                    (fixture, target)
                },
                |(fixture, target)| {
                    black_box(fixture.registry.unsubscribe(&target, "e"));
                    fixture
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_subscribe, bench_publish, bench_unsubscribe);
criterion_main!(benches);
