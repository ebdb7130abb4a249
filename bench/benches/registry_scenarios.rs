//! Registry scenario benchmarks using Criterion.
//!
//! These benchmarks measure realistic subscription workloads:
//! - Fanout (few events, large aggregates, publish heavy)
//! - Churn (many events, constant subscribe/unsubscribe and widget turnover)

use std::fmt::Display;

use criterion::{
    BenchmarkGroup, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
    measurement::WallTime,
};
use rusty_bus_bench::scenarios::{
    ChurnConfig, ChurnScenario, FanoutConfig, FanoutScenario, Scenario,
};

/// Benchmarks one `update` round of `scenario`, labelled `<name>/<parameter>`.
fn bench_rounds<S: Scenario>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    mut scenario: S,
    parameter: impl Display,
) {
    let id = BenchmarkId::new(scenario.name(), parameter);
    scenario.setup();
    group.bench_function(id, |b| {
        b.iter(|| {
            scenario.update();
        });
    });
    scenario.teardown();
}

// =============================================================================
// Fanout Benchmarks
// =============================================================================

fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario");

    for count in [1_000, 10_000, 50_000] {
        let config = FanoutConfig {
            widget_count: count,
            ..Default::default()
        };
        let published = config.widget_count * config.event_count;
        let scenario = FanoutScenario::new(config);
        group.throughput(Throughput::Elements(published as u64));

        let widgets = scenario.widget_count();
        bench_rounds(&mut group, scenario, widgets);
    }

    group.finish();
}

// =============================================================================
// Churn Benchmarks
// =============================================================================

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario");

    for events in [8, 32, 128] {
        let config = ChurnConfig {
            event_count: events,
            ..Default::default()
        };
        group.throughput(Throughput::Elements(config.operations as u64));
        let scenario = ChurnScenario::new(config);

        let parameter = format!("{}w-{events}e", scenario.widget_count());
        bench_rounds(&mut group, scenario, parameter);
    }

    group.finish();
}

criterion_group!(benches, bench_fanout, bench_churn);
criterion_main!(benches);
