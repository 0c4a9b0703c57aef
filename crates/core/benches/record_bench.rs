use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use metricore_core::testing::{CollectingSink, ManualScheduler};
use metricore_core::{MetricFlags, Outcome, PolicyDefinition, Registry};

fn registry_with_policy(metrics: usize) -> (Registry, Arc<ManualScheduler>) {
    let scheduler = Arc::new(ManualScheduler::default());
    let mut registry = Registry::builder()
        .sink(Arc::new(CollectingSink::default()))
        .scheduler(scheduler.clone())
        .build();
    registry
        .create_policies([Arc::new(PolicyDefinition::new("bench", Duration::from_secs(1)))])
        .expect("create policy");

    for i in 0..metrics {
        let id = registry.create_metric(&format!("m{i}"), MetricFlags::MEAN).expect("create metric");
        registry.switch_policy(id, "bench").expect("switch");
        registry.record_event(id, Outcome::Go, i as u64);
    }
    (registry, scheduler)
}

fn bench_record_event(c: &mut Criterion) {
    let mut registry = Registry::builder().build();
    let id = registry.create_metric("latency", MetricFlags::MEAN).expect("create metric");

    c.bench_function("record_event", |b| {
        b.iter(|| registry.record_event(black_box(id), Outcome::Go, black_box(250)));
    });
}

fn bench_bump(c: &mut Criterion) {
    let mut registry = Registry::builder().build();
    let id = registry.create_metric("status", MetricFlags::HISTOGRAM).expect("create metric");
    let codes = ["200", "201", "204", "301", "304", "400", "401", "403", "404", "500"];
    for code in codes {
        registry.bump(id, code).expect("bump");
    }

    c.bench_function("bump_existing_bucket", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % codes.len();
            registry.bump(id, black_box(codes[i])).expect("bump");
        });
    });
}

fn bench_periodic_dump(c: &mut Criterion) {
    c.bench_function("run_periodic_1000", |b| {
        b.iter_batched(
            || registry_with_policy(1_000),
            |(mut registry, scheduler)| {
                black_box(scheduler.tick(&mut registry));
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_record_event, bench_bump, bench_periodic_dump);
criterion_main!(benches);
