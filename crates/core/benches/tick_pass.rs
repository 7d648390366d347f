use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use gametest_core::TickScheduler;

fn scheduler_with_repeating(count: usize, interval: i64) -> (TickScheduler, Arc<AtomicU64>) {
    let scheduler = TickScheduler::new(0);
    let hits = Arc::new(AtomicU64::new(0));
    for _ in 0..count {
        let hits = Arc::clone(&hits);
        scheduler
            .schedule_repeating(
                move || {
                    hits.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                },
                interval,
            )
            .expect("valid interval");
    }
    (scheduler, hits)
}

fn tick_pass_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_pass");
    group.sample_size(50);

    group.bench_function("idle_pass_1000_pending", |b| {
        // Every task is far in the future, so a pass only scans.
        let scheduler = TickScheduler::new(0);
        for _ in 0..1_000 {
            scheduler.schedule_once(|| Ok(()), 1_000_000_000);
        }
        b.iter(|| black_box(scheduler.run_pass()));
    });

    group.bench_function("pass_firing_100_repeating", |b| {
        let (scheduler, hits) = scheduler_with_repeating(100, 1);
        b.iter(|| black_box(scheduler.run_pass()));
        black_box(hits.load(Ordering::Relaxed));
    });

    group.bench_function("schedule_and_fire_one_shots", |b| {
        b.iter_batched(
            || TickScheduler::new(0),
            |scheduler| {
                for delay in 0..100 {
                    scheduler.schedule_once(|| Ok(()), delay % 4);
                }
                for _ in 0..4 {
                    black_box(scheduler.run_pass());
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, tick_pass_benchmark);
criterion_main!(benches);
