//! Scenario tests for `TickScheduler` driven by hand.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gametest_core::TickScheduler;
use gametest_domain::{GametestError, SchedulerConfig, TaskKind};
use parking_lot::Mutex;

#[test]
fn once_and_repeating_interleave_on_shared_counter() {
    let scheduler = TickScheduler::new(1_000);
    let log = Arc::new(Mutex::new(Vec::new()));

    let once_log = Arc::clone(&log);
    let once_clock = scheduler.clone();
    scheduler.schedule_once(
        move || {
            once_log.lock().push(("once", once_clock.current_tick()));
            Ok(())
        },
        3,
    );

    let repeat_log = Arc::clone(&log);
    let repeat_clock = scheduler.clone();
    let repeat_id = scheduler
        .schedule_repeating(
            move || {
                repeat_log.lock().push(("repeat", repeat_clock.current_tick()));
                Ok(())
            },
            2,
        )
        .unwrap();

    for _ in 0..7 {
        scheduler.run_pass();
    }

    // The counter is read before the pass advances it.
    assert_eq!(
        *log.lock(),
        vec![("repeat", 1_002), ("once", 1_003), ("repeat", 1_004), ("repeat", 1_006)]
    );
    assert_eq!(scheduler.current_tick(), 1_007);
    assert_eq!(scheduler.task_kind(repeat_id), Some(TaskKind::Repeating));
    assert!(scheduler.cancel_repeating(repeat_id));

    for _ in 0..4 {
        scheduler.run_pass();
    }
    assert_eq!(log.lock().len(), 4);
}

#[test]
fn repeating_task_can_cancel_itself() {
    let scheduler = TickScheduler::new(0);
    let runs = Arc::new(AtomicUsize::new(0));
    let own_id = Arc::new(Mutex::new(None));

    let handle = scheduler.clone();
    let counter = Arc::clone(&runs);
    let slot = Arc::clone(&own_id);
    let id = scheduler
        .schedule_repeating(
            move || {
                if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                    if let Some(id) = *slot.lock() {
                        handle.cancel_repeating(id);
                    }
                }
                Ok(())
            },
            1,
        )
        .unwrap();
    *own_id.lock() = Some(id);

    for _ in 0..10 {
        scheduler.run_pass();
    }
    assert_eq!(runs.load(Ordering::SeqCst), 3);
    assert_eq!(scheduler.pending_count(), 0);
}

#[test]
fn failing_repeating_task_keeps_its_schedule() {
    let scheduler = TickScheduler::new(0);
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let id = scheduler
        .schedule_repeating(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("upstream unavailable")
            },
            1,
        )
        .unwrap();

    let failed: usize = (0..5).map(|_| scheduler.run_pass().failed).sum();
    assert_eq!(failed, 4);
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert!(scheduler.is_pending(id));
}

#[test]
fn invalid_interval_reports_value() {
    let scheduler = TickScheduler::new(0);
    let err = scheduler.schedule_repeating(|| Ok(()), 0).unwrap_err();
    assert_eq!(err, GametestError::InvalidInterval(0));
    assert!(err.to_string().contains("can't be smaller than 1"));
}

#[test]
fn config_controls_starting_tick() {
    let fixed = TickScheduler::from_config(&SchedulerConfig {
        initial_tick: Some(77),
        ..SchedulerConfig::default()
    });
    assert_eq!(fixed.current_tick(), 77);

    let random = TickScheduler::from_config(&SchedulerConfig::default());
    assert!(random.current_tick() < 10_000);
}

#[test]
fn scheduling_from_another_thread_is_safe() {
    let scheduler = TickScheduler::new(0);
    let hits = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let scheduler = scheduler.clone();
            let hits = Arc::clone(&hits);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    let hits = Arc::clone(&hits);
                    scheduler.schedule_once(
                        move || {
                            hits.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        },
                        1,
                    );
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    scheduler.run_pass();
    scheduler.run_pass();
    assert_eq!(hits.load(Ordering::SeqCst), 100);
}
