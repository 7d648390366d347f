//! Virtual tick counter and callback registry.
//!
//! Task lifecycle:
//! - one-shot: `Pending -> Fired -> removed`
//! - repeating: `Pending -> Fired -> Pending` with `fire_at` advanced by the
//!   interval
//! - either kind: `Pending -> Cancelled (removed)` through the cancel call
//!   matching its kind
//!
//! A pass runs due callbacks one at a time, in registration order, and only
//! then advances the counter. The registry lock is released while a callback
//! runs, so callbacks may schedule or cancel tasks (including themselves).
//! A callback that returns an error or panics is reported and skipped over;
//! it never stops the pass.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use gametest_core::TickScheduler;
//!
//! let scheduler = TickScheduler::new(100);
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&hits);
//! scheduler.schedule_once(
//!     move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     },
//!     2,
//! );
//!
//! scheduler.run_pass(); // tick 100
//! scheduler.run_pass(); // tick 101
//! assert_eq!(hits.load(Ordering::SeqCst), 0);
//! scheduler.run_pass(); // tick 102
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! assert_eq!(scheduler.current_tick(), 103);
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gametest_domain::constants::{DEFAULT_TICK_DELAY, DEFAULT_TICK_INTERVAL, INITIAL_TICK_RANGE};
use gametest_domain::{
    GametestError, Result, SchedulerConfig, TaskFailure, TaskId, TaskKind, TickReport,
};
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use tracing::{debug, trace, warn};

/// Callback stored by the scheduler. `Err` marks the run as failed.
pub type TaskCallback = Box<dyn FnMut() -> anyhow::Result<()> + Send + 'static>;

/// Receives every contained callback failure.
pub type FailureHook = Arc<dyn Fn(&TaskFailure) + Send + Sync + 'static>;

type SharedCallback = Arc<Mutex<TaskCallback>>;

struct ScheduledTask {
    fire_at: u64,
    interval: Option<u64>,
    callback: SharedCallback,
}

impl ScheduledTask {
    fn kind(&self) -> TaskKind {
        if self.interval.is_some() {
            TaskKind::Repeating
        } else {
            TaskKind::OneShot
        }
    }
}

#[derive(Default)]
struct Registry {
    // Ids are monotonic, so key order is registration order.
    tasks: BTreeMap<TaskId, ScheduledTask>,
    next_id: u64,
}

impl Registry {
    fn insert(&mut self, task: ScheduledTask) -> TaskId {
        let id = TaskId::new(self.next_id);
        self.next_id += 1;
        self.tasks.insert(id, task);
        id
    }

    fn remove_if(&mut self, id: TaskId, kind: TaskKind) -> bool {
        match self.tasks.get(&id) {
            Some(task) if task.kind() == kind => self.tasks.remove(&id).is_some(),
            _ => false,
        }
    }
}

struct Inner {
    registry: Mutex<Registry>,
    current_tick: AtomicU64,
    // Serialises passes so callbacks never run in parallel.
    pass_lock: Mutex<()>,
    failure_hook: RwLock<Option<FailureHook>>,
}

/// Cloneable handle to a tick scheduler.
///
/// Clones share the same counter and registry, so a callback can capture a
/// clone to schedule follow-up work.
#[derive(Clone)]
pub struct TickScheduler {
    inner: Arc<Inner>,
}

impl TickScheduler {
    /// Scheduler whose counter starts at `initial_tick`.
    pub fn new(initial_tick: u64) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(Registry::default()),
                current_tick: AtomicU64::new(initial_tick),
                pass_lock: Mutex::new(()),
                failure_hook: RwLock::new(None),
            }),
        }
    }

    /// Scheduler starting at a random tick below 10 000.
    pub fn with_random_start() -> Self {
        Self::new(rand::thread_rng().gen_range(0..INITIAL_TICK_RANGE))
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        match config.initial_tick {
            Some(tick) => Self::new(tick),
            None => Self::with_random_start(),
        }
    }

    /// Install the hook that receives contained callback failures.
    pub fn set_failure_hook<F>(&self, hook: F)
    where
        F: Fn(&TaskFailure) + Send + Sync + 'static,
    {
        *self.inner.failure_hook.write() = Some(Arc::new(hook));
    }

    pub fn clear_failure_hook(&self) {
        *self.inner.failure_hook.write() = None;
    }

    /// Last published tick value.
    pub fn current_tick(&self) -> u64 {
        self.inner.current_tick.load(Ordering::Acquire)
    }

    /// Run `callback` once, `tick_delay` ticks from now.
    ///
    /// Any delay is accepted. A delay that lands on or before the tick
    /// currently being processed fires on the next pass.
    pub fn schedule_once<F>(&self, callback: F, tick_delay: i64) -> TaskId
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let mut registry = self.inner.registry.lock();
        let fire_at = self.current_tick().saturating_add_signed(tick_delay);
        let id = registry.insert(ScheduledTask {
            fire_at,
            interval: None,
            callback: Arc::new(Mutex::new(Box::new(callback))),
        });
        debug!(task_id = %id, fire_at, "scheduled one-shot task");
        id
    }

    /// [`schedule_once`](Self::schedule_once) with the default delay of one tick.
    pub fn schedule_once_next<F>(&self, callback: F) -> TaskId
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        self.schedule_once(callback, DEFAULT_TICK_DELAY)
    }

    /// Run `callback` every `tick_interval` ticks, first at now + interval.
    ///
    /// # Errors
    /// Returns `GametestError::InvalidInterval` when `tick_interval < 1`;
    /// nothing is registered in that case.
    pub fn schedule_repeating<F>(&self, callback: F, tick_interval: i64) -> Result<TaskId>
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let interval = u64::try_from(tick_interval)
            .ok()
            .filter(|interval| *interval >= 1)
            .ok_or(GametestError::InvalidInterval(tick_interval))?;

        let mut registry = self.inner.registry.lock();
        let fire_at = self.current_tick().saturating_add(interval);
        let id = registry.insert(ScheduledTask {
            fire_at,
            interval: Some(interval),
            callback: Arc::new(Mutex::new(Box::new(callback))),
        });
        debug!(task_id = %id, fire_at, interval, "scheduled repeating task");
        Ok(id)
    }

    /// [`schedule_repeating`](Self::schedule_repeating) firing on every tick.
    pub fn schedule_repeating_every_tick<F>(&self, callback: F) -> TaskId
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let mut registry = self.inner.registry.lock();
        let interval = DEFAULT_TICK_INTERVAL.unsigned_abs();
        let fire_at = self.current_tick().saturating_add(interval);
        registry.insert(ScheduledTask {
            fire_at,
            interval: Some(interval),
            callback: Arc::new(Mutex::new(Box::new(callback))),
        })
    }

    /// Cancel a pending one-shot task. Repeating tasks are left alone.
    ///
    /// Returns whether a task was removed.
    pub fn cancel_once(&self, id: TaskId) -> bool {
        let removed = self.inner.registry.lock().remove_if(id, TaskKind::OneShot);
        trace!(task_id = %id, removed, "cancel_once");
        removed
    }

    /// Cancel a pending repeating task. One-shot tasks are left alone.
    ///
    /// Returns whether a task was removed.
    pub fn cancel_repeating(&self, id: TaskId) -> bool {
        let removed = self.inner.registry.lock().remove_if(id, TaskKind::Repeating);
        trace!(task_id = %id, removed, "cancel_repeating");
        removed
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.inner.registry.lock().tasks.contains_key(&id)
    }

    pub fn task_kind(&self, id: TaskId) -> Option<TaskKind> {
        self.inner.registry.lock().tasks.get(&id).map(ScheduledTask::kind)
    }

    /// Tick at which a pending task fires next.
    pub fn next_fire_tick(&self, id: TaskId) -> Option<u64> {
        self.inner.registry.lock().tasks.get(&id).map(|task| task.fire_at)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.registry.lock().tasks.len()
    }

    /// Process the current tick, then advance the counter by one.
    ///
    /// Tasks due at or before the current tick fire in registration order.
    /// Tasks cancelled by an earlier callback of the same pass are skipped;
    /// tasks registered during the pass wait for the next one.
    pub fn run_pass(&self) -> TickReport {
        let _pass = self.inner.pass_lock.lock();
        let tick = self.current_tick();

        let due: Vec<(TaskId, TaskKind, SharedCallback)> = {
            let registry = self.inner.registry.lock();
            registry
                .tasks
                .iter()
                .filter(|(_, task)| task.fire_at <= tick)
                .map(|(id, task)| (*id, task.kind(), Arc::clone(&task.callback)))
                .collect()
        };

        let mut report = TickReport { tick, ..TickReport::default() };
        for (id, kind, callback) in due {
            if !self.is_pending(id) {
                trace!(task_id = %id, tick, "skipping task cancelled earlier in this pass");
                continue;
            }

            report.fired += 1;
            if let Err(message) = invoke(&callback) {
                report.failed += 1;
                self.report_failure(TaskFailure { task_id: id, kind, tick, message });
            }
            self.complete(id, tick);
        }

        let next_tick = tick.saturating_add(1);
        self.inner.current_tick.store(next_tick, Ordering::Release);
        report.next_tick = next_tick;

        if report.fired > 0 {
            debug!(tick, fired = report.fired, failed = report.failed, "tick pass complete");
        }
        report
    }

    /// Apply the Fired transition unless the task is already gone.
    fn complete(&self, id: TaskId, tick: u64) {
        let mut registry = self.inner.registry.lock();
        let Some(task) = registry.tasks.get_mut(&id) else {
            return;
        };
        match task.interval {
            Some(interval) => task.fire_at = tick.saturating_add(interval),
            None => {
                registry.tasks.remove(&id);
            }
        }
    }

    fn report_failure(&self, failure: TaskFailure) {
        warn!(
            task_id = %failure.task_id,
            kind = %failure.kind,
            tick = failure.tick,
            error = %failure.message,
            "scheduled task failed"
        );
        let hook = self.inner.failure_hook.read().clone();
        if let Some(hook) = hook {
            hook(&failure);
        }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::with_random_start()
    }
}

impl fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickScheduler")
            .field("current_tick", &self.current_tick())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Run one callback inside a failure boundary.
fn invoke(callback: &SharedCallback) -> std::result::Result<(), String> {
    let mut guard = callback.lock();
    let run: &mut TaskCallback = &mut guard;
    match panic::catch_unwind(AssertUnwindSafe(|| run())) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(format!("callback panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
