//! Periodic driver for a [`TickScheduler`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use gametest_core::TickScheduler;
//! use gametest_infra::scheduling::TickDriver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scheduler = TickScheduler::new(0);
//! scheduler.schedule_repeating(|| Ok(()), 5)?;
//!
//! let mut driver = TickDriver::new(scheduler, Duration::from_millis(20))?;
//! driver.start()?;
//! // ... sandbox runs ...
//! driver.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use gametest_core::TickScheduler;
use gametest_domain::SchedulerConfig;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use super::error::{SchedulerError, SchedulerResult};

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs one scheduler pass per tick period.
///
/// Callbacks execute on the driver task, so a callback that blocks delays
/// every later tick. Work that waits on I/O should be spawned onto the
/// runtime from inside the callback.
pub struct TickDriver {
    scheduler: TickScheduler,
    period: Duration,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Create a stopped driver.
    ///
    /// # Errors
    /// Returns `SchedulerError::InvalidPeriod` for a period under 1ms.
    pub fn new(scheduler: TickScheduler, period: Duration) -> SchedulerResult<Self> {
        if period < Duration::from_millis(1) {
            return Err(SchedulerError::InvalidPeriod);
        }
        Ok(Self { scheduler, period, cancellation: CancellationToken::new(), task_handle: None })
    }

    pub fn from_config(scheduler: TickScheduler, config: &SchedulerConfig) -> SchedulerResult<Self> {
        Self::new(scheduler, Duration::from_millis(config.tick_period_ms))
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawn the tick loop on the current Tokio runtime.
    ///
    /// # Errors
    /// `AlreadyRunning` if started twice, `NoRuntime` outside a runtime.
    #[instrument(skip(self), fields(period_ms = self.period.as_millis() as u64))]
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        // Fresh token so the driver can be restarted after stop
        self.cancellation = CancellationToken::new();

        let scheduler = self.scheduler.clone();
        let period = self.period;
        let cancel = self.cancellation.clone();
        self.task_handle = Some(runtime.spawn(tick_loop(scheduler, period, cancel)));

        info!(tick = self.scheduler.current_tick(), "Tick driver started");
        Ok(())
    }

    /// Cancel the tick loop and wait for it to finish.
    ///
    /// A pass already in progress completes first.
    ///
    /// # Errors
    /// `NotRunning` if the driver was never started or already stopped.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        if let Some(handle) = self.task_handle.take() {
            tokio::time::timeout(JOIN_TIMEOUT, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { millis: JOIN_TIMEOUT.as_millis() as u64 })?
                .map_err(|err| SchedulerError::TaskJoinFailed(err.to_string()))?;
        }

        info!(tick = self.scheduler.current_tick(), "Tick driver stopped");
        Ok(())
    }

    /// Whether the tick loop task is alive.
    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("TickDriver dropped while running; cancelling tick loop");
            self.cancellation.cancel();
        }
    }
}

async fn tick_loop(scheduler: TickScheduler, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    // A slow pass pushes later ticks back instead of bursting to catch up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("Tick loop cancelled");
                break;
            }
            _ = interval.tick() => {
                let report = scheduler.run_pass();
                trace!(tick = report.tick, fired = report.fired, "tick");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn fast_driver(scheduler: TickScheduler) -> TickDriver {
        TickDriver::new(scheduler, Duration::from_millis(5)).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lifecycle_advances_ticks() {
        let scheduler = TickScheduler::new(0);
        let mut driver = fast_driver(scheduler.clone());

        driver.start().unwrap();
        assert!(driver.is_running());
        tokio::time::sleep(Duration::from_millis(100)).await;
        driver.stop().await.unwrap();

        assert!(!driver.is_running());
        let stopped_at = scheduler.current_tick();
        assert!(stopped_at >= 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(scheduler.current_tick(), stopped_at);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fires_scheduled_callbacks() {
        let scheduler = TickScheduler::new(0);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        scheduler
            .schedule_repeating(
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
                1,
            )
            .unwrap();

        let mut driver = fast_driver(scheduler);
        driver.start().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        driver.stop().await.unwrap();

        assert!(hits.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let mut driver = fast_driver(TickScheduler::new(0));
        driver.start().unwrap();
        assert!(matches!(driver.start(), Err(SchedulerError::AlreadyRunning)));
        driver.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_without_start_is_rejected() {
        let mut driver = fast_driver(TickScheduler::new(0));
        assert!(matches!(driver.stop().await, Err(SchedulerError::NotRunning)));
    }

    #[tokio::test]
    async fn can_restart_after_stop() {
        let mut driver = fast_driver(TickScheduler::new(0));
        driver.start().unwrap();
        driver.stop().await.unwrap();
        driver.start().unwrap();
        assert!(driver.is_running());
        driver.stop().await.unwrap();
    }

    #[test]
    fn start_outside_runtime_is_rejected() {
        let mut driver = fast_driver(TickScheduler::new(0));
        assert!(matches!(driver.start(), Err(SchedulerError::NoRuntime)));
    }

    #[test]
    fn zero_period_is_rejected() {
        let result = TickDriver::new(TickScheduler::new(0), Duration::ZERO);
        assert!(matches!(result, Err(SchedulerError::InvalidPeriod)));
    }
}
