//! Background polling thread.
//!
//! The monitor itself never schedules anything. `Poller` is an optional driver
//! that moves a [`Monitor`] onto a dedicated thread and calls
//! [`Monitor::check_updates`] once immediately and then every `interval`.
//! Errors are logged and the next tick proceeds as usual; nothing is retried
//! early.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::error::{MonitorError, MonitorResult};
use crate::identity::ResourceIdentity;
use crate::monitor::Monitor;

/// Background poller settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between the end of one check and the start of the next.
    pub interval: Duration,
    /// Name of the polling thread.
    pub thread_name: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            thread_name: "edgemon-poller".to_string(),
        }
    }
}

/// Handle to a running polling thread.
///
/// Dropping the handle signals the thread to stop without waiting for it.
#[derive(Debug)]
pub struct Poller<R: ResourceIdentity> {
    shutdown_tx: Option<Sender<()>>,
    join: Option<JoinHandle<Monitor<R>>>,
    checks: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
}

impl<R: ResourceIdentity> Poller<R> {
    /// Moves `monitor` onto a new thread and starts polling.
    ///
    /// Register listeners through [`Monitor::dispatcher`] before calling this,
    /// or keep the dispatcher handle to register them later.
    pub fn spawn(monitor: Monitor<R>, cfg: PollerConfig) -> MonitorResult<Self> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let checks = Arc::new(AtomicU64::new(0));
        let failures = Arc::new(AtomicU64::new(0));

        let thread_checks = Arc::clone(&checks);
        let thread_failures = Arc::clone(&failures);
        let interval = cfg.interval;
        let join = thread::Builder::new()
            .name(cfg.thread_name.clone())
            .spawn(move || poll_loop(monitor, interval, shutdown_rx, &thread_checks, &thread_failures))
            .map_err(|e| MonitorError::internal(format!("failed to spawn poller thread: {e}")))?;

        info!(
            thread = %cfg.thread_name,
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Poller started"
        );

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            join: Some(join),
            checks,
            failures,
        })
    }

    /// Completed `check_updates` calls, successful or not.
    #[must_use]
    pub fn checks(&self) -> u64 {
        self.checks.load(Ordering::Relaxed)
    }

    /// `check_updates` calls that returned an error.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Stops the thread, waits for it, and hands the monitor back.
    pub fn stop(mut self) -> MonitorResult<Monitor<R>> {
        drop(self.shutdown_tx.take());
        let join = self
            .join
            .take()
            .ok_or_else(|| MonitorError::internal("poller already stopped"))?;
        join.join()
            .map_err(|_| MonitorError::internal("poller thread panicked"))
    }
}

impl<R: ResourceIdentity> Drop for Poller<R> {
    fn drop(&mut self) {
        // Closing the channel wakes the thread; it exits after the current check.
        drop(self.shutdown_tx.take());
    }
}

fn poll_loop<R: ResourceIdentity>(
    mut monitor: Monitor<R>,
    interval: Duration,
    shutdown_rx: Receiver<()>,
    checks: &AtomicU64,
    failures: &AtomicU64,
) -> Monitor<R> {
    loop {
        match monitor.check_updates() {
            Ok(summary) => {
                if !summary.is_quiet() {
                    debug!(
                        entered = summary.entered,
                        exited = summary.exited,
                        "Poller observed transitions"
                    );
                }
            }
            Err(e) => {
                failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, retryable = e.is_retryable(), "Check failed");
            }
        }
        checks.fetch_add(1, Ordering::Relaxed);

        select! {
            recv(shutdown_rx) -> _ => break,
            default(interval) => {}
        }
    }

    info!(checks = checks.load(Ordering::Relaxed), "Poller stopped");
    monitor
}
