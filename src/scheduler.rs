use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::models::WatchDefinition;
use crate::watch_runner::{WatchRunReport, WatchRunner};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub watches: Vec<WatchRunReport>,
    pub failed_watches: usize,
    pub notifications_sent: usize,
    pub total_time_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulerStats {
    pub cycles_started: u64,
    pub cycles_completed: u64,
    pub ticks_skipped: u64,
}

#[derive(Default)]
struct Counters {
    cycles_started: AtomicU64,
    cycles_completed: AtomicU64,
    ticks_skipped: AtomicU64,
}

/// Clears the in-progress flag when the cycle task ends, panics included.
struct CycleGuard(Arc<AtomicBool>);

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives the watch list: one cycle at startup, then one per interval.
///
/// At most one cycle runs at a time. A tick that finds a cycle still running
/// is dropped, and missed ticks are not made up later.
pub struct PollScheduler {
    runner: Arc<WatchRunner>,
    watches: Arc<Vec<WatchDefinition>>,
    interval: Duration,
    cycle_running: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl PollScheduler {
    pub fn new(runner: Arc<WatchRunner>, watches: Vec<WatchDefinition>, interval: Duration) -> Self {
        Self {
            runner,
            watches: Arc::new(watches),
            interval,
            cycle_running: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn is_cycle_running(&self) -> bool {
        self.cycle_running.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            cycles_started: self.counters.cycles_started.load(Ordering::Relaxed),
            cycles_completed: self.counters.cycles_completed.load(Ordering::Relaxed),
            ticks_skipped: self.counters.ticks_skipped.load(Ordering::Relaxed),
        }
    }

    /// Run every watch once, in order, on the calling task.
    pub async fn run_cycle(&self) -> CycleReport {
        Self::execute_cycle(&self.runner, &self.watches).await
    }

    /// Start a cycle on its own task unless one is already running.
    pub fn try_start_cycle(&self) -> Option<JoinHandle<CycleReport>> {
        if self
            .cycle_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let skipped = self.counters.ticks_skipped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(skipped, "Previous cycle still running, skipping tick");
            return None;
        }

        let cycle = self.counters.cycles_started.fetch_add(1, Ordering::Relaxed) + 1;
        let guard = CycleGuard(Arc::clone(&self.cycle_running));
        let runner = Arc::clone(&self.runner);
        let watches = Arc::clone(&self.watches);
        let counters = Arc::clone(&self.counters);

        Some(tokio::spawn(async move {
            let _guard = guard;
            tracing::debug!(cycle, watches = watches.len(), "Cycle started");
            let report = Self::execute_cycle(&runner, &watches).await;
            counters.cycles_completed.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                cycle,
                watches = report.watches.len(),
                failed = report.failed_watches,
                notified = report.notifications_sent,
                elapsed_ms = report.total_time_ms,
                "Cycle finished"
            );
            report
        }))
    }

    /// Tick forever. The first tick fires immediately.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            watches = self.watches.len(),
            "Poll scheduler started"
        );

        loop {
            ticker.tick().await;
            self.try_start_cycle();
        }
    }

    async fn execute_cycle(runner: &WatchRunner, watches: &[WatchDefinition]) -> CycleReport {
        let start_time = Instant::now();
        let mut reports = Vec::with_capacity(watches.len());

        for watch in watches {
            reports.push(runner.run_watch(watch).await);
        }

        CycleReport {
            failed_watches: reports.iter().filter(|r| !r.success).count(),
            notifications_sent: reports.iter().map(|r| r.notifications_sent).sum(),
            watches: reports,
            total_time_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}
