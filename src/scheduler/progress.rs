//! Background progress monitor for a scheduler run.
//!
//! Periodically logs how many sites have been dispatched, are active, and
//! have finished, so operators can follow long runs without reading every
//! per-site log line.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Snapshot of run progress at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub dispatched: usize,
    pub active: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub articles: usize,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    pub fn finished(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Shared atomic counters, cloned into the scheduler and its site tasks.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounters {
    /// Sites handed to a worker.
    pub dispatched: Arc<AtomicUsize>,
    /// Sites currently holding a worker slot.
    pub active: Arc<AtomicUsize>,
    pub succeeded: Arc<AtomicUsize>,
    /// Sites that returned an error or crashed.
    pub failed: Arc<AtomicUsize>,
    /// Successful sites that produced an article.
    pub articles: Arc<AtomicUsize>,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a snapshot of the current counter values.
    pub fn snapshot(&self, start: Instant) -> ProgressSnapshot {
        ProgressSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            articles: self.articles.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        }
    }
}

/// Decrements `active` when dropped, including when a task unwinds.
pub(crate) struct ActiveSlot(Arc<AtomicUsize>);

impl ActiveSlot {
    pub(crate) fn enter(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::Relaxed);
        Self(active)
    }
}

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// A background task that periodically logs run progress.
///
/// Call [`ProgressMonitor::stop`] when the run is over.
pub struct ProgressMonitor {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressMonitor {
    /// Start logging a snapshot every `interval`.
    ///
    /// # Arguments
    ///
    /// * `counters` - Counters updated by the scheduler
    /// * `total` - Number of sites in the run (used for the percentage)
    /// * `interval` - How often to emit progress logs
    pub fn start(counters: ProgressCounters, total: usize, interval: Duration) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = stop_flag.clone();
        let start = Instant::now();

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.tick().await; // skip the immediate first tick

            loop {
                tick.tick().await;
                if flag.load(Ordering::Relaxed) {
                    break;
                }

                let snap = counters.snapshot(start);
                let pct = if total > 0 {
                    (snap.finished() as f64 / total as f64 * 100.0).min(100.0)
                } else {
                    0.0
                };

                tracing::info!(
                    dispatched = snap.dispatched,
                    active = snap.active,
                    succeeded = snap.succeeded,
                    failed = snap.failed,
                    articles = snap.articles,
                    total = total,
                    progress_pct = format!("{:.1}%", pct),
                    elapsed_secs = snap.elapsed.as_secs(),
                    "Run progress"
                );
            }
        });

        Self {
            stop_flag,
            handle: Some(handle),
        }
    }

    /// Stop the monitor without waiting for its next tick.
    pub async fn stop(mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
