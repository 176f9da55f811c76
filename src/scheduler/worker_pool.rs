//! Bounded-concurrency scheduler for site tasks.
//!
//! Each sitemap URL becomes one [`SiteTask`] spawned onto the runtime. A
//! counting semaphore caps how many are active at once; the permit travels
//! with the spawned future, so it is released on success, on a reported
//! error, and when the task panics. A [`JoinSet`] observes every terminal
//! result exactly once.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, error, info};

use super::progress::{ActiveSlot, ProgressCounters, ProgressMonitor};
use crate::pipeline::output::domain_from_sitemap_url;
use crate::pipeline::{PipelineConfig, SiteFailure, SiteTask, TaskContext, TaskOutcome};

/// Dispatches one isolated site task per sitemap URL.
pub struct Scheduler {
    ctx: Arc<TaskContext>,
    max_workers: usize,
    dispatch_delay: Duration,
    progress_interval: Duration,
    counters: ProgressCounters,
}

impl Scheduler {
    pub fn new(ctx: Arc<TaskContext>, config: &PipelineConfig) -> Self {
        Self {
            ctx,
            max_workers: config.max_workers.max(1),
            dispatch_delay: config.rate_limit_delay,
            progress_interval: config.progress_interval,
            counters: ProgressCounters::new(),
        }
    }

    /// Counters updated while [`run`](Self::run) is in progress.
    pub fn counters(&self) -> &ProgressCounters {
        &self.counters
    }

    /// Process every URL and return one outcome per URL, in completion order.
    ///
    /// Before each dispatch the scheduler waits for a free slot; after each
    /// dispatch it pauses for the rate-limit delay. It returns once every
    /// dispatched task has retired. In-flight tasks are never cancelled.
    pub async fn run(&self, sitemap_urls: &[String]) -> Vec<TaskOutcome> {
        info!(
            sites = sitemap_urls.len(),
            max_workers = self.max_workers,
            "Processing sitemaps"
        );

        let monitor = ProgressMonitor::start(
            self.counters.clone(),
            sitemap_urls.len(),
            self.progress_interval,
        );

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut join_set: JoinSet<TaskOutcome> = JoinSet::new();
        let mut in_flight: HashMap<Id, String> = HashMap::new();
        let mut outcomes = Vec::with_capacity(sitemap_urls.len());

        for sitemap_url in sitemap_urls {
            // Collect anything that already finished so completions are logged promptly.
            while let Some(result) = join_set.try_join_next_with_id() {
                outcomes.push(self.record(result, &mut in_flight));
            }

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    error!("Worker semaphore closed unexpectedly; no further sites dispatched");
                    break;
                }
            };

            let task = SiteTask::new(sitemap_url.clone(), self.ctx.clone());
            let slot = ActiveSlot::enter(self.counters.active.clone());
            self.counters.dispatched.fetch_add(1, Ordering::Relaxed);

            debug!(
                task_id = %task.id(),
                sitemap_url = %sitemap_url,
                active = self.counters.active.load(Ordering::Relaxed),
                "Dispatching site"
            );

            let handle = join_set.spawn(async move {
                let _permit = permit;
                let _slot = slot;
                task.run().await
            });
            in_flight.insert(handle.id(), sitemap_url.clone());

            tokio::time::sleep(self.dispatch_delay).await;
        }

        while let Some(result) = join_set.join_next_with_id().await {
            outcomes.push(self.record(result, &mut in_flight));
        }

        monitor.stop().await;

        let snap = self.counters.snapshot(tokio::time::Instant::now());
        info!(
            succeeded = snap.succeeded,
            failed = snap.failed,
            articles = snap.articles,
            "All site tasks retired"
        );

        outcomes
    }

    /// Turn one terminal signal into an outcome and update the counters.
    fn record(
        &self,
        result: Result<(Id, TaskOutcome), JoinError>,
        in_flight: &mut HashMap<Id, String>,
    ) -> TaskOutcome {
        let outcome = match result {
            Ok((id, outcome)) => {
                in_flight.remove(&id);
                outcome
            }
            Err(join_error) => {
                let sitemap_url = in_flight.remove(&join_error.id()).unwrap_or_default();
                let domain =
                    domain_from_sitemap_url(&sitemap_url).unwrap_or_else(|_| sitemap_url.clone());
                let message = describe_join_error(join_error);
                error!(
                    domain = %domain,
                    sitemap_url = %sitemap_url,
                    error = %message,
                    "Site task crashed"
                );
                TaskOutcome::Failed(SiteFailure {
                    domain,
                    sitemap_url,
                    message,
                })
            }
        };

        match &outcome {
            TaskOutcome::Succeeded(site) => {
                self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
                if site.processed_keyword.is_some() {
                    self.counters.articles.fetch_add(1, Ordering::Relaxed);
                }
            }
            TaskOutcome::Failed(_) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        outcome
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_cancelled() {
        return "site task was cancelled".to_string();
    }
    let payload = err.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("site task panicked: {detail}")
}
