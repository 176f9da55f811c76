//! Bounded-concurrency scheduling of site tasks.
//!
//! - **Scheduler**: dispatches one isolated task per sitemap URL, at most
//!   `max_workers` at a time, staggered by the rate-limit delay
//! - **ProgressMonitor**: logs periodic snapshots of shared counters
//!
//! # Example
//!
//! ```rust,ignore
//! use seo_forge::scheduler::Scheduler;
//!
//! let scheduler = Scheduler::new(ctx, &config);
//! let outcomes = scheduler.run(&sitemap_urls).await;
//! ```

mod progress;
mod worker_pool;

pub use progress::{ProgressCounters, ProgressMonitor, ProgressSnapshot};
pub use worker_pool::Scheduler;
