//! Per-site pipeline: configuration, the site task, its outcomes, and
//! run-level aggregation.
//!
//! # Pipeline Flow
//!
//! 1. **Output**: a fresh `{domain}_{timestamp}` directory is created for the site
//! 2. **Fetch**: the sitemap is downloaded through a
//!    [`SitemapSource`](crate::sitemap::SitemapSource)
//! 3. **Parse**: `urlset > url > loc` entries are extracted
//! 4. **Classify**: URLs become keywords and phrases
//! 5. **Write**: both lists are written concurrently, one entry per line
//! 6. **Generate**: one keyword, if any, is turned into an article
//! 7. **Aggregate**: a summary line is written for each successful site
//!
//! # Example
//!
//! ```rust,ignore
//! use seo_forge::pipeline::{ResultAggregator, SiteTask, TaskContext};
//!
//! let outcome = SiteTask::new("https://example.com/sitemap.xml", ctx).run().await;
//! let summary = ResultAggregator::new().aggregate(&[outcome]).await;
//! println!("{}", summary.completion_message());
//! ```

pub mod aggregator;
pub mod config;
pub mod outcome;
pub mod output;
pub mod selector;
pub mod site_task;

pub use aggregator::{ResultAggregator, RunSummary};
pub use config::{ConfigError, FileConfig, PipelineConfig};
pub use outcome::{SiteFailure, SiteOutcome, TaskOutcome, NO_KEYWORD};
pub use selector::{FixedSelector, KeywordSelector, SeededSelector, UniformSelector};
pub use site_task::{SiteTask, TaskContext};
