//! Run-level aggregation of site outcomes.

use futures::future::join_all;
use serde::Serialize;

use super::outcome::TaskOutcome;
use super::output::{summary_file_name, timestamp_now};

/// Totals for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Sites whose processed keyword is not `"None"`.
    pub articles_generated: usize,
    pub total_keywords: usize,
    pub total_phrases: usize,
    /// Stamp shared by every `summary_*.txt` written for this run.
    pub summary_timestamp: String,
}

impl RunSummary {
    /// The closing line printed at the end of a run.
    pub fn completion_message(&self) -> String {
        format!(
            "All processing complete. {} articles generated. See output folders for details.",
            self.articles_generated
        )
    }
}

/// Writes per-site summaries and computes run totals.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    stamp: String,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    /// Aggregator stamped with the current time.
    pub fn new() -> Self {
        Self::with_timestamp(timestamp_now())
    }

    pub fn with_timestamp(stamp: impl Into<String>) -> Self {
        Self {
            stamp: stamp.into(),
        }
    }

    /// Write one summary file per successful site and total the run.
    ///
    /// Failed sites are logged and counted; a summary that cannot be
    /// written is logged without affecting the other sites.
    pub async fn aggregate(&self, outcomes: &[TaskOutcome]) -> RunSummary {
        let mut summary = RunSummary {
            total: outcomes.len(),
            succeeded: 0,
            failed: 0,
            articles_generated: 0,
            total_keywords: 0,
            total_phrases: 0,
            summary_timestamp: self.stamp.clone(),
        };

        let mut writes = Vec::new();
        for outcome in outcomes {
            match outcome {
                TaskOutcome::Succeeded(site) => {
                    summary.succeeded += 1;
                    summary.total_keywords += site.keyword_count;
                    summary.total_phrases += site.phrase_count;
                    if site.processed_keyword.is_some() {
                        summary.articles_generated += 1;
                    }

                    let path = site.output_dir.join(summary_file_name(&self.stamp));
                    let line = site.summary_line();
                    let domain = site.domain.clone();
                    writes.push(async move {
                        if let Err(e) = tokio::fs::write(&path, line).await {
                            tracing::error!(
                                domain = %domain,
                                path = %path.display(),
                                error = %e,
                                "Failed to write site summary"
                            );
                        }
                    });
                }
                TaskOutcome::Failed(failure) => {
                    summary.failed += 1;
                    tracing::warn!(
                        domain = %failure.domain,
                        sitemap_url = %failure.sitemap_url,
                        error = %failure.message,
                        "Site excluded from summaries"
                    );
                }
            }
        }
        join_all(writes).await;

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            articles = summary.articles_generated,
            "Run aggregated"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::outcome::{SiteFailure, SiteOutcome};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use uuid::Uuid;

    const STAMP: &str = "2024-05-01T12-30-00-123Z";

    fn success(dir: &Path, domain: &str, keyword: Option<&str>) -> TaskOutcome {
        let output_dir = dir.join(domain);
        std::fs::create_dir_all(&output_dir).unwrap();
        TaskOutcome::Succeeded(SiteOutcome {
            task_id: Uuid::new_v4(),
            domain: domain.to_string(),
            sitemap_url: format!("https://{domain}/sitemap.xml"),
            output_dir,
            keyword_count: 3,
            phrase_count: 4,
            processed_keyword: keyword.map(str::to_string),
            article_path: None,
        })
    }

    fn failure(domain: &str) -> TaskOutcome {
        TaskOutcome::Failed(SiteFailure {
            domain: domain.to_string(),
            sitemap_url: format!("https://{domain}/sitemap.xml"),
            message: "Sitemap request returned HTTP 404".to_string(),
        })
    }

    #[tokio::test]
    async fn test_aggregate_writes_summaries_and_counts_articles() {
        let dir = TempDir::new().unwrap();
        let outcomes = vec![
            success(dir.path(), "a.example", Some("Plumbing Repair NJ")),
            success(dir.path(), "b.example", None),
            failure("c.example"),
        ];

        let summary = ResultAggregator::with_timestamp(STAMP).aggregate(&outcomes).await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.articles_generated, 1);
        assert_eq!(summary.total_keywords, 6);
        assert_eq!(summary.total_phrases, 8);
        assert_eq!(
            summary.completion_message(),
            "All processing complete. 1 articles generated. See output folders for details."
        );

        let a = std::fs::read_to_string(dir.path().join("a.example").join(summary_file_name(STAMP)))
            .unwrap();
        assert_eq!(a, "a.example: 3 keywords, 4 phrases, processed keyword: Plumbing Repair NJ");
        let b = std::fs::read_to_string(dir.path().join("b.example").join(summary_file_name(STAMP)))
            .unwrap();
        assert!(b.ends_with("processed keyword: None"));
        assert!(!dir.path().join("c.example").exists());
    }

    #[tokio::test]
    async fn test_unwritable_summary_does_not_block_others() {
        let dir = TempDir::new().unwrap();
        let mut outcomes = vec![success(dir.path(), "ok.example", None)];
        outcomes.push(TaskOutcome::Succeeded(SiteOutcome {
            task_id: Uuid::new_v4(),
            domain: "gone.example".to_string(),
            sitemap_url: "https://gone.example/sitemap.xml".to_string(),
            output_dir: PathBuf::from(dir.path()).join("missing").join("dir"),
            keyword_count: 0,
            phrase_count: 0,
            processed_keyword: None,
            article_path: None,
        }));

        let summary = ResultAggregator::with_timestamp(STAMP).aggregate(&outcomes).await;
        assert_eq!(summary.succeeded, 2);
        assert!(dir
            .path()
            .join("ok.example")
            .join(summary_file_name(STAMP))
            .exists());
    }

    #[tokio::test]
    async fn test_empty_run() {
        let summary = ResultAggregator::with_timestamp(STAMP).aggregate(&[]).await;
        assert_eq!(summary.total, 0);
        assert_eq!(summary.articles_generated, 0);
        assert_eq!(summary.summary_timestamp, STAMP);
    }
}
