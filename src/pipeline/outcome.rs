//! Terminal results of site tasks.

use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Label recorded when a site produced no keyword to write about.
pub const NO_KEYWORD: &str = "None";

/// Result of a site task that ran to completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteOutcome {
    pub task_id: Uuid,
    pub domain: String,
    pub sitemap_url: String,
    /// The task's own `{domain}_{timestamp}` directory.
    pub output_dir: PathBuf,
    pub keyword_count: usize,
    pub phrase_count: usize,
    /// Keyword the article was written about, if any.
    pub processed_keyword: Option<String>,
    pub article_path: Option<PathBuf>,
}

impl SiteOutcome {
    /// The processed keyword, or `"None"` when no article was generated.
    pub fn processed_keyword_label(&self) -> &str {
        self.processed_keyword.as_deref().unwrap_or(NO_KEYWORD)
    }

    /// One-line summary written next to the site's artifacts.
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} keywords, {} phrases, processed keyword: {}",
            self.domain,
            self.keyword_count,
            self.phrase_count,
            self.processed_keyword_label()
        )
    }
}

/// A site task that ended in an error or crashed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteFailure {
    /// Host of the sitemap, or the raw URL when it has none.
    pub domain: String,
    pub sitemap_url: String,
    pub message: String,
}

/// Exactly one of these is produced per dispatched site task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Succeeded(SiteOutcome),
    Failed(SiteFailure),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded(_))
    }

    pub fn domain(&self) -> &str {
        match self {
            TaskOutcome::Succeeded(o) => &o.domain,
            TaskOutcome::Failed(f) => &f.domain,
        }
    }
}
