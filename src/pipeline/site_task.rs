//! The unit of work for one sitemap.

use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::config::PipelineConfig;
use super::outcome::{SiteFailure, SiteOutcome, TaskOutcome};
use super::output::{
    article_file_name, create_site_dir, domain_from_sitemap_url, keywords_file_name,
    phrases_file_name, timestamp_now, write_lines,
};
use super::selector::KeywordSelector;
use crate::classify::Classifier;
use crate::error::TaskError;
use crate::llm::ArticleGenerator;
use crate::sitemap::{parse_sitemap, SitemapSource};

/// Read-only collaborators shared by every site task of a run.
pub struct TaskContext {
    pub output_dir: PathBuf,
    pub source: Arc<dyn SitemapSource>,
    pub classifier: Classifier,
    pub generator: ArticleGenerator,
    pub selector: Arc<dyn KeywordSelector>,
}

impl TaskContext {
    pub fn new(
        config: &PipelineConfig,
        source: Arc<dyn SitemapSource>,
        classifier: Classifier,
        generator: ArticleGenerator,
        selector: Arc<dyn KeywordSelector>,
    ) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            source,
            classifier,
            generator,
            selector,
        }
    }
}

/// Fetch, parse, classify, write, and optionally generate for one sitemap.
///
/// Artifacts are confined to the task's own `{domain}_{timestamp}`
/// directory. Files already written stay on disk if a later step fails.
pub struct SiteTask {
    id: Uuid,
    sitemap_url: String,
    ctx: Arc<TaskContext>,
}

impl SiteTask {
    pub fn new(sitemap_url: impl Into<String>, ctx: Arc<TaskContext>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sitemap_url: sitemap_url.into(),
            ctx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Run to a terminal state. Errors are converted into a failed outcome
    /// labelled with the site's domain.
    pub async fn run(self) -> TaskOutcome {
        match self.execute().await {
            Ok(outcome) => {
                tracing::info!(
                    task_id = %self.id,
                    domain = %outcome.domain,
                    keywords = outcome.keyword_count,
                    phrases = outcome.phrase_count,
                    processed_keyword = %outcome.processed_keyword_label(),
                    "Site completed"
                );
                TaskOutcome::Succeeded(outcome)
            }
            Err(e) => {
                let domain = domain_from_sitemap_url(&self.sitemap_url)
                    .unwrap_or_else(|_| self.sitemap_url.clone());
                tracing::error!(
                    task_id = %self.id,
                    domain = %domain,
                    sitemap_url = %self.sitemap_url,
                    error = %e,
                    "Site failed"
                );
                TaskOutcome::Failed(SiteFailure {
                    domain,
                    sitemap_url: self.sitemap_url.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    async fn execute(&self) -> Result<SiteOutcome, TaskError> {
        let domain = domain_from_sitemap_url(&self.sitemap_url)?;
        let stamp = timestamp_now();
        let output_dir = create_site_dir(&self.ctx.output_dir, &domain, &stamp).await?;

        tracing::debug!(task_id = %self.id, domain = %domain, "Fetching sitemap");
        let xml = self.ctx.source.fetch(&self.sitemap_url).await?;

        let urls = parse_sitemap(&xml)?;
        tracing::debug!(task_id = %self.id, domain = %domain, urls = urls.len(), "Parsed sitemap");

        let result = self.ctx.classifier.classify(&urls);

        let keywords_path = output_dir.join(keywords_file_name(&stamp));
        let phrases_path = output_dir.join(phrases_file_name(&stamp));
        tokio::try_join!(
            write_lines(&keywords_path, &result.keywords),
            write_lines(&phrases_path, &result.phrases),
        )?;

        let mut processed_keyword = None;
        let mut article_path = None;
        if let Some(keyword) = self.ctx.selector.select(&result.keywords) {
            tracing::debug!(
                task_id = %self.id,
                domain = %domain,
                keyword = %keyword,
                "Generating article"
            );
            let article = self.ctx.generator.generate(keyword).await?;
            let path = output_dir.join(article_file_name(keyword, &stamp));
            tokio::fs::write(&path, article).await?;
            processed_keyword = Some(keyword.clone());
            article_path = Some(path);
        }

        Ok(SiteOutcome {
            task_id: self.id,
            domain,
            sitemap_url: self.sitemap_url.clone(),
            output_dir,
            keyword_count: result.keywords.len(),
            phrase_count: result.phrases.len(),
            processed_keyword,
            article_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LlmError, SitemapError};
    use crate::llm::{Choice, GenerationRequest, GenerationResponse, LlmProvider, Message};
    use crate::pipeline::selector::FixedSelector;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    const SITEMAP: &str = r#"<urlset>
        <url><loc>https://example.com/plumbing-repair-nj</loc></url>
        <url><loc>https://example.com/drain-cleaning-ny.html</loc></url>
        <url><loc>https://example.com/about-us</loc></url>
        <url><loc>https://example.com/blog/top-5-tips</loc></url>
        <url><loc>https://example.com/contact</loc></url>
    </urlset>"#;

    struct StaticSource(Result<&'static str, u16>);

    #[async_trait]
    impl SitemapSource for StaticSource {
        async fn fetch(&self, _url: &str) -> Result<String, SitemapError> {
            match self.0 {
                Ok(body) => Ok(body.to_string()),
                Err(code) => Err(SitemapError::HttpStatus { code }),
            }
        }
    }

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl LlmProvider for CountingProvider {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LlmError::ApiError {
                    code: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(GenerationResponse {
                id: "id".to_string(),
                model: request.model,
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant("Article body"),
                    finish_reason: None,
                }],
                usage: None,
            })
        }
    }

    fn context(
        dir: &TempDir,
        source: StaticSource,
        provider: Arc<CountingProvider>,
    ) -> Arc<TaskContext> {
        let config = PipelineConfig::default()
            .with_output_dir(dir.path())
            .with_rate_limit_delay(Duration::from_millis(10))
            .with_max_retries(2);
        let classifier = Classifier::from_config(&config, Arc::new(HashSet::new()));
        let generator = ArticleGenerator::new(provider, &config);
        Arc::new(TaskContext::new(
            &config,
            Arc::new(source),
            classifier,
            generator,
            Arc::new(FixedSelector::new(0)),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_site_task_success_writes_artifacts() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(CountingProvider::new(false));
        let ctx = context(&dir, StaticSource(Ok(SITEMAP)), provider.clone());

        let outcome = SiteTask::new("https://example.com/sitemap.xml", ctx).run().await;
        let TaskOutcome::Succeeded(outcome) = outcome else {
            panic!("expected success, got {outcome:?}");
        };

        assert_eq!(outcome.domain, "example.com");
        assert_eq!(outcome.keyword_count, 2);
        assert_eq!(outcome.phrase_count, 1);
        assert_eq!(outcome.processed_keyword.as_deref(), Some("Plumbing Repair NJ"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let dir_name = outcome.output_dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(dir_name.starts_with("example.com_"));
        let stamp = dir_name.trim_start_matches("example.com_");

        let keywords =
            std::fs::read_to_string(outcome.output_dir.join(keywords_file_name(stamp))).unwrap();
        assert_eq!(keywords, "Plumbing Repair NJ\nDrain Cleaning NY");
        let phrases =
            std::fs::read_to_string(outcome.output_dir.join(phrases_file_name(stamp))).unwrap();
        assert_eq!(phrases, "About Us");

        let article_path = outcome.article_path.unwrap();
        assert_eq!(
            article_path.file_name().unwrap().to_string_lossy(),
            format!("plumbing_repair_nj_{stamp}.txt")
        );
        assert_eq!(std::fs::read_to_string(article_path).unwrap(), "Article body");
    }

    #[tokio::test(start_paused = true)]
    async fn test_site_task_without_keywords_skips_generation() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(CountingProvider::new(false));
        let xml = "<urlset><url><loc>https://example.com/about-us</loc></url></urlset>";
        let ctx = context(&dir, StaticSource(Ok(xml)), provider.clone());

        let outcome = SiteTask::new("https://example.com/sitemap.xml", ctx).run().await;
        let TaskOutcome::Succeeded(outcome) = outcome else {
            panic!("expected success");
        };
        assert_eq!(outcome.processed_keyword_label(), "None");
        assert!(outcome.article_path.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_failure_keeps_written_lists() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(CountingProvider::new(true));
        let ctx = context(&dir, StaticSource(Ok(SITEMAP)), provider.clone());

        let outcome = SiteTask::new("https://example.com/sitemap.xml", ctx).run().await;
        let TaskOutcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.domain, "example.com");
        assert!(failure.message.contains("boom"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

        let site_dirs: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(site_dirs.len(), 1);
        let site_dir = site_dirs[0].as_ref().unwrap().path();
        let files: Vec<String> = std::fs::read_dir(&site_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.starts_with("keywords_")));
        assert!(files.iter().any(|f| f.starts_with("phrases_")));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported_with_domain() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(CountingProvider::new(false));
        let ctx = context(&dir, StaticSource(Err(503)), provider);

        let outcome = SiteTask::new("https://down.example/sitemap.xml", ctx).run().await;
        let TaskOutcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.domain, "down.example");
        assert!(failure.message.contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_sitemap_fails_task() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(CountingProvider::new(false));
        let ctx = context(&dir, StaticSource(Ok("<html></html>")), provider);

        let outcome = SiteTask::new("https://example.com/sitemap.xml", ctx).run().await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.domain(), "example.com");
    }

    #[tokio::test]
    async fn test_same_host_tasks_get_separate_directories() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(CountingProvider::new(false));
        let ctx = context(&dir, StaticSource(Ok(SITEMAP)), provider);

        let (a, b) = tokio::join!(
            SiteTask::new("https://example.com/sitemap.xml", ctx.clone()).run(),
            SiteTask::new("https://example.com/sitemap-pages.xml", ctx).run(),
        );
        let (TaskOutcome::Succeeded(a), TaskOutcome::Succeeded(b)) = (a, b) else {
            panic!("expected both tasks to succeed");
        };
        assert_ne!(a.output_dir, b.output_dir);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_sitemap_url_uses_raw_url_as_domain() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(CountingProvider::new(false));
        let ctx = context(&dir, StaticSource(Ok(SITEMAP)), provider);

        let outcome = SiteTask::new("not-a-url", ctx).run().await;
        let TaskOutcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.domain, "not-a-url");
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
