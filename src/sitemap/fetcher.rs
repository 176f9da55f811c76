//! Sitemap retrieval.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::SitemapError;

/// Default timeout for a single sitemap download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw sitemap documents.
///
/// The pipeline only depends on this trait so that tests can serve canned
/// XML without a network.
#[async_trait]
pub trait SitemapSource: Send + Sync {
    /// Retrieve the body of the document at `url`.
    async fn fetch(&self, url: &str) -> Result<String, SitemapError>;
}

/// Fetches sitemaps over HTTP(S) with a single GET per call.
///
/// No retries are attempted; any transport failure or non-2xx status is
/// returned to the caller.
#[derive(Debug, Clone)]
pub struct HttpSitemapFetcher {
    http_client: Client,
}

impl HttpSitemapFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self, SitemapError> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a fetcher whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, SitemapError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("seo-forge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SitemapError::RequestFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl SitemapSource for HttpSitemapFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SitemapError> {
        tracing::debug!(url = %url, "Fetching sitemap");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| SitemapError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SitemapError::HttpStatus {
                code: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SitemapError::RequestFailed(e.to_string()))?;

        tracing::debug!(url = %url, bytes = body.len(), "Fetched sitemap");
        Ok(body)
    }
}
