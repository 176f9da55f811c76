//! Rate-limited, retrying article generation.

use std::sync::Arc;
use std::time::Duration;

use super::client::{GenerationRequest, LlmProvider, Message};
use crate::error::LlmError;
use crate::pipeline::PipelineConfig;

/// System instruction sent with every article request.
pub const ARTICLE_SYSTEM_PROMPT: &str =
    "You are a professional content writer specializing in local service businesses.";

/// User instruction template; `{keyword}` is replaced with the chosen phrase.
pub const ARTICLE_USER_PROMPT: &str = "Write a 500 word SEO-optimized article about {keyword}. \
Include specific details about the service, how the area is being served, \
benefits to customers, and end with a clear call to action";

/// Turns one keyword into article text through an [`LlmProvider`].
///
/// Every attempt is preceded by the rate-limit delay. After failed attempt
/// `n` the generator additionally waits `delay * n` before the next one, so
/// the gap between consecutive attempts grows with each failure.
#[derive(Clone)]
pub struct ArticleGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    rate_limit_delay: Duration,
    max_attempts: u32,
}

impl ArticleGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            rate_limit_delay: config.rate_limit_delay,
            max_attempts: config.max_retries.max(1),
        }
    }

    /// Total number of attempts made before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Extra wait after failed attempt `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.rate_limit_delay.saturating_mul(attempt)
    }

    /// Build the chat request for `keyword`.
    pub fn build_request(&self, keyword: &str) -> GenerationRequest {
        GenerationRequest::new(
            self.model.clone(),
            vec![
                Message::system(ARTICLE_SYSTEM_PROMPT),
                Message::user(ARTICLE_USER_PROMPT.replace("{keyword}", keyword)),
            ],
        )
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens)
    }

    /// Generate an article for `keyword`, returning the last error once the
    /// attempt budget is exhausted.
    pub async fn generate(&self, keyword: &str) -> Result<String, LlmError> {
        let mut attempt = 1;
        loop {
            tokio::time::sleep(self.rate_limit_delay).await;

            match self.attempt(keyword).await {
                Ok(text) => {
                    tracing::debug!(
                        keyword = %keyword,
                        attempt,
                        chars = text.len(),
                        "Article generated"
                    );
                    return Ok(text);
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        keyword = %keyword,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Article generation attempt failed, retrying"
                    );
                    tokio::time::sleep(self.backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        keyword = %keyword,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Article generation failed after final attempt"
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(&self, keyword: &str) -> Result<String, LlmError> {
        let response = self.provider.generate(self.build_request(keyword)).await?;
        match response.first_content() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(LlmError::EmptyResponse),
        }
    }
}

impl std::fmt::Debug for ArticleGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleGenerator")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
