//! Error types for seo-forge operations.
//!
//! Defines error types for the major subsystems:
//! - Input list loading (sitemap list, exclusion list)
//! - Sitemap fetching and XML parsing
//! - Chat-completion API interactions
//! - Per-site task execution

use thiserror::Error;

/// Errors that can occur while loading the run inputs.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Sitemap list not found: {0}")]
    MissingSitemapList(String),

    #[error("Sitemap list '{0}' contains no URLs")]
    EmptySitemapList(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while fetching or parsing a sitemap document.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Sitemap request returned HTTP {code}")]
    HttpStatus { code: u16 },

    #[error("Malformed sitemap XML: {0}")]
    MalformedXml(String),

    #[error("Sitemap is missing required element '{0}'")]
    MissingElement(&'static str),

    #[error("Unexpected sitemap root element '{0}', expected 'urlset'")]
    UnexpectedRoot(String),
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: OPENAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("LLM response contained no content")]
    EmptyResponse,
}

/// Errors that terminate a single site task.
///
/// None of these abort the run; the scheduler converts them into a failed
/// outcome for the owning site.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Invalid sitemap URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    #[error("Article generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
