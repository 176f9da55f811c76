//! seo-forge: mine location keywords from sitemaps and draft one promotional
//! article per site.
//!
//! This library provides the sitemap pipeline: strict sitemap parsing, URL
//! classification into keywords and phrases, rate-limited article generation,
//! and a bounded-concurrency scheduler that runs one isolated task per site.

// Core modules
pub mod classify;
pub mod cli;
pub mod error;
pub mod input;
pub mod llm;
pub mod pipeline;
pub mod scheduler;
pub mod sitemap;

// Re-export commonly used error types
pub use error::{InputError, LlmError, SitemapError, TaskError};
