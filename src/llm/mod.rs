//! LLM integration for seo-forge.
//!
//! [`ChatClient`] speaks the OpenAI-compatible chat-completions protocol and
//! implements [`LlmProvider`]; [`ArticleGenerator`] wraps any provider with
//! the rate-limit and linear-backoff retry policy used by site tasks.
//!
//! ```ignore
//! use seo_forge::llm::{ArticleGenerator, ChatClient};
//! use seo_forge::pipeline::PipelineConfig;
//! use std::sync::Arc;
//!
//! let config = PipelineConfig::from_env()?;
//! let client = ChatClient::from_env(config.request_timeout)?;
//! let generator = ArticleGenerator::new(Arc::new(client), &config);
//! let article = generator.generate("Plumbing Repair NJ").await?;
//! ```

pub mod article;
pub mod client;

pub use article::{ArticleGenerator, ARTICLE_SYSTEM_PROMPT, ARTICLE_USER_PROMPT};
pub use client::{
    ChatClient, Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, Usage,
    DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT,
};
