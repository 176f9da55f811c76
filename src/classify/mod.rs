//! Sitemap URL classification.
//!
//! Converts page URLs into title-cased phrases and routes them into
//! location keywords or generic phrases using the configured locale
//! abbreviations.

pub mod classifier;

pub use classifier::{
    is_blog_url, word_count, ClassificationResult, Classifier, MIN_PHRASE_WORDS,
};
