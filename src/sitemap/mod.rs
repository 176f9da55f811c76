//! Sitemap retrieval and `urlset` parsing.

mod fetcher;
mod parser;

pub use fetcher::{HttpSitemapFetcher, SitemapSource, DEFAULT_FETCH_TIMEOUT};
pub use parser::parse_sitemap;
