//! Output directory and file naming for site artifacts.

use chrono::{DateTime, SecondsFormat, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::TaskError;

/// Filesystem-safe UTC timestamp, e.g. `2024-05-01T12-30-00-123Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// [`format_timestamp`] for the current instant.
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

/// Host name of a sitemap URL, used to label the site everywhere.
pub fn domain_from_sitemap_url(sitemap_url: &str) -> Result<String, TaskError> {
    let parsed = Url::parse(sitemap_url.trim()).map_err(|e| TaskError::InvalidUrl {
        url: sitemap_url.to_string(),
        reason: e.to_string(),
    })?;
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TaskError::InvalidUrl {
            url: sitemap_url.to_string(),
            reason: "URL has no host".to_string(),
        })
}

/// Replace every character that is not an ASCII letter or digit with `_`
/// and lower-case the result.
pub fn sanitize_file_stem(phrase: &str) -> String {
    phrase
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

pub fn site_dir_name(domain: &str, stamp: &str) -> String {
    format!("{domain}_{stamp}")
}

/// Create a fresh `{domain}_{stamp}` directory under `base`.
///
/// If that name is already taken (two tasks for the same host stamped in the
/// same millisecond), `_2`, `_3`, ... is appended until creation succeeds, so
/// no two tasks ever share a directory.
pub async fn create_site_dir(
    base: &Path,
    domain: &str,
    stamp: &str,
) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(base).await?;
    let name = site_dir_name(domain, stamp);
    let mut candidate = base.join(&name);
    let mut n = 1u32;
    loop {
        match tokio::fs::create_dir(&candidate).await {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                n += 1;
                candidate = base.join(format!("{name}_{n}"));
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn keywords_file_name(stamp: &str) -> String {
    format!("keywords_{stamp}.txt")
}

pub fn phrases_file_name(stamp: &str) -> String {
    format!("phrases_{stamp}.txt")
}

pub fn summary_file_name(stamp: &str) -> String {
    format!("summary_{stamp}.txt")
}

pub fn article_file_name(keyword: &str, stamp: &str) -> String {
    format!("{}_{stamp}.txt", sanitize_file_stem(keyword))
}

/// Write one entry per line, without a trailing newline.
pub async fn write_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    tokio::fs::write(path, lines.join("\n")).await
}
