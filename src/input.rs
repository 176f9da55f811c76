//! Loading of the run's newline-delimited input lists.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::InputError;

/// Default location of the sitemap list.
pub const DEFAULT_SITEMAPS_FILE: &str = "sitemaps.txt";

/// Default location of the exclusion list.
pub const DEFAULT_EXCLUSIONS_FILE: &str = "exclusions.txt";

/// Read one sitemap URL per line, skipping blank lines and `#` comments.
///
/// # Errors
///
/// A missing file is `InputError::MissingSitemapList`; a file with no URLs
/// is `InputError::EmptySitemapList`. Both abort the run.
pub async fn load_sitemap_urls(path: impl AsRef<Path>) -> Result<Vec<String>, InputError> {
    let path = path.as_ref();
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(InputError::MissingSitemapList(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let urls: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        return Err(InputError::EmptySitemapList(path.display().to_string()));
    }
    tracing::debug!(path = %path.display(), count = urls.len(), "Loaded sitemap list");
    Ok(urls)
}

/// Read one excluded phrase per line.
///
/// Never fails: a missing file yields an empty set with a warning, and any
/// other read error yields an empty set with an error log.
pub async fn load_exclusions(path: impl AsRef<Path>) -> HashSet<String> {
    let path = path.as_ref();
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => {
            let set: HashSet<String> = raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            tracing::debug!(path = %path.display(), count = set.len(), "Loaded exclusions");
            set
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(
                path = %path.display(),
                "Exclusion file not found; no phrases will be excluded"
            );
            HashSet::new()
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error reading exclusion file");
            HashSet::new()
        }
    }
}
