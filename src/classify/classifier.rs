//! URL-to-phrase classification.
//!
//! Turns the `<loc>` URLs of one sitemap into human-readable phrases and
//! splits them into two disjoint lists:
//!
//! - **keywords**: phrases of at least two words whose last word is a
//!   configured locale abbreviation ("Plumbing Repair NJ")
//! - **phrases**: every other phrase of at least two words ("About Us")
//!
//! Blog URLs, single-word phrases and excluded phrases are dropped.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineConfig;

/// Minimum number of words for a phrase to be kept.
pub const MIN_PHRASE_WORDS: usize = 2;

fn blog_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(blog|blogs|blogging|blog-post|blog-posts)")
            .expect("Invalid regex for blog paths")
    })
}

fn origin_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://[^/]+").expect("Invalid regex for URL origin"))
}

fn page_suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\.html$|\.php$").expect("Invalid regex for page suffix"))
}

/// Keywords and phrases extracted from one sitemap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Location-specific phrases, in sitemap order.
    pub keywords: Vec<String>,
    /// Generic phrases, in sitemap order.
    pub phrases: Vec<String>,
}

impl ClassificationResult {
    /// Returns true when neither list has entries.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.phrases.is_empty()
    }
}

/// Classifies sitemap URLs into keywords and phrases.
///
/// Holds only read-only state, so one classifier can be shared by any number
/// of site tasks.
#[derive(Debug, Clone)]
pub struct Classifier {
    abbreviations: Vec<String>,
    exclusions: Arc<HashSet<String>>,
}

impl Classifier {
    /// Create a classifier for the given locale abbreviations and exclusions.
    ///
    /// Abbreviations are upper-cased; blank entries are ignored.
    pub fn new<I, S>(abbreviations: I, exclusions: Arc<HashSet<String>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let abbreviations = abbreviations
            .into_iter()
            .map(|a| a.as_ref().trim().to_uppercase())
            .filter(|a| !a.is_empty())
            .collect();

        Self {
            abbreviations,
            exclusions,
        }
    }

    /// Create a classifier from the run configuration.
    pub fn from_config(config: &PipelineConfig, exclusions: Arc<HashSet<String>>) -> Self {
        Self::new(&config.locale_abbreviations, exclusions)
    }

    /// Configured (upper-cased) locale abbreviations.
    pub fn abbreviations(&self) -> &[String] {
        &self.abbreviations
    }

    /// Classify a list of sitemap URLs.
    ///
    /// Output order follows input order; a phrase produced by several URLs is
    /// listed once.
    pub fn classify<S: AsRef<str>>(&self, urls: &[S]) -> ClassificationResult {
        let mut result = ClassificationResult::default();
        let mut seen: HashSet<String> = HashSet::new();

        for url in urls {
            let url = url.as_ref();
            if is_blog_url(url) {
                continue;
            }

            let Some(phrase) = self.phrase_from_url(url) else {
                continue;
            };

            if word_count(&phrase) < MIN_PHRASE_WORDS || self.exclusions.contains(&phrase) {
                continue;
            }

            if !seen.insert(phrase.clone()) {
                continue;
            }

            if self.ends_with_locale(&phrase) {
                result.keywords.push(phrase);
            } else {
                result.phrases.push(phrase);
            }
        }

        result
    }

    /// Build the title-cased phrase for a single URL.
    ///
    /// Returns `None` when nothing is left after stripping the origin,
    /// separators and page suffix.
    pub fn phrase_from_url(&self, url: &str) -> Option<String> {
        let path = strip_origin(url);
        let path = path.trim_matches('/');
        let path = page_suffix_pattern().replace(path, "");
        let spaced = path.replace('-', " ");

        let words: Vec<&str> = spaced
            .split(' ')
            .filter(|word| !word.trim().is_empty())
            .collect();

        let last = words.len().saturating_sub(1);
        let phrase = words
            .iter()
            .enumerate()
            .map(|(index, word)| {
                let upper = word.to_uppercase();
                if index == last && self.is_abbreviation(&upper) {
                    upper
                } else {
                    title_case(word)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let phrase = phrase.trim();
        if phrase.is_empty() {
            None
        } else {
            Some(phrase.to_string())
        }
    }

    /// Whether the last word of `phrase` is a configured abbreviation.
    pub fn ends_with_locale(&self, phrase: &str) -> bool {
        phrase
            .split_whitespace()
            .last()
            .is_some_and(|word| self.is_abbreviation(word))
    }

    fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.iter().any(|a| a == word)
    }
}

/// Whether the URL path names a blog page.
pub fn is_blog_url(url: &str) -> bool {
    blog_pattern().is_match(strip_origin(url))
}

/// Count the non-empty, space-separated words of a phrase.
pub fn word_count(phrase: &str) -> usize {
    phrase.split(' ').filter(|w| !w.trim().is_empty()).count()
}

fn strip_origin(url: &str) -> &str {
    match origin_pattern().find(url) {
        Some(m) => &url[m.end()..],
        None => url,
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(abbreviations: &[&str], exclusions: &[&str]) -> Classifier {
        let exclusions = exclusions.iter().map(|s| s.to_string()).collect();
        Classifier::new(abbreviations, Arc::new(exclusions))
    }

    #[test]
    fn test_location_phrase_becomes_keyword() {
        let c = classifier(&["NJ"], &[]);
        let result = c.classify(&["https://example.com/plumbing-repair-nj"]);

        assert_eq!(result.keywords, vec!["Plumbing Repair NJ"]);
        assert!(result.phrases.is_empty());
    }

    #[test]
    fn test_generic_phrase_becomes_phrase() {
        let c = classifier(&["NJ"], &[]);
        let result = c.classify(&["https://example.com/about-us"]);

        assert!(result.keywords.is_empty());
        assert_eq!(result.phrases, vec!["About Us"]);
    }

    #[test]
    fn test_blog_urls_are_discarded() {
        let c = classifier(&["NJ"], &[]);
        let result = c.classify(&[
            "https://example.com/blog/top-5-tips",
            "https://example.com/Blogging-Guide-nj",
            "https://example.com/news/blog-posts-archive",
        ]);

        assert!(result.is_empty());
    }

    #[test]
    fn test_blog_match_ignores_host() {
        let c = classifier(&["NJ"], &[]);
        let result = c.classify(&["https://myblogsite.com/roof-repair-nj"]);

        assert_eq!(result.keywords, vec!["Roof Repair NJ"]);
    }

    #[test]
    fn test_single_word_paths_are_dropped() {
        let c = classifier(&["NJ"], &[]);
        let result = c.classify(&[
            "https://example.com/contact",
            "https://example.com/",
            "https://example.com/nj",
        ]);

        assert!(result.is_empty());
    }

    #[test]
    fn test_excluded_phrases_are_dropped() {
        let c = classifier(&["NJ"], &["About Us", "Plumbing Repair NJ"]);
        let result = c.classify(&[
            "https://example.com/about-us",
            "https://example.com/plumbing-repair-nj",
            "https://example.com/drain-cleaning-nj",
        ]);

        assert_eq!(result.keywords, vec!["Drain Cleaning NJ"]);
        assert!(result.phrases.is_empty());
    }

    #[test]
    fn test_suffixes_and_slashes_are_stripped() {
        let c = classifier(&["NY", "CA"], &[]);

        assert_eq!(
            c.phrase_from_url("https://example.com/water-heater-install-ny.html"),
            Some("Water Heater Install NY".to_string())
        );
        assert_eq!(
            c.phrase_from_url("http://example.com/emergency--service-ca.php/"),
            Some("Emergency Service CA".to_string())
        );
        assert_eq!(
            c.phrase_from_url("https://example.com/our-TEAM/"),
            Some("Our Team".to_string())
        );
        assert_eq!(c.phrase_from_url("https://example.com/"), None);
        assert_eq!(c.phrase_from_url("https://example.com/.html"), None);
    }

    #[test]
    fn test_abbreviation_only_kept_upper_in_last_position() {
        let c = classifier(&["CA"], &[]);

        assert_eq!(
            c.phrase_from_url("https://example.com/ca-roofing-experts"),
            Some("Ca Roofing Experts".to_string())
        );
        let result = c.classify(&["https://example.com/ca-roofing-experts"]);
        assert_eq!(result.phrases, vec!["Ca Roofing Experts"]);
    }

    #[test]
    fn test_lowercase_configured_abbreviations_match() {
        let c = classifier(&["nj"], &[]);
        assert_eq!(c.abbreviations().to_vec(), vec!["NJ".to_string()]);

        let result = c.classify(&["https://example.com/hvac-Nj"]);
        assert_eq!(result.keywords, vec!["Hvac NJ"]);
    }

    #[test]
    fn test_nested_paths_keep_separator_inside_word() {
        let c = classifier(&["NJ"], &[]);
        let result = c.classify(&["https://example.com/services/sewer-line-nj/"]);

        assert_eq!(result.keywords, vec!["Services/sewer Line NJ"]);
    }

    #[test]
    fn test_duplicate_phrases_listed_once() {
        let c = classifier(&["NJ"], &[]);
        let result = c.classify(&[
            "https://example.com/gutter-cleaning-nj",
            "https://example.com/gutter-cleaning-nj.html",
            "https://example.com/about-us",
            "https://example.com/about-us/",
        ]);

        assert_eq!(result.keywords, vec!["Gutter Cleaning NJ"]);
        assert_eq!(result.phrases, vec!["About Us"]);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = classifier(&["NJ", "NY"], &["Careers Page"]);
        let urls = vec![
            "https://example.com/plumbing-repair-nj",
            "https://example.com/about-us",
            "https://example.com/careers-page",
            "https://example.com/drain-cleaning-ny",
            "https://example.com/blog/how-to",
            "https://example.com/service-area-map",
        ];

        let first = c.classify(&urls);
        let second = c.classify(&urls);
        assert_eq!(first, second);
        assert_eq!(
            first.keywords,
            vec!["Plumbing Repair NJ", "Drain Cleaning NY"]
        );
        assert_eq!(first.phrases, vec!["About Us", "Service Area Map"]);
    }

    #[test]
    fn test_lists_respect_invariants() {
        let c = classifier(&["NJ", "NY", "CA"], &["Contact Us NJ"]);
        let urls = vec![
            "https://a.com/contact-us-nj",
            "https://a.com/x-nj",
            "https://a.com/nj-x",
            "https://a.com/one",
            "https://a.com/ny",
            "https://a.com/free-estimate-ny.php",
            "https://a.com/blog-post/why-nj",
            "https://a.com/faq-ca/",
        ];

        let result = c.classify(&urls);
        for keyword in &result.keywords {
            assert!(word_count(keyword) >= MIN_PHRASE_WORDS);
            assert!(c.ends_with_locale(keyword), "{keyword}");
        }
        for phrase in &result.phrases {
            assert!(word_count(phrase) >= MIN_PHRASE_WORDS);
            assert!(!c.ends_with_locale(phrase), "{phrase}");
            assert!(!result.keywords.contains(phrase));
        }
        assert!(!result.keywords.contains(&"Contact Us NJ".to_string()));
        assert_eq!(result.keywords, vec!["X NJ", "Free Estimate NY", "Faq CA"]);
        assert_eq!(result.phrases, vec!["Nj X"]);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("plumbing"), "Plumbing");
        assert_eq!(title_case("HVAC"), "Hvac");
        assert_eq!(title_case("émile"), "Émile");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("Plumbing Repair NJ"), 3);
        assert_eq!(word_count("Contact"), 1);
        assert_eq!(word_count("  "), 0);
    }
}
