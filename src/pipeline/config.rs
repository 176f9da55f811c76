//! Run configuration for the sitemap pipeline.
//!
//! `PipelineConfig` is built once at startup (defaults, then an optional YAML
//! file, then environment variables, then CLI overrides), validated, and then
//! shared read-only with the scheduler, every site task, and the article
//! generator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default number of site tasks allowed to run at once.
pub const DEFAULT_MAX_WORKERS: usize = 3;

/// Default pause before each generation attempt and between dispatches.
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 1000;

/// Default generation attempt budget.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default base directory for per-site output folders.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable or file entry has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for this schema.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// On-disk configuration file. Every field is optional and overrides the
/// corresponding default when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub max_workers: Option<usize>,
    pub rate_limit_delay_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub locale_abbreviations: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub progress_interval_secs: Option<u64>,
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // Scheduling
    /// Maximum number of site tasks active at once.
    pub max_workers: usize,
    /// Pause applied after each dispatch and before each generation attempt.
    pub rate_limit_delay: Duration,
    /// Total generation attempts per article.
    pub max_retries: u32,

    // Classification
    /// Upper-cased locale abbreviations that mark a phrase as a keyword.
    pub locale_abbreviations: Vec<String>,

    // Output
    /// Base directory holding one `{domain}_{timestamp}` folder per site.
    pub output_dir: PathBuf,

    // Generation
    /// Chat model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum completion length in tokens.
    pub max_tokens: u32,
    /// Timeout applied to every outgoing HTTP request.
    pub request_timeout: Duration,

    // Reporting
    /// How often the progress monitor logs a snapshot.
    pub progress_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            rate_limit_delay: Duration::from_millis(DEFAULT_RATE_LIMIT_DELAY_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            locale_abbreviations: vec!["NJ".to_string(), "NY".to_string(), "CA".to_string()],
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 800,
            request_timeout: Duration::from_secs(120),
            progress_interval: Duration::from_secs(10),
        }
    }
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads defaults overlaid with a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let file: FileConfig = serde_yaml::from_str(&raw)?;
        Ok(Self::default().apply_file(file))
    }

    /// Creates configuration from defaults overlaid with environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEO_FORGE_MAX_WORKERS`: Maximum concurrent site tasks (default: 3)
    /// - `SEO_FORGE_RATE_LIMIT_DELAY_MS`: Rate-limit pause in ms (default: 1000)
    /// - `SEO_FORGE_MAX_RETRIES`: Generation attempts (default: 3)
    /// - `SEO_FORGE_LOCALE_ABBREVIATIONS`: Comma-separated abbreviations (default: NJ,NY,CA)
    /// - `SEO_FORGE_OUTPUT_DIR`: Base output directory (default: ./output)
    /// - `SEO_FORGE_MODEL`: Chat model (default: gpt-3.5-turbo)
    /// - `SEO_FORGE_TEMPERATURE`: Sampling temperature (default: 0.7)
    /// - `SEO_FORGE_MAX_TOKENS`: Maximum completion tokens (default: 800)
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlays the values present in a parsed configuration file.
    pub fn apply_file(mut self, file: FileConfig) -> Self {
        if let Some(v) = file.max_workers {
            self.max_workers = v;
        }
        if let Some(v) = file.rate_limit_delay_ms {
            self.rate_limit_delay = Duration::from_millis(v);
        }
        if let Some(v) = file.max_retries {
            self.max_retries = v;
        }
        if let Some(v) = file.locale_abbreviations {
            self = self.with_locale_abbreviations(v);
        }
        if let Some(v) = file.output_dir {
            self.output_dir = v;
        }
        if let Some(v) = file.model {
            self.model = v;
        }
        if let Some(v) = file.temperature {
            self.temperature = v;
        }
        if let Some(v) = file.max_tokens {
            self.max_tokens = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.progress_interval_secs {
            self.progress_interval = Duration::from_secs(v);
        }
        self
    }

    /// Overlays environment variables read through `lookup`.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SEO_FORGE_MAX_WORKERS") {
            self.max_workers = parse_env_value(&val, "SEO_FORGE_MAX_WORKERS")?;
        }

        if let Some(val) = lookup("SEO_FORGE_RATE_LIMIT_DELAY_MS") {
            let ms: u64 = parse_env_value(&val, "SEO_FORGE_RATE_LIMIT_DELAY_MS")?;
            self.rate_limit_delay = Duration::from_millis(ms);
        }

        if let Some(val) = lookup("SEO_FORGE_MAX_RETRIES") {
            self.max_retries = parse_env_value(&val, "SEO_FORGE_MAX_RETRIES")?;
        }

        if let Some(val) = lookup("SEO_FORGE_LOCALE_ABBREVIATIONS") {
            self = self.with_locale_abbreviations(val.split(',').map(|s| s.to_string()));
        }

        if let Some(val) = lookup("SEO_FORGE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("SEO_FORGE_MODEL") {
            self.model = val;
        }

        if let Some(val) = lookup("SEO_FORGE_TEMPERATURE") {
            self.temperature = parse_env_value(&val, "SEO_FORGE_TEMPERATURE")?;
        }

        if let Some(val) = lookup("SEO_FORGE_MAX_TOKENS") {
            self.max_tokens = parse_env_value(&val, "SEO_FORGE_MAX_TOKENS")?;
        }

        Ok(self)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_workers must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_delay.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "rate_limit_delay must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.progress_interval.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "progress_interval must be greater than 0".to_string(),
            ));
        }

        if self.locale_abbreviations.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "locale_abbreviations cannot be empty".to_string(),
            ));
        }

        if self.locale_abbreviations.iter().any(|a| a.is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "locale_abbreviations cannot contain blank entries".to_string(),
            ));
        }

        if self.model.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model cannot be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder method to set the worker cap.
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = max;
        self
    }

    /// Builder method to set the rate-limit delay.
    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Builder method to set the generation attempt budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Builder method to set locale abbreviations. Entries are trimmed and
    /// upper-cased.
    pub fn with_locale_abbreviations<I, S>(mut self, abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.locale_abbreviations = abbreviations
            .into_iter()
            .map(|a| a.as_ref().trim().to_uppercase())
            .collect();
        self
    }

    /// Builder method to set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder method to set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method to set temperature.
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    /// Builder method to set the completion token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Builder method to set the per-request HTTP timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builder method to set the progress log interval.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
