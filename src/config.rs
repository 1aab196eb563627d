//! Configuration file handling.
//!
//! This module handles loading `.gh-trending.toml` files, merging them with
//! CLI arguments, and producing the validated [`Filters`] for a run.

use crate::cli::{DisplayMode, OutputFormat};
use crate::models::{BackendKind, Filters};
use crate::source::SourceConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".gh-trending.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Filter settings.
    #[serde(default)]
    pub filters: FiltersConfig,

    /// HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Output settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Which repositories to ask for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Programming languages.
    #[serde(default)]
    pub langs: Vec<String>,

    /// Spoken-language codes (trending page only).
    #[serde(default)]
    pub spoken_langs: Vec<String>,

    /// Recency window: day/week/month, a day count, or daily/weekly/monthly.
    #[serde(default = "default_period")]
    pub period: String,

    /// Minimum star count.
    #[serde(default)]
    pub min_stars: u64,

    /// Number of repositories to display.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Scrape github.com/trending instead of using the search API.
    #[serde(default)]
    pub use_scraper: bool,

    /// Drop repositories repeated across queries.
    #[serde(default)]
    pub dedupe: bool,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            langs: Vec::new(),
            spoken_langs: Vec::new(),
            period: default_period(),
            min_stars: 0,
            limit: default_limit(),
            use_scraper: false,
            dedupe: false,
        }
    }
}

fn default_period() -> String {
    "day".to_string()
}

fn default_limit() -> usize {
    10
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// GitHub REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// GitHub website origin.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum concurrent requests.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// User-Agent header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Search API page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,

    /// API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            site_url: default_site_url(),
            timeout_seconds: default_timeout(),
            concurrency: default_concurrency(),
            user_agent: default_user_agent(),
            per_page: None,
            token: None,
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_site_url() -> String {
    "https://github.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_concurrency() -> usize {
    4
}

fn default_user_agent() -> String {
    format!("gh-trending/{}", env!("CARGO_PKG_VERSION"))
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Which fields each row shows.
    #[serde(default)]
    pub mode: DisplayMode,

    /// Text or JSON.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.gh-trending.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref langs) = args.lang {
            self.filters.langs = langs.clone();
        }
        if let Some(ref spoken) = args.spoken_lang {
            self.filters.spoken_langs = spoken.clone();
        }
        if let Some(ref period) = args.period {
            self.filters.period = period.clone();
        }
        if let Some(min_stars) = args.min_stars {
            self.filters.min_stars = min_stars;
        }
        if let Some(limit) = args.limit {
            self.filters.limit = limit;
        }

        if args.scraper {
            self.filters.use_scraper = true;
        } else if args.no_scraper {
            self.filters.use_scraper = false;
        }
        if args.dedupe {
            self.filters.dedupe = true;
        }

        if let Some(ref api_url) = args.api_url {
            self.http.api_url = api_url.clone();
        }
        if let Some(ref site_url) = args.site_url {
            self.http.site_url = site_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.http.timeout_seconds = timeout;
        }
        if let Some(concurrency) = args.concurrency {
            self.http.concurrency = concurrency;
        }
        if let Some(ref token) = args.token {
            self.http.token = Some(token.clone());
        }

        if let Some(mode) = args.display {
            self.display.mode = mode;
        }
        if let Some(format) = args.format {
            self.display.format = format;
        }
    }

    /// Check values that may have come from the file.
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in [("API", &self.http.api_url), ("Site", &self.http.site_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("{} URL must start with 'http://' or 'https://'", name));
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.http.concurrency == 0 {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.http.per_page == Some(0) {
            return Err("Page size must be at least 1".to_string());
        }

        Ok(())
    }

    /// The active backend.
    pub fn backend(&self) -> BackendKind {
        if self.filters.use_scraper {
            BackendKind::Scrape
        } else {
            BackendKind::Search
        }
    }

    /// Filters for a run. Language lists are treated as sets.
    pub fn filters(&self) -> Filters {
        Filters {
            languages: unique(&self.filters.langs),
            spoken_languages: unique(&self.filters.spoken_langs),
            period: self.filters.period.clone(),
            min_stars: self.filters.min_stars,
            limit: self.filters.limit,
            backend: self.backend(),
            dedupe: self.filters.dedupe,
        }
    }

    /// HTTP settings for the sources.
    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            api_url: self.http.api_url.clone(),
            site_url: self.http.site_url.clone(),
            timeout_seconds: self.http.timeout_seconds,
            user_agent: self.http.user_agent.clone(),
            per_page: self.http.per_page,
            token: self.http.token.clone(),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Trimmed, non-empty entries in first-seen order.
fn unique(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}
