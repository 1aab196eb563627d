//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap. Most options are
//! optional so that values from `.gh-trending.toml` survive unless overridden.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// gh-trending - trending GitHub repositories in your terminal
///
/// Lists the repositories gaining the most attention, either from the
/// GitHub search API (ranked by stars) or by scraping github.com/trending
/// (ranked by stars gained relative to total stars).
///
/// Examples:
///   gh-trending
///   gh-trending --lang rust,go --period week --limit 20
///   gh-trending --scraper --spoken-lang en,zh --period daily
///   gh-trending --scraper --format json --output trending.json
///   gh-trending --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Programming languages to filter by (comma-separated)
    ///
    /// Example: --lang rust,go
    #[arg(short, long, value_name = "LANGS", value_delimiter = ',')]
    pub lang: Option<Vec<String>>,

    /// Spoken-language codes to filter by (comma-separated, scraper only)
    ///
    /// Example: --spoken-lang en,zh
    #[arg(short, long, value_name = "CODES", value_delimiter = ',')]
    pub spoken_lang: Option<Vec<String>>,

    /// Recency window
    ///
    /// Search API: day, week, month, or a number of days.
    /// Scraper: daily, weekly, monthly.
    #[arg(short, long, value_name = "PERIOD")]
    pub period: Option<String>,

    /// Minimum number of stars (search API)
    #[arg(long, value_name = "COUNT")]
    pub min_stars: Option<u64>,

    /// Number of repositories to display
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Scrape github.com/trending instead of using the search API
    ///
    /// Allows filtering by spoken language and ranks by stars gained today.
    #[arg(long, conflicts_with = "no_scraper")]
    pub scraper: bool,

    /// Use the search API even if the config file enables the scraper
    #[arg(long, conflicts_with = "scraper")]
    pub no_scraper: bool,

    /// Show a repository only once when several queries return it
    #[arg(long)]
    pub dedupe: bool,

    /// Fields shown per repository
    #[arg(long, value_name = "MODE")]
    pub display: Option<DisplayMode>,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// GitHub API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// GitHub website origin used for the trending page and links
    #[arg(long, value_name = "URL")]
    pub site_url: Option<String>,

    /// GitHub token for the search API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of concurrent requests
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .gh-trending.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .gh-trending.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON
    Json,
}

/// Which fields each row shows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// Name only
    Name,
    /// Name and description
    NameDesc,
    /// Language, name and description
    NameDescLang,
    /// Language, name, stars and description (default)
    #[default]
    Full,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err("Concurrency must be at least 1".to_string());
            }
        }

        for url in [&self.api_url, &self.site_url].into_iter().flatten() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("URL must start with 'http://' or 'https://': {}", url));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }

    /// Whether to draw the progress spinner for the resolved output format.
    pub fn show_progress(&self, format: OutputFormat) -> bool {
        !self.quiet && format == OutputFormat::Text
    }
}
