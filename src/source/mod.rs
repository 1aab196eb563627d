//! Data sources for trending repositories.
//!
//! Two interchangeable backends implement [`Source`]: the GitHub search API
//! and the github.com/trending listing page. One is picked per run.

pub mod scrape;
pub mod search;

use crate::error::TrendingError;
use crate::models::{BackendKind, QuerySpec, RawRecord};
use async_trait::async_trait;
use std::time::Duration;

pub use scrape::ScrapeSource;
pub use search::SearchSource;

/// A backend that turns one query into one batch of raw records.
#[async_trait]
pub trait Source: Send + Sync {
    /// Run a single query. Each call returns its own complete batch.
    async fn fetch(&self, spec: &QuerySpec) -> Result<Vec<RawRecord>, TrendingError>;
}

/// HTTP settings shared by both backends.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the REST API.
    pub api_url: String,
    /// Origin of the website (trending page, repository links).
    pub site_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Optional search page size.
    pub per_page: Option<u32>,
    /// Optional API token.
    pub token: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            site_url: "https://github.com".to_string(),
            timeout_seconds: 30,
            user_agent: format!("gh-trending/{}", env!("CARGO_PKG_VERSION")),
            per_page: None,
            token: None,
        }
    }
}

/// Build the source for the given backend.
pub fn build_source(
    kind: BackendKind,
    config: &SourceConfig,
) -> Result<Box<dyn Source>, TrendingError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| TrendingError::fetch(config.api_url.clone(), &e))?;

    Ok(match kind {
        BackendKind::Search => Box::new(SearchSource::new(client, config)),
        BackendKind::Scrape => Box::new(ScrapeSource::new(client, config)),
    })
}

/// Turn a non-2xx status into a `Fetch` error.
pub(crate) fn check_status(url: &str, response: &reqwest::Response) -> Result<(), TrendingError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(TrendingError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", status),
        })
    }
}
