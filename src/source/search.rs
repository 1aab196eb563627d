//! GitHub search API backend.
//!
//! One request per query, sorted by stars descending. The API has no notion
//! of stars gained in a window, so these records never carry that count.

use super::{check_status, Source, SourceConfig};
use crate::error::TrendingError;
use crate::models::{QuerySpec, RawRecord};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

/// Search API response body.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

/// A repository item in the search response.
#[derive(Debug, Deserialize)]
struct SearchItem {
    full_name: Option<String>,
    html_url: Option<String>,
    description: Option<String>,
    language: Option<String>,
    stargazers_count: Option<u64>,
}

impl From<SearchItem> for RawRecord {
    fn from(item: SearchItem) -> Self {
        RawRecord {
            full_name: item.full_name,
            url: item.html_url,
            description: item.description,
            language: item.language,
            stars: item.stargazers_count,
            stars_today: None,
        }
    }
}

/// Source backed by `GET /search/repositories`.
pub struct SearchSource {
    client: reqwest::Client,
    api_url: String,
    per_page: Option<u32>,
    token: Option<String>,
}

impl SearchSource {
    pub fn new(client: reqwest::Client, config: &SourceConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            per_page: config.per_page,
            token: config.token.clone(),
        }
    }

    /// Full request URL for a query, relative to `today`.
    fn request_url(&self, spec: &QuerySpec, today: NaiveDate) -> Result<Url, TrendingError> {
        let endpoint = format!("{}/search/repositories", self.api_url);
        let mut params = vec![
            ("q", build_query(spec, today)),
            ("sort", "stars".to_string()),
            ("order", "desc".to_string()),
        ];
        if let Some(per_page) = self.per_page {
            params.push(("per_page", per_page.to_string()));
        }

        Url::parse_with_params(&endpoint, &params).map_err(|e| TrendingError::Fetch {
            url: endpoint.clone(),
            reason: e.to_string(),
        })
    }
}

/// Build the search query text: creation date, star floor, then languages.
pub fn build_query(spec: &QuerySpec, today: NaiveDate) -> String {
    let mut clauses = vec![
        format!("created:>={}", spec.period.since(today).format("%Y-%m-%d")),
        format!("stars:>={}", spec.min_stars),
    ];
    clauses.extend(spec.languages.iter().map(|lang| format!("language:{}", lang)));
    clauses.join(" ")
}

#[async_trait]
impl Source for SearchSource {
    async fn fetch(&self, spec: &QuerySpec) -> Result<Vec<RawRecord>, TrendingError> {
        let url = self.request_url(spec, Utc::now().date_naive())?;
        info!("Searching repositories: {}", url);

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TrendingError::fetch(url.as_str(), &e))?;
        check_status(url.as_str(), &response)?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TrendingError::fetch(url.as_str(), &e))?;
        let body: SearchResponse = serde_json::from_slice(&bytes)
            .map_err(|e| TrendingError::Parse(format!("search response: {}", e)))?;

        debug!("Search returned {} items", body.items.len());
        Ok(body.items.into_iter().map(RawRecord::from).collect())
    }
}
