//! Trending page backend.
//!
//! Fetches github.com/trending and reads the repository blocks out of the
//! HTML. The metadata row of each block is read by position:
//! 0 = language, 1 = total stars, 4 = stars gained in the window.

use super::{check_status, Source, SourceConfig};
use crate::error::TrendingError;
use crate::models::{QuerySpec, RawRecord};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

const REPO_BLOCK: &str = "article.Box-row";
const HEADING_LINK: &str = "h2 a";
const DESCRIPTION: &str = "p";
const METADATA_ROW: &str = "div.f6";

const LANGUAGE_CELL: usize = 0;
const STARS_CELL: usize = 1;
const STARS_TODAY_CELL: usize = 4;

/// Source backed by the trending listing page.
pub struct ScrapeSource {
    client: reqwest::Client,
    site_url: String,
}

impl ScrapeSource {
    pub fn new(client: reqwest::Client, config: &SourceConfig) -> Self {
        Self {
            client,
            site_url: config.site_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Source for ScrapeSource {
    async fn fetch(&self, spec: &QuerySpec) -> Result<Vec<RawRecord>, TrendingError> {
        let url = listing_url(&self.site_url, spec)?;
        info!("Fetching trending page: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TrendingError::fetch(url.as_str(), &e))?;
        check_status(url.as_str(), &response)?;

        let body = response
            .text()
            .await
            .map_err(|e| TrendingError::fetch(url.as_str(), &e))?;

        // `Html` is !Send; keep it inside the synchronous parser.
        let records = parse_listing(&body, &self.site_url)?;
        debug!("Parsed {} repositories from {}", records.len(), url);
        Ok(records)
    }
}

/// Listing page URL for a query. Parameters are only set when non-empty.
pub fn listing_url(site_url: &str, spec: &QuerySpec) -> Result<Url, TrendingError> {
    let endpoint = format!("{}/trending", site_url.trim_end_matches('/'));
    let mut url = Url::parse(&endpoint).map_err(|e| TrendingError::Fetch {
        url: endpoint.clone(),
        reason: e.to_string(),
    })?;

    let mut params: Vec<(&str, &str)> = Vec::new();
    match spec.languages.as_slice() {
        [] => {}
        [lang] => params.push(("language", lang.as_str())),
        many => warn!(
            "The trending page takes one language per request, dropping filter {:?}",
            many
        ),
    }
    if let Some(spoken) = spec.spoken_language.as_deref().filter(|s| !s.is_empty()) {
        params.push(("spoken_language_code", spoken));
    }
    if let Some(since) = spec.period.listing_token() {
        params.push(("since", since));
    }

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// Parse every repository block of a trending page.
pub fn parse_listing(html: &str, site_url: &str) -> Result<Vec<RawRecord>, TrendingError> {
    let document = Html::parse_document(html);
    let block_sel = selector(REPO_BLOCK)?;
    let heading_sel = selector(HEADING_LINK)?;
    let description_sel = selector(DESCRIPTION)?;
    let metadata_sel = selector(METADATA_ROW)?;

    document
        .select(&block_sel)
        .map(|block| -> Result<RawRecord, TrendingError> {
            let heading = block.select(&heading_sel).next().ok_or_else(|| {
                TrendingError::Parse("repository block without a heading link".to_string())
            })?;

            // "owner /\n  repo" in the markup
            let full_name: String = heading.text().flat_map(str::split_whitespace).collect();
            let href = heading.value().attr("href").unwrap_or("").trim();

            let mut record = RawRecord {
                full_name: Some(full_name),
                url: Some(absolute_url(site_url, href)),
                description: block.select(&description_sel).next().map(element_text),
                ..RawRecord::default()
            };

            if let Some(row) = block.select(&metadata_sel).next() {
                let cells = row.children().filter_map(ElementRef::wrap);
                for (position, cell) in cells.enumerate() {
                    let text = element_text(cell);
                    match position {
                        LANGUAGE_CELL => record.language = Some(text),
                        STARS_CELL => record.stars = extract_count(&text),
                        STARS_TODAY_CELL => record.stars_today = extract_count(&text),
                        _ => {}
                    }
                }
            }

            Ok(record)
        })
        .collect()
}

/// Concatenate every digit run in `text`: "1,234 stars today" is 1234.
pub fn extract_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn absolute_url(site_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", site_url, href)
    } else {
        format!("{}/{}", site_url, href)
    }
}

/// Text content with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector(css: &str) -> Result<Selector, TrendingError> {
    Selector::parse(css).map_err(|_| TrendingError::Parse(format!("invalid selector: {}", css)))
}
