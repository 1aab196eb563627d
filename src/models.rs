//! Data models for the trending aggregator.
//!
//! This module contains the core data structures shared by the planner,
//! the sources, and the ranking step.

use crate::error::TrendingError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which data source is active for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// GitHub search API. Cannot report stars gained in the window.
    Search,
    /// The github.com/trending listing page.
    Scrape,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Search => write!(f, "search"),
            BackendKind::Scrape => write!(f, "scrape"),
        }
    }
}

/// Recency window for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    /// Custom number of days, search backend only.
    Days(u32),
}

impl Period {
    /// Parse a recency token in the vocabulary of the given backend.
    ///
    /// The search backend takes `day`, `week`, `month` or a day count. The
    /// listing page takes `daily`, `weekly`, `monthly`; the named search
    /// tokens are accepted there as aliases.
    pub fn parse(token: &str, backend: BackendKind) -> Result<Self, TrendingError> {
        let trimmed = token.trim();
        let named = match (backend, trimmed) {
            (_, "day") => Some(Period::Day),
            (_, "week") => Some(Period::Week),
            (_, "month") => Some(Period::Month),
            (BackendKind::Scrape, "daily") => Some(Period::Day),
            (BackendKind::Scrape, "weekly") => Some(Period::Week),
            (BackendKind::Scrape, "monthly") => Some(Period::Month),
            _ => None,
        };
        if let Some(period) = named {
            return Ok(period);
        }

        match backend {
            BackendKind::Search => trimmed
                .parse::<u32>()
                .map(Period::Days)
                .map_err(|_| TrendingError::InvalidPeriod(token.to_string())),
            BackendKind::Scrape => Err(TrendingError::InvalidPeriod(token.to_string())),
        }
    }

    /// Length of the window in days.
    pub fn days(&self) -> u32 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 31,
            Period::Days(n) => *n,
        }
    }

    /// Earliest creation date covered by the window, counted back from `today`.
    pub fn since(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.days())))
            .unwrap_or(NaiveDate::MIN)
    }

    /// The `since` value understood by the trending page.
    pub fn listing_token(&self) -> Option<&'static str> {
        match self {
            Period::Day => Some("daily"),
            Period::Week => Some("weekly"),
            Period::Month => Some("monthly"),
            Period::Days(_) => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Day => write!(f, "day"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
            Period::Days(n) => write!(f, "{} days", n),
        }
    }
}

/// Validated filter parameters for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    /// Programming languages, deduplicated.
    pub languages: Vec<String>,
    /// Spoken-language codes, deduplicated.
    pub spoken_languages: Vec<String>,
    /// Raw recency token, parsed by the planner.
    pub period: String,
    /// Minimum star count (search backend).
    pub min_stars: u64,
    /// Maximum number of repositories returned.
    pub limit: usize,
    /// Active backend.
    pub backend: BackendKind,
    /// Drop repeated `full_name`s across queries.
    pub dedupe: bool,
}

/// One concrete combination of filters, sent to exactly one backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// Empty means no language filter.
    pub languages: Vec<String>,
    pub spoken_language: Option<String>,
    pub period: Period,
    pub min_stars: u64,
}

/// A record as a backend produced it, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub full_name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: Option<u64>,
    pub stars_today: Option<u64>,
}

/// A trending repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Short name, the part of `full_name` after the owner.
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    /// Absolute link to the repository.
    pub url: String,
    /// May be empty.
    pub description: String,
    /// May be empty when the language is unknown.
    pub language: String,
    /// Total star count.
    pub stars: u64,
    /// Stars gained in the window; `None` when the backend cannot report it.
    pub stars_today: Option<u64>,
}
