//! Merging and ranking.
//!
//! Batches are concatenated in planner order, ranked, and truncated. The two
//! backends rank differently: the listing page reports stars gained in the
//! window, so its results are ranked by `stars_today / stars`; search results
//! have no such count and are ranked by total stars.

use crate::models::{BackendKind, Repository};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Ranking criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ranking {
    /// `stars_today / stars`, highest first.
    Momentum,
    /// Total stars, highest first.
    Stars,
}

impl Ranking {
    pub fn for_backend(backend: BackendKind) -> Self {
        match backend {
            BackendKind::Scrape => Ranking::Momentum,
            BackendKind::Search => Ranking::Stars,
        }
    }

    /// Compare two repositories; `Greater` means `a` ranks higher.
    pub fn compare(&self, a: &Repository, b: &Repository) -> Ordering {
        match self {
            Ranking::Stars => a.stars.cmp(&b.stars),
            Ranking::Momentum => compare_scores(trending_score(a), trending_score(b)),
        }
    }
}

/// `stars_today / stars`, or `None` when it cannot be computed.
///
/// Zero-star repositories and records without a daily count score `None`,
/// which ranks below every real score.
pub fn trending_score(repo: &Repository) -> Option<f64> {
    let today = repo.stars_today?;
    if repo.stars == 0 {
        return None;
    }
    Some(today as f64 / repo.stars as f64)
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Options for [`aggregate`].
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    pub limit: usize,
    pub ranking: Ranking,
    /// Keep only the first record per `full_name`.
    pub dedupe: bool,
}

/// Merge batches, rank, and truncate to `limit`.
///
/// The sort is stable, so ties keep their concatenation order. Without
/// `dedupe`, a repository returned by two queries appears twice.
pub fn aggregate(batches: Vec<Vec<Repository>>, options: AggregateOptions) -> Vec<Repository> {
    let mut repos: Vec<Repository> = batches.into_iter().flatten().collect();

    if options.dedupe {
        let mut seen = HashSet::new();
        repos.retain(|repo| seen.insert(repo.full_name.clone()));
    }

    repos.sort_by(|a, b| options.ranking.compare(b, a));
    repos.truncate(options.limit);
    repos
}
