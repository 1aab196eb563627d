//! Query planning.
//!
//! Expands the filter dimensions into the list of independent queries a run
//! executes. Languages collapse into a single query when no spoken language
//! is set, since one search query can carry several `language:` clauses,
//! while the listing page accepts one spoken language per request.

use crate::error::TrendingError;
use crate::models::{BackendKind, Filters, Period, QuerySpec};
use tracing::{debug, warn};

/// Plan the queries for a run against the backend named in `filters`.
///
/// Fails with `InvalidPeriod` before anything touches the network.
pub fn plan(filters: &Filters) -> Result<Vec<QuerySpec>, TrendingError> {
    let backend = filters.backend;
    let period = Period::parse(&filters.period, backend)?;

    let spoken: &[String] = match backend {
        BackendKind::Scrape => &filters.spoken_languages,
        BackendKind::Search => {
            if !filters.spoken_languages.is_empty() {
                warn!("Spoken-language filters only apply to the trending page, ignoring them");
            }
            &[]
        }
    };

    let specs = expand(&filters.languages, spoken, period, filters.min_stars);
    debug!(
        "Planned {} queries over the last {} for the {} backend",
        specs.len(),
        period,
        backend
    );
    Ok(specs)
}

/// Expand languages and spoken languages into query specs.
///
/// Order is spoken-language major, programming-language minor.
pub fn expand(
    languages: &[String],
    spoken_languages: &[String],
    period: Period,
    min_stars: u64,
) -> Vec<QuerySpec> {
    let spec = |languages: Vec<String>, spoken_language: Option<String>| QuerySpec {
        languages,
        spoken_language,
        period,
        min_stars,
    };

    if spoken_languages.is_empty() {
        return vec![spec(languages.to_vec(), None)];
    }

    if languages.is_empty() {
        return spoken_languages
            .iter()
            .map(|spoken| spec(Vec::new(), Some(spoken.clone())))
            .collect();
    }

    spoken_languages
        .iter()
        .flat_map(|spoken| {
            languages
                .iter()
                .map(move |lang| spec(vec![lang.clone()], Some(spoken.clone())))
        })
        .collect()
}
