//! Raw record normalization.

use crate::error::TrendingError;
use crate::models::{BackendKind, RawRecord, Repository};

/// Convert a backend record into a [`Repository`].
///
/// Missing strings become empty and missing counts become zero. Search
/// records always get `stars_today: None`, whatever the raw record holds.
/// A full name without an owner separator is rejected.
pub fn normalize(raw: RawRecord, backend: BackendKind) -> Result<Repository, TrendingError> {
    let full_name = raw.full_name.unwrap_or_default();
    let name = short_name(&full_name)
        .ok_or_else(|| {
            TrendingError::Parse(format!(
                "repository name '{}' has no owner separator",
                full_name
            ))
        })?
        .to_string();

    let stars_today = match backend {
        BackendKind::Search => None,
        BackendKind::Scrape => Some(raw.stars_today.unwrap_or(0)),
    };

    Ok(Repository {
        name,
        full_name,
        url: raw.url.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        language: raw.language.unwrap_or_default(),
        stars: raw.stars.unwrap_or(0),
        stars_today,
    })
}

/// The part of `owner/name` after the first `/`.
pub fn short_name(full_name: &str) -> Option<&str> {
    full_name.split_once('/').map(|(_, name)| name)
}

/// Normalize a whole batch, stopping at the first bad record.
pub fn normalize_batch(
    batch: Vec<RawRecord>,
    backend: BackendKind,
) -> Result<Vec<Repository>, TrendingError> {
    batch
        .into_iter()
        .map(|raw| normalize(raw, backend))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(full_name: &str) -> RawRecord {
        RawRecord {
            full_name: Some(full_name.to_string()),
            ..RawRecord::default()
        }
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("golang/go"), Some("go"));
        assert_eq!(short_name("a/b/c"), Some("b/c"));
        assert_eq!(short_name("nosep"), None);
    }

    #[test]
    fn test_normalize_defaults() {
        let repo = normalize(raw("golang/go"), BackendKind::Scrape).unwrap();
        assert_eq!(repo.name, "go");
        assert_eq!(repo.full_name, "golang/go");
        assert_eq!(repo.url, "");
        assert_eq!(repo.description, "");
        assert_eq!(repo.language, "");
        assert_eq!(repo.stars, 0);
        assert_eq!(repo.stars_today, Some(0));
    }

    #[test]
    fn test_search_records_get_sentinel() {
        let record = RawRecord {
            stars: Some(10),
            stars_today: Some(99),
            ..raw("rust-lang/rust")
        };
        let repo = normalize(record, BackendKind::Search).unwrap();
        assert_eq!(repo.stars, 10);
        assert_eq!(repo.stars_today, None);
    }

    #[test]
    fn test_scrape_records_keep_daily_stars() {
        let record = RawRecord {
            stars: Some(200),
            stars_today: Some(12),
            ..raw("tokio-rs/tokio")
        };
        let repo = normalize(record, BackendKind::Scrape).unwrap();
        assert_eq!(repo.stars_today, Some(12));
    }

    #[test]
    fn test_missing_separator_is_rejected() {
        let err = normalize(raw("orphan"), BackendKind::Scrape).unwrap_err();
        assert!(matches!(err, TrendingError::Parse(_)));

        let err = normalize(RawRecord::default(), BackendKind::Search).unwrap_err();
        assert!(matches!(err, TrendingError::Parse(_)));
    }

    #[test]
    fn test_normalize_batch_stops_on_bad_record() {
        let batch = vec![raw("a/one"), raw("broken"), raw("c/three")];
        assert!(normalize_batch(batch, BackendKind::Scrape).is_err());

        let batch = vec![raw("a/one"), raw("b/two")];
        let repos = normalize_batch(batch, BackendKind::Scrape).unwrap();
        assert_eq!(repos.len(), 2);
    }
}
