//! Trending run orchestration.
//!
//! Plans the queries, runs them against the source with bounded concurrency,
//! normalizes every batch, and hands the batches to the aggregator. Results
//! come back in planner order no matter which query finishes first, and the
//! first failure ends the run without partial results.

use crate::analysis::{aggregate, normalize_batch, AggregateOptions, Ranking};
use crate::error::TrendingError;
use crate::models::{Filters, Repository};
use crate::planner;
use crate::source::Source;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

/// Run a full trending aggregation.
///
/// `source` must be the backend named by `filters.backend`; that field alone
/// decides the period vocabulary, normalization, and ranking.
/// `concurrency` caps the number of in-flight requests. When one request
/// fails, the remaining ones are dropped and the error is returned.
pub async fn collect_trending(
    source: &dyn Source,
    filters: &Filters,
    concurrency: usize,
) -> Result<Vec<Repository>, TrendingError> {
    let backend = filters.backend;
    let specs = planner::plan(filters)?;
    info!(
        "Running {} queries against the {} backend",
        specs.len(),
        backend
    );

    let raw_batches: Vec<_> = stream::iter(specs.iter())
        .map(|spec| source.fetch(spec))
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let batches = raw_batches
        .into_iter()
        .map(|batch| normalize_batch(batch, backend))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        "Fetched {} records",
        batches.iter().map(Vec::len).sum::<usize>()
    );

    Ok(aggregate(
        batches,
        AggregateOptions {
            limit: filters.limit,
            ranking: Ranking::for_backend(backend),
            dedupe: filters.dedupe,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackendKind, QuerySpec, RawRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    /// In-memory source. Answers by spoken language; `fail_on` makes that
    /// spoken language fail. Earlier queries sleep longer so completion
    /// order differs from planner order.
    struct FakeSource {
        records: Vec<RawRecord>,
        fail_on: Option<String>,
        calls: AtomicUsize,
        seen: Mutex<Vec<QuerySpec>>,
    }

    impl FakeSource {
        fn new(records: Vec<RawRecord>) -> Self {
            Self {
                records,
                fail_on: None,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Source for FakeSource {
        async fn fetch(&self, spec: &QuerySpec) -> Result<Vec<RawRecord>, TrendingError> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(spec.clone());
            tokio::time::sleep(Duration::from_millis(30u64.saturating_sub(index as u64 * 10))).await;

            let spoken = spec.spoken_language.clone().unwrap_or_default();
            if self.fail_on.as_deref() == Some(spoken.as_str()) {
                return Err(TrendingError::Fetch {
                    url: format!("https://github.com/trending?spoken_language_code={}", spoken),
                    reason: "connection reset".to_string(),
                });
            }

            Ok(self
                .records
                .iter()
                .cloned()
                .map(|mut r| {
                    r.full_name = r.full_name.map(|n| format!("{}-{}", n, spoken));
                    r
                })
                .collect())
        }
    }

    fn record(full_name: &str, stars: u64, stars_today: u64) -> RawRecord {
        RawRecord {
            full_name: Some(full_name.to_string()),
            stars: Some(stars),
            stars_today: Some(stars_today),
            ..RawRecord::default()
        }
    }

    fn filters(backend: BackendKind, spoken: &[&str], period: &str, limit: usize) -> Filters {
        Filters {
            languages: Vec::new(),
            spoken_languages: spoken.iter().map(|s| s.to_string()).collect(),
            period: period.to_string(),
            min_stars: 0,
            limit,
            backend,
            dedupe: false,
        }
    }

    fn eight_records() -> Vec<RawRecord> {
        // distinct stars; momentum order is the reverse of star order
        (1..=8)
            .map(|i| record(&format!("owner/repo{}", i), i * 100, 80 - i * 5))
            .collect()
    }

    #[tokio::test]
    async fn test_search_run_ranks_by_stars() {
        let source = FakeSource::new(eight_records());
        let repos = assert_ok!(
            collect_trending(&source, &filters(BackendKind::Search, &[], "day", 5), 4).await
        );

        assert_eq!(repos.len(), 5);
        let stars: Vec<u64> = repos.iter().map(|r| r.stars).collect();
        assert_eq!(stars, vec![800, 700, 600, 500, 400]);
        assert!(repos.iter().all(|r| r.stars_today.is_none()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scrape_run_ranks_by_momentum() {
        let source = FakeSource::new(eight_records());
        let repos = assert_ok!(
            collect_trending(&source, &filters(BackendKind::Scrape, &[], "daily", 5), 4).await
        );

        assert_eq!(repos.len(), 5);
        assert_eq!(repos[0].full_name, "owner/repo1-");
        assert_eq!(repos[0].name, "repo1-");
        assert_eq!(repos[4].full_name, "owner/repo5-");
    }

    #[tokio::test]
    async fn test_invalid_period_makes_no_calls() {
        let source = FakeSource::new(eight_records());
        let err = assert_err!(
            collect_trending(&source, &filters(BackendKind::Scrape, &["en"], "century", 5), 4).await
        );

        assert_eq!(err, TrendingError::InvalidPeriod("century".to_string()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_failed_query_fails_the_run() {
        let mut source = FakeSource::new(eight_records());
        source.fail_on = Some("zh".to_string());

        let err = assert_err!(
            collect_trending(&source, &filters(BackendKind::Scrape, &["en", "zh"], "daily", 5), 4)
                .await
        );
        assert!(matches!(err, TrendingError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_merge_order_follows_plan_not_completion() {
        let source = FakeSource::new(vec![record("owner/same", 100, 10)]);
        let repos = assert_ok!(
            collect_trending(
                &source,
                &filters(BackendKind::Scrape, &["en", "zh", "es"], "daily", 10),
                3
            )
            .await
        );

        let names: Vec<&str> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["owner/same-en", "owner/same-zh", "owner/same-es"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_sequential_when_concurrency_is_one() {
        let source = FakeSource::new(vec![record("owner/x", 10, 1)]);
        let repos = assert_ok!(
            collect_trending(&source, &filters(BackendKind::Scrape, &["en", "zh"], "weekly", 10), 0)
                .await
        );
        assert_eq!(repos.len(), 2);

        let seen = source.seen.lock().unwrap();
        let spoken: Vec<Option<&str>> = seen.iter().map(|s| s.spoken_language.as_deref()).collect();
        assert_eq!(spoken, vec![Some("en"), Some("zh")]);
    }

    #[tokio::test]
    async fn test_bad_record_fails_the_run() {
        let source = FakeSource::new(vec![record("no-separator", 1, 0)]);
        // the fake appends "-" to the name, still no '/'
        let err = assert_err!(
            collect_trending(&source, &filters(BackendKind::Search, &[], "week", 5), 1).await
        );
        assert!(matches!(err, TrendingError::Parse(_)));
    }
}
