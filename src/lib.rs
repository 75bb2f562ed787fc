pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod github;
pub mod models;
pub mod types;

use cache::PageCache;
use error::Result;
use fetch::{FetchConfig, PageSource};
use models::{Granularity, RepoId, StarReport};

/// Retrieve a repository's full star history and bucket it into a series.
///
/// The total star count is summed before the in-progress bucket is dropped,
/// so it covers every retrieved event; the returned series is trimmed. A
/// repository with stars in only one bucket yields an empty series.
pub async fn star_time_series<S: PageSource, C: PageCache>(
    source: &S,
    cache: &C,
    repo: &RepoId,
    granularity: Granularity,
    config: &FetchConfig,
) -> Result<StarReport> {
    let outcome = fetch::fetch_all_stars(source, cache, repo, config).await?;

    let buckets = aggregate::bucket_by_period(outcome.timestamps, granularity);
    let total_stars = buckets.iter().map(|bucket| bucket.count).sum();
    let series = aggregate::drop_open_bucket(buckets);

    Ok(StarReport {
        repo: repo.to_string(),
        granularity,
        total_stars,
        series,
        stats: outcome.stats,
    })
}
