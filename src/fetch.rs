use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::cache::{PageCache, PAGE_TTL};
use crate::error::{Result, StarHistoryError};
use crate::models::{FetchStats, RepoId};

/// Number of stargazers per page; a page with fewer items is the last one.
pub const PAGE_SIZE: usize = 100;

/// Default number of concurrent page fetchers.
pub const DEFAULT_WORKERS: usize = 10;

/// Outcome of resolving a single page against the remote API.
#[derive(Debug, Clone)]
pub enum PageFetch {
    /// The page's raw `starred_at` timestamp strings; empty means the list
    /// is exhausted.
    Events(Vec<String>),
    /// The provider refused to paginate any further (HTTP 422).
    CeilingReached,
}

/// Source of stargazer pages. Implemented by [`crate::github::GitHubClient`]
/// for the real API and by scripted sources in tests.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// The exact request URL for a page; doubles as the cache key.
    fn page_url(&self, repo: &RepoId, page: u32) -> String;

    async fn fetch_page(&self, repo: &RepoId, page: u32) -> Result<PageFetch>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub workers: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Everything a retrieval produced: the unordered timestamps plus counters.
#[derive(Debug)]
pub struct FetchOutcome {
    pub timestamps: Vec<DateTime<Utc>>,
    pub stats: FetchStats,
}

/// Shared coordination state for a pool of page fetchers.
struct PoolState {
    next_page: AtomicU32,
    ongoing: AtomicBool,
    cached_pages: AtomicUsize,
    downloaded_pages: AtomicUsize,
    ceiling_hit: AtomicBool,
}

impl PoolState {
    fn new() -> Self {
        Self {
            next_page: AtomicU32::new(1),
            ongoing: AtomicBool::new(true),
            cached_pages: AtomicUsize::new(0),
            downloaded_pages: AtomicUsize::new(0),
            ceiling_hit: AtomicBool::new(false),
        }
    }

    fn stop(&self) {
        self.ongoing.store(false, Ordering::SeqCst);
    }

    fn is_ongoing(&self) -> bool {
        self.ongoing.load(Ordering::SeqCst)
    }
}

/// Retrieve every star timestamp for `repo`.
///
/// A fixed pool of workers claims page numbers off a shared counter and
/// resolves each page cache-first. The returned timestamps are unordered;
/// sorting is the aggregation step's job.
pub async fn fetch_all_stars<S: PageSource, C: PageCache>(
    source: &S,
    cache: &C,
    repo: &RepoId,
    config: &FetchConfig,
) -> Result<FetchOutcome> {
    let started = Instant::now();
    let state = PoolState::new();
    let workers = config.workers.max(1);

    debug!(repo = %repo, workers, "starting stargazer fetch");

    let results = join_all(
        (0..workers).map(|worker| run_worker(worker, source, cache, repo, &state)),
    )
    .await;

    let mut timestamps = Vec::new();
    for result in results {
        timestamps.extend(result?);
    }

    let stats = FetchStats {
        cached_pages: state.cached_pages.load(Ordering::Relaxed),
        downloaded_pages: state.downloaded_pages.load(Ordering::Relaxed),
        pagination_limited: state.ceiling_hit.load(Ordering::Relaxed),
        elapsed: started.elapsed(),
    };

    info!(
        repo = %repo,
        events = timestamps.len(),
        cached_pages = stats.cached_pages,
        downloaded_pages = stats.downloaded_pages,
        pagination_limited = stats.pagination_limited,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "stargazer fetch finished"
    );

    Ok(FetchOutcome { timestamps, stats })
}

/// One worker's claim-resolve-append loop. Runs until the shared ongoing
/// flag is cleared by any worker observing a terminal condition.
async fn run_worker<S: PageSource, C: PageCache>(
    worker: usize,
    source: &S,
    cache: &C,
    repo: &RepoId,
    state: &PoolState,
) -> Result<Vec<DateTime<Utc>>> {
    let mut collected = Vec::new();

    loop {
        if !state.is_ongoing() {
            break;
        }

        let page = state.next_page.fetch_add(1, Ordering::SeqCst);
        let url = source.page_url(repo, page);

        match cache.read(&url).await {
            Ok(Some(raw)) => {
                debug!(worker, page, "page served from cache");
                state.cached_pages.fetch_add(1, Ordering::Relaxed);
                match parse_timestamps(&raw) {
                    Ok(parsed) => collected.extend(parsed),
                    Err(e) => {
                        state.stop();
                        return Err(e);
                    }
                }
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                debug!(worker, page, error = %e, "cache lookup failed, falling back to network");
            }
        }

        // Another worker may have observed termination while we probed the
        // cache; a page claimed after that must not be requested.
        if !state.is_ongoing() {
            break;
        }

        let fetched = match source.fetch_page(repo, page).await {
            Ok(fetched) => fetched,
            Err(e) => {
                state.stop();
                return Err(e);
            }
        };

        match fetched {
            PageFetch::Events(raw) if raw.is_empty() => {
                debug!(worker, page, "empty page, stargazer list exhausted");
                state.stop();
                break;
            }
            PageFetch::Events(raw) => {
                state.downloaded_pages.fetch_add(1, Ordering::Relaxed);
                let parsed = match parse_timestamps(&raw) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        state.stop();
                        return Err(e);
                    }
                };

                // Only full pages are cached: a partial page marks the end of
                // the list, and freezing it would hide stars added later.
                if raw.len() == PAGE_SIZE {
                    if let Err(e) = cache.write(&url, &raw, PAGE_TTL).await {
                        warn!(worker, page, error = %e, "failed to cache page");
                    }
                }

                collected.extend(parsed);
            }
            PageFetch::CeilingReached => {
                warn!(
                    worker,
                    page, "pagination ceiling reached, keeping what was collected"
                );
                state.ceiling_hit.store(true, Ordering::Relaxed);
                state.stop();
                break;
            }
        }
    }

    Ok(collected)
}

fn parse_timestamps(raw: &[String]) -> Result<Vec<DateTime<Utc>>> {
    raw.iter()
        .map(|value| {
            DateTime::parse_from_rfc3339(value)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|_| StarHistoryError::MalformedTimestamp {
                    value: value.clone(),
                })
        })
        .collect()
}
