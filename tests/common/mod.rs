use std::sync::atomic::{AtomicUsize, Ordering};

use github_star_history::error::{Result, StarHistoryError};
use github_star_history::fetch::{PageFetch, PageSource, PAGE_SIZE};
use github_star_history::models::RepoId;

/// Scripted stand-in for the GitHub API: `full_pages` pages of 100 events,
/// then empty pages, with optional failure or pagination-ceiling pages.
pub struct ScriptedApi {
    pub full_pages: u32,
    pub fail_from: Option<u32>,
    pub ceiling_from: Option<u32>,
    pub network_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn with_pages(full_pages: u32) -> Self {
        Self {
            full_pages,
            fail_from: None,
            ceiling_from: None,
            network_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }
}

/// One calendar day per page, so bucketing over the result is predictable.
pub fn page_timestamps(page: u32) -> Vec<String> {
    let day = (page - 1) % 27 + 1;
    (0..PAGE_SIZE)
        .map(|i| format!("2023-03-{:02}T{:02}:{:02}:00Z", day, i / 60, i % 60))
        .collect()
}

impl PageSource for ScriptedApi {
    fn page_url(&self, repo: &RepoId, page: u32) -> String {
        format!(
            "https://api.scripted.test/repos/{}/stargazers?per_page={}&page={}",
            repo, PAGE_SIZE, page
        )
    }

    async fn fetch_page(&self, repo: &RepoId, page: u32) -> Result<PageFetch> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(fail_from) = self.fail_from {
            if page >= fail_from {
                return Err(StarHistoryError::RemoteFailure {
                    url: self.page_url(repo, page),
                    status: 500,
                });
            }
        }

        if let Some(ceiling_from) = self.ceiling_from {
            if page >= ceiling_from {
                return Ok(PageFetch::CeilingReached);
            }
        }

        if page <= self.full_pages {
            Ok(PageFetch::Events(page_timestamps(page)))
        } else {
            Ok(PageFetch::Events(Vec::new()))
        }
    }
}

pub fn test_repo() -> RepoId {
    RepoId::new("octocat", "Hello-World")
}
