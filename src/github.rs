use std::time::{Duration, SystemTime};

use reqwest::{Client, Response};
use tokio::time::sleep;
use tracing::warn;

use crate::error::{Result, StarHistoryError};
use crate::fetch::{PageFetch, PageSource, PAGE_SIZE};
use crate::models::RepoId;
use crate::types::{GitHubRepo, StargazerEntry};

const API_BASE_URL: &str = "https://api.github.com";
const MAX_RETRIES: u32 = 3;

// The star+json media type is what makes the stargazers endpoint include
// the starred_at timestamp on each entry.
const ACCEPT_STARRED_AT: &str = "application/vnd.github.star+json";

pub struct GitHubClient {
    client: Client,
    token: Option<String>,
}

impl GitHubClient {
    /// Build a client. Without a token, requests go out unauthenticated and
    /// are subject to the stricter anonymous rate limits.
    pub fn new(token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("github-star-history/0.1.0")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient { client, token })
    }

    async fn make_request(&self, url: &str) -> Result<Response> {
        let mut retries = 0;

        loop {
            let mut request = self.client.get(url).header("Accept", ACCEPT_STARRED_AT);
            if let Some(token) = &self.token {
                request = request.header("Authorization", format!("token {}", token));
            }
            let response = request.send().await?;

            let rate_limit_remaining = response
                .headers()
                .get("X-RateLimit-Remaining")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(0);

            let rate_limit_reset = response
                .headers()
                .get("X-RateLimit-Reset")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);

            match response.status() {
                status if status.is_success() => {
                    if rate_limit_remaining < 10 {
                        warn!(
                            remaining = rate_limit_remaining,
                            "rate limit low, adding delay"
                        );
                        sleep(Duration::from_secs(1)).await;
                    }
                    return Ok(response);
                }
                reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
                    return Err(StarHistoryError::PaginationLimit {
                        url: url.to_string(),
                    });
                }
                reqwest::StatusCode::NOT_FOUND => {
                    return Err(StarHistoryError::NotFound(format!(
                        "Resource not found: {}",
                        url
                    )));
                }
                reqwest::StatusCode::FORBIDDEN if rate_limit_remaining == 0 => {
                    let reset_time =
                        SystemTime::UNIX_EPOCH + Duration::from_secs(rate_limit_reset);
                    let wait_time = reset_time
                        .duration_since(SystemTime::now())
                        .unwrap_or(Duration::from_secs(0));

                    if wait_time > Duration::from_secs(60) {
                        return Err(StarHistoryError::RateLimitExceeded(format!(
                            "API rate limit exceeded. Reset at: {:?}",
                            reset_time
                        )));
                    }

                    warn!(
                        wait_secs = wait_time.as_secs() + 1,
                        "rate limit reached, waiting for reset"
                    );
                    sleep(wait_time + Duration::from_secs(1)).await;
                    continue;
                }
                status if status.is_server_error() && retries < MAX_RETRIES => {
                    warn!(status = status.as_u16(), "server error, retrying in 2 seconds");
                    sleep(Duration::from_secs(2)).await;
                    retries += 1;
                    continue;
                }
                status => {
                    return Err(StarHistoryError::RemoteFailure {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
            }
        }
    }

    pub async fn get_repository_info(&self, repo: &RepoId) -> Result<GitHubRepo> {
        let url = format!("{}/repos/{}/{}", API_BASE_URL, repo.owner, repo.name);
        let response = self.make_request(&url).await?;
        let repo_data: GitHubRepo = response.json().await?;
        Ok(repo_data)
    }

    /// Fetch one page of stargazers, keeping the timestamps as the raw
    /// strings the API returned. The pagination ceiling comes back in-band
    /// as [`PageFetch::CeilingReached`].
    pub async fn fetch_stargazers_page(&self, repo: &RepoId, page: u32) -> Result<PageFetch> {
        let url = self.page_url(repo, page);

        match self.make_request(&url).await {
            Ok(response) => {
                let entries: Vec<StargazerEntry> = response.json().await?;
                Ok(PageFetch::Events(
                    entries.into_iter().map(|entry| entry.starred_at).collect(),
                ))
            }
            Err(StarHistoryError::PaginationLimit { .. }) => Ok(PageFetch::CeilingReached),
            Err(e) => Err(e),
        }
    }
}

impl PageSource for GitHubClient {
    fn page_url(&self, repo: &RepoId, page: u32) -> String {
        format!(
            "{}/repos/{}/{}/stargazers?per_page={}&page={}",
            API_BASE_URL, repo.owner, repo.name, PAGE_SIZE, page
        )
    }

    async fn fetch_page(&self, repo: &RepoId, page: u32) -> Result<PageFetch> {
        self.fetch_stargazers_page(repo, page).await
    }
}
