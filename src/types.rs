use serde::Deserialize;

// GitHub API response structures

#[derive(Debug, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub stargazers_count: u32,
}

/// One stargazer entry as returned with the `application/vnd.github.star+json`
/// media type. Only the timestamp is deserialized; the accompanying user
/// object is ignored.
#[derive(Debug, Deserialize)]
pub struct StargazerEntry {
    pub starred_at: String,
}
