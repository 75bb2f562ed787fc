use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use url::Url;

use crate::error::StarHistoryError;

/// A repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoId {
    type Err = StarHistoryError;

    /// Accepts both `owner/name` and a full GitHub URL such as
    /// `https://github.com/owner/name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StarHistoryError::InvalidRepo(s.to_string());

        if s.starts_with("http://") || s.starts_with("https://") {
            let parsed = Url::parse(s).map_err(|_| invalid())?;
            let mut segments = parsed
                .path_segments()
                .ok_or_else(invalid)?
                .filter(|segment| !segment.is_empty());
            let owner = segments.next().ok_or_else(invalid)?;
            let name = segments.next().ok_or_else(invalid)?;
            return Ok(RepoId::new(owner, name.trim_end_matches(".git")));
        }

        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => {
                Ok(RepoId::new(*owner, *name))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Width of the buckets the star series is grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Week => write!(f, "week"),
            Granularity::Month => write!(f, "month"),
        }
    }
}

/// One point of the series: the bucket's start date and how many stars
/// landed in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub date: NaiveDate,
    pub count: u64,
}

/// Counters describing how a retrieval went, for tuning pool size.
#[derive(Debug, Clone, Serialize)]
pub struct FetchStats {
    pub cached_pages: usize,
    pub downloaded_pages: usize,
    pub pagination_limited: bool,
    pub elapsed: Duration,
}

/// Result of a star history query.
///
/// `total_stars` is summed before the in-progress bucket is trimmed off, so
/// it reflects every retrieved event; `series` is the trimmed sequence.
#[derive(Debug, Clone, Serialize)]
pub struct StarReport {
    pub repo: String,
    pub granularity: Granularity,
    pub total_stars: u64,
    pub series: Vec<Bucket>,
    pub stats: FetchStats,
}
