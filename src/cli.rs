use clap::Parser;

use crate::models::Granularity;

#[derive(Parser)]
#[command(name = "github-star-history")]
#[command(about = "Fetches a repository's stargazer history and buckets it into a time series")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Repository to inspect, as owner/name or a full GitHub URL
    pub repo: String,

    /// Bucket width for the series
    #[arg(long, short, value_enum, default_value_t = Granularity::Day)]
    pub granularity: Granularity,

    /// Number of concurrent page fetchers
    #[arg(long, env = "STAR_FETCH_WORKERS", default_value_t = 10)]
    pub workers: usize,

    /// GitHub API token; requests go out unauthenticated when absent
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print running totals per bucket instead of per-bucket counts
    #[arg(long)]
    pub cumulative: bool,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}
