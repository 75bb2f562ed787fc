use anyhow::Context;
use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use github_star_history::aggregate;
use github_star_history::cache::MemoryPageCache;
use github_star_history::cli::Cli;
use github_star_history::fetch::FetchConfig;
use github_star_history::github::GitHubClient;
use github_star_history::models::RepoId;
use github_star_history::star_time_series;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let repo: RepoId = cli
        .repo
        .parse()
        .context("could not parse repository argument")?;

    println!("{}", "GitHub Star History".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());

    if cli.token.is_none() {
        println!(
            "{}",
            "No GITHUB_TOKEN set, falling back to unauthenticated requests".yellow()
        );
    }

    let client = GitHubClient::new(cli.token.clone())?;
    let cache = MemoryPageCache::new();
    let config = FetchConfig {
        workers: cli.workers,
    };

    let info = client.get_repository_info(&repo).await?;
    println!(
        "{} — {} stars reported by GitHub",
        info.full_name.bold(),
        info.stargazers_count
    );
    println!("{}\n", info.html_url.dimmed());

    let report = star_time_series(&client, &cache, &repo, cli.granularity, &config).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "📊 {} stars retrieved, bucketed per {}",
        report.total_stars.to_string().bold(),
        report.granularity
    );
    println!(
        "{}",
        format!(
            "{} pages from cache, {} downloaded, {:.1}s elapsed",
            report.stats.cached_pages,
            report.stats.downloaded_pages,
            report.stats.elapsed.as_secs_f64()
        )
        .dimmed()
    );
    if report.stats.pagination_limited {
        println!(
            "{}",
            "⚠️ Pagination ceiling reached; the series covers the pages the API allowed".yellow()
        );
    }
    println!();

    let series = if cli.cumulative {
        aggregate::cumulative(&report.series)
    } else {
        report.series.clone()
    };

    if series.is_empty() {
        println!("{}", "Not enough history for a single closed bucket".dimmed());
        return Ok(());
    }

    for bucket in &series {
        println!("{}  {}", bucket.date, bucket.count);
    }

    Ok(())
}
