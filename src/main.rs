// src/main.rs

mod cli;
mod summary;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use git_census::{BackendConfig, CommitCollection, Feature, RangeSpec, Registry};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Logs go to stderr so the summary stays readable on stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    // 1. Open the repository through the backend registry
    let registry = Registry::with_defaults();
    let config = BackendConfig {
        github_token: args.github_token.clone(),
        github_api_url: args.github_api_url.clone(),
    };
    let mut repo = registry
        .open(args.vcs.name(), &args.location, &config)
        .with_context(|| format!("failed to open {} repository at {}", args.vcs.name(), args.location))?;

    let range = match &args.range {
        Some(range) => RangeSpec::parse(range)?,
        None => repo.default_range().context("failed to determine the current branch")?,
    };

    // 2. Load the commits of the range
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Loading commits of {range}"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let loaded = repo.commits(range.clone());
    spinner.finish_and_clear();
    let commits = loaded.with_context(|| format!("failed to load commits of {range}"))?;
    println!("Loaded {} commits in {:.2?}.", commits.len(), start_time.elapsed());

    // 3. Narrow them down and print the summary
    let analysis_start = Instant::now();
    let commits = apply_filters(&args, commits)?;

    summary::print_header(&repo, &range.to_string())?;
    summary::print_overview(&commits)?;
    summary::print_activity(&commits.activity());
    summary::print_top_authors(&commits.authors().top(args.top));
    if repo.supports(Feature::LineStats) {
        summary::print_significant_commits(&commits.most_significant(args.top)?)?;
    }

    println!();
    println!("Analysis finished in {:.2?}.", analysis_start.elapsed());
    println!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

fn apply_filters(args: &Args, mut commits: CommitCollection) -> Result<CommitCollection> {
    if let Some(since) = args.since {
        commits = commits.after(since);
    }
    if let Some(until) = args.until {
        commits = commits.before(until);
    }
    if !args.author.is_empty() {
        commits = commits.by(&args.author);
    }
    if !args.path.is_empty() {
        commits = commits.changing(&args.path)?;
    }
    if let Some(min_impact) = args.min_impact {
        commits = commits.with_impact(min_impact)?;
    }
    Ok(commits)
}
