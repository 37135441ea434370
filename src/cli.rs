// src/cli.rs

use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use git_census::github::DEFAULT_API_URL;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path of a git repository, or `owner/project` for GitHub
    #[arg(default_value = ".")]
    pub location: String,

    /// Version control backend
    #[arg(long, value_enum, default_value_t = Vcs::Git)]
    pub vcs: Vcs,

    /// Commit range like `master`, `v1.0..master` or `..master`. Defaults to the current branch.
    #[arg(short, long)]
    pub range: Option<String>,

    /// Number of entries in the top authors and significant commits lists
    #[arg(long, default_value_t = 3)]
    pub top: usize,

    /// Only count commits committed after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub since: Option<DateTime<Utc>>,

    /// Only count commits committed before this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub until: Option<DateTime<Utc>>,

    /// Only count commits by these authors (email for git, login for GitHub)
    #[arg(long)]
    pub author: Vec<String>,

    /// Only count commits touching these paths
    #[arg(long)]
    pub path: Vec<String>,

    /// Only count commits changing at least this many lines
    #[arg(long)]
    pub min_impact: Option<u64>,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum Vcs {
    /// Local git repository
    Git,
    /// GitHub project
    Github,
}

impl Vcs {
    pub fn name(self) -> &'static str {
        match self {
            Vcs::Git => "git",
            Vcs::Github => "github",
        }
    }
}

/// Accepts a full RFC 3339 timestamp or a plain date at midnight UTC
fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        .map_err(|_| format!("'{value}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_in_both_formats() {
        assert_eq!(parse_date("2021-01-03").unwrap().to_rfc3339(), "2021-01-03T00:00:00+00:00");
        assert_eq!(
            parse_date("2021-01-03T10:00:00+02:00").unwrap().to_rfc3339(),
            "2021-01-03T08:00:00+00:00"
        );
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn defaults() {
        let args = Args::parse_from(["git-census"]);
        assert_eq!(args.location, ".");
        assert_eq!(args.vcs, Vcs::Git);
        assert_eq!(args.top, 3);
        assert!(args.range.is_none());
    }

    #[test]
    fn filters_and_backend() {
        let args = Args::parse_from([
            "git-census",
            "rust-lang/rust",
            "--vcs",
            "github",
            "--range",
            "1.0.0..master",
            "--author",
            "alice",
            "--author",
            "bob",
        ]);
        assert_eq!(args.vcs.name(), "github");
        assert_eq!(args.range.as_deref(), Some("1.0.0..master"));
        assert_eq!(args.author, vec!["alice", "bob"]);
    }
}
