// src/collections/activity.rs

use crate::commit::Commit;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::rc::Rc;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Activity statistics of a set of commits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    /// Number of commits per UTC calendar day
    pub active_days: BTreeMap<NaiveDate, usize>,
    /// The day with the most commits; the earliest such day on a tie
    pub most_active_day: Option<NaiveDate>,
    /// Committed date of the oldest commit
    pub first_commit_date: Option<DateTime<Utc>>,
    /// Committed date of the newest commit
    pub last_commit_date: Option<DateTime<Utc>>,
    pub commits_per_day: f64,
    pub commits_per_active_day: f64,
}

impl Activity {
    /// Computes activity for commits ordered newest first, measuring age up to `now`
    pub(crate) fn compute<'a>(commits: impl ExactSizeIterator<Item = &'a Rc<Commit>>, now: DateTime<Utc>) -> Self {
        let total = commits.len();
        if total == 0 {
            return Self::default();
        }

        let mut active_days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        let mut first_commit_date = None;
        let mut last_commit_date = None;
        for commit in commits {
            let date = commit.committed_date();
            *active_days.entry(date.date_naive()).or_default() += 1;
            if last_commit_date.is_none() {
                last_commit_date = Some(date);
            }
            first_commit_date = Some(date);
        }

        // max_by_key keeps the last maximum, so walk the days newest first
        let most_active_day = active_days
            .iter()
            .rev()
            .max_by_key(|(_, count)| **count)
            .map(|(day, _)| *day);

        let age_in_days = first_commit_date.map_or(0.0, |first| (now - first).num_seconds() as f64 / SECONDS_PER_DAY);
        let commits_per_day = if age_in_days > 0.0 { total as f64 / age_in_days } else { total as f64 };

        Self {
            commits_per_active_day: total as f64 / active_days.len() as f64,
            active_days,
            most_active_day,
            first_commit_date,
            last_commit_date,
            commits_per_day,
        }
    }
}

/// Commits and changed lines of a single day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayStats {
    pub commits: usize,
    pub additions: u64,
    pub deletions: u64,
}

/// Buckets commits by UTC calendar day together with their line counts
pub(crate) fn calendar<'a>(commits: impl Iterator<Item = &'a Rc<Commit>>) -> Result<BTreeMap<NaiveDate, DayStats>> {
    let mut days: BTreeMap<NaiveDate, DayStats> = BTreeMap::new();
    for commit in commits {
        let stats = commit.line_stats()?;
        let day = days.entry(commit.committed_date().date_naive()).or_default();
        day.commits += 1;
        day.additions += stats.additions;
        day.deletions += stats.deletions;
    }
    Ok(days)
}
