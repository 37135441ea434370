// src/summary.rs

use git_census::{Activity, ActorCollection, CommitCollection, Feature, Repository};

/// Length of abbreviated commit ids
const SHORT_ID: usize = 8;

pub fn print_header(repo: &Repository, range: &str) -> git_census::Result<()> {
    println!("Repository: {} ({})", repo.location(), repo.vcs());
    let name = repo.name()?;
    if !name.is_empty() {
        println!("Project: {name}");
    }
    let description = repo.description()?;
    if !description.is_empty() {
        println!("  {description}");
    }
    println!("Range: {range}");
    Ok(())
}

pub fn print_overview(commits: &CommitCollection) -> git_census::Result<()> {
    let authors = commits.authors();
    let committers = commits.committers();
    println!();
    println!("Commits: {}  Authors: {}  Committers: {}", commits.len(), authors.len(), committers.len());

    if commits.backend().supports(Feature::LineStats) {
        println!(
            "Lines: +{} -{} ({} changed)",
            commits.additions()?,
            commits.deletions()?,
            commits.modifications()?
        );
    }
    Ok(())
}

pub fn print_activity(activity: &Activity) {
    let (Some(first), Some(last)) = (activity.first_commit_date, activity.last_commit_date) else {
        return;
    };
    println!();
    println!("First commit: {}", first.to_rfc2822());
    println!("Last commit:  {}", last.to_rfc2822());
    println!(
        "Active days: {}  Commits per day: {:.2}  Commits per active day: {:.2}",
        activity.active_days.len(),
        activity.commits_per_day,
        activity.commits_per_active_day
    );
    if let Some(day) = activity.most_active_day {
        println!("Most active day: {day} ({} commits)", activity.active_days.get(&day).copied().unwrap_or(0));
    }
}

pub fn print_top_authors(authors: &ActorCollection) {
    if authors.is_empty() {
        return;
    }
    println!();
    println!("Top authors:");
    for actor in authors {
        let count = authors.authored_commits(Some(actor.id())).len();
        match actor.email() {
            Some(email) if email != actor.id() => println!("  {:>5}  {} <{}> [{}]", count, actor.name(), email, actor.id()),
            Some(email) => println!("  {:>5}  {} <{}>", count, actor.name(), email),
            None => println!("  {:>5}  {} [{}]", count, actor.name(), actor.id()),
        }
    }
}

pub fn print_significant_commits(commits: &CommitCollection) -> git_census::Result<()> {
    if commits.is_empty() {
        return Ok(());
    }
    println!();
    println!("Most significant commits:");
    for commit in commits {
        let id = commit.id().get(..SHORT_ID).unwrap_or(commit.id());
        println!(
            "  {}  +{:<6} -{:<6} {}",
            id,
            commit.additions()?,
            commit.deletions()?,
            commit.subject()
        );
    }
    Ok(())
}
