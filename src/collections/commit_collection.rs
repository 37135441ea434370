// src/collections/commit_collection.rs

use super::activity::{self, Activity, DayStats};
use super::actor_collection::ActorCollection;
use super::collection::Collection;
use crate::actor::Actor;
use crate::adapter::Backend;
use crate::commit::Commit;
use crate::error::Result;
use crate::features::Feature;
use crate::model::{CommitId, LineStats};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::map::Values;
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// An ordered set of commits, newest first when it comes from a repository
#[derive(Clone)]
pub struct CommitCollection {
    commits: Collection<Commit>,
    backend: Rc<Backend>,
    totals: OnceCell<LineStats>,
}

impl CommitCollection {
    pub fn new(backend: Rc<Backend>) -> Self {
        Self {
            commits: Collection::new(),
            backend,
            totals: OnceCell::new(),
        }
    }

    pub fn from_commits(backend: Rc<Backend>, commits: impl IntoIterator<Item = Rc<Commit>>) -> Self {
        Self {
            commits: commits.into_iter().collect(),
            backend,
            totals: OnceCell::new(),
        }
    }

    fn derive(&self, commits: impl IntoIterator<Item = Rc<Commit>>) -> Self {
        Self::from_commits(Rc::clone(&self.backend), commits)
    }

    pub fn backend(&self) -> &Rc<Backend> {
        &self.backend
    }

    pub fn add(&mut self, commit: Rc<Commit>) -> bool {
        let added = self.commits.add(commit);
        if added {
            self.totals = OnceCell::new();
        }
        added
    }

    pub fn merge(&mut self, other: &CommitCollection) {
        self.commits.merge(&other.commits);
        self.totals = OnceCell::new();
    }

    pub fn get(&self, id: &str) -> Option<&Rc<Commit>> {
        self.commits.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commits.contains(id)
    }

    /// The newest commit
    pub fn first(&self) -> Option<&Rc<Commit>> {
        self.commits.first()
    }

    /// The oldest commit
    pub fn last(&self) -> Option<&Rc<Commit>> {
        self.commits.last()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn iter(&self) -> Values<'_, String, Rc<Commit>> {
        self.commits.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.commits.ids()
    }

    pub fn all(&self, predicate: impl FnMut(&Rc<Commit>) -> bool) -> bool {
        self.commits.all(predicate)
    }

    pub fn filter(&self, predicate: impl FnMut(&Rc<Commit>) -> bool) -> Self {
        Self {
            commits: self.commits.filter(predicate),
            backend: Rc::clone(&self.backend),
            totals: OnceCell::new(),
        }
    }

    /// The authors of these commits in first-seen order.
    ///
    /// The returned actors are scoped to this collection: their commit counts
    /// and line totals only consider commits contained here.
    pub fn authors(&self) -> ActorCollection {
        self.actors(Commit::author)
    }

    /// The committers of these commits in first-seen order, scoped like [`Self::authors`]
    pub fn committers(&self) -> ActorCollection {
        self.actors(Commit::committer)
    }

    fn actors(&self, select: fn(&Commit) -> &Rc<Actor>) -> ActorCollection {
        let scope: HashSet<CommitId> = self.ids().map(str::to_string).collect();
        let actors = self.iter().map(|commit| Rc::clone(select(commit)));
        ActorCollection::scoped(Rc::clone(&self.backend), actors, Rc::new(scope))
    }

    /// Commits authored by any of the given actors
    pub fn by<I, S>(&self, actor_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: HashSet<String> = actor_ids.into_iter().map(|id| id.as_ref().to_string()).collect();
        self.filter(|commit| ids.contains(commit.author().id()))
    }

    /// Commits committed strictly after `date`
    pub fn after(&self, date: DateTime<Utc>) -> Self {
        self.filter(|commit| commit.committed_date() > date)
    }

    /// Commits committed strictly before `date`
    pub fn before(&self, date: DateTime<Utc>) -> Self {
        self.filter(|commit| commit.committed_date() < date)
    }

    /// Commits that added, modified or deleted any of the given paths
    pub fn changing<I, S>(&self, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.backend.support(Feature::FileStats)?;

        let paths: HashSet<String> = paths.into_iter().map(|p| p.as_ref().to_string()).collect();
        let mut matching = Vec::new();
        for commit in self.iter() {
            if commit.file_stats()?.paths().any(|path| paths.contains(path)) {
                matching.push(Rc::clone(commit));
            }
        }
        Ok(self.derive(matching))
    }

    /// Loads the line counts of every commit not loaded yet with a single backend call
    pub fn load_line_stats(&self) -> Result<()> {
        self.backend.support(Feature::LineStats)?;

        let missing: Vec<CommitId> = self
            .iter()
            .filter(|commit| !commit.line_stats_loaded())
            .map(|commit| commit.id().to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        tracing::debug!("loading line stats for {} commits", missing.len());
        let loaded = self.backend.adapter().load_line_stats(&missing)?;
        for commit in self.iter().filter(|commit| !commit.line_stats_loaded()) {
            commit.set_line_stats(loaded.get(commit.id()).copied().unwrap_or_default());
        }
        Ok(())
    }

    /// Up to `count` commits with the most changed lines, biggest first.
    /// Ties keep the collection order.
    pub fn most_significant(&self, count: usize) -> Result<Self> {
        self.load_line_stats()?;

        let mut ranked = self
            .iter()
            .map(|commit| Ok((commit.modifications()?, Rc::clone(commit))))
            .collect::<Result<Vec<_>>>()?;
        ranked.sort_by(|(a, _), (b, _)| b.cmp(a));
        Ok(self.derive(ranked.into_iter().take(count).map(|(_, commit)| commit)))
    }

    /// Same as [`Self::most_significant`]
    pub fn top(&self, count: usize) -> Result<Self> {
        self.most_significant(count)
    }

    /// Commits changing at least `min_lines` lines
    pub fn with_impact(&self, min_lines: u64) -> Result<Self> {
        self.load_line_stats()?;

        let mut matching = Vec::new();
        for commit in self.iter() {
            if commit.modifications()? >= min_lines {
                matching.push(Rc::clone(commit));
            }
        }
        Ok(self.derive(matching))
    }

    fn totals(&self) -> Result<LineStats> {
        if let Some(totals) = self.totals.get() {
            return Ok(*totals);
        }

        self.load_line_stats()?;
        let mut totals = LineStats::default();
        for commit in self.iter() {
            totals = totals + commit.line_stats()?;
        }
        Ok(*self.totals.get_or_init(|| totals))
    }

    /// Lines added by all commits together
    pub fn additions(&self) -> Result<u64> {
        Ok(self.totals()?.additions)
    }

    /// Lines deleted by all commits together
    pub fn deletions(&self) -> Result<u64> {
        Ok(self.totals()?.deletions)
    }

    pub fn modifications(&self) -> Result<u64> {
        Ok(self.totals()?.modifications())
    }

    /// Activity statistics measured up to the current time
    pub fn activity(&self) -> Activity {
        self.activity_at(Utc::now())
    }

    /// Activity statistics measured up to `now`
    pub fn activity_at(&self, now: DateTime<Utc>) -> Activity {
        Activity::compute(self.iter(), now)
    }

    /// Commits, additions and deletions per UTC calendar day
    pub fn calendar(&self) -> Result<BTreeMap<NaiveDate, DayStats>> {
        self.load_line_stats()?;
        activity::calendar(self.iter())
    }
}

impl<'a> IntoIterator for &'a CommitCollection {
    type Item = &'a Rc<Commit>;
    type IntoIter = Values<'a, String, Rc<Commit>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for CommitCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitCollection")
            .field("vcs", &self.backend.vcs())
            .field("commits", &self.commits)
            .finish()
    }
}
