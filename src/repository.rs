// src/repository.rs

use crate::actor::Actor;
use crate::adapter::{Adapter, Backend};
use crate::collections::{ActorCollection, CommitCollection};
use crate::commit::Commit;
use crate::error::Result;
use crate::features::{Feature, FeatureSet};
use crate::model::*;
use crate::range::{RangeSpec, ResolvedRange};
use chrono::{DateTime, Utc};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Added, deleted and modified dates of a single path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStat {
    pub added_date: Option<DateTime<Utc>>,
    pub deleted_date: Option<DateTime<Utc>>,
    pub last_modified_date: Option<DateTime<Utc>>,
    /// Number of commits adding or modifying the path
    pub modifications: usize,
}

/// Changed lines per commit, oldest commit first. Deletions are negative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineHistory {
    pub additions: Vec<i64>,
    pub deletions: Vec<i64>,
}

/// A source code repository accessed through an [`Adapter`].
///
/// Commits, actors and resolved refs are cached for the lifetime of the
/// value and never evicted, so overlapping range queries only fetch the part
/// of the history that has not been seen yet.
#[derive(Debug)]
pub struct Repository {
    location: String,
    backend: Rc<Backend>,
    commits: HashMap<CommitId, Rc<Commit>>,
    actors: HashMap<ActorId, Rc<Actor>>,
    refs: HashMap<String, CommitId>,
    /// Children whose parent has not been built yet, keyed by that parent
    pending_children: HashMap<CommitId, Vec<CommitId>>,
    /// Commits known to be reachable from a lower bound, keyed by that bound
    hidden: HashMap<CommitId, HashSet<CommitId>>,
    metadata: OnceCell<ProjectMetadata>,
}

/// State of a backward walk over the cached graph
#[derive(Default)]
struct Walk {
    seen: HashSet<CommitId>,
    found: Vec<Rc<Commit>>,
    missing: Vec<CommitId>,
    /// Cached commits with at least one missing parent
    boundaries: Vec<CommitId>,
}

impl Repository {
    pub fn new(location: impl Into<String>, adapter: Box<dyn Adapter>) -> Self {
        Self::with_backend(location, Backend::new(adapter))
    }

    /// A repository whose optional features are `features` instead of what the adapter reports
    pub fn with_features(location: impl Into<String>, adapter: Box<dyn Adapter>, features: FeatureSet) -> Self {
        Self::with_backend(location, Backend::with_features(adapter, features))
    }

    fn with_backend(location: impl Into<String>, backend: Backend) -> Self {
        Self {
            location: location.into(),
            backend: Rc::new(backend),
            commits: HashMap::new(),
            actors: HashMap::new(),
            refs: HashMap::new(),
            pending_children: HashMap::new(),
            hidden: HashMap::new(),
            metadata: OnceCell::new(),
        }
    }

    /// The file system path or remote slug this repository was opened with
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn vcs(&self) -> &'static str {
        self.backend.vcs()
    }

    pub fn features(&self) -> FeatureSet {
        self.backend.features()
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.backend.supports(feature)
    }

    /// Number of commits in the cache
    pub fn cached_commit_count(&self) -> usize {
        self.commits.len()
    }

    /// A cached commit by identifier
    pub fn commit(&self, id: &str) -> Option<&Rc<Commit>> {
        self.commits.get(id)
    }

    /// A cached actor by identifier
    pub fn actor(&self, id: &str) -> Option<&Rc<Actor>> {
        self.actors.get(id)
    }

    pub fn current_branch(&self) -> Result<String> {
        self.backend.adapter().current_branch()
    }

    /// The range used when a caller does not name one: the whole current branch
    pub fn default_range(&self) -> Result<RangeSpec> {
        Ok(RangeSpec::Ref(self.current_branch()?))
    }

    /// Resolves a ref name to a commit identifier, memoizing the answer
    pub fn resolve_ref(&mut self, name: &str) -> Result<CommitId> {
        if self.backend.adapter().is_commit_id(name) {
            return Ok(name.to_string());
        }
        if let Some(id) = self.refs.get(name) {
            return Ok(id.clone());
        }

        let id = self.backend.adapter().resolve_ref(name)?;
        debug!("resolved '{name}' to {id}");
        self.refs.insert(name.to_string(), id.clone());
        Ok(id)
    }

    /// Resolves both bounds of `range` to commit identifiers
    pub fn resolve(&mut self, range: &RangeSpec) -> Result<ResolvedRange> {
        let from = match range.lower() {
            Some(from) => Some(self.resolve_ref(from)?),
            None => None,
        };
        let to = self.resolve_ref(range.upper())?;
        Ok(ResolvedRange { from, to })
    }

    /// All commits of `range`, newest first.
    ///
    /// Commits that are already cached are reused; only the missing parts of
    /// the range are fetched from the backend.
    pub fn commits(&mut self, range: impl Into<RangeSpec>) -> Result<CommitCollection> {
        let range = self.resolve(&range.into())?;
        let commits = self.load_range(&range)?;
        Ok(CommitCollection::from_commits(Rc::clone(&self.backend), commits))
    }

    pub fn authors(&mut self, range: impl Into<RangeSpec>) -> Result<ActorCollection> {
        Ok(self.commits(range)?.authors())
    }

    pub fn committers(&mut self, range: impl Into<RangeSpec>) -> Result<ActorCollection> {
        Ok(self.commits(range)?.committers())
    }

    /// The `count` authors that changed the most lines in `range`
    pub fn significant_authors(&mut self, range: impl Into<RangeSpec>, count: usize) -> Result<ActorCollection> {
        self.backend.support(Feature::LineStats)?;
        self.authors(range)?.most_significant(count)
    }

    /// The `count` commits that changed the most lines in `range`
    pub fn significant_commits(&mut self, range: impl Into<RangeSpec>, count: usize) -> Result<CommitCollection> {
        self.backend.support(Feature::LineStats)?;
        self.commits(range)?.most_significant(count)
    }

    /// The `count` authors with the most commits in `range`
    pub fn top_authors(&mut self, range: impl Into<RangeSpec>, count: usize) -> Result<ActorCollection> {
        Ok(self.authors(range)?.top(count))
    }

    /// Changed lines of every commit in `range`, oldest first
    pub fn line_history(&mut self, range: impl Into<RangeSpec>) -> Result<LineHistory> {
        self.backend.support(Feature::LineStats)?;
        let commits = self.commits(range)?;
        commits.load_line_stats()?;

        let mut history = LineHistory::default();
        for commit in commits.iter().rev() {
            let stats = commit.line_stats()?;
            history.additions.push(stats.additions as i64);
            history.deletions.push(-(stats.deletions as i64));
        }
        Ok(history)
    }

    /// Per-path change dates and modification counts over `range`
    pub fn file_stats(&mut self, range: impl Into<RangeSpec>) -> Result<BTreeMap<String, FileStat>> {
        self.backend.support(Feature::FileStats)?;
        let commits = self.commits(range)?;

        let mut stats: BTreeMap<String, FileStat> = BTreeMap::new();
        for commit in commits.iter().rev() {
            let date = commit.authored_date();
            let files = commit.file_stats()?;
            for path in &files.added {
                let stat = stats.entry(path.clone()).or_default();
                stat.added_date = Some(date);
                stat.modifications += 1;
            }
            for path in &files.modified {
                let stat = stats.entry(path.clone()).or_default();
                stat.last_modified_date = Some(date);
                stat.modifications += 1;
            }
            for path in &files.deleted {
                stats.entry(path.clone()).or_default().deleted_date = Some(date);
            }
        }
        Ok(stats)
    }

    /// Branch names and the commits they point to. Every branch is remembered as a resolved ref.
    pub fn branches(&mut self) -> Result<RefMap> {
        let branches = self.backend.adapter().list_branches()?;
        self.remember_refs(&branches);
        Ok(branches)
    }

    /// Tag names and the commits they point to. Every tag is remembered as a resolved ref.
    pub fn tags(&mut self) -> Result<RefMap> {
        let tags = self.backend.adapter().list_tags()?;
        self.remember_refs(&tags);
        Ok(tags)
    }

    fn remember_refs(&mut self, refs: &RefMap) {
        for (name, id) in refs {
            self.refs.entry(name.clone()).or_insert_with(|| id.clone());
        }
    }

    /// The project name, loaded from the backend on first use
    pub fn name(&self) -> Result<&str> {
        Ok(&self.metadata()?.name)
    }

    /// The project description, loaded from the backend on first use
    pub fn description(&self) -> Result<&str> {
        Ok(&self.metadata()?.description)
    }

    fn metadata(&self) -> Result<&ProjectMetadata> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(metadata);
        }
        let metadata = self.backend.adapter().project_metadata()?;
        Ok(self.metadata.get_or_init(|| metadata))
    }

    /// Collects the commits of a resolved range, fetching whatever the cache cannot answer
    fn load_range(&mut self, range: &ResolvedRange) -> Result<Vec<Rc<Commit>>> {
        if range.from.as_ref() == Some(&range.to) {
            return Ok(Vec::new());
        }

        if self.commits.contains_key(&range.to) {
            debug!("cache hit for {}", range.to);
        } else {
            // 1. Nothing cached below `to`: fetch everything above the newest cached descendant of `from`
            let lower = match &range.from {
                Some(from) => Some(self.newest_cached_descendant(from).unwrap_or_else(|| from.clone())),
                None => None,
            };
            debug!("cache miss for {}, fetching from {:?}", range.to, lower);
            self.fetch(lower.as_deref(), &range.to)?;
            if !self.commits.contains_key(&range.to) {
                return Ok(Vec::new());
            }
        }

        // 2. Walk the cached graph, filling gaps with residual fetches
        let uncached_from = range.from.as_ref().filter(|from| !self.commits.contains_key(*from));
        let mut commits = self.walk_range(range)?;

        // 3. Without the lower bound its ancestors cannot be told apart, so walk again once it is known
        if let Some(from) = uncached_from {
            if !self.commits.contains_key(from) {
                debug!("lower bound {from} is not cached, fetching {range}");
                self.fetch(Some(from.as_str()), &range.to)?;
            }
            commits = self.walk_range(range)?;
        }

        commits.sort_by(|a, b| b.committed_date().cmp(&a.committed_date()));
        Ok(commits)
    }

    /// Commits reachable from `range.to` through the cache, with one residual fetch per boundary commit
    fn walk_range(&mut self, range: &ResolvedRange) -> Result<Vec<Rc<Commit>>> {
        let mut excluded = self.excluded_by(range);
        let mut walk = Walk::default();
        let mut roots = vec![range.to.clone()];
        loop {
            self.walk_cached(range, &excluded, roots.drain(..), &mut walk);
            if walk.missing.is_empty() {
                break;
            }

            for boundary in std::mem::take(&mut walk.boundaries) {
                if self.has_missing_parents(&boundary, &walk.missing) {
                    debug!("residual fetch below {boundary}");
                    self.fetch(range.from.as_deref(), &boundary)?;
                }
            }
            excluded = self.excluded_by(range);

            for missing in std::mem::take(&mut walk.missing) {
                if self.commits.contains_key(&missing) {
                    walk.seen.remove(&missing);
                    roots.push(missing);
                } else if let Some(from) = &range.from {
                    // `missing` is an ancestor of the lower bound
                    self.hidden.entry(from.clone()).or_default().insert(missing);
                } else {
                    warn!("commit {missing} is not available from the {} backend", self.vcs());
                }
            }
        }
        Ok(walk.found)
    }

    fn has_missing_parents(&self, id: &str, missing: &[CommitId]) -> bool {
        self.commits.get(id).is_some_and(|commit| {
            commit
                .parents()
                .iter()
                .any(|parent| missing.contains(parent) && !self.commits.contains_key(parent))
        })
    }

    /// Walks from `roots` to older commits through the cache.
    ///
    /// Stops at `excluded` commits and at commits known to lie below the lower
    /// bound. Parents that are not cached are recorded as missing, and their
    /// cached children as boundaries.
    fn walk_cached(
        &self,
        range: &ResolvedRange,
        excluded: &HashSet<CommitId>,
        roots: impl IntoIterator<Item = CommitId>,
        walk: &mut Walk,
    ) {
        let hidden = range.from.as_ref().and_then(|from| self.hidden.get(from));
        let skipped = |id: &CommitId| excluded.contains(id) || hidden.is_some_and(|hidden| hidden.contains(id));
        let mut queue: VecDeque<CommitId> = roots.into_iter().collect();

        while let Some(id) = queue.pop_front() {
            if skipped(&id) || !walk.seen.insert(id.clone()) {
                continue;
            }
            let Some(commit) = self.commits.get(&id) else {
                walk.missing.push(id);
                continue;
            };
            walk.found.push(Rc::clone(commit));
            let parents = commit.parents();
            if parents.iter().any(|parent| !skipped(parent) && !self.commits.contains_key(parent)) {
                walk.boundaries.push(id);
            }
            queue.extend(parents.iter().cloned());
        }
    }

    /// The lower bound of `range` and every commit reachable from it through cached parent links
    fn excluded_by(&self, range: &ResolvedRange) -> HashSet<CommitId> {
        let Some(from) = range.from.as_deref() else {
            return HashSet::new();
        };
        let mut ancestors = HashSet::from([from.to_string()]);
        let mut queue: VecDeque<&str> = VecDeque::from([from]);
        while let Some(id) = queue.pop_front() {
            let Some(commit) = self.commits.get(id) else {
                continue;
            };
            for parent in commit.parents() {
                if ancestors.insert(parent.clone()) {
                    queue.push_back(parent);
                }
            }
        }
        ancestors
    }

    /// The most recently committed cached descendant of `from`, following child links
    fn newest_cached_descendant(&self, from: &str) -> Option<CommitId> {
        let start = self.commits.get(from)?;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&Rc<Commit>> = VecDeque::from([start]);
        let mut newest: Option<&Rc<Commit>> = None;

        while let Some(commit) = queue.pop_front() {
            for child in commit.children() {
                let Some(child) = self.commits.get(&child) else {
                    continue;
                };
                if !seen.insert(child.id()) {
                    continue;
                }
                if newest.map_or(true, |n| child.committed_date() > n.committed_date()) {
                    newest = Some(child);
                }
                queue.push_back(child);
            }
        }
        newest.map(|commit| commit.id().to_string())
    }

    /// Fetches `(from, to]` from the backend and adds the result to the cache
    fn fetch(&mut self, from: Option<&str>, to: &str) -> Result<()> {
        info!("fetching {}..{to} from the {} backend", from.unwrap_or(""), self.vcs());
        let batch = self.backend.adapter().fetch_commits(from, to)?;
        debug!("received {} commits", batch.commits.len());

        let built = self.build_commits(batch.commits);
        if let Some(base) = batch.base {
            self.build_commit(base);
        }

        // parents still unknown after a bounded fetch lie below the bound
        if let Some(from) = from {
            let below: Vec<CommitId> = built
                .iter()
                .flat_map(|commit| commit.parents())
                .filter(|parent| !self.commits.contains_key(*parent))
                .cloned()
                .collect();
            self.hidden.entry(from.to_string()).or_default().extend(below);
        }
        Ok(())
    }

    /// Turns a newest-first batch of raw commits into cached entities
    fn build_commits(&mut self, raw: Vec<RawCommit>) -> Vec<Rc<Commit>> {
        raw.into_iter().map(|raw| self.build_commit(raw)).collect()
    }

    /// Builds and caches a single commit, or returns the cached one with the same identifier
    fn build_commit(&mut self, raw: RawCommit) -> Rc<Commit> {
        if let Some(commit) = self.commits.get(&raw.id) {
            return Rc::clone(commit);
        }

        let author = self.actor_for(&raw.author);
        let committer = self.actor_for(&raw.committer);
        let commit = Rc::new(Commit::new(raw, Rc::clone(&author), Rc::clone(&committer), Rc::clone(&self.backend)));
        author.add_authored(&commit);
        committer.add_committed(&commit);

        for parent in commit.parents() {
            match self.commits.get(parent) {
                Some(parent) => parent.add_child(commit.id()),
                None => self.pending_children.entry(parent.clone()).or_default().push(commit.id().to_string()),
            }
        }
        if let Some(children) = self.pending_children.remove(commit.id()) {
            for child in &children {
                commit.add_child(child);
            }
        }

        self.commits.insert(commit.id().to_string(), Rc::clone(&commit));
        commit
    }

    /// The cached actor for `raw`, created on first sight
    fn actor_for(&mut self, raw: &RawActor) -> Rc<Actor> {
        let backend = &self.backend;
        Rc::clone(
            self.actors
                .entry(raw.id.clone())
                .or_insert_with(|| Rc::new(Actor::new(raw, Rc::clone(backend)))),
        )
    }
}
