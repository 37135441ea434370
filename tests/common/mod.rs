// tests/common/mod.rs

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use git_census::adapter::Adapter;
use git_census::model::*;
use git_census::{Error, FeatureSet, Repository, Result};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Canonical 40 digit id of the n-th scripted commit
pub fn id(n: u32) -> String {
    format!("{n:040x}")
}

pub fn date(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

/// Adapter calls observed by a test
#[derive(Debug, Default)]
pub struct Calls {
    pub resolves: Cell<usize>,
    pub fetches: RefCell<Vec<(Option<String>, String)>>,
    pub line_stats: Cell<usize>,
    pub file_stats: Cell<usize>,
}

impl Calls {
    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }
}

/// An in-memory history answering fetches with git range semantics
pub struct MockAdapter {
    features: FeatureSet,
    commits: HashMap<CommitId, RawCommit>,
    /// Insertion order, used to break ties between equal timestamps
    order: Vec<CommitId>,
    refs: HashMap<String, CommitId>,
    line_stats: HashMap<CommitId, LineStats>,
    file_stats: HashMap<CommitId, FileStats>,
    calls: Rc<Calls>,
}

impl MockAdapter {
    pub fn new(features: FeatureSet) -> Self {
        Self {
            features,
            commits: HashMap::new(),
            order: Vec::new(),
            refs: HashMap::new(),
            line_stats: HashMap::new(),
            file_stats: HashMap::new(),
            calls: Rc::new(Calls::default()),
        }
    }

    pub fn calls(&self) -> Rc<Calls> {
        Rc::clone(&self.calls)
    }

    /// Adds commit `n` with the given parents, authored and committed at `when`
    pub fn commit(mut self, n: u32, parents: &[u32], author: &str, when: &str) -> Self {
        let actor = RawActor {
            id: format!("{author}@example.com"),
            name: author.to_string(),
            email: Some(format!("{author}@example.com")),
        };
        let raw = RawCommit {
            id: id(n),
            parents: parents.iter().map(|p| id(*p)).collect(),
            author: actor.clone(),
            committer: actor,
            authored_date: date(when),
            committed_date: date(when),
            message: format!("Commit {n}\n\nDetails of commit {n}"),
            file_changes: None,
            line_stats: None,
        };
        self.order.push(raw.id.clone());
        self.commits.insert(raw.id.clone(), raw);
        self
    }

    pub fn lines(mut self, n: u32, additions: u64, deletions: u64) -> Self {
        self.line_stats.insert(id(n), LineStats::new(additions, deletions));
        self
    }

    pub fn files(mut self, n: u32, added: &[&str], modified: &[&str], deleted: &[&str]) -> Self {
        let paths = |paths: &[&str]| paths.iter().map(|p| p.to_string()).collect();
        let stats = FileStats {
            added: paths(added),
            modified: paths(modified),
            deleted: paths(deleted),
        };
        self.file_stats.insert(id(n), stats);
        self
    }

    pub fn with_ref(mut self, name: &str, n: u32) -> Self {
        self.refs.insert(name.to_string(), id(n));
        self
    }

    pub fn into_repository(self) -> (Repository, Rc<Calls>) {
        let calls = self.calls();
        (Repository::new("mock://history", Box::new(self)), calls)
    }

    fn ancestors(&self, start: &str) -> HashSet<CommitId> {
        let mut seen = HashSet::new();
        let mut stack = vec![start.to_string()];
        while let Some(id) = stack.pop() {
            if let Some(commit) = self.commits.get(&id) {
                if seen.insert(id) {
                    stack.extend(commit.parents.iter().cloned());
                }
            }
        }
        seen
    }
}

impl Adapter for MockAdapter {
    fn vcs(&self) -> &'static str {
        "mock"
    }

    fn supported_features(&self) -> FeatureSet {
        self.features
    }

    fn resolve_ref(&self, name: &str) -> Result<CommitId> {
        self.calls.resolves.set(self.calls.resolves.get() + 1);
        self.refs.get(name).cloned().ok_or_else(|| Error::RefNotFound(name.to_string()))
    }

    fn fetch_commits(&self, from: Option<&str>, to: &str) -> Result<CommitBatch> {
        self.calls
            .fetches
            .borrow_mut()
            .push((from.map(str::to_string), to.to_string()));

        let mut wanted = self.ancestors(to);
        if let Some(from) = from {
            for hidden in self.ancestors(from) {
                wanted.remove(&hidden);
            }
        }

        // newest first, later insertions first on equal timestamps
        let mut commits: Vec<RawCommit> = self
            .order
            .iter()
            .rev()
            .filter(|id| wanted.contains(*id))
            .map(|id| self.commits[id].clone())
            .collect();
        commits.sort_by(|a, b| b.committed_date.cmp(&a.committed_date));

        Ok(CommitBatch {
            base: from.and_then(|from| self.commits.get(from)).cloned(),
            commits,
        })
    }

    fn current_branch(&self) -> Result<String> {
        Ok("master".to_string())
    }

    fn list_branches(&self) -> Result<RefMap> {
        Ok(self.refs.iter().map(|(name, id)| (name.clone(), id.clone())).collect())
    }

    fn project_metadata(&self) -> Result<ProjectMetadata> {
        Ok(ProjectMetadata {
            name: "mock".to_string(),
            description: "A scripted history".to_string(),
        })
    }

    fn load_line_stats(&self, ids: &[CommitId]) -> Result<HashMap<CommitId, LineStats>> {
        self.calls.line_stats.set(self.calls.line_stats.get() + 1);
        Ok(ids
            .iter()
            .filter_map(|id| self.line_stats.get(id).map(|stats| (id.clone(), *stats)))
            .collect())
    }

    fn load_file_stats(&self, id: &str) -> Result<FileStats> {
        self.calls.file_stats.set(self.calls.file_stats.get() + 1);
        Ok(self.file_stats.get(id).cloned().unwrap_or_default())
    }
}

/// Five commits on one line, one per day starting 2021-01-01, `master` at the newest
pub fn linear_history(features: FeatureSet) -> MockAdapter {
    MockAdapter::new(features)
        .commit(1, &[], "alice", "2021-01-01T10:00:00Z")
        .commit(2, &[1], "bob", "2021-01-02T10:00:00Z")
        .commit(3, &[2], "alice", "2021-01-03T10:00:00Z")
        .commit(4, &[3], "carol", "2021-01-04T10:00:00Z")
        .commit(5, &[4], "alice", "2021-01-05T10:00:00Z")
        .with_ref("master", 5)
}

/// A branch off 1 merged back by 4:
///
/// ```text
/// 1 - 2 ----- 4 - 5
///  \         /
///   --- 3 ---
/// ```
pub fn merge_history(features: FeatureSet) -> MockAdapter {
    MockAdapter::new(features)
        .commit(1, &[], "alice", "2021-01-01T10:00:00Z")
        .commit(2, &[1], "alice", "2021-01-02T10:00:00Z")
        .commit(3, &[1], "bob", "2021-01-03T10:00:00Z")
        .commit(4, &[2, 3], "alice", "2021-01-04T10:00:00Z")
        .commit(5, &[4], "carol", "2021-01-05T10:00:00Z")
        .with_ref("master", 5)
        .with_ref("feature", 3)
}

/// Two branches sharing only the root:
///
/// ```text
/// 1 - 2 - 3   master
///  \
///   4         side
/// ```
pub fn forked_history(features: FeatureSet) -> MockAdapter {
    MockAdapter::new(features)
        .commit(1, &[], "alice", "2021-01-01T10:00:00Z")
        .commit(2, &[1], "bob", "2021-01-02T10:00:00Z")
        .commit(3, &[2], "alice", "2021-01-03T10:00:00Z")
        .commit(4, &[1], "carol", "2021-01-04T10:00:00Z")
        .with_ref("master", 3)
        .with_ref("side", 4)
}

pub fn ids(commits: &git_census::CommitCollection) -> Vec<String> {
    commits.ids().map(str::to_string).collect()
}
