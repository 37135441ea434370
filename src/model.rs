// src/model.rs

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Uniquely identifies a commit within a backend, e.g. a SHA-1 hex string
pub type CommitId = String;

/// Uniquely identifies an actor within a backend, e.g. an email or a login
pub type ActorId = String;

/// Maps ref names (branches, tags) to the commit they point to
pub type RefMap = BTreeMap<String, CommitId>;

/// An author or committer as reported by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawActor {
    pub id: ActorId,
    pub name: String,
    pub email: Option<String>,
}

/// Lines added and deleted by a single commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub additions: u64,
    pub deletions: u64,
}

impl LineStats {
    pub fn new(additions: u64, deletions: u64) -> Self {
        Self { additions, deletions }
    }

    pub fn modifications(self) -> u64 {
        self.additions + self.deletions
    }
}

impl std::ops::Add for LineStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            additions: self.additions + rhs.additions,
            deletions: self.deletions + rhs.deletions,
        }
    }
}

/// The kind of change a commit applied to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// A single path touched by a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub kind: ChangeKind,
    pub path: String,
}

/// Paths touched by a commit, split by kind of change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStats {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl FileStats {
    pub fn from_changes(changes: impl IntoIterator<Item = FileChange>) -> Self {
        let mut stats = Self::default();
        for change in changes {
            match change.kind {
                ChangeKind::Added => stats.added.push(change.path),
                ChangeKind::Modified => stats.modified.push(change.path),
                ChangeKind::Deleted => stats.deleted.push(change.path),
            }
        }
        stats
    }

    /// Every path touched, added first, then modified, then deleted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(&self.modified)
            .chain(&self.deleted)
            .map(String::as_str)
    }
}

/// A commit record as delivered by a backend, before it enters the cache
#[derive(Debug, Clone)]
pub struct RawCommit {
    pub id: CommitId,
    pub parents: Vec<CommitId>,
    pub author: RawActor,
    pub committer: RawActor,
    pub authored_date: DateTime<Utc>,
    pub committed_date: DateTime<Utc>,
    pub message: String,
    /// Present when the backend delivers file changes together with the commit
    pub file_changes: Option<Vec<FileChange>>,
    /// Present when the backend delivers line counts together with the commit
    pub line_stats: Option<LineStats>,
}

/// The answer to a single history fetch, newest commit first
#[derive(Debug, Default)]
pub struct CommitBatch {
    /// The exclusive lower bound of the fetched range, absent at the root of history
    pub base: Option<RawCommit>,
    pub commits: Vec<RawCommit>,
}

/// Project name and description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: String,
    pub description: String,
}
