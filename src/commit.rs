// src/commit.rs

use crate::actor::Actor;
use crate::adapter::Backend;
use crate::collections::Identify;
use crate::error::Result;
use crate::features::Feature;
use crate::model::*;
use chrono::{DateTime, Utc};
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A commit in the cached history graph.
///
/// Everything but the child links and the lazily loaded stats is fixed at
/// construction. The lazy fields are filled at most once, either from the raw
/// record or on first access through the backend.
pub struct Commit {
    id: CommitId,
    parents: Vec<CommitId>,
    children: RefCell<Vec<CommitId>>,
    author: Rc<Actor>,
    committer: Rc<Actor>,
    authored_date: DateTime<Utc>,
    committed_date: DateTime<Utc>,
    message: String,
    line_stats: OnceCell<LineStats>,
    file_stats: OnceCell<FileStats>,
    backend: Rc<Backend>,
}

impl Commit {
    pub(crate) fn new(raw: RawCommit, author: Rc<Actor>, committer: Rc<Actor>, backend: Rc<Backend>) -> Self {
        let line_stats = raw.line_stats.map(OnceCell::from).unwrap_or_default();
        let file_stats = raw
            .file_changes
            .map(|changes| OnceCell::from(FileStats::from_changes(changes)))
            .unwrap_or_default();

        Self {
            id: raw.id,
            parents: raw.parents,
            children: RefCell::new(Vec::new()),
            author,
            committer,
            authored_date: raw.authored_date,
            committed_date: raw.committed_date,
            message: raw.message,
            line_stats,
            file_stats,
            backend,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parents(&self) -> &[CommitId] {
        &self.parents
    }

    /// Identifiers of the cached commits that list this commit as a parent
    pub fn children(&self) -> Vec<CommitId> {
        self.children.borrow().clone()
    }

    pub(crate) fn add_child(&self, child: &str) {
        let mut children = self.children.borrow_mut();
        if !children.iter().any(|c| c == child) {
            children.push(child.to_string());
        }
    }

    pub fn author(&self) -> &Rc<Actor> {
        &self.author
    }

    pub fn committer(&self) -> &Rc<Actor> {
        &self.committer
    }

    pub fn authored_date(&self) -> DateTime<Utc> {
        self.authored_date
    }

    pub fn committed_date(&self) -> DateTime<Utc> {
        self.committed_date
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The first line of the commit message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn backend(&self) -> &Rc<Backend> {
        &self.backend
    }

    pub fn line_stats_loaded(&self) -> bool {
        self.line_stats.get().is_some()
    }

    pub fn file_stats_loaded(&self) -> bool {
        self.file_stats.get().is_some()
    }

    /// Line counts of this commit, loading them from the backend on first use
    pub fn line_stats(&self) -> Result<LineStats> {
        self.backend.support(Feature::LineStats)?;
        if let Some(stats) = self.line_stats.get() {
            return Ok(*stats);
        }

        let loaded = self.backend.adapter().load_line_stats(std::slice::from_ref(&self.id))?;
        let stats = loaded.get(&self.id).copied().unwrap_or_default();
        Ok(*self.line_stats.get_or_init(|| stats))
    }

    /// Stores line counts loaded in bulk. Already loaded values are kept.
    pub(crate) fn set_line_stats(&self, stats: LineStats) {
        self.line_stats.get_or_init(|| stats);
    }

    pub fn additions(&self) -> Result<u64> {
        Ok(self.line_stats()?.additions)
    }

    pub fn deletions(&self) -> Result<u64> {
        Ok(self.line_stats()?.deletions)
    }

    /// Total of changed lines, i.e. additions plus deletions
    pub fn modifications(&self) -> Result<u64> {
        Ok(self.line_stats()?.modifications())
    }

    /// Paths touched by this commit, loading them from the backend on first use
    pub fn file_stats(&self) -> Result<&FileStats> {
        self.backend.support(Feature::FileStats)?;
        if let Some(stats) = self.file_stats.get() {
            return Ok(stats);
        }

        let stats = self.backend.adapter().load_file_stats(&self.id)?;
        Ok(self.file_stats.get_or_init(|| stats))
    }

    pub fn added_files(&self) -> Result<&[String]> {
        Ok(&self.file_stats()?.added)
    }

    pub fn modified_files(&self) -> Result<&[String]> {
        Ok(&self.file_stats()?.modified)
    }

    pub fn deleted_files(&self) -> Result<&[String]> {
        Ok(&self.file_stats()?.deleted)
    }
}

impl Identify for Commit {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Debug for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commit")
            .field("id", &self.id)
            .field("author", &self.author.id())
            .field("committer", &self.committer.id())
            .field("committed_date", &self.committed_date)
            .field("subject", &self.subject())
            .finish_non_exhaustive()
    }
}
