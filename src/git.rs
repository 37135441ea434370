// src/git.rs

use crate::adapter::Adapter;
use crate::error::{Error, Result};
use crate::features::FeatureSet;
use crate::model::*;
use chrono::{DateTime, TimeZone, Utc};
use git2::{BranchType, Delta, Diff, DiffFindOptions, DiffOptions, ErrorCode, Oid, Repository, Signature, Sort};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads history from a local git repository through libgit2
pub struct GitAdapter {
    repo: Repository,
}

impl GitAdapter {
    pub const VCS: &'static str = "git";

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::open(path.as_ref())?;
        debug!("opened git repository at {}", repo.path().display());
        Ok(Self { repo })
    }

    fn find_commit(&self, id: &str) -> Result<git2::Commit<'_>> {
        Ok(self.repo.find_commit(Oid::from_str(id)?)?)
    }

    /// Diff of `commit` against its first parent, or `None` for merge commits
    fn first_parent_diff(&self, commit: &git2::Commit<'_>) -> Result<Option<Diff<'_>>> {
        if commit.parent_count() > 1 {
            return Ok(None);
        }
        let parent_tree = if commit.parent_count() == 0 {
            None
        } else {
            Some(commit.parent(0)?.tree()?)
        };
        let tree = commit.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.include_untracked(false);
        diff_opts.ignore_filemode(true);

        let diff = self.repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_opts))?;
        Ok(Some(diff))
    }
}

impl Adapter for GitAdapter {
    fn vcs(&self) -> &'static str {
        Self::VCS
    }

    fn supported_features(&self) -> FeatureSet {
        FeatureSet::FILE_STATS | FeatureSet::LINE_STATS
    }

    fn resolve_ref(&self, name: &str) -> Result<CommitId> {
        let not_found = |e: git2::Error| match e.code() {
            ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous | ErrorCode::Peel => {
                Error::RefNotFound(name.to_string())
            }
            _ => Error::Git(e),
        };
        let commit = self
            .repo
            .revparse_single(name)
            .and_then(|object| object.peel_to_commit())
            .map_err(not_found)?;
        Ok(commit.id().to_string())
    }

    fn fetch_commits(&self, from: Option<&str>, to: &str) -> Result<CommitBatch> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(Oid::from_str(to)?)?;
        if let Some(from) = from {
            revwalk.hide(Oid::from_str(from)?)?;
        }

        let mut batch = CommitBatch::default();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            batch.commits.push(raw_commit(&commit));
        }
        if let Some(from) = from {
            batch.base = Some(raw_commit(&self.find_commit(from)?));
        }
        Ok(batch)
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(name.to_string());
            }
        }
        // detached HEAD
        head.target()
            .map(|oid| oid.to_string())
            .ok_or_else(|| Error::RefNotFound("HEAD".to_string()))
    }

    fn list_branches(&self) -> Result<RefMap> {
        let mut branches = RefMap::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()? else {
                continue;
            };
            if let Some(target) = branch.get().target() {
                branches.insert(name.to_string(), target.to_string());
            }
        }
        Ok(branches)
    }

    fn list_tags(&self) -> Result<RefMap> {
        let mut tags = RefMap::new();
        for name in self.repo.tag_names(None)?.iter().flatten() {
            let target = self
                .repo
                .revparse_single(&format!("refs/tags/{name}"))
                .and_then(|object| object.peel_to_commit());
            match target {
                Ok(commit) => {
                    tags.insert(name.to_string(), commit.id().to_string());
                }
                Err(e) => debug!("skipping tag {name}: {e}"),
            }
        }
        Ok(tags)
    }

    /// Name and description from the first and remaining lines of `GIT_DIR/description`
    fn project_metadata(&self) -> Result<ProjectMetadata> {
        let path = self.repo.path().join("description");
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ProjectMetadata::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(parse_description(&text))
    }

    fn load_line_stats(&self, ids: &[CommitId]) -> Result<HashMap<CommitId, LineStats>> {
        let mut stats = HashMap::with_capacity(ids.len());
        for id in ids {
            let commit = self.find_commit(id)?;
            let line_stats = match self.first_parent_diff(&commit)? {
                Some(diff) => {
                    let diff_stats = diff.stats()?;
                    LineStats::new(diff_stats.insertions() as u64, diff_stats.deletions() as u64)
                }
                None => LineStats::default(),
            };
            stats.insert(id.clone(), line_stats);
        }
        Ok(stats)
    }

    fn load_file_stats(&self, id: &str) -> Result<FileStats> {
        let commit = self.find_commit(id)?;
        let Some(mut diff) = self.first_parent_diff(&commit)? else {
            return Ok(FileStats::default());
        };
        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        let mut changes = Vec::new();
        for delta in diff.deltas() {
            let old_path = delta.old_file().path().map(|p| p.to_string_lossy().into_owned());
            let new_path = delta.new_file().path().map(|p| p.to_string_lossy().into_owned());
            let change = |kind, path: Option<String>| path.map(|path| FileChange { kind, path });

            match delta.status() {
                Delta::Added | Delta::Copied => changes.extend(change(ChangeKind::Added, new_path)),
                Delta::Deleted => changes.extend(change(ChangeKind::Deleted, old_path)),
                Delta::Modified | Delta::Typechange => changes.extend(change(ChangeKind::Modified, new_path)),
                Delta::Renamed => {
                    changes.extend(change(ChangeKind::Added, new_path));
                    changes.extend(change(ChangeKind::Deleted, old_path));
                }
                _ => {}
            }
        }
        Ok(FileStats::from_changes(changes))
    }
}

fn raw_commit(commit: &git2::Commit<'_>) -> RawCommit {
    let author = commit.author();
    let committer = commit.committer();
    RawCommit {
        id: commit.id().to_string(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        author: raw_actor(&author),
        committer: raw_actor(&committer),
        authored_date: timestamp(author.when()),
        committed_date: timestamp(committer.when()),
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        file_changes: None,
        line_stats: None,
    }
}

/// Git actors are identified by their email address
fn raw_actor(signature: &Signature<'_>) -> RawActor {
    let name = signature.name().unwrap_or("Unknown").to_string();
    let email = signature.email().map(str::to_string);
    RawActor {
        id: email.clone().unwrap_or_else(|| name.clone()),
        name,
        email,
    }
}

fn timestamp(time: git2::Time) -> DateTime<Utc> {
    Utc.timestamp_opt(time.seconds(), 0).single().unwrap_or_default()
}

fn parse_description(text: &str) -> ProjectMetadata {
    // placeholder written by `git init`
    if text.starts_with("Unnamed repository") {
        return ProjectMetadata::default();
    }
    let mut lines = text.lines();
    let name = lines.next().unwrap_or("").trim().to_string();
    let description = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    ProjectMetadata { name, description }
}
