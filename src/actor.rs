// src/actor.rs

use crate::adapter::Backend;
use crate::collections::{CommitCollection, Identify};
use crate::commit::Commit;
use crate::error::Result;
use crate::model::{ActorId, RawActor};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// An author or committer of commits in a repository.
///
/// The commit lists hold weak links; the repository's commit cache owns the
/// commits, so an actor never keeps a commit alive on its own.
pub struct Actor {
    id: ActorId,
    name: String,
    email: Option<String>,
    authored: RefCell<Vec<Weak<Commit>>>,
    committed: RefCell<Vec<Weak<Commit>>>,
    backend: Rc<Backend>,
}

impl Actor {
    pub(crate) fn new(raw: &RawActor, backend: Rc<Backend>) -> Self {
        Self {
            id: raw.id.clone(),
            name: raw.name.clone(),
            email: raw.email.clone(),
            authored: RefCell::new(Vec::new()),
            committed: RefCell::new(Vec::new()),
            backend,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub(crate) fn add_authored(&self, commit: &Rc<Commit>) {
        self.authored.borrow_mut().push(Rc::downgrade(commit));
    }

    pub(crate) fn add_committed(&self, commit: &Rc<Commit>) {
        self.committed.borrow_mut().push(Rc::downgrade(commit));
    }

    /// Every cached commit authored by this actor, newest first.
    ///
    /// This includes lower-bound commits a fetch delivered only to mark the
    /// end of a range, which no queried range contains.
    pub fn authored_commits(&self) -> CommitCollection {
        collect(&self.authored, &self.backend)
    }

    /// Every cached commit committed by this actor, newest first. Includes lower-bound commits as well.
    pub fn committed_commits(&self) -> CommitCollection {
        collect(&self.committed, &self.backend)
    }

    pub fn additions(&self) -> Result<u64> {
        self.authored_commits().additions()
    }

    pub fn deletions(&self) -> Result<u64> {
        self.authored_commits().deletions()
    }

    pub fn modifications(&self) -> Result<u64> {
        Ok(self.additions()? + self.deletions()?)
    }
}

fn collect(commits: &RefCell<Vec<Weak<Commit>>>, backend: &Rc<Backend>) -> CommitCollection {
    let mut live: Vec<Rc<Commit>> = commits.borrow().iter().filter_map(Weak::upgrade).collect();
    // commits of later fetches may be older than earlier ones
    live.sort_by(|a, b| b.committed_date().cmp(&a.committed_date()));
    CommitCollection::from_commits(Rc::clone(backend), live)
}

impl Identify for Actor {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("authored", &self.authored.borrow().len())
            .field("committed", &self.committed.borrow().len())
            .finish_non_exhaustive()
    }
}
