// src/collections/actor_collection.rs

use super::collection::Collection;
use super::commit_collection::CommitCollection;
use crate::actor::Actor;
use crate::adapter::Backend;
use crate::error::Result;
use crate::features::Feature;
use crate::model::CommitId;
use indexmap::map::Values;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// An ordered set of actors.
///
/// A collection taken from a [`CommitCollection`] remembers which commits it
/// came from and only counts those when ranking or listing commits.
#[derive(Clone)]
pub struct ActorCollection {
    actors: Collection<Actor>,
    backend: Rc<Backend>,
    scope: Option<Rc<HashSet<CommitId>>>,
}

#[derive(Clone, Copy)]
enum Role {
    Author,
    Committer,
}

impl ActorCollection {
    pub fn new(backend: Rc<Backend>) -> Self {
        Self {
            actors: Collection::new(),
            backend,
            scope: None,
        }
    }

    pub(crate) fn scoped(
        backend: Rc<Backend>,
        actors: impl IntoIterator<Item = Rc<Actor>>,
        scope: Rc<HashSet<CommitId>>,
    ) -> Self {
        Self {
            actors: actors.into_iter().collect(),
            backend,
            scope: Some(scope),
        }
    }

    fn derive(&self, actors: impl IntoIterator<Item = Rc<Actor>>) -> Self {
        Self {
            actors: actors.into_iter().collect(),
            backend: Rc::clone(&self.backend),
            scope: self.scope.clone(),
        }
    }

    pub fn add(&mut self, actor: Rc<Actor>) -> bool {
        self.actors.add(actor)
    }

    pub fn merge(&mut self, other: &ActorCollection) {
        self.actors.merge(&other.actors);
    }

    pub fn get(&self, id: &str) -> Option<&Rc<Actor>> {
        self.actors.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actors.contains(id)
    }

    pub fn first(&self) -> Option<&Rc<Actor>> {
        self.actors.first()
    }

    pub fn last(&self) -> Option<&Rc<Actor>> {
        self.actors.last()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn iter(&self) -> Values<'_, String, Rc<Actor>> {
        self.actors.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.actors.ids()
    }

    pub fn all(&self, predicate: impl FnMut(&Rc<Actor>) -> bool) -> bool {
        self.actors.all(predicate)
    }

    /// Commits authored by all actors, or only by `actor_id` when given
    pub fn authored_commits(&self, actor_id: Option<&str>) -> CommitCollection {
        self.commits(Role::Author, actor_id)
    }

    /// Commits committed by all actors, or only by `actor_id` when given
    pub fn committed_commits(&self, actor_id: Option<&str>) -> CommitCollection {
        self.commits(Role::Committer, actor_id)
    }

    fn commits(&self, role: Role, actor_id: Option<&str>) -> CommitCollection {
        let mut commits = CommitCollection::new(Rc::clone(&self.backend));
        let actors: Vec<&Rc<Actor>> = match actor_id {
            Some(id) => self.get(id).into_iter().collect(),
            None => self.iter().collect(),
        };
        for actor in actors {
            commits.merge(&self.commits_of(actor, role));
        }
        commits
    }

    fn commits_of(&self, actor: &Actor, role: Role) -> CommitCollection {
        let commits = match role {
            Role::Author => actor.authored_commits(),
            Role::Committer => actor.committed_commits(),
        };
        match &self.scope {
            Some(scope) => commits.filter(|commit| scope.contains(commit.id())),
            None => commits,
        }
    }

    /// Up to `count` actors whose authored commits changed the most lines, biggest first
    pub fn most_significant(&self, count: usize) -> Result<Self> {
        self.backend.support(Feature::LineStats)?;
        // one backend round trip for every commit involved
        self.authored_commits(None).load_line_stats()?;

        let mut ranked = self
            .iter()
            .map(|actor| Ok((self.commits_of(actor, Role::Author).modifications()?, Rc::clone(actor))))
            .collect::<Result<Vec<_>>>()?;
        ranked.sort_by(|(a, _), (b, _)| b.cmp(a));
        Ok(self.derive(ranked.into_iter().take(count).map(|(_, actor)| actor)))
    }

    /// Up to `count` actors with the most authored commits, most active first
    pub fn top(&self, count: usize) -> Self {
        let mut ranked: Vec<(usize, Rc<Actor>)> = self
            .iter()
            .map(|actor| (self.commits_of(actor, Role::Author).len(), Rc::clone(actor)))
            .collect();
        ranked.sort_by(|(a, _), (b, _)| b.cmp(a));
        self.derive(ranked.into_iter().take(count).map(|(_, actor)| actor))
    }
}

impl<'a> IntoIterator for &'a ActorCollection {
    type Item = &'a Rc<Actor>;
    type IntoIter = Values<'a, String, Rc<Actor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for ActorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCollection")
            .field("vcs", &self.backend.vcs())
            .field("actors", &self.actors)
            .field("scoped", &self.scope.is_some())
            .finish()
    }
}
