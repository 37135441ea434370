// src/collections/collection.rs

use indexmap::map::Values;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Entities that carry a stable identity within a repository
pub trait Identify {
    fn id(&self) -> &str;
}

/// An insertion-ordered set of shared entities keyed by their identifier.
///
/// Adding an entity whose identifier is already present keeps the existing
/// entry and its position.
pub struct Collection<T> {
    items: IndexMap<String, Rc<T>>,
}

impl<T: Identify> Collection<T> {
    pub fn new() -> Self {
        Self { items: IndexMap::new() }
    }

    /// Adds `item` unless its identifier is already known. Returns whether it was inserted.
    pub fn add(&mut self, item: Rc<T>) -> bool {
        if self.items.contains_key(item.id()) {
            return false;
        }
        self.items.insert(item.id().to_string(), item);
        true
    }

    /// Appends every entity of `other` that is not yet present, in `other`'s order
    pub fn merge(&mut self, other: &Collection<T>) {
        for item in other.iter() {
            self.add(Rc::clone(item));
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rc<T>> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// The entity added first
    pub fn first(&self) -> Option<&Rc<T>> {
        self.items.first().map(|(_, item)| item)
    }

    /// The entity added last
    pub fn last(&self) -> Option<&Rc<T>> {
        self.items.last().map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> Values<'_, String, Rc<T>> {
        self.items.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Whether `predicate` holds for every entity. True for an empty collection.
    pub fn all(&self, predicate: impl FnMut(&Rc<T>) -> bool) -> bool {
        self.items.values().all(predicate)
    }

    /// A new collection with the entities matching `predicate`, order preserved
    pub fn filter(&self, mut predicate: impl FnMut(&Rc<T>) -> bool) -> Self {
        self.iter().filter(|item| predicate(*item)).cloned().collect()
    }
}

impl<T: Identify> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self { items: self.items.clone() }
    }
}

impl<T: Identify> FromIterator<Rc<T>> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = Rc<T>>>(iter: I) -> Self {
        let mut collection = Self::new();
        for item in iter {
            collection.add(item);
        }
        collection
    }
}

impl<T: Identify> Extend<Rc<T>> for Collection<T> {
    fn extend<I: IntoIterator<Item = Rc<T>>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.keys()).finish()
    }
}
