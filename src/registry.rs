//! Named attachment of entry sets.
//!
//! The system this crate serves historically attached every set to an
//! ambient global directory on construction, so consumers could look a
//! selection up by name. Here attachment is explicit: an owner that wants
//! lookup-by-name registers the set with a [`Registry`] of its choice, and
//! the set itself never reaches into any global state.

use crate::set::EntrySet;
use std::collections::BTreeMap;

/// Where named sets live. Implementations own the sets attached to them.
pub trait Registry {
    /// Attach `set` under `name`. Any set previously attached under that
    /// name is replaced and returned.
    fn attach(&mut self, name: &str, set: EntrySet) -> Option<EntrySet>;

    /// Detach and return the set attached under `name`.
    fn detach(&mut self, name: &str) -> Option<EntrySet>;

    /// Borrow the set attached under `name`.
    fn get(&self, name: &str) -> Option<&EntrySet>;

    /// Mutably borrow the set attached under `name`.
    fn get_mut(&mut self, name: &str) -> Option<&mut EntrySet>;
}

/// An in-memory registry keyed by name, iterating in name order.
#[derive(Debug, Default)]
pub struct Directory {
    sets: BTreeMap<String, EntrySet>,
}

impl Directory {
    /// Construct a new, empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Show if no sets are attached.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Move the set attached under `from` to the name `to`, replacing any
    /// set already attached there. Returns `false` when `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.sets.remove(from) {
            Some(set) => {
                self.sets.insert(to.to_string(), set);
                true
            }
            None => false,
        }
    }

    /// Iterate the attached names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Iterate the attached sets in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntrySet)> {
        self.sets.iter().map(|(name, set)| (name.as_str(), set))
    }
}

impl Registry for Directory {
    fn attach(&mut self, name: &str, set: EntrySet) -> Option<EntrySet> {
        self.sets.insert(name.to_string(), set)
    }

    fn detach(&mut self, name: &str) -> Option<EntrySet> {
        self.sets.remove(name)
    }

    fn get(&self, name: &str) -> Option<&EntrySet> {
        self.sets.get(name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut EntrySet> {
        self.sets.get_mut(name)
    }
}
