use serde::Serialize;
use std::collections::HashSet;

/// Set of selected file paths, iterated in insertion order.
///
/// Per-file generation creates units in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.members.contains(path)
    }

    /// Returns false when already present
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.members.contains(&path) {
            return false;
        }
        self.members.insert(path.clone());
        self.order.push(path);
        true
    }

    pub fn remove(&mut self, path: &str) -> bool {
        if !self.members.remove(path) {
            return false;
        }
        self.order.retain(|p| p != path);
        true
    }

    /// Remove many paths in one pass
    pub fn remove_all<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) {
        let mut removed = false;
        for path in paths {
            removed |= self.members.remove(path);
        }
        if removed {
            let members = &self.members;
            self.order.retain(|p| members.contains(p));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

impl Serialize for SelectionSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.order.serialize(serializer)
    }
}
