use std::collections::HashMap;

use super::error::{ElectionError, ElectionResult};

/// An entity keyed by a unique, human-chosen identity.
pub trait Identified {
    fn identity(&self) -> &str;
}

/// Insertion-ordered collection of uniquely identified entities.
///
/// Iteration order is registration order, which the tally relies on for tie-breaking.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Registry<T>
where
    T: Identified,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Insert the entry iff its identity is not already present.
    pub fn insert(&mut self, entry: T) -> ElectionResult<()> {
        if self.contains(entry.identity()) {
            return Err(ElectionError::DuplicateId(entry.identity().to_string()));
        }
        self.index
            .insert(entry.identity().to_string(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.index.get(id).map(|&i| &mut self.entries[i])
    }

    /// Remove an entry, preserving the relative order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let position = self.index.remove(id)?;
        let removed = self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Registry<T>
where
    T: Identified,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Named(&'static str);

    impl Identified for Named {
        fn identity(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn rejects_duplicates() {
        let mut registry = Registry::new();
        registry.insert(Named("a")).unwrap();
        assert_eq!(
            registry.insert(Named("a")),
            Err(ElectionError::DuplicateId("a".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_keeps_order_and_index() {
        let mut registry = Registry::new();
        for name in ["a", "b", "c", "d"] {
            registry.insert(Named(name)).unwrap();
        }

        assert_eq!(registry.remove("b"), Some(Named("b")));
        assert_eq!(registry.remove("b"), None);

        let order: Vec<_> = registry.iter().map(|n| n.0).collect();
        assert_eq!(order, vec!["a", "c", "d"]);
        assert_eq!(registry.get("d"), Some(&Named("d")));
        assert_eq!(registry.get("c"), Some(&Named("c")));

        // The freed identity can be reused, and goes to the back.
        registry.insert(Named("b")).unwrap();
        let order: Vec<_> = registry.iter().map(|n| n.0).collect();
        assert_eq!(order, vec!["a", "c", "d", "b"]);
    }
}
