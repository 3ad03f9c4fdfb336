//! Entity store owning every record by name
//!
//! Lookup by name is get-or-create: the first `get` of an unknown name
//! creates a default built-in record. Names never change once created.

use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::constants::names;
use crate::record::{KeyBinding, Record};

#[derive(Debug, Default)]
pub struct Store {
    records: HashMap<String, Record>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create: returns the record named `name`, creating a default one first if needed
    pub fn get(&mut self, name: &str) -> &mut Record {
        self.records.entry(name.to_string()).or_insert_with(|| {
            debug!(name = %name, "Created default record");
            Record::new(name)
        })
    }

    /// Lookup without creating
    pub fn exists(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    pub fn exists_mut(&mut self, name: &str) -> Option<&mut Record> {
        self.records.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Insert a fully built record, replacing any record of the same name
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.name().to_string(), record)
    }

    /// Remove a record from the store
    ///
    /// Neighbors keep whatever links pointed here; relinking them is the
    /// tree navigator's job.
    pub fn free(&mut self, name: &str) -> Option<Record> {
        let removed = self.records.remove(name);
        if removed.is_some() {
            debug!(name = %name, "Freed record");
        }
        removed
    }

    /// Allocate a fresh custom record with a unique `cstm_` name
    pub fn new_custom(&mut self) -> String {
        let name = self.unique_custom_name();
        self.records.insert(name.clone(), Record::new_custom(name.as_str()));
        info!(name = %name, "Created custom record");
        name
    }

    /// Generate a custom name not yet used by any record
    pub fn unique_custom_name(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = format!(
                "{}{:0width$x}",
                names::CUSTOM_PREFIX,
                rng.r#gen::<u32>(),
                width = names::CUSTOM_HEX_DIGITS
            );
            if !self.records.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.records.values_mut()
    }

    /// All names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the record bound to a shortcut, for conflict detection
    pub fn find_by_key(&self, binding: KeyBinding) -> Option<&Record> {
        if !binding.is_set() {
            return None;
        }
        let mut matches: Vec<&Record> = self.records.values().filter(|r| r.key == binding).collect();
        matches.sort_by(|a, b| a.name().cmp(b.name()));
        matches.into_iter().next()
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TriState;

    #[test]
    fn test_get_creates_default_record() {
        let mut store = Store::new();
        let record = store.get("main_terminal");
        assert_eq!(record.name(), "main_terminal");
        assert!(record.lock);
        assert_eq!(record.b, TriState::Unset);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_is_idempotent() {
        let mut store = Store::new();
        store.get("show_hidden").b = TriState::True;
        let again = store.get("show_hidden");
        assert_eq!(again.b, TriState::True);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_exists_does_not_create() {
        let store = Store::new();
        assert!(store.exists("nothing").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_free_removes_record() {
        let mut store = Store::new();
        store.get("a");
        assert!(store.free("a").is_some());
        assert!(store.free("a").is_none());
        assert!(!store.contains("a"));
    }

    #[test]
    fn test_new_custom_names_are_unique() {
        let mut store = Store::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let name = store.new_custom();
            assert!(name.starts_with(names::CUSTOM_PREFIX));
            assert_eq!(name.len(), names::CUSTOM_PREFIX.len() + names::CUSTOM_HEX_DIGITS);
            assert!(seen.insert(name.clone()));
            assert!(!store.exists(&name).unwrap().lock);
        }
        assert_eq!(store.len(), 200);
    }

    #[test]
    fn test_find_by_key() {
        let mut store = Store::new();
        store.get("copy").key = KeyBinding::new(99, 4);
        store.get("paste").key = KeyBinding::new(118, 4);

        let found = store.find_by_key(KeyBinding::new(99, 4)).unwrap();
        assert_eq!(found.name(), "copy");
        assert!(store.find_by_key(KeyBinding::new(99, 0)).is_none());
        assert!(store.find_by_key(KeyBinding::default()).is_none());
    }

    #[test]
    fn test_names_sorted() {
        let mut store = Store::new();
        store.get("b");
        store.get("a");
        store.get("c");
        assert_eq!(store.names(), vec!["a", "b", "c"]);
    }
}
