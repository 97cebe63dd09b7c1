//! In-memory store of every discoverable app entry.
//!
//! The `EntryStore` maps an [`AppIdentifier`] to its [`AppEntry`]. It supports:
//!
//! - Full rebuilds from an enumeration pass
//! - Single-package patches when one package is installed or updated
//! - Package removal
//!
//! Entries are stored behind `Arc` and never mutated in place, so the
//! snapshot returned by [`EntryStore::all`] stays valid while the store is
//! rebuilt underneath it. The store itself is not synchronized; the
//! [`IndexingCoordinator`](crate::IndexingCoordinator) guards it together
//! with the menu under one lock.

use crate::types::{AppEntry, AppIdentifier};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The full index of discoverable apps, keyed by identifier.
#[derive(Debug, Default, Clone)]
pub struct EntryStore {
    /// Map from identifier to entry
    entries: HashMap<AppIdentifier, Arc<AppEntry>>,
}

impl EntryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the whole store with `entries`.
    ///
    /// Entries whose package is in `excluding` are skipped; the host's own
    /// package is always passed here. Later duplicates of an identifier
    /// replace earlier ones.
    #[instrument(skip(self, entries, excluding))]
    pub fn rebuild<I>(&mut self, entries: I, excluding: &HashSet<String>)
    where
        I: IntoIterator<Item = AppEntry>,
    {
        self.entries.clear();

        let mut skipped = 0usize;
        for entry in entries {
            if excluding.contains(entry.package()) {
                skipped += 1;
                continue;
            }
            self.entries
                .insert(entry.identifier.clone(), Arc::new(entry));
        }

        info!(
            entries = self.entries.len(),
            skipped = skipped,
            "Entry store rebuilt"
        );
    }

    /// Replace every entry of `package` with `entries`.
    ///
    /// Entries of other packages are untouched. The new entries are expected,
    /// but not required, to belong to `package`.
    #[instrument(skip(self, entries))]
    pub fn patch_package<I>(&mut self, package: &str, entries: I)
    where
        I: IntoIterator<Item = AppEntry>,
    {
        let removed = self.remove_matching(package);

        let mut added = 0usize;
        for entry in entries {
            self.entries
                .insert(entry.identifier.clone(), Arc::new(entry));
            added += 1;
        }

        debug!(
            package = %package,
            removed = removed,
            added = added,
            "Package patched"
        );
    }

    /// Remove every entry of `package`. Returns how many were removed.
    #[instrument(skip(self))]
    pub fn remove_package(&mut self, package: &str) -> usize {
        let removed = self.remove_matching(package);
        if removed > 0 {
            debug!(package = %package, removed = removed, "Package removed");
        }
        removed
    }

    fn remove_matching(&mut self, package: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| id.package() != package);
        before - self.entries.len()
    }

    /// Get an entry by its identifier.
    pub fn get(&self, identifier: &AppIdentifier) -> Option<Arc<AppEntry>> {
        self.entries.get(identifier).cloned()
    }

    /// Whether an identifier resolves in the store.
    pub fn contains(&self, identifier: &AppIdentifier) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Snapshot of all entries, in store-iteration order.
    pub fn all(&self) -> Vec<Arc<AppEntry>> {
        self.entries.values().cloned().collect()
    }

    /// Iterate entries without taking a snapshot.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AppEntry>> {
        self.entries.values()
    }

    /// Number of distinct packages with at least one entry.
    pub fn package_count(&self) -> usize {
        self.entries
            .keys()
            .map(AppIdentifier::package)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IconHandle;

    fn entry(package: &str, class: &str, label: &str) -> AppEntry {
        AppEntry::new(AppIdentifier::new(package, class), label, IconHandle::none())
    }

    fn make_test_entries() -> Vec<AppEntry> {
        vec![
            entry("com.android.camera", "com.android.camera.Camera", "Camera"),
            entry("com.android.calendar", "com.android.calendar.Launch", "Calendar"),
            entry("com.android.calculator2", "com.android.calculator2.Main", "Calculator"),
            entry("com.x", "com.x.One", "X One"),
            entry("com.x", "com.x.Two", "X Two"),
            entry("org.radial", "org.radial.Home", "Radial"),
        ]
    }

    fn no_exclusions() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_rebuild() {
        let mut store = EntryStore::new();
        store.rebuild(make_test_entries(), &no_exclusions());

        assert_eq!(store.len(), 6);
        assert_eq!(store.package_count(), 5);
        let camera = store
            .get(&AppIdentifier::new("com.android.camera", "com.android.camera.Camera"))
            .unwrap();
        assert_eq!(camera.label, "Camera");
    }

    #[test]
    fn test_rebuild_excludes_packages() {
        let mut store = EntryStore::new();
        let excluding: HashSet<String> = ["org.radial".to_string()].into_iter().collect();
        store.rebuild(make_test_entries(), &excluding);

        assert_eq!(store.len(), 5);
        assert!(store.iter().all(|e| e.package() != "org.radial"));
    }

    #[test]
    fn test_rebuild_clears_previous_contents() {
        let mut store = EntryStore::new();
        store.rebuild(make_test_entries(), &no_exclusions());
        store.rebuild(vec![entry("a", "a.A", "A")], &no_exclusions());

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rebuild_empty_input() {
        let mut store = EntryStore::new();
        store.rebuild(make_test_entries(), &no_exclusions());
        store.rebuild(Vec::new(), &no_exclusions());

        assert!(store.is_empty());
    }

    #[test]
    fn test_rebuild_idempotent() {
        let mut once = EntryStore::new();
        once.rebuild(make_test_entries(), &no_exclusions());

        let mut twice = EntryStore::new();
        twice.rebuild(make_test_entries(), &no_exclusions());
        twice.rebuild(make_test_entries(), &no_exclusions());

        assert_eq!(once.len(), twice.len());
        for e in once.iter() {
            assert_eq!(twice.get(&e.identifier).as_deref(), Some(e.as_ref()));
        }
    }

    #[test]
    fn test_patch_package_isolation() {
        let mut store = EntryStore::new();
        store.rebuild(make_test_entries(), &no_exclusions());
        let others: Vec<_> = store
            .iter()
            .filter(|e| e.package() != "com.x")
            .map(|e| (**e).clone())
            .collect();

        store.patch_package("com.x", vec![entry("com.x", "com.x.Three", "X Three")]);

        assert_eq!(store.len(), others.len() + 1);
        for e in &others {
            assert_eq!(store.get(&e.identifier).as_deref(), Some(e));
        }
        assert!(!store.contains(&AppIdentifier::new("com.x", "com.x.One")));
        assert!(store.contains(&AppIdentifier::new("com.x", "com.x.Three")));
    }

    #[test]
    fn test_remove_package() {
        let mut store = EntryStore::new();
        store.rebuild(make_test_entries(), &no_exclusions());

        assert_eq!(store.remove_package("com.x"), 2);
        assert_eq!(store.len(), 4);
        assert_eq!(store.remove_package("com.missing"), 0);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_snapshot_survives_rebuild() {
        let mut store = EntryStore::new();
        store.rebuild(make_test_entries(), &no_exclusions());

        let snapshot = store.all();
        store.rebuild(Vec::new(), &no_exclusions());

        assert_eq!(snapshot.len(), 6);
        assert!(snapshot.iter().any(|e| e.label == "Calculator"));
    }
}
