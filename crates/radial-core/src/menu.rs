//! The curated, ordered menu.
//!
//! A `MenuList` is the user's ordered selection of apps shown in the radial
//! menu. It holds identifiers only; entries are resolved against the
//! [`EntryStore`] when displayed. The list never keeps an identifier the
//! store cannot resolve past a [`MenuList::reconcile`].
//!
//! ## Persisted Format
//!
//! ```text
//! com.android.chrome/com.google.android.apps.chrome.Main
//! org.gnome.Nautilus/default
//! ```
//!
//! One identifier per line in menu order. Lines that fail to parse or
//! resolve are skipped on load.

use crate::backend::Launcher;
use crate::entries::EntryStore;
use crate::error::{RadialError, Result};
use crate::types::{AppEntry, AppIdentifier};
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on the number of entries a first-run menu is seeded with.
pub const DEFAULT_BOOTSTRAP_CAP: usize = 8;

/// Ordered sequence of references into the entry store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuList {
    items: Vec<AppIdentifier>,
}

impl MenuList {
    /// Create an empty menu.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The identifiers in menu order.
    pub fn identifiers(&self) -> &[AppIdentifier] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppIdentifier> {
        self.items.iter()
    }

    pub fn get(&self, position: usize) -> Option<&AppIdentifier> {
        self.items.get(position)
    }

    pub fn contains(&self, identifier: &AppIdentifier) -> bool {
        self.items.contains(identifier)
    }

    /// Append an identifier. Returns false if it is already in the menu.
    pub fn push(&mut self, identifier: AppIdentifier) -> bool {
        if self.contains(&identifier) {
            return false;
        }
        self.items.push(identifier);
        true
    }

    /// Insert an identifier at `position`, clamped to the end of the list.
    ///
    /// Returns false if it is already in the menu.
    pub fn insert(&mut self, position: usize, identifier: AppIdentifier) -> bool {
        if self.contains(&identifier) {
            return false;
        }
        let position = position.min(self.items.len());
        self.items.insert(position, identifier);
        true
    }

    /// Remove and return the identifier at `position`.
    pub fn remove(&mut self, position: usize) -> Option<AppIdentifier> {
        (position < self.items.len()).then(|| self.items.remove(position))
    }

    /// Move the entry at `from` so it ends up at `to`, shifting the rest.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        for position in [from, to] {
            if position >= len {
                return Err(RadialError::MenuPosition { position, len });
            }
        }
        let identifier = self.items.remove(from);
        self.items.insert(to, identifier);
        Ok(())
    }

    /// Remove every entry of `package`. Returns how many were removed.
    pub fn remove_package(&mut self, package: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|id| id.package() != package);
        before - self.items.len()
    }

    /// Drop every entry that no longer resolves in `store`, keeping order.
    ///
    /// Returns how many entries were pruned.
    pub fn reconcile(&mut self, store: &EntryStore) -> usize {
        let before = self.items.len();
        self.items.retain(|id| store.contains(id));
        let pruned = before - self.items.len();
        if pruned > 0 {
            debug!(pruned = pruned, remaining = self.items.len(), "Menu reconciled");
        }
        pruned
    }

    /// Seed an empty menu for first use.
    ///
    /// Preferred identifiers (the host's default apps) come first, at most one
    /// per package, then the list is padded in store-iteration order with
    /// apps from packages not already contributed by the preferred phase.
    /// The result never exceeds `min(store.len(), cap)` entries.
    pub fn bootstrap(&mut self, store: &EntryStore, preferred: &[AppIdentifier], cap: usize) {
        let max = store.len().min(cap);
        let mut default_packages: HashSet<&str> = HashSet::new();

        for identifier in preferred {
            if self.items.len() >= max {
                break;
            }
            if default_packages.contains(identifier.package()) || !store.contains(identifier) {
                continue;
            }
            if self.push(identifier.clone()) {
                default_packages.insert(identifier.package());
            }
        }

        let defaults = self.items.len();
        for entry in store.iter() {
            if self.items.len() >= max {
                break;
            }
            if !default_packages.contains(entry.package()) {
                self.push(entry.identifier.clone());
            }
        }

        info!(
            defaults = defaults,
            total = self.items.len(),
            cap = max,
            "Bootstrapped menu"
        );
    }

    /// Resolve the menu against `store` for display.
    pub fn resolve(&self, store: &EntryStore) -> Vec<Arc<AppEntry>> {
        self.items.iter().filter_map(|id| store.get(id)).collect()
    }

    /// The identifier at the selected position, if any.
    pub fn selected_identifier(&self, selected: Option<usize>) -> Option<&AppIdentifier> {
        selected.and_then(|position| self.items.get(position))
    }

    /// Parse a persisted menu, keeping only lines that resolve in `store`.
    ///
    /// Lines that are not valid UTF-8 are skipped like any other malformed
    /// line. A read error stops the load and keeps what was read so far.
    pub fn load<R: BufRead>(reader: R, store: &EntryStore) -> MenuList {
        let mut menu = MenuList::new();
        let mut skipped = 0usize;

        for raw in reader.split(b'\n') {
            let raw = match raw {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "Menu read interrupted, keeping entries read so far");
                    break;
                }
            };
            let Ok(line) = String::from_utf8(raw) else {
                skipped += 1;
                continue;
            };
            let line = line.trim_end_matches('\r');
            match AppIdentifier::parse(line) {
                Some(id) if store.contains(&id) => {
                    menu.push(id);
                }
                _ => skipped += 1,
            }
        }

        debug!(entries = menu.len(), skipped = skipped, "Menu loaded");
        menu
    }

    /// Parse a persisted menu from raw bytes.
    pub fn from_bytes(bytes: &[u8], store: &EntryStore) -> MenuList {
        Self::load(bytes, store)
    }

    /// One canonical identifier per line, in menu order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = String::new();
        for id in &self.items {
            out.push_str(&id.to_line());
            out.push('\n');
        }
        out.into_bytes()
    }

    /// Write the serialized menu to `writer`.
    ///
    /// The in-memory list is unaffected by a failed write.
    pub fn store<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.serialize())?;
        writer.flush()
    }
}

impl FromIterator<AppIdentifier> for MenuList {
    fn from_iter<I: IntoIterator<Item = AppIdentifier>>(iter: I) -> Self {
        let mut menu = MenuList::new();
        for id in iter {
            menu.push(id);
        }
        menu
    }
}

/// Launch the selected menu entry through `launcher`.
///
/// Returns false without side effects when nothing is selected, the
/// selection is out of range, no launcher is available, or the launch fails.
pub fn launch_selected(
    menu: &MenuList,
    selected: Option<usize>,
    launcher: Option<&dyn Launcher>,
) -> bool {
    let Some(identifier) = menu.selected_identifier(selected) else {
        return false;
    };
    let Some(launcher) = launcher else {
        debug!(app = %identifier, "No launcher available");
        return false;
    };
    match launcher.launch(identifier) {
        Ok(()) => true,
        Err(e) => {
            warn!(app = %identifier, error = %e, "Launch failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IconHandle;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    fn id(package: &str, class: &str) -> AppIdentifier {
        AppIdentifier::new(package, class)
    }

    fn store_with(ids: &[AppIdentifier]) -> EntryStore {
        let mut store = EntryStore::new();
        store.rebuild(
            ids.iter()
                .map(|i| AppEntry::new(i.clone(), i.class(), IconHandle::none())),
            &HashSet::new(),
        );
        store
    }

    fn numbered_store(count: usize) -> EntryStore {
        let ids: Vec<_> = (0..count)
            .map(|i| id(&format!("com.app{i}"), "Main"))
            .collect();
        store_with(&ids)
    }

    #[test]
    fn test_reconcile_prunes_and_keeps_order() {
        let a = id("a", "A");
        let b = id("b", "B");
        let c = id("c", "C");
        let d = id("d", "D");
        let store = store_with(&[a.clone(), c.clone(), d.clone()]);

        let mut menu: MenuList = [d.clone(), b, a.clone(), c.clone()].into_iter().collect();
        assert_eq!(menu.reconcile(&store), 1);

        assert_eq!(menu.identifiers(), &[d, a, c]);
        assert!(menu.iter().all(|i| store.contains(i)));
    }

    #[test]
    fn test_bootstrap_cap() {
        let store = numbered_store(20);
        let mut menu = MenuList::new();
        menu.bootstrap(&store, &[], DEFAULT_BOOTSTRAP_CAP);

        assert_eq!(menu.len(), 8);
        let unique: HashSet<_> = menu.iter().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn test_bootstrap_small_store() {
        let store = numbered_store(3);
        let mut menu = MenuList::new();
        menu.bootstrap(&store, &[], DEFAULT_BOOTSTRAP_CAP);

        assert_eq!(menu.len(), 3);
    }

    #[test]
    fn test_bootstrap_preferred_first_one_per_package() {
        let browser = id("org.browser", "org.browser.Main");
        let browser_alt = id("org.browser", "org.browser.Incognito");
        let mail = id("org.mail", "org.mail.Inbox");
        let missing = id("org.missing", "Main");

        let mut ids: Vec<_> = (0..10).map(|i| id(&format!("com.app{i}"), "Main")).collect();
        ids.extend([browser.clone(), browser_alt.clone(), mail.clone()]);
        let store = store_with(&ids);

        let mut menu = MenuList::new();
        menu.bootstrap(
            &store,
            &[missing, browser.clone(), browser_alt.clone(), mail.clone()],
            DEFAULT_BOOTSTRAP_CAP,
        );

        assert_eq!(menu.len(), 8);
        assert_eq!(&menu.identifiers()[..2], &[browser, mail]);
        assert!(!menu.contains(&browser_alt));
        let packages: HashSet<_> = menu.iter().map(AppIdentifier::package).collect();
        assert_eq!(packages.len(), 8);
    }

    #[test]
    fn test_load_tolerates_malformed_lines() {
        let a = id("com.a", "com.a.Main");
        let b = id("com.b", "com.b.Main");
        let c = id("com.c", "com.c.Main");
        let store = store_with(&[a.clone(), b.clone()]);

        let text = "com.a/com.a.Main\nthis line is garbage\ncom.b/.Main\r\ncom.c/com.c.Main\n";
        let menu = MenuList::from_bytes(text.as_bytes(), &store);

        assert_eq!(menu.identifiers(), &[a, b]);
        assert!(!menu.contains(&c));
    }

    #[test]
    fn test_load_skips_invalid_utf8_line() {
        let a = id("com.a", "com.a.Main");
        let b = id("com.b", "com.b.Main");
        let store = store_with(&[a.clone(), b.clone()]);

        let bytes = b"com.a/com.a.Main\nbad\xff\xfe/line\ncom.b/com.b.Main\n";
        let menu = MenuList::from_bytes(bytes, &store);

        assert_eq!(menu.identifiers(), &[a, b]);
    }

    #[test]
    fn test_load_empty() {
        let store = numbered_store(2);
        assert!(MenuList::from_bytes(b"", &store).is_empty());
    }

    #[test]
    fn test_serialize() {
        let menu: MenuList = [id("com.a", "com.a.Main"), id("org.b", "default")]
            .into_iter()
            .collect();
        assert_eq!(
            menu.serialize(),
            b"com.a/com.a.Main\norg.b/default\n".to_vec()
        );
        assert!(MenuList::new().serialize().is_empty());
    }

    #[test]
    fn test_store_then_load_preserves_order() {
        let ids: Vec<_> = (0..5).rev().map(|i| id(&format!("p{i}"), "C")).collect();
        let store = store_with(&ids);
        let menu: MenuList = ids.iter().cloned().collect();

        let mut buf = Vec::new();
        menu.store(&mut buf).unwrap();

        assert_eq!(MenuList::from_bytes(&buf, &store), menu);
    }

    #[test]
    fn test_store_failure_keeps_menu() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let menu: MenuList = [id("a", "A")].into_iter().collect();
        assert!(menu.store(Broken).is_err());
        assert_eq!(menu.len(), 1);
    }

    #[test]
    fn test_edits() {
        let mut menu = MenuList::new();
        assert!(menu.push(id("a", "A")));
        assert!(!menu.push(id("a", "A")));
        assert!(menu.push(id("b", "B")));
        assert!(menu.insert(0, id("c", "C")));
        assert!(menu.insert(99, id("d", "D")));

        menu.move_entry(0, 3).unwrap();
        assert_eq!(
            menu.identifiers(),
            &[id("a", "A"), id("b", "B"), id("d", "D"), id("c", "C")]
        );
        assert!(matches!(
            menu.move_entry(4, 0),
            Err(RadialError::MenuPosition { position: 4, len: 4 })
        ));

        assert_eq!(menu.remove(1), Some(id("b", "B")));
        assert_eq!(menu.remove(10), None);
        assert_eq!(menu.remove_package("d"), 1);
        assert_eq!(menu.identifiers(), &[id("a", "A"), id("c", "C")]);
    }

    struct RecordingLauncher {
        launched: Mutex<Vec<AppIdentifier>>,
        fail: bool,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&self, identifier: &AppIdentifier) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("no such activity");
            }
            self.launched.lock().push(identifier.clone());
            Ok(())
        }
    }

    #[test]
    fn test_launch_selected() {
        let menu: MenuList = [id("a", "A"), id("b", "B")].into_iter().collect();
        let launcher = RecordingLauncher {
            launched: Mutex::new(Vec::new()),
            fail: false,
        };

        assert!(launch_selected(&menu, Some(1), Some(&launcher)));
        assert!(!launch_selected(&menu, None, Some(&launcher)));
        assert!(!launch_selected(&menu, Some(5), Some(&launcher)));
        assert!(!launch_selected(&menu, Some(0), None));
        assert_eq!(*launcher.launched.lock(), vec![id("b", "B")]);

        let failing = RecordingLauncher {
            launched: Mutex::new(Vec::new()),
            fail: true,
        };
        assert!(!launch_selected(&menu, Some(0), Some(&failing)));
    }
}
