//! Persistence layer for the curated menu.
//!
//! The menu is stored as a small text file, one canonical identifier per
//! line (see [`MenuList::serialize`]). The on-disk handling is designed for:
//!
//! - Absence as state: a missing file is an empty menu, not an error
//! - Atomic writes: the file is written to a temp sibling and renamed over
//!   the old one, so readers never see a partial line
//! - Tolerant reads: unparseable or unresolvable lines are skipped

use crate::entries::EntryStore;
use crate::error::{RadialError, Result};
use crate::menu::MenuList;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Manages the persisted menu file.
///
/// ## Example
///
/// ```rust,ignore
/// use radial_core::{EntryStore, MenuStore};
///
/// let store = MenuStore::new(data_dir.join("menu"));
/// let menu = store.load(&entries);
/// store.save(&menu)?;
/// ```
#[derive(Debug, Clone)]
pub struct MenuStore {
    /// Location of the menu file
    path: PathBuf,
}

impl MenuStore {
    /// Create a MenuStore for the given file path.
    ///
    /// The parent directory is created on first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        MenuStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path to the menu file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the path to a temporary file during save.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "menu".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Check if a menu file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the menu, resolving each line against `entries`.
    ///
    /// Returns `MenuNotFound` if there is no menu file.
    pub fn try_load(&self, entries: &EntryStore) -> Result<MenuList> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RadialError::MenuNotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let menu = MenuList::load(BufReader::new(file), entries);
        info!(path = %self.path.display(), entries = menu.len(), "Menu loaded from disk");
        Ok(menu)
    }

    /// Load the menu, or an empty one if it is missing or unreadable.
    pub fn load(&self, entries: &EntryStore) -> MenuList {
        match self.try_load(entries) {
            Ok(menu) => menu,
            Err(e) if e.is_not_found() => {
                debug!(path = %self.path.display(), "No menu file, starting empty");
                MenuList::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read menu, starting empty");
                MenuList::new()
            }
        }
    }

    /// Save the menu to disk.
    ///
    /// Uses atomic write (write to temp, then rename) so the previous
    /// content stays intact until the new content is complete.
    pub fn save(&self, menu: &MenuList) -> Result<()> {
        self.write_atomic(menu).map_err(|source| RadialError::MenuWrite {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), entries = menu.len(), "Menu saved");
        Ok(())
    }

    fn write_atomic(&self, menu: &MenuList) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            menu.store(&mut writer)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&temp_path, &self.path)
    }

    /// Save the menu, reporting success as a flag.
    ///
    /// Failures are logged; the caller decides whether to surface them.
    pub fn store(&self, menu: &MenuList) -> bool {
        match self.save(menu) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to store menu");
                false
            }
        }
    }

    /// Delete the persisted menu.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        let temp_path = self.temp_path();
        if temp_path.exists() {
            fs::remove_file(&temp_path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppEntry, AppIdentifier, IconHandle};
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn make_entries() -> EntryStore {
        let mut store = EntryStore::new();
        store.rebuild(
            ["com.a", "com.b", "com.c"].iter().map(|p| {
                AppEntry::new(
                    AppIdentifier::new(*p, format!("{p}.Main")),
                    *p,
                    IconHandle::none(),
                )
            }),
            &HashSet::new(),
        );
        store
    }

    fn make_menu() -> MenuList {
        ["com.c", "com.a"]
            .iter()
            .map(|p| AppIdentifier::new(*p, format!("{p}.Main")))
            .collect()
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = MenuStore::new(temp_dir.path().join("nested").join("menu"));

        store.save(&make_menu()).unwrap();
        assert!(store.exists());

        let loaded = store.load(&make_entries());
        assert_eq!(loaded, make_menu());
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let store = MenuStore::new(temp_dir.path().join("menu"));

        let result = store.try_load(&make_entries());
        assert!(matches!(result, Err(RadialError::MenuNotFound { .. })));
        assert!(store.load(&make_entries()).is_empty());
    }

    #[test]
    fn test_load_skips_malformed_and_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("menu");
        fs::write(
            &path,
            "com.a/com.a.Main\n???\ncom.gone/com.gone.Main\ncom.b/com.b.Main\n",
        )
        .unwrap();

        let loaded = MenuStore::new(&path).load(&make_entries());
        let packages: Vec<_> = loaded.iter().map(AppIdentifier::package).collect();
        assert_eq!(packages, vec!["com.a", "com.b"]);
    }

    #[test]
    fn test_save_overwrites_completely() {
        let temp_dir = TempDir::new().unwrap();
        let store = MenuStore::new(temp_dir.path().join("menu"));

        store.save(&make_menu()).unwrap();
        store.save(&MenuList::new()).unwrap();

        assert_eq!(fs::read(store.path()).unwrap(), Vec::<u8>::new());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_store_reports_failure() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = temp_dir.path().join("menu");
        fs::create_dir_all(path.join("occupied")).unwrap();

        let menu = make_menu();
        assert!(!MenuStore::new(&path).store(&menu));
        assert_eq!(menu.len(), 2);
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = MenuStore::new(temp_dir.path().join("menu"));

        store.save(&make_menu()).unwrap();
        store.clear().unwrap();
        assert!(!store.exists());
        store.clear().unwrap();
    }
}
