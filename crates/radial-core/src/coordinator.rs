//! Background indexing with a single writer.
//!
//! The `IndexingCoordinator` owns the [`EntryStore`] and the [`MenuList`]
//! together behind one lock. Every indexing or removal request runs as its
//! own short-lived background task:
//!
//! 1. Enumerate through the [`AppSource`] and decode icons (no lock held)
//! 2. Apply the result to the store and reconcile the menu (write lock)
//! 3. Notify the registered [`UpdateListener`] exactly once
//!
//! Tasks are serialized end to end, so two requests never interleave their
//! mutations. Searches and menu reads take the read lock and never observe a
//! half-rebuilt store.
//!
//! ## Example
//!
//! ```rust,ignore
//! let coordinator = IndexingCoordinator::new(source, icons, config.excluded_packages(), 8);
//! coordinator.set_menu_store(MenuStore::new(config.menu_path()?));
//! coordinator.index_all().join();
//! ```

use crate::backend::{AppSource, IconDecoder, LaunchableApp, Launcher, UpdateListener};
use crate::entries::EntryStore;
use crate::error::{RadialError, Result};
use crate::locale::Locale;
use crate::menu::{self, MenuList};
use crate::persistence::MenuStore;
use crate::search::{FuzzyMatcher, SearchResult};
use crate::types::{AppEntry, AppIdentifier, IndexStats};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The store and the menu, always mutated together.
#[derive(Debug, Default)]
struct Catalog {
    entries: EntryStore,
    menu: MenuList,
    last_indexed: Option<DateTime<Utc>>,
    passes: u64,
}

impl Catalog {
    fn finish_pass(&mut self) {
        self.last_indexed = Some(Utc::now());
        self.passes += 1;
    }
}

#[derive(Debug, Clone)]
enum Task {
    IndexAll,
    IndexPackage(String),
    RemovePackage(String),
}

impl Task {
    fn thread_name(&self) -> &'static str {
        match self {
            Task::IndexAll => "radial-index",
            Task::IndexPackage(_) => "radial-index-pkg",
            Task::RemovePackage(_) => "radial-remove-pkg",
        }
    }
}

/// State shared between the coordinator and its running tasks.
struct Shared {
    catalog: RwLock<Catalog>,

    /// Held for the whole duration of a task, enumeration included
    task_lock: Mutex<()>,

    /// Tasks of any kind requested and not yet finished
    in_flight: AtomicUsize,

    /// Full passes requested and not yet finished
    full_passes: AtomicUsize,

    /// Set once the persisted menu has been read
    menu_restored: AtomicBool,

    source: Arc<dyn AppSource>,
    icons: Arc<dyn IconDecoder>,
    excluded: HashSet<String>,
    bootstrap_cap: usize,
    menu_store: RwLock<Option<MenuStore>>,
    listener: RwLock<Option<Arc<dyn UpdateListener>>>,
}

/// Counts a requested task until it finishes, unwinding included.
struct InFlight {
    shared: Arc<Shared>,
    full: bool,
}

impl InFlight {
    fn enter(shared: &Arc<Shared>, full: bool) -> Self {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        if full {
            shared.full_passes.fetch_add(1, Ordering::SeqCst);
        }
        InFlight {
            shared: Arc::clone(shared),
            full,
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.full {
            self.shared.full_passes.fetch_sub(1, Ordering::SeqCst);
        }
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Shared {
    fn run(&self, task: &Task, in_flight: InFlight) {
        {
            let _serial = self.task_lock.lock();
            match task {
                Task::IndexAll => self.full_pass(),
                Task::IndexPackage(package) => self.package_pass(package),
                Task::RemovePackage(package) => self.removal_pass(package),
            }
        }

        drop(in_flight);
        self.notify();
    }

    fn notify(&self) {
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            listener.on_update();
        }
    }

    fn enumerate(&self, package: Option<&str>) -> Option<Vec<AppEntry>> {
        let apps = match self.source.enumerate(package) {
            Ok(apps) => apps,
            Err(e) => {
                let err = RadialError::enumeration(format!("{:#}", e));
                warn!(
                    backend = self.source.name(),
                    package = package.unwrap_or("*"),
                    error = %err,
                    "Keeping previous index"
                );
                return None;
            }
        };
        Some(self.decode(apps))
    }

    /// Turn enumerated apps into entries, skipping excluded packages before
    /// their icons are decoded.
    fn decode(&self, apps: Vec<LaunchableApp>) -> Vec<AppEntry> {
        apps.into_iter()
            .filter(|app| !self.excluded.contains(app.identifier.package()))
            .map(|app| {
                let icon = self.icons.decode(app.icon);
                AppEntry::new(app.identifier, app.label, icon)
            })
            .collect()
    }

    fn full_pass(&self) {
        let start = Instant::now();
        let Some(entries) = self.enumerate(None) else {
            return;
        };
        let preferred = self.source.preferred_apps();

        let mut catalog = self.catalog.write();
        let Catalog { entries: store, menu, .. } = &mut *catalog;
        store.rebuild(entries, &self.excluded);

        if let Some(menu_store) = self.menu_store.read().as_ref() {
            if !self.menu_restored.swap(true, Ordering::SeqCst) {
                *menu = menu_store.load(store);
            }
        }

        let pruned = menu.reconcile(store);
        if menu.is_empty() {
            menu.bootstrap(store, &preferred, self.bootstrap_cap);
        }
        catalog.finish_pass();

        info!(
            entries = catalog.entries.len(),
            menu = catalog.menu.len(),
            pruned = pruned,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Full index complete"
        );
    }

    fn package_pass(&self, package: &str) {
        let Some(entries) = self.enumerate(Some(package)) else {
            return;
        };
        let preferred = self.source.preferred_apps();

        let mut catalog = self.catalog.write();
        let Catalog { entries: store, menu, .. } = &mut *catalog;
        let found = entries.len();
        let had_entries = !menu.is_empty();
        if entries.is_empty() {
            store.remove_package(package);
        } else {
            store.patch_package(package, entries);
        }
        self.settle_menu(store, menu, &preferred, had_entries);
        catalog.finish_pass();

        debug!(package = %package, entries = found, "Package index complete");
    }

    fn removal_pass(&self, package: &str) {
        let preferred = self.source.preferred_apps();

        let mut catalog = self.catalog.write();
        let Catalog { entries: store, menu, .. } = &mut *catalog;
        let had_entries = !menu.is_empty();
        let removed = store.remove_package(package);
        let unlisted = menu.remove_package(package);
        self.settle_menu(store, menu, &preferred, had_entries);
        catalog.finish_pass();

        debug!(
            package = %package,
            removed = removed,
            unlisted = unlisted,
            "Package removal complete"
        );
    }

    /// Reconcile after a package-scoped change; bootstrap only if the change
    /// emptied the menu.
    fn settle_menu(
        &self,
        store: &EntryStore,
        menu: &mut MenuList,
        preferred: &[AppIdentifier],
        had_entries: bool,
    ) {
        menu.reconcile(store);
        if had_entries && menu.is_empty() {
            menu.bootstrap(store, preferred, self.bootstrap_cap);
        }
    }
}

/// Handle to a background indexing task.
#[derive(Debug)]
pub struct TaskHandle {
    inner: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Block until the task has finished and its listener call returned.
    pub fn join(self) {
        if let Some(handle) = self.inner {
            if handle.join().is_err() {
                error!("Indexing task panicked");
            }
        }
    }
}

/// Orchestrates indexing and guards the store and menu as one unit.
pub struct IndexingCoordinator {
    shared: Arc<Shared>,
    matcher: FuzzyMatcher,
}

impl IndexingCoordinator {
    /// Create a coordinator with an empty store and menu.
    ///
    /// `excluded` lists packages never indexed; the host passes its own
    /// package here.
    pub fn new(
        source: Arc<dyn AppSource>,
        icons: Arc<dyn IconDecoder>,
        excluded: HashSet<String>,
        bootstrap_cap: usize,
    ) -> Self {
        IndexingCoordinator {
            shared: Arc::new(Shared {
                catalog: RwLock::new(Catalog::default()),
                task_lock: Mutex::new(()),
                in_flight: AtomicUsize::new(0),
                full_passes: AtomicUsize::new(0),
                menu_restored: AtomicBool::new(false),
                source,
                icons,
                excluded,
                bootstrap_cap,
                menu_store: RwLock::new(None),
                listener: RwLock::new(None),
            }),
            matcher: FuzzyMatcher::new(),
        }
    }

    /// Use `matcher` for [`search`](Self::search).
    pub fn with_matcher(mut self, matcher: FuzzyMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Attach the persisted menu. The next full index restores it.
    pub fn set_menu_store(&self, store: MenuStore) {
        *self.shared.menu_store.write() = Some(store);
        self.shared.menu_restored.store(false, Ordering::SeqCst);
    }

    /// Register the observer notified after every completed task.
    pub fn set_update_listener(&self, listener: Arc<dyn UpdateListener>) {
        *self.shared.listener.write() = Some(listener);
    }

    /// Whether any indexing or removal task is in flight.
    pub fn is_indexing(&self) -> bool {
        self.shared.in_flight.load(Ordering::SeqCst) > 0
    }

    fn full_index_in_flight(&self) -> bool {
        self.shared.full_passes.load(Ordering::SeqCst) > 0
    }

    /// Rebuild the whole store in the background.
    ///
    /// A full index always proceeds, even while another one is in flight.
    pub fn index_all(&self) -> TaskHandle {
        self.spawn(Task::IndexAll)
    }

    /// Re-index a single package in the background.
    ///
    /// Returns `None` and does nothing while a full index is in flight; the
    /// full pass picks the package up.
    pub fn index_package(&self, package: &str) -> Option<TaskHandle> {
        if self.full_index_in_flight() {
            debug!(package = %package, "Full index in flight, ignoring package request");
            return None;
        }
        Some(self.spawn(Task::IndexPackage(package.to_string())))
    }

    /// Remove a package from the store and the menu in the background.
    pub fn remove_package_async(&self, package: &str) -> TaskHandle {
        self.spawn(Task::RemovePackage(package.to_string()))
    }

    fn spawn(&self, task: Task) -> TaskHandle {
        let full = matches!(task, Task::IndexAll);
        let in_flight = InFlight::enter(&self.shared, full);

        let shared = Arc::clone(&self.shared);
        let job = task.clone();
        let spawned = thread::Builder::new()
            .name(task.thread_name().to_string())
            .spawn(move || shared.run(&job, in_flight));

        match spawned {
            Ok(handle) => TaskHandle {
                inner: Some(handle),
            },
            Err(e) => {
                warn!(error = %e, "Could not spawn indexing thread, running inline");
                let in_flight = InFlight::enter(&self.shared, full);
                self.shared.run(&task, in_flight);
                TaskHandle { inner: None }
            }
        }
    }

    /// Rank every indexed entry against `query`.
    pub fn search(&self, query: &str, locale: &Locale) -> Vec<Arc<AppEntry>> {
        let snapshot = self.shared.catalog.read().entries.all();
        self.matcher.search(&snapshot, query, locale)
    }

    /// Rank every indexed entry against `query`, keeping match tiers.
    pub fn search_tiered(&self, query: &str, locale: &Locale) -> Vec<SearchResult> {
        let snapshot = self.shared.catalog.read().entries.all();
        self.matcher.search_tiered(&snapshot, query, locale)
    }

    /// The menu resolved for display.
    pub fn menu_entries(&self) -> Vec<Arc<AppEntry>> {
        let catalog = self.shared.catalog.read();
        catalog.menu.resolve(&catalog.entries)
    }

    /// A copy of the current menu.
    pub fn menu(&self) -> MenuList {
        self.shared.catalog.read().menu.clone()
    }

    /// A copy of the current store.
    pub fn entries_snapshot(&self) -> EntryStore {
        self.shared.catalog.read().entries.clone()
    }

    /// Look up a single entry.
    pub fn entry(&self, identifier: &AppIdentifier) -> Option<Arc<AppEntry>> {
        self.shared.catalog.read().entries.get(identifier)
    }

    pub fn stats(&self) -> IndexStats {
        let catalog = self.shared.catalog.read();
        IndexStats {
            entries: catalog.entries.len(),
            packages: catalog.entries.package_count(),
            menu_entries: catalog.menu.len(),
            last_indexed: catalog.last_indexed,
            generation: catalog.passes,
        }
    }

    /// Apply a user edit to the menu under the write lock.
    ///
    /// The menu is reconciled afterwards, so an edit can never leave an
    /// unresolvable identifier behind.
    pub fn edit_menu<F, T>(&self, edit: F) -> T
    where
        F: FnOnce(&mut MenuList, &EntryStore) -> T,
    {
        let mut catalog = self.shared.catalog.write();
        let Catalog { entries, menu, .. } = &mut *catalog;
        let result = edit(menu, entries);
        menu.reconcile(entries);
        result
    }

    /// Replace the menu with a fresh bootstrap.
    pub fn reset_menu(&self) {
        let preferred = self.shared.source.preferred_apps();
        let cap = self.shared.bootstrap_cap;
        self.edit_menu(|menu, entries| {
            *menu = MenuList::new();
            menu.bootstrap(entries, &preferred, cap);
        });
    }

    /// Persist the menu to the attached store.
    pub fn save_menu(&self) -> Result<()> {
        let menu = self.menu();
        match self.shared.menu_store.read().as_ref() {
            Some(store) => store.save(&menu),
            None => Err(RadialError::Internal("no menu store attached".to_string())),
        }
    }

    /// Persist the menu, reporting success as a flag.
    pub fn store_menu(&self) -> bool {
        let menu = self.menu();
        self.shared
            .menu_store
            .read()
            .as_ref()
            .map_or(false, |store| store.store(&menu))
    }

    /// Launch the menu entry at `selected`.
    pub fn launch_selected(&self, selected: Option<usize>, launcher: Option<&dyn Launcher>) -> bool {
        let menu = self.menu();
        menu::launch_selected(&menu, selected, launcher)
    }
}
