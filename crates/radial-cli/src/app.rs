//! Application state management.

use crossbeam_channel::Receiver;
use radial_backend_xdg::{IconResolver, XdgBackend, XdgDirs};
use radial_core::{
    ChannelUpdateListener, Config, FuzzyMatcher, IndexStats, IndexingCoordinator, Launcher,
    Locale, MenuStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Shared application state.
pub struct App {
    /// Configuration
    pub config: Config,

    /// Owner of the app index and the menu
    pub coordinator: IndexingCoordinator,

    /// XDG backend, also used as the launcher
    pub backend: Arc<XdgBackend>,

    /// Where the menu is saved
    pub menu_path: PathBuf,

    /// One message per completed indexing task
    pub updates: Receiver<()>,
}

impl App {
    /// Create a new application instance. Nothing is indexed yet.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let dirs = XdgDirs::with_overrides(&config.xdg.data_dirs, &config.xdg.config_dirs);
        let backend = Arc::new(XdgBackend::with_dirs(dirs.clone(), Locale::current()));
        let icons = Arc::new(IconResolver::new(dirs));

        let matcher =
            FuzzyMatcher::new().with_parallel_threshold(config.search.parallel_threshold);
        let coordinator = IndexingCoordinator::new(
            backend.clone(),
            icons,
            config.excluded_packages(),
            config.menu.bootstrap_cap,
        )
        .with_matcher(matcher);

        let menu_path = config.menu_path()?;
        coordinator.set_menu_store(MenuStore::new(&menu_path));

        let (listener, updates) = ChannelUpdateListener::new();
        coordinator.set_update_listener(Arc::new(listener));

        info!(
            menu = %menu_path.display(),
            data_dirs = backend.dirs().data_dirs.len(),
            "Application initialized"
        );

        Ok(App {
            config,
            coordinator,
            backend,
            menu_path,
            updates,
        })
    }

    /// Run a full index and wait for it to finish.
    pub fn index_and_wait(&self) -> IndexStats {
        self.coordinator.index_all().join();
        self.updates.try_iter().for_each(drop);
        self.coordinator.stats()
    }

    /// Save the menu to disk.
    pub fn save_menu(&self) -> anyhow::Result<()> {
        self.coordinator.save_menu()?;
        Ok(())
    }

    pub fn launcher(&self) -> &dyn Launcher {
        self.backend.as_ref()
    }

    /// Result limit, from the command line or the config.
    pub fn result_limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.config.search.max_results)
    }
}

/// Convert a 1-based position from the command line.
pub fn position_index(position: usize) -> anyhow::Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("positions start at 1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_index() {
        assert_eq!(position_index(1).unwrap(), 0);
        assert_eq!(position_index(8).unwrap(), 7);
        assert!(position_index(0).is_err());
    }
}
