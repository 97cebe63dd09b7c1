//! # Radial Core Library
//!
//! This crate provides the core indexing, menu curation, persistence, and
//! search functionality for the Radial launcher. It is platform-agnostic:
//! app enumeration, icon decoding and launching are host collaborators
//! abstracted behind traits.
//!
//! ## Architecture
//!
//! - **Traits** (`backend`): Host collaborators (enumeration, icons, launch, listener)
//! - **Types** (`types`): App identifiers, entries and index statistics
//! - **Entries** (`entries`): The identifier → entry store
//! - **Search** (`search`): Tiered fuzzy matching (prefix / substring / near-miss)
//! - **Locale** (`locale`): Locale detection, lower-casing and collation
//! - **Menu** (`menu`): The curated, ordered menu and its bootstrap heuristic
//! - **Persistence** (`persistence`): Line-oriented menu file storage
//! - **Coordinator** (`coordinator`): Background indexing with a single writer
//! - **Config** (`config`): Configuration management
//!
//! ## Example
//!
//! ```rust,ignore
//! use radial_core::{IndexingCoordinator, Locale};
//!
//! let coordinator = IndexingCoordinator::new(source, icons, excluded, 8);
//! coordinator.index_all().join();
//!
//! for entry in coordinator.search("cal", &Locale::current()) {
//!     println!("{}", entry.label);
//! }
//! ```

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod entries;
pub mod error;
pub mod locale;
pub mod menu;
pub mod persistence;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use backend::{
    AppSource, ChannelUpdateListener, IconDecoder, LaunchableApp, Launcher, PassthroughIcons,
    UpdateListener,
};
pub use config::Config;
pub use coordinator::{IndexingCoordinator, TaskHandle};
pub use entries::EntryStore;
pub use error::{RadialError, Result};
pub use locale::Locale;
pub use menu::{launch_selected, MenuList, DEFAULT_BOOTSTRAP_CAP};
pub use persistence::MenuStore;
pub use search::{FuzzyMatcher, MatchTier};
pub use types::{AppEntry, AppIdentifier, IconHandle, IndexStats, RawIcon};
