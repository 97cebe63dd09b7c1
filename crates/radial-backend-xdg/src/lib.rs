//! # Radial XDG Backend
//!
//! This crate provides the freedesktop.org implementation of the Radial
//! host collaborators for Linux desktops:
//!
//! - **Enumeration** of installed `.desktop` entries (`AppSource`)
//! - **Default apps** from `mimeapps.list`, used to seed a first-run menu
//! - **Icon resolution** through the `hicolor` theme and `pixmaps/` (`IconDecoder`)
//! - **Launching** by expanding and spawning the `Exec=` line (`Launcher`)
//!
//! ## Architecture
//!
//! - `paths.rs`: XDG base directory resolution
//! - `desktop_entry.rs`: `.desktop` file parsing and label localization
//! - `defaults.rs`: `mimeapps.list` default application lookup
//! - `icons.rs`: Icon name to file resolution
//! - `exec.rs`: `Exec=` tokenizing and field code expansion

mod backend;
mod defaults;
mod desktop_entry;
mod exec;
mod icons;
mod paths;

pub use backend::{XdgBackend, DEFAULT_CLASS};
pub use defaults::{DefaultApps, DEFAULT_ROLES};
pub use desktop_entry::DesktopEntry;
pub use icons::IconResolver;
pub use paths::XdgDirs;

/// Error types specific to the XDG backend
pub mod error;
pub use error::XdgError;
