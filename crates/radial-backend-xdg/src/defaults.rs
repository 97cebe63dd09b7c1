//! Default application lookup from `mimeapps.list`.
//!
//! The first-run menu is seeded with the user's default apps for a fixed
//! set of roles. Each role is a MIME type or URL scheme handler; the first
//! `mimeapps.list` that names an installed handler for it wins.

use crate::paths::XdgDirs;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Roles in bootstrap priority order: browser, dialer, messaging, gallery,
/// maps, calendar, mail, camera.
pub const DEFAULT_ROLES: &[&str] = &[
    "x-scheme-handler/https",
    "x-scheme-handler/tel",
    "x-scheme-handler/sms",
    "image/jpeg",
    "x-scheme-handler/geo",
    "text/calendar",
    "x-scheme-handler/mailto",
    "x-scheme-handler/camera",
];

/// Merged `[Default Applications]` associations.
#[derive(Debug, Clone, Default)]
pub struct DefaultApps {
    /// MIME type to desktop ids, in preference order
    associations: HashMap<String, Vec<String>>,
}

impl DefaultApps {
    /// Read every `mimeapps.list` on the XDG search path, most important first.
    pub fn load(dirs: &XdgDirs) -> Self {
        let mut apps = DefaultApps::default();
        for path in mimeapps_files(dirs) {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    trace!(path = %path.display(), "Reading mimeapps.list");
                    apps.merge(&content);
                }
                Err(_) => continue,
            }
        }
        debug!(types = apps.associations.len(), "Default app associations loaded");
        apps
    }

    /// Add associations from one file. Earlier files take precedence, so
    /// handlers from `content` are appended after those already known.
    pub fn merge(&mut self, content: &str) {
        let mut in_group = false;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_group = line == "[Default Applications]";
                continue;
            }
            if !in_group {
                continue;
            }
            let Some((mime, handlers)) = line.split_once('=') else {
                continue;
            };
            let known = self.associations.entry(mime.trim().to_string()).or_default();
            for handler in handlers.split(';').map(str::trim).filter(|h| !h.is_empty()) {
                if !known.iter().any(|k| k == handler) {
                    known.push(handler.to_string());
                }
            }
        }
    }

    /// Handlers for `mime`, most preferred first.
    pub fn handlers(&self, mime: &str) -> &[String] {
        self.associations
            .get(mime)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The first handler of each role accepted by `installed`, in role order.
    ///
    /// `https` falls back to `http` for the browser role.
    pub fn resolve_roles<F>(&self, roles: &[&str], installed: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let mut resolved = Vec::new();
        for role in roles {
            let mut candidates = self.handlers(role).iter().collect::<Vec<_>>();
            if *role == "x-scheme-handler/https" {
                candidates.extend(self.handlers("x-scheme-handler/http"));
            }
            if let Some(handler) = candidates.into_iter().find(|h| installed(h)) {
                resolved.push(handler.clone());
            }
        }
        resolved
    }
}

fn mimeapps_files(dirs: &XdgDirs) -> Vec<PathBuf> {
    dirs.config_dirs
        .iter()
        .map(|dir| dir.join("mimeapps.list"))
        .chain(dirs.application_dirs().map(|dir| dir.join("mimeapps.list")))
        .collect()
}
