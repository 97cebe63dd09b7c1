//! XDG backend implementation.
//!
//! This module implements the `AppSource` and `Launcher` traits over the
//! freedesktop.org desktop entry layout.

use crate::defaults::{DefaultApps, DEFAULT_ROLES};
use crate::desktop_entry::DesktopEntry;
use crate::error::XdgError;
use crate::exec::{expand_field_codes, tokenize, FieldValues};
use crate::paths::XdgDirs;
use glob::{glob, Pattern};
use parking_lot::RwLock;
use radial_core::{AppIdentifier, AppSource, LaunchableApp, Launcher, Locale, RawIcon};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Class name of a desktop entry's main action.
pub const DEFAULT_CLASS: &str = "default";

/// A parsed entry together with the file it came from.
#[derive(Debug, Clone)]
struct Installed {
    entry: DesktopEntry,
    path: PathBuf,
}

/// freedesktop.org backend for Linux desktops.
///
/// Each installed `.desktop` file is one launchable app. Its desktop id
/// (the path below `applications/` with `/` replaced by `-`) minus the
/// `.desktop` suffix is the package; the class is always [`DEFAULT_CLASS`].
///
/// When the same desktop id exists in several data dirs, the first dir wins,
/// even if that copy is hidden.
pub struct XdgBackend {
    dirs: XdgDirs,
    locale: Locale,

    /// Entries seen by the last enumeration, keyed by package
    installed: RwLock<HashMap<String, Installed>>,
}

impl XdgBackend {
    /// Create a backend over the environment's XDG directories.
    pub fn new() -> Self {
        Self::with_dirs(XdgDirs::from_env(), Locale::current())
    }

    /// Create a backend over explicit directories.
    pub fn with_dirs(dirs: XdgDirs, locale: Locale) -> Self {
        XdgBackend {
            dirs,
            locale,
            installed: RwLock::new(HashMap::new()),
        }
    }

    pub fn dirs(&self) -> &XdgDirs {
        &self.dirs
    }

    /// Scan every `applications/` dir, returning launchable entries by package.
    fn scan(&self, only: Option<&str>) -> Result<HashMap<String, Installed>, XdgError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut found = HashMap::new();

        for apps_dir in self.dirs.application_dirs() {
            if !apps_dir.is_dir() {
                continue;
            }
            for path in desktop_files(&apps_dir)? {
                let Some(id) = desktop_id(&apps_dir, &path) else {
                    continue;
                };
                let package = id.strip_suffix(".desktop").unwrap_or(&id).to_string();
                if only.is_some_and(|wanted| wanted != package) {
                    continue;
                }
                if !seen.insert(id.clone()) {
                    continue;
                }

                let content = match fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "Skipping unreadable desktop file");
                        continue;
                    }
                };
                match DesktopEntry::parse(id, &content) {
                    Some(entry) if entry.is_launchable() => {
                        found.insert(package, Installed { entry, path });
                    }
                    _ => {}
                }
            }
        }

        Ok(found)
    }

    fn lookup(&self, package: &str) -> Result<Installed, XdgError> {
        if let Some(installed) = self.installed.read().get(package) {
            return Ok(installed.clone());
        }
        let mut found = self.scan(Some(package))?;
        let installed = found.remove(package).ok_or_else(|| XdgError::EntryNotFound {
            id: format!("{package}.desktop"),
        })?;
        self.installed
            .write()
            .insert(package.to_string(), installed.clone());
        Ok(installed)
    }

    /// Build the command line for an installed entry.
    fn command_line(installed: &Installed) -> Result<Vec<String>, XdgError> {
        let entry = &installed.entry;
        let exec = entry.exec.as_deref().ok_or_else(|| XdgError::MissingExec {
            id: entry.id.clone(),
        })?;
        let args = expand_field_codes(
            tokenize(&entry.id, exec)?,
            FieldValues {
                icon: entry.icon.as_deref(),
                name: &entry.name,
                location: Some(&installed.path),
            },
        );
        if args.is_empty() {
            return Err(XdgError::MissingExec {
                id: entry.id.clone(),
            });
        }
        Ok(args)
    }

    /// Launch an installed entry by package.
    pub fn launch_package(&self, package: &str) -> Result<(), XdgError> {
        let installed = self.lookup(package)?;
        let args = Self::command_line(&installed)?;
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| XdgError::MissingExec {
                id: installed.entry.id.clone(),
            })?;

        if installed.entry.terminal {
            debug!(id = %installed.entry.id, "Entry wants a terminal, launching directly");
        }

        Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| XdgError::Spawn {
                command: program.clone(),
                source,
            })?;

        info!(id = %installed.entry.id, program = %program, "Launched");
        Ok(())
    }
}

impl Default for XdgBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AppSource for XdgBackend {
    fn enumerate(&self, package: Option<&str>) -> anyhow::Result<Vec<LaunchableApp>> {
        let found = self.scan(package)?;

        let apps: Vec<LaunchableApp> = found
            .values()
            .map(|installed| {
                let entry = &installed.entry;
                let icon = entry
                    .icon
                    .clone()
                    .map(RawIcon::new)
                    .unwrap_or_else(RawIcon::none);
                LaunchableApp::new(
                    AppIdentifier::new(entry.package(), DEFAULT_CLASS),
                    entry.label(&self.locale),
                    icon,
                )
            })
            .collect();

        let mut cache = self.installed.write();
        match package {
            Some(package) => {
                cache.remove(package);
                cache.extend(found);
            }
            None => *cache = found,
        }

        info!(
            apps = apps.len(),
            package = package.unwrap_or("*"),
            "Enumerated desktop entries"
        );
        Ok(apps)
    }

    fn preferred_apps(&self) -> Vec<AppIdentifier> {
        let defaults = DefaultApps::load(&self.dirs);
        let resolved = defaults.resolve_roles(DEFAULT_ROLES, |id| {
            let package = id.strip_suffix(".desktop").unwrap_or(id);
            self.lookup(package).is_ok()
        });
        debug!(defaults = ?resolved, "Resolved default apps");

        resolved
            .iter()
            .map(|id| AppIdentifier::new(id.strip_suffix(".desktop").unwrap_or(id), DEFAULT_CLASS))
            .collect()
    }

    fn name(&self) -> &'static str {
        "xdg"
    }
}

impl Launcher for XdgBackend {
    fn launch(&self, identifier: &AppIdentifier) -> anyhow::Result<()> {
        if identifier.class() != DEFAULT_CLASS {
            warn!(app = %identifier, "Unknown class, launching the main entry");
        }
        self.launch_package(identifier.package())?;
        Ok(())
    }
}

/// Every `.desktop` file below `apps_dir`, in path order.
fn desktop_files(apps_dir: &Path) -> Result<Vec<PathBuf>, XdgError> {
    let pattern = format!("{}/**/*.desktop", Pattern::escape(&apps_dir.to_string_lossy()));
    let paths = glob(&pattern).map_err(|e| XdgError::Pattern {
        dir: apps_dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut files: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    files.sort();
    Ok(files)
}

/// The desktop id of `path`: its path below `apps_dir` with `/` as `-`.
fn desktop_id(apps_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(apps_dir).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_entry(dir: &Path, relative: &str, content: &str) {
        let path = dir.join("applications").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn app(name: &str, exec: &str) -> String {
        format!("[Desktop Entry]\nType=Application\nName={name}\nExec={exec}\nIcon={name}\n")
    }

    fn backend(data: &[&Path], config: &[&Path]) -> XdgBackend {
        XdgBackend::with_dirs(
            XdgDirs::new(
                data.iter().map(|p| p.to_path_buf()).collect(),
                config.iter().map(|p| p.to_path_buf()).collect(),
            ),
            Locale::new("en_US"),
        )
    }

    fn packages(apps: &[LaunchableApp]) -> Vec<String> {
        let mut packages: Vec<String> = apps
            .iter()
            .map(|a| a.identifier.package().to_string())
            .collect();
        packages.sort();
        packages
    }

    #[test]
    fn test_enumerate() {
        let data = TempDir::new().unwrap();
        write_entry(data.path(), "firefox.desktop", &app("Firefox", "firefox %u"));
        write_entry(data.path(), "kde/kate.desktop", &app("Kate", "kate %F"));
        write_entry(
            data.path(),
            "helper.desktop",
            "[Desktop Entry]\nName=Helper\nExec=helper\nNoDisplay=true\n",
        );

        let backend = backend(&[data.path()], &[]);
        let apps = backend.enumerate(None).unwrap();

        assert_eq!(packages(&apps), vec!["firefox", "kde-kate"]);
        assert!(apps.iter().all(|a| a.identifier.class() == DEFAULT_CLASS));
    }

    #[test]
    fn test_first_data_dir_wins() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        write_entry(user.path(), "mail.desktop", &app("My Mail", "mymail"));
        write_entry(system.path(), "mail.desktop", &app("Mail", "mail"));
        write_entry(
            user.path(),
            "spam.desktop",
            "[Desktop Entry]\nName=Spam\nExec=spam\nHidden=true\n",
        );
        write_entry(system.path(), "spam.desktop", &app("Spam", "spam"));

        let backend = backend(&[user.path(), system.path()], &[]);
        let apps = backend.enumerate(None).unwrap();

        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].label, "My Mail");
    }

    #[test]
    fn test_enumerate_single_package() {
        let data = TempDir::new().unwrap();
        write_entry(data.path(), "a.desktop", &app("A", "a"));
        write_entry(data.path(), "b.desktop", &app("B", "b"));

        let backend = backend(&[data.path()], &[]);
        let apps = backend.enumerate(Some("b")).unwrap();
        assert_eq!(packages(&apps), vec!["b"]);
        assert!(backend.enumerate(Some("gone")).unwrap().is_empty());
    }

    #[test]
    fn test_preferred_apps_from_mimeapps() {
        let data = TempDir::new().unwrap();
        let config = TempDir::new().unwrap();
        write_entry(data.path(), "firefox.desktop", &app("Firefox", "firefox %u"));
        write_entry(data.path(), "org.gnome.Calendar.desktop", &app("Calendar", "gnome-calendar"));
        fs::write(
            config.path().join("mimeapps.list"),
            "[Default Applications]\n\
             text/calendar=org.gnome.Calendar.desktop\n\
             x-scheme-handler/http=uninstalled.desktop;firefox.desktop\n",
        )
        .unwrap();

        let backend = backend(&[data.path()], &[config.path()]);
        assert_eq!(
            backend.preferred_apps(),
            vec![
                AppIdentifier::new("firefox", DEFAULT_CLASS),
                AppIdentifier::new("org.gnome.Calendar", DEFAULT_CLASS),
            ]
        );
    }

    #[test]
    fn test_command_line() {
        let data = TempDir::new().unwrap();
        write_entry(data.path(), "cal.desktop", &app("Calendar", "gnome-calendar %U %i"));

        let backend = backend(&[data.path()], &[]);
        let installed = backend.lookup("cal").unwrap();
        assert_eq!(
            XdgBackend::command_line(&installed).unwrap(),
            vec!["gnome-calendar", "--icon", "Calendar"]
        );
        assert!(backend.lookup("nope").unwrap_err().is_not_installed());
    }

    #[test]
    fn test_desktop_id() {
        let dir = Path::new("/usr/share/applications");
        assert_eq!(
            desktop_id(dir, &dir.join("kde4").join("kate.desktop")),
            Some("kde4-kate.desktop".to_string())
        );
    }
}
