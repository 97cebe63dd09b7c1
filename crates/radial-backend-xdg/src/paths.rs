//! XDG base directory resolution.

use directories::BaseDirs;
use std::env;
use std::path::PathBuf;

/// The directories the backend searches, most important first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XdgDirs {
    /// Data directories; each may contain `applications/`, `icons/` and `pixmaps/`
    pub data_dirs: Vec<PathBuf>,

    /// Config directories searched for `mimeapps.list`
    pub config_dirs: Vec<PathBuf>,
}

impl XdgDirs {
    pub fn new(data_dirs: Vec<PathBuf>, config_dirs: Vec<PathBuf>) -> Self {
        XdgDirs {
            data_dirs,
            config_dirs,
        }
    }

    /// Resolve from the environment: the user directory first, then the
    /// system directories from `XDG_DATA_DIRS` / `XDG_CONFIG_DIRS`.
    pub fn from_env() -> Self {
        let base = BaseDirs::new();

        let mut data_dirs = Vec::new();
        if let Some(base) = &base {
            data_dirs.push(base.data_dir().to_path_buf());
        }
        data_dirs.extend(split_var("XDG_DATA_DIRS", &["/usr/local/share", "/usr/share"]));

        let mut config_dirs = Vec::new();
        if let Some(base) = &base {
            config_dirs.push(base.config_dir().to_path_buf());
        }
        config_dirs.extend(split_var("XDG_CONFIG_DIRS", &["/etc/xdg"]));

        XdgDirs {
            data_dirs: dedup(data_dirs),
            config_dirs: dedup(config_dirs),
        }
    }

    /// Use `data_dirs` / `config_dirs` where non-empty, else the environment.
    pub fn with_overrides(data_dirs: &[PathBuf], config_dirs: &[PathBuf]) -> Self {
        let env = Self::from_env();
        XdgDirs {
            data_dirs: if data_dirs.is_empty() {
                env.data_dirs
            } else {
                data_dirs.to_vec()
            },
            config_dirs: if config_dirs.is_empty() {
                env.config_dirs
            } else {
                config_dirs.to_vec()
            },
        }
    }

    /// The `applications/` directory of every data dir.
    pub fn application_dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.data_dirs.iter().map(|dir| dir.join("applications"))
    }
}

fn split_var(name: &str, fallback: &[&str]) -> Vec<PathBuf> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .split(':')
            .filter(|part| !part.is_empty())
            .map(PathBuf::from)
            .collect(),
        _ => fallback.iter().map(PathBuf::from).collect(),
    }
}

fn dedup(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if !seen.contains(&dir) {
            seen.push(dir);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let dirs = XdgDirs::with_overrides(&[PathBuf::from("/opt/share")], &[PathBuf::from("/opt/etc")]);
        assert_eq!(dirs.data_dirs, vec![PathBuf::from("/opt/share")]);
        assert_eq!(dirs.config_dirs, vec![PathBuf::from("/opt/etc")]);
    }

    #[test]
    fn test_application_dirs() {
        let dirs = XdgDirs::new(vec![PathBuf::from("/a"), PathBuf::from("/b")], Vec::new());
        let apps: Vec<_> = dirs.application_dirs().collect();
        assert_eq!(apps, vec![PathBuf::from("/a/applications"), PathBuf::from("/b/applications")]);
    }

    #[test]
    fn test_dedup_keeps_first() {
        let dirs = dedup(vec![
            PathBuf::from("/x"),
            PathBuf::from("/y"),
            PathBuf::from("/x"),
        ]);
        assert_eq!(dirs, vec![PathBuf::from("/x"), PathBuf::from("/y")]);
    }
}
