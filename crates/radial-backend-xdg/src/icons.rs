//! Icon name resolution.
//!
//! Desktop entries name icons either by absolute path or by theme name. Theme
//! names are looked up in the `hicolor` theme of every data dir, largest size
//! first (scalable beats any bitmap), then in `pixmaps/`. The resolved file
//! path is the handle; pixels are never read here.

use crate::paths::XdgDirs;
use glob::{glob, Pattern};
use parking_lot::RwLock;
use radial_core::{IconDecoder, IconHandle, RawIcon};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::trace;

const EXTENSIONS: &[&str] = &["svg", "png", "xpm"];

/// Resolves icon names to files, caching every lookup.
#[derive(Debug)]
pub struct IconResolver {
    dirs: XdgDirs,
    cache: RwLock<HashMap<String, Option<PathBuf>>>,
}

impl IconResolver {
    pub fn new(dirs: XdgDirs) -> Self {
        IconResolver {
            dirs,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve an `Icon=` value to a file.
    pub fn resolve(&self, icon: &str) -> Option<PathBuf> {
        if let Some(hit) = self.cache.read().get(icon) {
            return hit.clone();
        }

        let resolved = self.lookup(icon);
        trace!(icon = %icon, resolved = ?resolved, "Icon lookup");
        self.cache.write().insert(icon.to_string(), resolved.clone());
        resolved
    }

    fn lookup(&self, icon: &str) -> Option<PathBuf> {
        let path = Path::new(icon);
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }
        if icon.contains('/') {
            return None;
        }

        let name = Pattern::escape(icon);
        for data_dir in &self.dirs.data_dirs {
            let base = Pattern::escape(&data_dir.to_string_lossy());

            let themed = format!("{base}/icons/hicolor/*/apps/{name}.*");
            let best = matches(&themed)
                .into_iter()
                .max_by_key(|p| (theme_size(p), extension_rank(p)));
            if best.is_some() {
                return best;
            }

            let pixmap = format!("{base}/pixmaps/{name}.*");
            if let Some(found) = matches(&pixmap).into_iter().max_by_key(|p| extension_rank(p)) {
                return Some(found);
            }
        }
        None
    }
}

impl IconDecoder for IconResolver {
    fn decode(&self, source: RawIcon) -> IconHandle {
        source
            .downcast_ref::<String>()
            .and_then(|name| self.resolve(name))
            .map(IconHandle::new)
            .unwrap_or_default()
    }
}

fn matches(pattern: &str) -> Vec<PathBuf> {
    match glob(pattern) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .filter(|p| extension_rank(p) > 0)
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Rank of a file extension; 0 for files that are not icons.
fn extension_rank(path: &Path) -> usize {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| EXTENSIONS.iter().rev().position(|known| *known == ext))
        .map_or(0, |pos| pos + 1)
}

/// Pixel size of a hicolor size directory (`48x48`, `32x32@2`, `scalable`).
fn theme_size(path: &Path) -> u32 {
    let Some(size_dir) = path
        .parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
    else {
        return 0;
    };
    if size_dir == "scalable" {
        return u32::MAX;
    }
    let (size, scale) = size_dir.split_once('@').unwrap_or((size_dir, "1"));
    let width = size
        .split_once('x')
        .and_then(|(w, _)| w.parse::<u32>().ok())
        .unwrap_or(0);
    width.saturating_mul(scale.parse().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: PathBuf) -> PathBuf {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_prefers_largest_theme_icon() {
        let data = TempDir::new().unwrap();
        let hicolor = data.path().join("icons").join("hicolor");
        touch(hicolor.join("16x16").join("apps").join("calendar.png"));
        let big = touch(hicolor.join("256x256").join("apps").join("calendar.png"));
        touch(data.path().join("pixmaps").join("calendar.xpm"));

        let resolver = IconResolver::new(XdgDirs::new(vec![data.path().to_path_buf()], Vec::new()));
        assert_eq!(resolver.resolve("calendar"), Some(big));
    }

    #[test]
    fn test_scalable_wins() {
        let data = TempDir::new().unwrap();
        let hicolor = data.path().join("icons").join("hicolor");
        touch(hicolor.join("512x512").join("apps").join("maps.png"));
        let svg = touch(hicolor.join("scalable").join("apps").join("maps.svg"));

        let resolver = IconResolver::new(XdgDirs::new(vec![data.path().to_path_buf()], Vec::new()));
        assert_eq!(resolver.resolve("maps"), Some(svg));
    }

    #[test]
    fn test_pixmaps_fallback_and_absolute() {
        let data = TempDir::new().unwrap();
        let pixmap = touch(data.path().join("pixmaps").join("legacy.xpm"));

        let resolver = IconResolver::new(XdgDirs::new(vec![data.path().to_path_buf()], Vec::new()));
        assert_eq!(resolver.resolve("legacy"), Some(pixmap.clone()));
        assert_eq!(resolver.resolve(pixmap.to_str().unwrap()), Some(pixmap));
        assert_eq!(resolver.resolve("missing"), None);
    }

    #[test]
    fn test_decode_handle() {
        let data = TempDir::new().unwrap();
        let pixmap = touch(data.path().join("pixmaps").join("tool.png"));
        let resolver = IconResolver::new(XdgDirs::new(vec![data.path().to_path_buf()], Vec::new()));

        let handle = resolver.decode(RawIcon::new("tool".to_string()));
        assert_eq!(handle.downcast_ref::<PathBuf>(), Some(&pixmap));
        assert!(resolver.decode(RawIcon::none()).is_none());
    }

    #[test]
    fn test_theme_size() {
        assert_eq!(theme_size(Path::new("/i/hicolor/48x48/apps/a.png")), 48);
        assert_eq!(theme_size(Path::new("/i/hicolor/32x32@2/apps/a.png")), 64);
        assert_eq!(theme_size(Path::new("/i/hicolor/scalable/apps/a.svg")), u32::MAX);
    }
}
