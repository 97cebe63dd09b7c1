//! Core data types for Radial.
//!
//! This module defines the fundamental data structures used throughout the
//! indexing, menu and search system. These types are designed to be:
//!
//! - **Stable**: `AppIdentifier` has one canonical textual form used for persistence
//! - **Platform-agnostic**: Icons are opaque handles, never decoded here
//! - **Cheap to share**: Entries are immutable once indexed and handed out behind `Arc`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::RadialError;

/// Stable key naming one launchable activity: `(package, class)`.
///
/// Equality and hashing are structural. The canonical textual form is
/// `package/class`; see [`AppIdentifier::parse`] for what is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AppIdentifier {
    package: String,
    class: String,
}

impl AppIdentifier {
    /// Create an identifier from its two components.
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        AppIdentifier {
            package: package.into(),
            class: class.into(),
        }
    }

    /// The owning package name
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The activity/class name within the package
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Parse the textual form `package/class`.
    ///
    /// A class starting with `.` is relative to the package, so
    /// `com.x/.Main` parses as `com.x/com.x.Main`. Returns `None` for input
    /// without a `/`, with an empty package or class, or containing a line
    /// break.
    pub fn parse(input: &str) -> Option<Self> {
        if input.contains(['\n', '\r']) {
            return None;
        }
        let (package, class) = input.split_once('/')?;
        if package.is_empty() || class.is_empty() {
            return None;
        }
        let class = if class.starts_with('.') {
            format!("{package}{class}")
        } else {
            class.to_string()
        };
        Some(AppIdentifier::new(package, class))
    }

    /// Canonical single-line form, always the full `package/class`.
    pub fn to_line(&self) -> String {
        format!("{}/{}", self.package, self.class)
    }
}

impl fmt::Display for AppIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

impl FromStr for AppIdentifier {
    type Err = RadialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppIdentifier::parse(s).ok_or_else(|| RadialError::InvalidIdentifier {
            input: s.to_string(),
        })
    }
}

impl From<AppIdentifier> for String {
    fn from(id: AppIdentifier) -> Self {
        id.to_line()
    }
}

impl TryFrom<String> for AppIdentifier {
    type Error = RadialError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Opaque reference to externally-decoded icon data.
///
/// The core never inspects pixels; hosts put whatever their renderer needs
/// in here and get it back with [`IconHandle::downcast_ref`].
#[derive(Clone)]
pub struct IconHandle(Option<Arc<dyn Any + Send + Sync>>);

impl IconHandle {
    /// Wrap a host-specific decoded icon
    pub fn new<T: Any + Send + Sync>(icon: T) -> Self {
        IconHandle(Some(Arc::new(icon)))
    }

    /// A handle carrying no icon
    pub fn none() -> Self {
        IconHandle(None)
    }

    /// Whether the handle carries an icon at all
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Borrow the decoded icon as its concrete host type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|icon| icon.downcast_ref::<T>())
    }
}

impl Default for IconHandle {
    fn default() -> Self {
        IconHandle::none()
    }
}

impl fmt::Debug for IconHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("IconHandle(..)"),
            None => f.write_str("IconHandle(none)"),
        }
    }
}

/// Host-specific icon source as produced by enumeration, before decoding.
#[derive(Clone)]
pub struct RawIcon(Option<Arc<dyn Any + Send + Sync>>);

impl RawIcon {
    pub fn new<T: Any + Send + Sync>(source: T) -> Self {
        RawIcon(Some(Arc::new(source)))
    }

    pub fn none() -> Self {
        RawIcon(None)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|source| source.downcast_ref::<T>())
    }

    /// Re-wrap the source unchanged as a display handle
    pub fn into_handle(self) -> IconHandle {
        IconHandle(self.0)
    }
}

impl fmt::Debug for RawIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("RawIcon(..)"),
            None => f.write_str("RawIcon(none)"),
        }
    }
}

/// Indexed record for one installed, launchable activity.
///
/// Owned by the [`EntryStore`](crate::EntryStore) and handed out behind
/// `Arc`, so a snapshot taken before a rebuild stays valid after it.
#[derive(Debug, Clone)]
pub struct AppEntry {
    /// Unique key of this entry
    pub identifier: AppIdentifier,

    /// Display name, casing preserved as loaded
    pub label: String,

    /// Opaque decoded icon
    pub icon: IconHandle,
}

impl AppEntry {
    /// Create a new entry
    pub fn new(identifier: AppIdentifier, label: impl Into<String>, icon: IconHandle) -> Self {
        AppEntry {
            identifier,
            label: label.into(),
            icon,
        }
    }

    /// The owning package of this entry
    pub fn package(&self) -> &str {
        self.identifier.package()
    }
}

impl PartialEq for AppEntry {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier && self.label == other.label
    }
}

impl Eq for AppEntry {}

/// Statistics about the index and menu
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of entries in the store
    pub entries: usize,

    /// Number of distinct packages in the store
    pub packages: usize,

    /// Number of entries in the curated menu
    pub menu_entries: usize,

    /// When the last indexing or removal pass completed
    pub last_indexed: Option<DateTime<Utc>>,

    /// Number of completed mutation passes
    pub generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_round_trip() {
        let ids = [
            AppIdentifier::new("com.android.chrome", "com.google.android.apps.chrome.Main"),
            AppIdentifier::new("org.gnome.Nautilus", "default"),
            AppIdentifier::new("pkg with spaces", "Class$Inner"),
        ];
        for id in ids {
            assert_eq!(AppIdentifier::parse(&id.to_line()), Some(id));
        }
    }

    #[test]
    fn test_parse_short_form() {
        let id = AppIdentifier::parse("com.example.mail/.MainActivity").unwrap();
        assert_eq!(id.package(), "com.example.mail");
        assert_eq!(id.class(), "com.example.mail.MainActivity");
        assert_eq!(id.to_line(), "com.example.mail/com.example.mail.MainActivity");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(AppIdentifier::parse(""), None);
        assert_eq!(AppIdentifier::parse("no-separator"), None);
        assert_eq!(AppIdentifier::parse("/class.only"), None);
        assert_eq!(AppIdentifier::parse("package.only/"), None);
        assert_eq!(AppIdentifier::parse("a/b\nc/d"), None);
    }

    #[test]
    fn test_class_may_contain_slash() {
        let id = AppIdentifier::parse("pkg/a/b").unwrap();
        assert_eq!(id.package(), "pkg");
        assert_eq!(id.class(), "a/b");
    }

    #[test]
    fn test_from_str_error() {
        let err = "garbage".parse::<AppIdentifier>().unwrap_err();
        assert!(matches!(err, RadialError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_icon_handle_downcast() {
        let icon = IconHandle::new(String::from("/usr/share/icons/app.png"));
        assert_eq!(
            icon.downcast_ref::<String>().map(String::as_str),
            Some("/usr/share/icons/app.png")
        );
        assert!(icon.downcast_ref::<u32>().is_none());
        assert!(IconHandle::none().is_none());
    }

    #[test]
    fn test_raw_icon_into_handle() {
        let handle = RawIcon::new(7u32).into_handle();
        assert_eq!(handle.downcast_ref::<u32>(), Some(&7));
    }
}
