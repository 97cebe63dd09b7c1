//! `.desktop` file parsing.
//!
//! Only the `[Desktop Entry]` group is read. Keys in other groups (actions,
//! vendor extensions) are ignored.

use radial_core::Locale;
use std::collections::HashMap;

/// The subset of a desktop entry the launcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    /// Desktop file id, e.g. `org.gnome.Calendar.desktop`
    pub id: String,

    /// `Type=` value
    pub kind: String,

    /// Unlocalized `Name=`
    pub name: String,

    /// `Name[locale]=` values keyed by locale (`de`, `pt_BR`, ...)
    pub localized_names: HashMap<String, String>,

    pub exec: Option<String>,
    pub icon: Option<String>,
    pub terminal: bool,
    pub no_display: bool,
    pub hidden: bool,
}

impl DesktopEntry {
    /// Parse the `[Desktop Entry]` group of `content`.
    ///
    /// Returns `None` when the group or its `Name` key is missing.
    pub fn parse(id: impl Into<String>, content: &str) -> Option<Self> {
        let mut in_group = false;
        let mut fields: HashMap<&str, &str> = HashMap::new();
        let mut localized_names = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_group = line == "[Desktop Entry]";
                continue;
            }
            if !in_group {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            if let Some(locale) = key
                .strip_prefix("Name[")
                .and_then(|rest| rest.strip_suffix(']'))
            {
                localized_names.insert(locale.to_string(), unescape(value));
            } else {
                fields.entry(key).or_insert(value);
            }
        }

        let name = fields.get("Name")?;
        let flag = |key: &str| fields.get(key).is_some_and(|v| v.eq_ignore_ascii_case("true"));

        Some(DesktopEntry {
            id: id.into(),
            kind: fields.get("Type").copied().unwrap_or("Application").to_string(),
            name: unescape(name),
            localized_names,
            exec: fields.get("Exec").map(|v| v.to_string()),
            icon: fields
                .get("Icon")
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string()),
            terminal: flag("Terminal"),
            no_display: flag("NoDisplay"),
            hidden: flag("Hidden"),
        })
    }

    /// Whether the entry belongs in the launcher.
    pub fn is_launchable(&self) -> bool {
        self.kind == "Application" && !self.no_display && !self.hidden && self.exec.is_some()
    }

    /// The name for `locale`: `Name[ll_CC]`, then `Name[ll]`, then `Name`.
    pub fn label(&self, locale: &Locale) -> &str {
        let language = locale.language();
        if let Some(region) = locale.region() {
            if let Some(name) = self.localized_names.get(&format!("{language}_{region}")) {
                return name;
            }
        }
        self.localized_names
            .get(&language)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    /// The desktop id without the `.desktop` suffix.
    pub fn package(&self) -> &str {
        self.id.strip_suffix(".desktop").unwrap_or(&self.id)
    }
}

/// Undo the string escapes of the desktop entry format.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
