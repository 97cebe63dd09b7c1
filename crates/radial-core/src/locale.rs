//! Locale detection, lower-casing and label collation.
//!
//! The locale can change while the launcher is running, so nothing here is
//! cached process-wide: callers obtain a [`Locale`] per operation (usually
//! [`Locale::current`]) and thread it through explicitly.

use icu_collator::{Collator, CollatorOptions};
use std::cmp::Ordering;
use std::env;
use std::fmt;
use tracing::debug;

/// A BCP 47 language tag such as `en`, `de-DE` or `tr-TR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    tag: String,
}

impl Locale {
    /// Create a locale from a tag, normalizing POSIX forms like `de_DE.UTF-8`.
    ///
    /// Unusable input falls back to `en`.
    pub fn new(tag: &str) -> Self {
        Locale {
            tag: normalize_tag(tag).unwrap_or_else(|| "en".to_string()),
        }
    }

    /// Detect the current process locale from the environment.
    pub fn current() -> Self {
        let lc_all = env::var("LC_ALL").ok();
        let lc_collate = env::var("LC_COLLATE").ok();
        let lang = env::var("LANG").ok();
        Self::from_env_values(lc_all.as_deref(), lc_collate.as_deref(), lang.as_deref())
    }

    /// Resolve a locale from `LC_ALL`, `LC_COLLATE` and `LANG`, in that order.
    pub fn from_env_values(
        lc_all: Option<&str>,
        lc_collate: Option<&str>,
        lang: Option<&str>,
    ) -> Self {
        let tag = lc_all
            .and_then(normalize_tag)
            .or_else(|| lc_collate.and_then(normalize_tag))
            .or_else(|| lang.and_then(normalize_tag))
            .unwrap_or_else(|| "en".to_string());
        Locale { tag }
    }

    /// The full tag, e.g. `pt-BR`
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The primary language subtag, lower-cased, e.g. `pt`
    pub fn language(&self) -> String {
        self.tag
            .split('-')
            .next()
            .unwrap_or(&self.tag)
            .to_ascii_lowercase()
    }

    /// The region subtag if present, e.g. `BR`
    pub fn region(&self) -> Option<&str> {
        self.tag
            .split('-')
            .skip(1)
            .find(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
    }

    /// Lower-case `text` with this locale's casing rules.
    ///
    /// Turkish and Azeri map `I` to dotless `ı` and `İ` to `i`; every other
    /// locale uses the default Unicode mapping.
    pub fn to_lowercase(&self, text: &str) -> String {
        match self.language().as_str() {
            "tr" | "az" => text
                .chars()
                .flat_map(|c| match c {
                    'I' => ['ı'].into_iter().chain(None),
                    '\u{130}' => ['i'].into_iter().chain(None),
                    _ => {
                        let mut lower = c.to_lowercase();
                        let first = lower.next().unwrap_or(c);
                        [first].into_iter().chain(lower.next())
                    }
                })
                .collect(),
            _ => text.to_lowercase(),
        }
    }

    /// Build a label comparator for this locale.
    pub fn collator(&self) -> LabelCollator {
        let inner = self
            .tag
            .parse::<icu_locid::Locale>()
            .ok()
            .and_then(|locale| match Collator::try_new(&locale.into(), CollatorOptions::new()) {
                Ok(collator) => Some(collator),
                Err(e) => {
                    debug!(locale = %self.tag, error = %e, "No collator, using code point order");
                    None
                }
            });
        LabelCollator { inner }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::new("en")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Locale-aware string comparison.
///
/// Falls back to code point order when no collation data is available for
/// the locale. Ties are broken by code point order so sorting is total.
pub struct LabelCollator {
    inner: Option<Collator>,
}

impl LabelCollator {
    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        match &self.inner {
            Some(collator) => collator
                .compare(left, right)
                .then_with(|| left.cmp(right)),
            None => left.cmp(right),
        }
    }
}

fn normalize_tag(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw.split('@').next().unwrap_or(raw);
    let raw = raw.split('.').next().unwrap_or(raw);
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.eq_ignore_ascii_case("c") || raw.eq_ignore_ascii_case("posix") {
        return Some("en".to_string());
    }
    Some(raw.replace('_', "-"))
}
