//! Fuzzy search over indexed apps.
//!
//! A query ranks entries in three tiers, decided on the locale-lower-cased
//! label:
//!
//! 1. **Prefix**: the label starts with the query
//! 2. **Substring**: the label contains the query elsewhere
//! 3. **Near-miss**: fewer than two mismatching characters over the length
//!    both strings share
//!
//! Entries matching no tier are dropped. Within a tier, entries are sorted by
//! their lower-cased label with the locale's collator. An empty query returns
//! every entry sorted by label, untiered.
//!
//! ## Performance
//!
//! A query costs O(n log n) in the number of indexed apps. Tier
//! classification switches to Rayon above a configurable entry count.

use crate::locale::Locale;
use crate::types::AppEntry;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Entry count above which tier classification runs in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// The match class of a search result, in ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// The label starts with the query
    Prefix,
    /// The label contains the query but does not start with it
    Substring,
    /// The label is within one character of the query over their common length
    NearMiss,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::Prefix => write!(f, "prefix"),
            MatchTier::Substring => write!(f, "substring"),
            MatchTier::NearMiss => write!(f, "near-miss"),
        }
    }
}

/// A ranked search result.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matching entry
    pub entry: Arc<AppEntry>,

    /// The tier it matched in; `None` for an empty query
    pub tier: Option<MatchTier>,
}

/// Tiered fuzzy matcher over app labels.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    parallel_threshold: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        FuzzyMatcher {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Set the entry count above which classification runs on Rayon.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Rank `entries` against `query`, returning the matching entries in order.
    pub fn search(&self, entries: &[Arc<AppEntry>], query: &str, locale: &Locale) -> Vec<Arc<AppEntry>> {
        self.search_tiered(entries, query, locale)
            .into_iter()
            .map(|result| result.entry)
            .collect()
    }

    /// Rank `entries` against `query`, keeping the tier of every result.
    pub fn search_tiered(
        &self,
        entries: &[Arc<AppEntry>],
        query: &str,
        locale: &Locale,
    ) -> Vec<SearchResult> {
        let query = locale.to_lowercase(query.trim());

        let classify_one = |entry: &Arc<AppEntry>| {
            let label = locale.to_lowercase(&entry.label);
            if query.is_empty() {
                return Some((None, label, entry.clone()));
            }
            classify(&label, &query).map(|tier| (Some(tier), label, entry.clone()))
        };

        let mut ranked: Vec<(Option<MatchTier>, String, Arc<AppEntry>)> =
            if entries.len() > self.parallel_threshold {
                entries.par_iter().filter_map(classify_one).collect()
            } else {
                entries.iter().filter_map(classify_one).collect()
            };

        let collator = locale.collator();
        ranked.sort_by(|(tier_a, label_a, _), (tier_b, label_b, _)| {
            tier_a
                .cmp(tier_b)
                .then_with(|| collator.compare(label_a, label_b))
        });

        trace!(
            query = %query,
            locale = %locale,
            candidates = entries.len(),
            matches = ranked.len(),
            "Search complete"
        );

        ranked
            .into_iter()
            .map(|(tier, _, entry)| SearchResult { entry, tier })
            .collect()
    }
}

/// Rank `entries` with the default matcher.
pub fn search(entries: &[Arc<AppEntry>], query: &str, locale: &Locale) -> Vec<Arc<AppEntry>> {
    FuzzyMatcher::new().search(entries, query, locale)
}

/// Classify an already lower-cased label against a non-empty lower-cased query.
pub fn classify(label: &str, query: &str) -> Option<MatchTier> {
    if label.starts_with(query) {
        Some(MatchTier::Prefix)
    } else if label.contains(query) {
        Some(MatchTier::Substring)
    } else if hamming_distance(label, query) < 2 {
        Some(MatchTier::NearMiss)
    } else {
        None
    }
}

/// Count mismatching characters over the first `min(len(a), len(b))` positions.
///
/// Any length difference beyond the shared prefix is ignored.
pub fn hamming_distance(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .filter(|(left, right)| left != right)
        .count()
}
