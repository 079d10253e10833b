//! Term frequency mapping.
//!
//! # Invariants
//! - Counts are sums of token occurrences; a stored count is never zero.
//! - Iteration order is lexicographic by term, so ranking ties resolve the
//!   same way for a given mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized token → occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, u64>",
    into = "BTreeMap<String, u64>"
)]
pub struct TermFrequencies(BTreeMap<String, u64>);

impl TermFrequencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `term`.
    pub fn increment(&mut self, term: &str) {
        self.add(term, 1);
    }

    /// Adds `count` occurrences of `term`; zero counts are ignored.
    pub fn add(&mut self, term: &str, count: u64) {
        if count == 0 {
            return;
        }
        *self.0.entry(term.to_string()).or_insert(0) += count;
    }

    pub fn get(&self, term: &str) -> u64 {
        self.0.get(term).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(term, count)| (term.as_str(), *count))
    }

    /// Returns at most `limit` terms ordered by count descending.
    ///
    /// Equal counts keep lexicographic term order (stable sort over the
    /// ordered map).
    pub fn most_common(&self, limit: usize) -> Vec<(String, u64)> {
        let mut ranked = self
            .0
            .iter()
            .map(|(term, count)| (term.clone(), *count))
            .collect::<Vec<_>>();
        ranked.sort_by(|left, right| right.1.cmp(&left.1));
        ranked.truncate(limit);
        ranked
    }

    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.0
    }
}

impl From<BTreeMap<String, u64>> for TermFrequencies {
    fn from(value: BTreeMap<String, u64>) -> Self {
        Self(value.into_iter().filter(|(_, count)| *count > 0).collect())
    }
}

impl From<TermFrequencies> for BTreeMap<String, u64> {
    fn from(value: TermFrequencies) -> Self {
        value.0
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for TermFrequencies {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        let mut frequencies = Self::new();
        for (term, count) in iter {
            let term: String = term.into();
            frequencies.add(&term, count);
        }
        frequencies
    }
}
