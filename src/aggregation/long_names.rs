// src/aggregation/long_names.rs
//! Long-Name Resolution
//!
//! Business object names are arbitrary display strings; derived object files
//! need short, filesystem-safe, collision-free keys. Resolution is scoped to
//! one build's index lifetime and is persisted as a long-to-short map so that
//! reads can reverse-resolve keys back to display names.

use std::collections::{BTreeMap, BTreeSet};

use crate::docu::encode_name;

/// Upper bound on generated short keys (disambiguation included).
pub const MAX_SHORT_KEY_LENGTH: usize = 64;

/// Deterministic, collision-free long-name to short-key mapping.
///
/// Collisions are avoided with a stored reverse set plus a numeric suffix,
/// never by hashing: two distinct long names can never yield the same key,
/// and repeated resolution of the same name always yields the same key.
#[derive(Debug, Default)]
pub struct LongObjectNamesResolver {
    short_by_long: BTreeMap<String, String>,
    used: BTreeSet<String>,
}

impl LongObjectNamesResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a long object name to its short key, minting a new key on
    /// first sight.
    pub fn resolve(&mut self, long_name: &str) -> String {
        if let Some(existing) = self.short_by_long.get(long_name) {
            return existing.clone();
        }

        // encode_name output is pure ASCII, so byte truncation is safe.
        let mut base = encode_name(long_name);
        base.truncate(MAX_SHORT_KEY_LENGTH);

        let mut candidate = base.clone();
        let mut counter = 2;
        while self.used.contains(&candidate) {
            let suffix = format!("_{counter}");
            let keep = MAX_SHORT_KEY_LENGTH.saturating_sub(suffix.len());
            candidate = format!("{}{suffix}", &base[..base.len().min(keep)]);
            counter += 1;
        }

        self.used.insert(candidate.clone());
        self.short_by_long
            .insert(long_name.to_string(), candidate.clone());
        candidate
    }

    /// The persisted long-to-short index, sorted by long name.
    #[must_use]
    pub fn index(&self) -> &BTreeMap<String, String> {
        &self.short_by_long
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.short_by_long.is_empty()
    }
}
