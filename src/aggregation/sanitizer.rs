// src/aggregation/sanitizer.rs
//! Page-identifier normalization.
//!
//! Raw page names arrive noisy: duplicated whitespace, surrounding blanks
//! and characters that upstream formatting differences smuggle in. Steps are
//! normalized before any grouping so that near-duplicate titles collapse
//! onto one page identity. The rule set is pluggable.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::Step;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap_or_else(|_| panic!("Invalid Regex")));

static HOSTILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\\/:*?"<>|]"#).unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Normalizes one raw page identifier into its canonical form.
pub trait PageNameSanitizer {
    fn sanitize(&self, raw: &str) -> String;
}

/// Default rules: trim, collapse whitespace runs to a single space, replace
/// filesystem-hostile characters with underscores.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPageNameSanitizer;

impl PageNameSanitizer for DefaultPageNameSanitizer {
    fn sanitize(&self, raw: &str) -> String {
        let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
        HOSTILE_RE.replace_all(&collapsed, "_").into_owned()
    }
}

/// Applies the sanitizer to every step's page name in place. Steps without
/// a page are left untouched; grouping files them under the unknown page.
pub fn sanitize_page_names(steps: &mut [Step], sanitizer: &dyn PageNameSanitizer) {
    for step in steps {
        if let Some(page) = &mut step.page {
            page.name = sanitizer.sanitize(&page.name);
        }
    }
}
