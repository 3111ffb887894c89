//! Slugs and the `<date>-<slug>` document naming convention.
//!
//! Every generated document, whatever its source, is named the same way:
//!
//! - stem: `2021-06-01-my-talk-part-2`
//! - filename: `2021-06-01-my-talk-part-2.md`
//! - permalink: `/talks/2021-06-01-my-talk-part-2`
//!
//! The slug comes from the title unless a row supplies its own.

use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// URL-safe identifier for `text`, or `fallback` when nothing survives.
///
/// - `"My Talk: Part 2!"` → `"my-talk-part-2"`
/// - `"  --  "` → `fallback`
pub fn slugify(text: &str, fallback: &str) -> String {
    let lowered = text.to_lowercase();
    let slug = NON_SLUG_RUN.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug.to_string()
    }
}

/// Name parts of one generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName {
    /// `<date>-<slug>`, shared by the filename and the permalink.
    pub stem: String,
}

impl DocumentName {
    pub fn new(date: &str, slug: &str) -> Self {
        Self {
            stem: format!("{date}-{slug}"),
        }
    }

    pub fn filename(&self) -> String {
        format!("{}.md", self.stem)
    }

    pub fn permalink(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.stem)
    }
}
