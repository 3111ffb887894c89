//! Location extraction from generated talk documents.
//!
//! Only the front matter is searched, and only its first non-empty
//! `location:` line counts. Values may be bare or wrapped in one pair of
//! matching single or double quotes.

use crate::render::DELIMITER;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

static LOCATION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^location:\s*(.+)$").expect("location pattern is valid"));

/// The text between the first two delimiters, if the document starts with one.
pub fn extract_front_matter(text: &str) -> Option<&str> {
    if !text.starts_with(DELIMITER) {
        return None;
    }
    let mut parts = text.splitn(3, DELIMITER);
    parts.next()?;
    let front = parts.next()?;
    parts.next()?;
    Some(front)
}

fn clean_location_value(raw: &str) -> String {
    let value = raw.trim();
    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && (first == '"' || first == '\'') => {
            value[1..value.len() - 1].trim().to_string()
        }
        // A lone quote character is both the opening and the closing quote.
        (Some(only), None) if only == '"' || only == '\'' => String::new(),
        _ => value.to_string(),
    }
}

/// First non-empty `location:` value in the document's front matter.
pub fn extract_location(text: &str) -> Option<String> {
    let front = extract_front_matter(text)?;
    front
        .lines()
        .filter_map(|line| LOCATION_LINE.captures(line.trim()))
        .map(|caps| clean_location_value(&caps[1]))
        .find(|location| !location.is_empty())
}

/// Read one document, decoding invalid UTF-8 lossily.
pub fn read_location(path: &Path) -> io::Result<Option<String>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(extract_location(&text))
}

/// Sorted, de-duplicated locations of every `*.md` directly in `dir`.
pub fn load_locations(dir: &Path) -> io::Result<Vec<String>> {
    let mut locations = BTreeSet::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        let path = entry.path();
        let is_markdown = path.extension().is_some_and(|ext| ext == "md");
        if !entry.file_type().is_file() || !is_markdown {
            continue;
        }
        if let Some(location) = read_location(path)? {
            locations.insert(location);
        }
    }
    Ok(locations.into_iter().collect())
}
