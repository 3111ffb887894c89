//! Raw input records and the normalization applied before anything else.
//!
//! Both record sources (TSV rows and BibTeX entries) are flattened into a
//! [`Record`]: a map from field name to an optional raw value. Nothing
//! downstream ever sees a raw value; [`NormalizedRecord`] is built first and
//! answers every lookup with a trimmed string where spreadsheet sentinels
//! (`nan`, `none`) and absent cells both read as empty.

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Per-item failures. Each one skips the offending row or entry and is
/// reported with enough context to locate it; none aborts the run.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("missing required values: {}", .0.join(", "))]
    MissingRequiredValue(Vec<String>),
    #[error("invalid date {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },
    #[error("duplicate output filename {0}")]
    DuplicateGeneratedFilename(String),
    #[error("missing expected field '{0}'")]
    MissingBibliographicField(String),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Trim a raw value and collapse the `nan`/`none` sentinels to empty.
pub fn normalize(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let text = value.trim();
    if text.eq_ignore_ascii_case("nan") || text.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        text.to_string()
    }
}

/// Normalize, then drop BibTeX grouping braces and escape backslashes.
pub fn strip_bibtex_markup(value: &str) -> String {
    normalize(Some(value)).replace(['{', '}', '\\'], "")
}

/// One input row or bibliography entry, values as they were read.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: BTreeMap<String, Option<String>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Option<String>) {
        self.fields.insert(field.into(), value);
    }

    /// Builder-style insert of a present value.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, Some(value.into()));
        self
    }

    pub fn normalized(&self) -> NormalizedRecord {
        NormalizedRecord {
            fields: self
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), normalize(v.as_deref())))
                .collect(),
        }
    }
}

impl FromIterator<(String, Option<String>)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A [`Record`] after [`normalize`] has been applied to every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRecord {
    fields: BTreeMap<String, String>,
}

impl NormalizedRecord {
    /// Normalized value of `field`; empty when absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    /// Fields from `required` whose normalized value is empty, in order.
    pub fn missing(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|field| !self.has(field))
            .cloned()
            .collect()
    }
}
