//! Shared types used across the generators and the talk map.
//!
//! These are the values that cross module boundaries: what a renderer
//! produces, what the writer reports, what a run adds up to, and the
//! coordinate pair stored in the geocode cache.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully rendered document, ready for the idempotent writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// `<date>-<slug>.md`
    pub filename: String,
    /// Final text, terminated by exactly one newline.
    pub content: String,
}

/// Outcome of [`write_if_changed`](crate::write::write_if_changed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// The file already held exactly this content.
    Unchanged,
    /// Content differs but the run is non-mutating.
    DryRun,
    /// Content was written to disk.
    Written,
}

impl WriteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteStatus::Unchanged => "unchanged",
            WriteStatus::DryRun => "dry-run",
            WriteStatus::Written => "written",
        }
    }
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts for one generator run.
///
/// Every processed item lands in exactly one bucket, so
/// `written + unchanged + skipped == total` always holds. Dry-run
/// outcomes count as `written`: they are the files a real run would touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub written: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn record_write(&mut self, status: WriteStatus) {
        self.total += 1;
        match status {
            WriteStatus::Unchanged => self.unchanged += 1,
            WriteStatus::DryRun | WriteStatus::Written => self.written += 1,
        }
    }

    pub fn record_skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    /// Fold another run's counts into this one (multi-source BibTeX runs).
    pub fn absorb(&mut self, other: RunSummary) {
        self.total += other.total;
        self.written += other.written;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
    }
}

/// A resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}
