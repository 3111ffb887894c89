//! The generation run: render, deduplicate, write, count.
//!
//! A [`GenerationRun`] owns all per-run state for one source: the output
//! directory, the dry-run flag, the [`DuplicateGuard`] and the
//! [`RunSummary`]. Sources feed it records one at a time through
//! [`GenerationRun::process`]; every per-item failure is logged with the
//! item's location and counted as skipped, never propagated.

use crate::record::{NormalizedRecord, RecordError};
use crate::render::render_document;
use crate::schema::DocumentSchema;
use crate::types::{RenderedDocument, RunSummary, WriteStatus};
use crate::write::write_if_changed;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where an item came from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemId {
    /// 1-based line number in a TSV file (the header is line 1).
    Row(usize),
    /// Citation key within a named BibTeX source.
    Entry { source: String, key: String },
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Row(n) => write!(f, "row {n}"),
            ItemId::Entry { source, key } => write!(f, "source={source} id={key}"),
        }
    }
}

/// Filenames generated so far in this run. The first occurrence wins.
#[derive(Debug, Default)]
pub struct DuplicateGuard {
    seen: HashSet<String>,
}

impl DuplicateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `filename` for this run; fails if it was already claimed.
    pub fn claim(&mut self, filename: &str) -> Result<(), RecordError> {
        if self.seen.insert(filename.to_string()) {
            Ok(())
        } else {
            Err(RecordError::DuplicateGeneratedFilename(filename.to_string()))
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// State for one run of one source.
pub struct GenerationRun<'a> {
    schema: &'a DocumentSchema,
    output_dir: PathBuf,
    dry_run: bool,
    guard: DuplicateGuard,
    summary: RunSummary,
}

impl<'a> GenerationRun<'a> {
    pub fn new(schema: &'a DocumentSchema, output_dir: &Path, dry_run: bool) -> Self {
        Self {
            schema,
            output_dir: output_dir.to_path_buf(),
            dry_run,
            guard: DuplicateGuard::new(),
            summary: RunSummary::default(),
        }
    }

    /// Render and write one record, counting the outcome.
    ///
    /// Returns the written document's filename and status, or the error that
    /// caused the item to be skipped (already logged).
    pub fn process(
        &mut self,
        id: &ItemId,
        record: &NormalizedRecord,
    ) -> Result<(String, WriteStatus), RecordError> {
        let outcome = render_document(self.schema, record).and_then(|doc| self.emit(doc));
        match outcome {
            Ok((filename, status)) => {
                self.summary.record_write(status);
                Ok((filename, status))
            }
            Err(err) => self.skip(id, err),
        }
    }

    /// Count an item that failed before it could be rendered.
    pub fn skip<T>(&mut self, id: &ItemId, err: RecordError) -> Result<T, RecordError> {
        warn!("{id}: {err}");
        self.summary.record_skip();
        Err(err)
    }

    fn emit(&mut self, doc: RenderedDocument) -> Result<(String, WriteStatus), RecordError> {
        self.guard.claim(&doc.filename)?;
        let path = self.output_dir.join(&doc.filename);
        let status = write_if_changed(&path, &doc.content, self.dry_run)
            .map_err(|source| RecordError::Write { path, source })?;
        Ok((doc.filename, status))
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn finish(self) -> RunSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use std::fs;
    use tempfile::TempDir;

    fn talk(title: &str, date: &str) -> NormalizedRecord {
        Record::new()
            .with("title", title)
            .with("date", date)
            .normalized()
    }

    #[test]
    fn guard_rejects_second_claim() {
        let mut guard = DuplicateGuard::new();
        assert!(guard.claim("a.md").is_ok());
        assert!(matches!(
            guard.claim("a.md"),
            Err(RecordError::DuplicateGeneratedFilename(name)) if name == "a.md"
        ));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn item_id_display() {
        assert_eq!(ItemId::Row(7).to_string(), "row 7");
        assert_eq!(
            ItemId::Entry {
                source: "journal".into(),
                key: "doe2020".into()
            }
            .to_string(),
            "source=journal id=doe2020"
        );
    }

    #[test]
    fn duplicate_slug_keeps_first_and_skips_second() {
        let tmp = TempDir::new().unwrap();
        let schema = DocumentSchema::talks();
        let mut run = GenerationRun::new(&schema, tmp.path(), false);

        run.process(&ItemId::Row(2), &talk("Same Title", "2020-01-01"))
            .unwrap();
        let second = run.process(&ItemId::Row(3), &talk("Same  title!", "2020-01-01"));

        assert!(matches!(
            second,
            Err(RecordError::DuplicateGeneratedFilename(_))
        ));
        let summary = run.finish();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 1);

        let content = fs::read_to_string(tmp.path().join("2020-01-01-same-title.md")).unwrap();
        assert!(content.contains("title: \"Same Title\""));
    }

    #[test]
    fn rerun_reports_unchanged() {
        let tmp = TempDir::new().unwrap();
        let schema = DocumentSchema::talks();
        let record = talk("Again", "2021-01-01");

        let mut first = GenerationRun::new(&schema, tmp.path(), false);
        let (_, status) = first.process(&ItemId::Row(2), &record).unwrap();
        assert_eq!(status, WriteStatus::Written);

        let mut second = GenerationRun::new(&schema, tmp.path(), false);
        let (_, status) = second.process(&ItemId::Row(2), &record).unwrap();
        assert_eq!(status, WriteStatus::Unchanged);
        assert_eq!(second.summary().unchanged, 1);
    }

    #[test]
    fn dry_run_counts_as_written_without_files() {
        let tmp = TempDir::new().unwrap();
        let schema = DocumentSchema::talks();
        let mut run = GenerationRun::new(&schema, tmp.path(), true);

        let (name, status) = run
            .process(&ItemId::Row(2), &talk("Dry", "2021-01-01"))
            .unwrap();
        assert_eq!(status, WriteStatus::DryRun);
        assert!(!tmp.path().join(name).exists());
        assert_eq!(run.finish().written, 1);
    }

    #[test]
    fn invalid_record_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let schema = DocumentSchema::talks();
        let mut run = GenerationRun::new(&schema, tmp.path(), false);

        assert!(run
            .process(&ItemId::Row(2), &talk("Bad date", "2021-13-01"))
            .is_err());
        assert!(run
            .process(&ItemId::Row(3), &talk("Good", "2021-12-01"))
            .is_ok());

        let summary = run.finish();
        assert_eq!((summary.total, summary.written, summary.skipped), (2, 1, 1));
    }
}
