//! Tab-separated record source for the publications and talks generators.
//!
//! The file must start with a header row naming every column the document
//! kind requires; a missing header or column rejects the whole file. After
//! that, each row stands alone: a row with an empty required value, a bad
//! date, or a duplicate filename is warned about and skipped.

use crate::generate::{GenerationRun, ItemId};
use crate::record::Record;
use crate::schema::DocumentSchema;
use crate::types::RunSummary;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input TSV does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("TSV header is missing")]
    MissingHeader,
    #[error("Missing required TSV columns: {}", .0.join(", "))]
    MissingRequiredColumn(Vec<String>),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A parsed TSV file: header plus one [`Record`] per data row.
#[derive(Debug)]
pub struct TsvTable {
    pub headers: Vec<String>,
    /// `(line number, record)`; the first data row is line 2.
    pub rows: Vec<(usize, Record)>,
}

impl TsvTable {
    /// Parse TSV text. A leading byte-order mark is ignored and short rows
    /// simply lack the trailing columns.
    pub fn parse(text: &str) -> Result<Self, InputError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(InputError::MissingHeader);
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row = result?;
            let record = headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), row.get(i).map(str::to_string)))
                .collect();
            rows.push((index + 2, record));
        }

        Ok(Self { headers, rows })
    }

    pub fn load(path: &Path) -> Result<Self, InputError> {
        if !path.exists() {
            return Err(InputError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Fail unless every `required` column is in the header.
    pub fn require_columns(&self, required: &[String]) -> Result<(), InputError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|column| !self.headers.contains(column))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InputError::MissingRequiredColumn(missing))
        }
    }
}

/// Generate one document per row of `input` into `output_dir`.
pub fn generate_from_tsv(
    schema: &DocumentSchema,
    input: &Path,
    output_dir: &Path,
    dry_run: bool,
) -> Result<RunSummary, InputError> {
    let table = TsvTable::load(input)?;
    table.require_columns(&schema.required)?;

    let mut run = GenerationRun::new(schema, output_dir, dry_run);
    for (line, record) in &table.rows {
        // Failures are logged and counted by the run.
        let _ = run.process(&ItemId::Row(*line), &record.normalized());
    }
    Ok(run.finish())
}
