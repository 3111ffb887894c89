//! BibTeX record source.
//!
//! Each configured source is one `.bib` file plus the mapping of its entries
//! onto publication documents (venue field, venue prefix, collection). An
//! entry is flattened into a [`Record`] with `title`, `date`, `venue`,
//! `citation`, `note` and `url`, then goes through the same
//! [`GenerationRun`] as the TSV generators.
//!
//! Parsing `.bib` syntax is the `biblatex` crate's job and sits behind the
//! `bibtex` cargo feature. Without it, [`generate_from_bibtex`] warns and
//! reports that nothing ran instead of failing.

use crate::citation::{Author, build_citation};
use crate::config::{BibSource, BibtexConfig};
use crate::dates::resolve_bibtex_date;
use crate::generate::{GenerationRun, ItemId};
use crate::record::{Record, RecordError, normalize, strip_bibtex_markup};
use crate::schema::DocumentSchema;
use crate::types::RunSummary;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum BibError {
    #[error("unknown source: {0}")]
    UnknownSource(String),
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Field aliases accepted when the configured name is absent.
const FIELD_ALIASES: &[(&str, &str)] = &[("journal", "journaltitle")];

/// One bibliography entry as handed over by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibEntry {
    /// Citation key.
    pub key: String,
    /// Raw field values keyed by lower-cased field name.
    pub fields: BTreeMap<String, String>,
    pub authors: Vec<Author>,
}

impl BibEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str).or_else(|| {
            FIELD_ALIASES
                .iter()
                .find(|(field, _)| *field == name)
                .and_then(|(_, alias)| self.fields.get(*alias))
                .map(String::as_str)
        })
    }

    fn required(&self, name: &str) -> Result<&str, RecordError> {
        self.field(name)
            .ok_or_else(|| RecordError::MissingBibliographicField(name.to_string()))
    }
}

/// Whether this build can read `.bib` files at all.
pub fn parser_available() -> bool {
    cfg!(feature = "bibtex")
}

/// Parse `.bib` text into entries, in file order.
#[cfg(feature = "bibtex")]
pub fn parse_bibliography(text: &str) -> Result<Vec<BibEntry>, String> {
    use biblatex::{Bibliography, ChunksExt};

    let bibliography = Bibliography::parse(text).map_err(|e| e.to_string())?;
    let entries = bibliography
        .iter()
        .map(|entry| {
            let fields = entry
                .fields
                .iter()
                .map(|(name, chunks)| (name.to_lowercase(), chunks.format_verbatim()))
                .collect();
            let authors = entry
                .author()
                .map(|people| {
                    people
                        .into_iter()
                        .map(|person| {
                            let last = format!("{} {}", person.prefix, person.name);
                            Author::new(person.given_name, last.trim())
                        })
                        .collect()
                })
                .unwrap_or_default();
            BibEntry {
                key: entry.key.clone(),
                fields,
                authors,
            }
        })
        .collect();
    Ok(entries)
}

#[cfg(not(feature = "bibtex"))]
pub fn parse_bibliography(_text: &str) -> Result<Vec<BibEntry>, String> {
    Err("built without the `bibtex` feature".to_string())
}

/// Flatten an entry into the fields the BibTeX document schema reads.
pub fn flatten_entry(entry: &BibEntry, source: &BibSource) -> Result<Record, RecordError> {
    let title = strip_bibtex_markup(entry.required("title")?);
    let date = resolve_bibtex_date(entry.field("year"), entry.field("month"), entry.field("day"))?;
    let year = date.format("%Y").to_string();
    let venue_raw = strip_bibtex_markup(entry.required(&source.venue_key)?);
    let venue = normalize(Some(&format!("{}{venue_raw}", source.venue_prefix)));
    let note = strip_bibtex_markup(entry.field("note").unwrap_or(""));
    let url = normalize(entry.field("url"));
    let citation = build_citation(&entry.authors, &title, &venue, &year);

    Ok(Record::new()
        .with("title", title)
        .with("date", date.format("%Y-%m-%d").to_string())
        .with("venue", venue)
        .with("citation", citation)
        .with("note", note)
        .with("url", url))
}

/// Generate documents for the already-parsed entries of one source.
pub fn generate_from_entries(
    name: &str,
    source: &BibSource,
    entries: &[BibEntry],
    output_dir: &Path,
    dry_run: bool,
) -> RunSummary {
    let schema = DocumentSchema::bibtex(&source.collection_name, &source.collection_permalink);
    let mut run = GenerationRun::new(&schema, output_dir, dry_run);

    for entry in entries {
        let id = ItemId::Entry {
            source: name.to_string(),
            key: entry.key.clone(),
        };
        let processed = match flatten_entry(entry, source) {
            Ok(record) => run.process(&id, &record.normalized()),
            Err(err) => run.skip(&id, err),
        };
        if let Ok((filename, _)) = processed {
            info!("parsed {id} file={filename}");
        }
    }
    run.finish()
}

/// Read, parse and generate one source. A missing file is a warning.
pub fn generate_from_source(
    name: &str,
    source: &BibSource,
    output_dir: &Path,
    dry_run: bool,
) -> Result<RunSummary, BibError> {
    if !source.file.exists() {
        warn!(
            "source={name}: missing bib file: {}",
            source.file.display()
        );
        return Ok(RunSummary::default());
    }
    let text = fs::read_to_string(&source.file)?;
    let entries = parse_bibliography(&text).map_err(|message| BibError::Parse {
        path: source.file.clone(),
        message,
    })?;
    Ok(generate_from_entries(name, source, &entries, output_dir, dry_run))
}

/// Run the `selected` sources in the order given, or every configured source
/// in [`BibtexConfig::run_order`] when none are selected.
///
/// Returns `Ok(None)` when this build has no BibTeX parser. Unknown source
/// names are rejected before any source runs.
pub fn generate_from_bibtex(
    selected: &[String],
    config: &BibtexConfig,
    output_dir: &Path,
    dry_run: bool,
) -> Result<Option<RunSummary>, BibError> {
    if !parser_available() {
        warn!("BibTeX support is not compiled in; rebuild with `--features bibtex` to enable it");
        return Ok(None);
    }

    let names: Vec<&str> = if selected.is_empty() {
        config.run_order()
    } else {
        selected.iter().map(String::as_str).collect()
    };
    let resolved = names
        .into_iter()
        .map(|name| {
            config
                .sources
                .get(name)
                .map(|source| (name, source))
                .ok_or_else(|| BibError::UnknownSource(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut total = RunSummary::default();
    for (name, source) in resolved {
        total.absorb(generate_from_source(name, source, output_dir, dry_run)?);
    }
    Ok(Some(total))
}
