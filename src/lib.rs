//! # scholarsite
//!
//! Content generators for an academic static site. Tabular and BibTeX
//! records become Markdown documents with YAML front matter, and the
//! locations of generated talks become a geocoded dataset for the talk map.
//!
//! # Architecture: One Pipeline, Three Sources
//!
//! Publications (TSV), talks (TSV) and BibTeX publications all flow through
//! the same stages:
//!
//! ```text
//! record ─► normalize ─► render (slug, date, citation, front matter, body) ─► claim filename ─► write if changed
//! ```
//!
//! The sources differ only in where records come from and in their
//! [`schema::DocumentSchema`], a declarative list of required fields,
//! front-matter lines and body sections. One renderer serves all three.
//!
//! The talk map runs separately over the generated talks:
//!
//! ```text
//! _talks/*.md ─► locations ─► geocode cache ─► lookups (throttled, capped) ─► points ─► dataset
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`record`] | Raw and normalized records, per-item error taxonomy |
//! | [`schema`] | Per-kind document schemas |
//! | [`render`] | Front matter and body rendering, scalar escaping |
//! | [`naming`] | Slugs and `<date>-<slug>.md` filenames |
//! | [`dates`] | ISO date validation and BibTeX date resolution |
//! | [`citation`] | Citation strings from authors, title, venue and year |
//! | [`generate`] | Per-run state: duplicate guard, counts, warnings |
//! | [`write`] | Idempotent, dry-run aware file writer |
//! | [`tsv`] | TSV record source (publications, talks) |
//! | [`bibtex`] | BibTeX record source, multiple configured sources |
//! | [`talkmap`] | Location extraction, geocode cache, lookups, dataset |
//! | [`config`] | `scholarsite.toml` loading, merging and validation |
//! | [`types`] | Shared result types |
//! | [`output`] | CLI summary lines |
//!
//! # Design Decisions
//!
//! ## Idempotent Output
//!
//! Generated files are compared byte-for-byte with what is on disk and only
//! rewritten when they differ. Re-running a generator on unchanged input
//! touches nothing, which keeps site rebuilds and version-control diffs quiet.
//!
//! ## Per-Item Failures Never Abort a Run
//!
//! A row with a missing value, an impossible date, or a filename that an
//! earlier row already claimed is reported with its row number (or BibTeX
//! source and key) and skipped. Only a structurally broken input (missing
//! file, missing header or column, unparseable `.bib`) fails the command.
//!
//! ## Explicit Run State
//!
//! The duplicate-filename set and the geocode cache belong to a run object
//! ([`generate::GenerationRun`], [`talkmap::cache::GeocodeCache`]) rather than
//! to globals, so every test gets isolated state.
//!
//! ## Geocoding Is a Capability
//!
//! Lookups go through the [`talkmap::geocoder::Geocoder`] trait. Builds
//! without the `nominatim` feature, or without network, still produce a
//! dataset from the cache.

pub mod bibtex;
pub mod citation;
pub mod config;
pub mod dates;
pub mod generate;
pub mod naming;
pub mod output;
pub mod record;
pub mod render;
pub mod schema;
pub mod talkmap;
pub mod tsv;
pub mod types;
pub mod write;

#[cfg(test)]
pub(crate) mod test_helpers;
