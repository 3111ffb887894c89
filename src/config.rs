//! Generator configuration.
//!
//! Handles loading, validating, and merging `scholarsite.toml`. Every key has
//! a stock default matching the usual academic-site layout, so the file is
//! optional and sparse: override just the values you need.
//!
//! ## Configuration Options
//!
//! ```toml
//! [publications]
//! input = "markdown_generator/publications.tsv"
//! output_dir = "_publications"
//!
//! [talks]
//! input = "markdown_generator/talks.tsv"
//! output_dir = "_talks"
//!
//! [bibtex]
//! output_dir = "_publications"
//! order = ["proceeding", "journal"]
//!
//! [bibtex.sources.journal]
//! file = "markdown_generator/pubs.bib"
//! venue_key = "journal"
//! venue_prefix = ""
//! collection_name = "publications"
//! collection_permalink = "/publication/"
//!
//! [talkmap]
//! talks_dir = "_talks"
//! output_js = "talkmap/org-locations.js"
//! cache_file = "talkmap/geocode-cache.json"
//! user_agent = "scholarsite-talkmap-generator"
//! endpoint = "https://nominatim.openstreetmap.org/search"
//! min_delay_secs = 1.1      # pause between geocoding requests
//! timeout_secs = 10         # per-request timeout
//! lookup_limit = 0          # max uncached lookups per run (0 = no limit)
//! ```
//!
//! Unknown keys are rejected to catch typos early. Command-line flags
//! override whatever the file says.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "scholarsite.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub publications: TsvConfig,
    pub talks: TsvConfig,
    pub bibtex: BibtexConfig,
    pub talkmap: TalkmapConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            publications: TsvConfig::default(),
            talks: default_talks(),
            bibtex: BibtexConfig::default(),
            talkmap: TalkmapConfig::default(),
        }
    }
}

impl Config {
    /// Validate values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let talkmap = &self.talkmap;
        if Duration::try_from_secs_f64(talkmap.min_delay_secs).is_err() {
            return Err(ConfigError::Validation(format!(
                "talkmap.min_delay_secs must be a non-negative number of seconds, got {}",
                talkmap.min_delay_secs
            )));
        }
        if talkmap.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "talkmap.timeout_secs must be greater than zero".into(),
            ));
        }
        for (name, source) in &self.bibtex.sources {
            if source.venue_key.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "bibtex.sources.{name}.venue_key must not be empty"
                )));
            }
            if source.file.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "bibtex.sources.{name}.file must not be empty"
                )));
            }
        }
        for name in &self.bibtex.order {
            if !self.bibtex.sources.contains_key(name) {
                return Err(ConfigError::Validation(format!(
                    "bibtex.order names unknown source {name:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Input and output locations for a TSV-driven generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TsvConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for TsvConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("markdown_generator/publications.tsv"),
            output_dir: PathBuf::from("_publications"),
        }
    }
}

fn default_talks() -> TsvConfig {
    TsvConfig {
        input: PathBuf::from("markdown_generator/talks.tsv"),
        output_dir: PathBuf::from("_talks"),
    }
}

/// BibTeX generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BibtexConfig {
    pub output_dir: PathBuf,
    /// Sources to run first, in this order. Each source keeps its own
    /// duplicate guard, so a later source rewrites a document an earlier one
    /// produced under the same filename.
    pub order: Vec<String>,
    /// Named sources. Those missing from `order` run after it, in name order.
    pub sources: BTreeMap<String, BibSource>,
}

impl BibtexConfig {
    /// Every configured source name in processing order.
    pub fn run_order(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.sources.len());
        for name in &self.order {
            if self.sources.contains_key(name) && !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        for name in self.sources.keys() {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}

impl Default for BibtexConfig {
    fn default() -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(
            "proceeding".to_string(),
            BibSource {
                file: PathBuf::from("markdown_generator/proceedings.bib"),
                venue_key: "booktitle".into(),
                venue_prefix: "In the proceedings of ".into(),
                ..BibSource::default()
            },
        );
        sources.insert(
            "journal".to_string(),
            BibSource {
                file: PathBuf::from("markdown_generator/pubs.bib"),
                venue_key: "journal".into(),
                ..BibSource::default()
            },
        );
        Self {
            output_dir: PathBuf::from("_publications"),
            order: vec!["proceeding".into(), "journal".into()],
            sources,
        }
    }
}

/// One `.bib` file and how its entries map onto publication documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BibSource {
    pub file: PathBuf,
    /// Field holding the venue (`booktitle`, `journal`).
    pub venue_key: String,
    /// Text prepended to the venue, e.g. `"In the proceedings of "`.
    pub venue_prefix: String,
    pub collection_name: String,
    pub collection_permalink: String,
}

impl Default for BibSource {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            venue_key: "journal".into(),
            venue_prefix: String::new(),
            collection_name: "publications".into(),
            collection_permalink: "/publication/".into(),
        }
    }
}

/// Talk map settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TalkmapConfig {
    /// Directory of generated talk documents.
    pub talks_dir: PathBuf,
    /// `var addressPoints = [...]` dataset consumed by the map page.
    pub output_js: PathBuf,
    pub cache_file: PathBuf,
    /// Sent with every geocoding request, as the service's policy requires.
    pub user_agent: String,
    pub endpoint: String,
    pub min_delay_secs: f64,
    pub timeout_secs: u64,
    /// Maximum uncached lookups per run; 0 means no limit.
    pub lookup_limit: usize,
}

impl Default for TalkmapConfig {
    fn default() -> Self {
        Self {
            talks_dir: PathBuf::from("_talks"),
            output_js: PathBuf::from("talkmap/org-locations.js"),
            cache_file: PathBuf::from("talkmap/geocode-cache.json"),
            user_agent: "scholarsite-talkmap-generator".into(),
            endpoint: "https://nominatim.openstreetmap.org/search".into(),
            min_delay_secs: 1.1,
            timeout_secs: 10,
            lookup_limit: 0,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value; `Ok(None)` when it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `path` on top of the stock defaults. A missing file is not an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// The stock defaults with no file at all.
pub fn stock_config() -> Config {
    // Stock values always validate.
    resolve_config(stock_defaults_value(), None).unwrap_or_default()
}

/// A fully-commented stock `scholarsite.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# scholarsite configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Paths are relative to the directory
# the command runs in. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Publications from a TSV file
# ---------------------------------------------------------------------------
# Required columns: pub_date, title, venue, citation.
# Optional columns: excerpt, paper_url, slides_url, url_slug.
[publications]
input = "markdown_generator/publications.tsv"
output_dir = "_publications"

# ---------------------------------------------------------------------------
# Talks from a TSV file
# ---------------------------------------------------------------------------
# Required columns: title, date.
# Optional columns: type, venue, location, talk_url, description, url_slug.
[talks]
input = "markdown_generator/talks.tsv"
output_dir = "_talks"

# ---------------------------------------------------------------------------
# Publications from BibTeX files
# ---------------------------------------------------------------------------
[bibtex]
output_dir = "_publications"

# Sources to run first, in this order; the rest follow in name order.
# When two sources produce the same filename, the later one's document stays.
order = ["proceeding", "journal"]

# One table per source. Entries need title, year and the venue field.
[bibtex.sources.proceeding]
file = "markdown_generator/proceedings.bib"
venue_key = "booktitle"
venue_prefix = "In the proceedings of "
collection_name = "publications"
collection_permalink = "/publication/"

[bibtex.sources.journal]
file = "markdown_generator/pubs.bib"
venue_key = "journal"
venue_prefix = ""
collection_name = "publications"
collection_permalink = "/publication/"

# ---------------------------------------------------------------------------
# Talk map
# ---------------------------------------------------------------------------
[talkmap]
# Directory scanned for talk documents with a `location:` field.
talks_dir = "_talks"

# Generated `var addressPoints = [...]` file.
output_js = "talkmap/org-locations.js"

# Persistent geocode cache (location -> latitude/longitude).
cache_file = "talkmap/geocode-cache.json"

# Nominatim requires an identifying user agent.
user_agent = "scholarsite-talkmap-generator"
endpoint = "https://nominatim.openstreetmap.org/search"

# Minimum pause between geocoding requests, in seconds.
min_delay_secs = 1.1

# Per-request timeout, in seconds.
timeout_secs = 10

# Maximum uncached locations to look up per run. 0 means no limit.
lookup_limit = 0
"##
}
