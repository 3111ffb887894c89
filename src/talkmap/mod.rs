//! Talk map dataset builder.
//!
//! Collects the `location:` of every generated talk, resolves each distinct
//! location to coordinates, and writes the `var addressPoints = [...]`
//! dataset the site's map page loads.
//!
//! ```text
//! _talks/*.md ──► locations ──► cache (+ legacy dataset) ──► lookups ──► points ──► org-locations.js
//!                                   │
//!                                   └──────────── saved once per run ◄──────────────────┘
//! ```
//!
//! Lookups go to an external service with a strict rate policy, so they are
//! cached permanently, spaced by a [`Throttle`], and optionally capped per
//! run (`lookup_limit`). Repeated scheduled runs therefore converge on a
//! complete cache without bursting the service.
//!
//! A run that finds locations but can resolve none of them (service down,
//! `--skip-geocode` with a cold cache) keeps the previous dataset instead of
//! replacing it with an empty one, unless `allow_empty_output` is set.

pub mod cache;
pub mod geocoder;
pub mod location;
pub mod points;

use crate::config::TalkmapConfig;
use crate::types::WriteStatus;
use crate::write::write_if_changed;
use cache::GeocodeCache;
use geocoder::{Geocoder, Throttle};
use points::{build_address_points, render_dataset};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum TalkmapError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything one talk map run needs to know.
#[derive(Debug, Clone)]
pub struct TalkmapOptions {
    pub talks_dir: PathBuf,
    pub output_js: PathBuf,
    pub cache_file: PathBuf,
    pub min_delay: Duration,
    /// Maximum lookups this run; 0 means no limit.
    pub lookup_limit: usize,
    /// Resolve from the cache only.
    pub skip_geocode: bool,
    /// Write the dataset even when no location resolved.
    pub allow_empty_output: bool,
    /// No lookups and no writes; report what would happen.
    pub dry_run: bool,
}

impl TalkmapOptions {
    /// Options from a validated config section, all switches off.
    pub fn from_config(config: &TalkmapConfig) -> Self {
        Self {
            talks_dir: config.talks_dir.clone(),
            output_js: config.output_js.clone(),
            cache_file: config.cache_file.clone(),
            min_delay: Duration::try_from_secs_f64(config.min_delay_secs).unwrap_or_default(),
            lookup_limit: config.lookup_limit,
            skip_geocode: false,
            allow_empty_output: false,
            dry_run: false,
        }
    }
}

/// What happened to the dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetOutcome {
    /// Rendered and handed to the idempotent writer.
    Rendered(WriteStatus),
    /// Nothing resolved; the previous dataset was left in place.
    KeptExisting,
    /// The talks directory does not exist; nothing was read or written.
    TalksDirMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TalkmapReport {
    /// Distinct locations found in the talk documents.
    pub locations: usize,
    /// Locations with coordinates, i.e. entries in the dataset.
    pub points: usize,
    /// Requests sent to the geocoder this run.
    pub lookups: usize,
    /// Lookups that returned coordinates this run.
    pub new_geocodes: usize,
    /// Missing locations that no lookup resolved: service errors, no
    /// match, or no geocoder available.
    pub failed_lookups: usize,
    /// Locations without coordinates after this run.
    pub unresolved: usize,
    /// Lookups a dry run would have attempted.
    pub pending_lookups: usize,
    pub outcome: DatasetOutcome,
}

/// Counts from one [`geocode_missing`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    pub attempted: usize,
    pub resolved: usize,
    pub failed: usize,
}

/// Locations to look up this run: uncached ones, capped at `limit` when
/// `limit` is positive.
pub fn lookup_candidates<'a>(
    locations: &'a [String],
    cache: &GeocodeCache,
    limit: usize,
) -> Vec<&'a str> {
    let mut missing = cache.missing(locations);
    if limit > 0 {
        missing.truncate(limit);
    }
    missing
}

/// Resolve uncached locations into `cache`.
///
/// A failed or empty lookup leaves the cache untouched and is counted as
/// failed. With no geocoder every candidate fails without a request.
pub fn geocode_missing(
    locations: &[String],
    cache: &mut GeocodeCache,
    geocoder: Option<&dyn Geocoder>,
    throttle: &mut Throttle,
    limit: usize,
) -> LookupStats {
    let candidates = lookup_candidates(locations, cache, limit);
    let mut stats = LookupStats::default();
    if candidates.is_empty() {
        return stats;
    }

    let Some(geocoder) = geocoder else {
        warn!(
            "no geocoder available; {} location(s) left unresolved",
            candidates.len()
        );
        stats.failed = candidates.len();
        return stats;
    };

    for location in candidates {
        throttle.wait();
        stats.attempted += 1;
        match geocoder.resolve(location) {
            Ok(Some(coordinate)) => {
                debug!(
                    "geocoded {location:?} to {}, {}",
                    coordinate.latitude, coordinate.longitude
                );
                cache.insert(location, coordinate);
                stats.resolved += 1;
            }
            Ok(None) => {
                warn!("no geocoding match for {location:?}");
                stats.failed += 1;
            }
            Err(err) => {
                warn!("geocoding {location:?} failed: {err}");
                stats.failed += 1;
            }
        }
    }
    stats
}

/// Build the talk map dataset.
///
/// The cache is saved once, after all lookups, whether or not the dataset
/// is written. Dry runs skip lookups and all writes.
pub fn run(
    options: &TalkmapOptions,
    geocoder: Option<&dyn Geocoder>,
) -> Result<TalkmapReport, TalkmapError> {
    let mut report = TalkmapReport {
        locations: 0,
        points: 0,
        lookups: 0,
        new_geocodes: 0,
        failed_lookups: 0,
        unresolved: 0,
        pending_lookups: 0,
        outcome: DatasetOutcome::TalksDirMissing,
    };
    if !options.talks_dir.is_dir() {
        return Ok(report);
    }

    let locations = location::load_locations(&options.talks_dir)?;
    report.locations = locations.len();

    let mut cache = GeocodeCache::load(&options.cache_file);
    let seeded = cache.seed_from_legacy_dataset(&options.output_js);
    if seeded > 0 {
        info!(
            "seeded {seeded} cache entries from {}",
            options.output_js.display()
        );
    }

    if !options.skip_geocode {
        if options.dry_run {
            report.pending_lookups =
                lookup_candidates(&locations, &cache, options.lookup_limit).len();
        } else {
            let mut throttle = Throttle::new(options.min_delay);
            let stats = geocode_missing(
                &locations,
                &mut cache,
                geocoder,
                &mut throttle,
                options.lookup_limit,
            );
            report.lookups = stats.attempted;
            report.new_geocodes = stats.resolved;
            report.failed_lookups = stats.failed;
        }
    }

    let (points, unresolved) = build_address_points(&locations, &cache);
    report.points = points.len();
    report.unresolved = unresolved;

    if !options.dry_run {
        cache.save(&options.cache_file)?;
    }

    if !locations.is_empty() && points.is_empty() && !options.allow_empty_output {
        report.outcome = DatasetOutcome::KeptExisting;
        return Ok(report);
    }

    let content = render_dataset(&points)?;
    let status = write_if_changed(&options.output_js, &content, options.dry_run)?;
    report.outcome = DatasetOutcome::Rendered(status);
    Ok(report)
}
