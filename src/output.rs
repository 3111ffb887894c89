//! CLI summary lines.
//!
//! Every command prints exactly one line to stdout when it finishes.
//! Per-item warnings go to stderr through `tracing` and so always appear
//! before it. The `format_*` functions are pure and return the line; the
//! `print_*` wrappers write it.
//!
//! ```text
//! publications: mode=write rows=12 written=2 unchanged=9 skipped=1
//! talks: mode=dry-run rows=4 written=4 unchanged=0 skipped=0
//! pubsFromBib: mode=write entries=31 written=0 unchanged=30 skipped=1
//! pubsFromBib: mode=skipped entries=0 written=0 unchanged=0 skipped=0
//! talkmap: mode=write locations=9 points=8 lookups=2 new_geocodes=1 failed_lookups=1 unresolved=1 dataset=written
//! talkmap: mode=write locations=1 points=0 unresolved=1; skip updating talkmap/org-locations.js (use --allow-empty-output to force)
//! ```

use crate::talkmap::{DatasetOutcome, TalkmapOptions, TalkmapReport};
use crate::types::RunSummary;

fn mode(dry_run: bool) -> &'static str {
    if dry_run { "dry-run" } else { "write" }
}

/// `<label>: mode=<mode> <unit>=N written=N unchanged=N skipped=N`
pub fn format_summary(label: &str, unit: &str, summary: &RunSummary, dry_run: bool) -> String {
    format!(
        "{label}: mode={} {unit}={} written={} unchanged={} skipped={}",
        mode(dry_run),
        summary.total,
        summary.written,
        summary.unchanged,
        summary.skipped
    )
}

pub fn print_summary(label: &str, unit: &str, summary: &RunSummary, dry_run: bool) {
    println!("{}", format_summary(label, unit, summary, dry_run));
}

/// Summary of a BibTeX run in a build without a BibTeX parser.
pub fn format_bibtex_skipped() -> String {
    "pubsFromBib: mode=skipped entries=0 written=0 unchanged=0 skipped=0".to_string()
}

pub fn format_talkmap_report(report: &TalkmapReport, options: &TalkmapOptions) -> String {
    let output_js = options.output_js.display();
    match report.outcome {
        DatasetOutcome::TalksDirMissing => format!(
            "talkmap: talks directory not found: {}; skip updating {output_js}",
            options.talks_dir.display()
        ),
        DatasetOutcome::KeptExisting => format!(
            "talkmap: mode={} locations={} points={} unresolved={}; \
             skip updating {output_js} (use --allow-empty-output to force)",
            mode(options.dry_run),
            report.locations,
            report.points,
            report.unresolved
        ),
        DatasetOutcome::Rendered(status) if options.dry_run => format!(
            "talkmap: mode=dry-run locations={} points={} pending_lookups={} unresolved={} dataset={status}",
            report.locations, report.points, report.pending_lookups, report.unresolved
        ),
        DatasetOutcome::Rendered(status) => format!(
            "talkmap: mode=write locations={} points={} lookups={} new_geocodes={} failed_lookups={} unresolved={} dataset={status}",
            report.locations,
            report.points,
            report.lookups,
            report.new_geocodes,
            report.failed_lookups,
            report.unresolved
        ),
    }
}

pub fn print_talkmap_report(report: &TalkmapReport, options: &TalkmapOptions) {
    println!("{}", format_talkmap_report(report, options));
}
