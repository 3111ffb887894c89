//! Calendar date resolution.
//!
//! TSV sources carry a ready-made `YYYY-MM-DD` string, which is only
//! validated. BibTeX entries carry `year`, `month` and `day` separately, in
//! whatever shape authors typed them (`2`, `{02}`, `feb`, `February`), and
//! are resolved into a date here. Either way the date must exist on the real
//! calendar: `2020-02-29` passes, `2021-02-29` does not.

use crate::record::{RecordError, normalize};
use chrono::NaiveDate;

const ISO_FORMAT: &str = "%Y-%m-%d";

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn invalid(value: &str, reason: impl Into<String>) -> RecordError {
    RecordError::InvalidDate {
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn clean(raw: &str) -> String {
    raw.trim_matches(|c: char| c == '{' || c == '}' || c == ' ')
        .to_string()
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Validate a pre-formatted ISO date and return it unchanged.
///
/// Only the canonical zero-padded form is accepted, so the returned string
/// can go straight into a filename.
pub fn validate_iso_date(value: &str) -> Result<&str, RecordError> {
    let date = NaiveDate::parse_from_str(value, ISO_FORMAT)
        .map_err(|e| invalid(value, e.to_string()))?;
    if date.format(ISO_FORMAT).to_string() != value {
        return Err(invalid(value, "expected YYYY-MM-DD"));
    }
    Ok(value)
}

fn parse_month(value: Option<&str>) -> Result<u32, RecordError> {
    let raw = normalize(value);
    if raw.is_empty() {
        return Ok(1);
    }
    let cleaned = clean(&raw).to_lowercase();

    if is_all_digits(&cleaned) {
        return match cleaned.parse::<u32>() {
            Ok(month @ 1..=12) => Ok(month),
            _ => Err(invalid(&raw, "invalid month number")),
        };
    }

    let token: String = cleaned.chars().take(3).collect();
    MONTH_NAMES
        .iter()
        .position(|name| *name == token)
        .map(|i| i as u32 + 1)
        .ok_or_else(|| invalid(&raw, "invalid month format"))
}

fn parse_day(value: Option<&str>) -> Result<u32, RecordError> {
    let raw = normalize(value);
    if raw.is_empty() {
        return Ok(1);
    }
    let cleaned = clean(&raw);
    if is_all_digits(&cleaned)
        && let Ok(day @ 1..=31) = cleaned.parse::<u32>()
    {
        return Ok(day);
    }
    Err(invalid(&raw, "invalid day format"))
}

/// Resolve BibTeX `year`/`month`/`day` fields into a calendar date.
///
/// Month and day default to 1 when empty. The combination is checked
/// against the real calendar; the chrono error is kept as the reason.
pub fn resolve_bibtex_date(
    year: Option<&str>,
    month: Option<&str>,
    day: Option<&str>,
) -> Result<NaiveDate, RecordError> {
    let raw_year = normalize(year);
    if !is_all_digits(&raw_year) {
        return Err(invalid(&raw_year, "missing or invalid year"));
    }
    let year: i32 = raw_year
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid(&raw_year, e.to_string()))?;
    if !(1..=9999).contains(&year) {
        return Err(invalid(&raw_year, "year must be between 1 and 9999"));
    }
    let month = parse_month(month)?;
    let day = parse_day(day)?;

    let composed = format!("{year:04}-{month:02}-{day:02}");
    NaiveDate::parse_from_str(&composed, ISO_FORMAT)
        .map_err(|e| invalid(&composed, format!("invalid date combination: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(year: &str, month: &str, day: &str) -> Result<String, RecordError> {
        resolve_bibtex_date(Some(year), Some(month), Some(day)).map(|d| d.to_string())
    }

    #[test]
    fn leap_day_resolves() {
        assert_eq!(resolve("2020", "2", "29").unwrap(), "2020-02-29");
    }

    #[test]
    fn impossible_day_in_february_fails() {
        let err = resolve("2020", "feb", "30").unwrap_err();
        assert!(matches!(err, RecordError::InvalidDate { .. }));
        assert!(err.to_string().contains("invalid date combination"));
    }

    #[test]
    fn month_names_and_abbreviations() {
        assert_eq!(resolve("2019", "September", "").unwrap(), "2019-09-01");
        assert_eq!(resolve("2019", "{Dec}", "5").unwrap(), "2019-12-05");
        assert_eq!(resolve("2019", "MAR", "{07}").unwrap(), "2019-03-07");
    }

    #[test]
    fn empty_month_and_day_default_to_first() {
        assert_eq!(
            resolve_bibtex_date(Some("2018"), None, None)
                .unwrap()
                .to_string(),
            "2018-01-01"
        );
    }

    #[test]
    fn month_out_of_range_fails() {
        assert!(matches!(
            resolve("2018", "13", "1"),
            Err(RecordError::InvalidDate { .. })
        ));
        assert!(resolve("2018", "0", "1").is_err());
    }

    #[test]
    fn unknown_month_name_fails() {
        let err = resolve("2018", "Spring", "1").unwrap_err();
        assert!(err.to_string().contains("\"Spring\""));
    }

    #[test]
    fn day_out_of_range_or_textual_fails() {
        assert!(resolve("2018", "1", "32").is_err());
        assert!(resolve("2018", "1", "first").is_err());
    }

    #[test]
    fn missing_or_non_numeric_year_fails() {
        assert!(resolve_bibtex_date(None, None, None).is_err());
        assert!(resolve("20x0", "1", "1").is_err());
    }

    #[test]
    fn year_outside_calendar_range_fails() {
        for year in ["0", "0000", "10000"] {
            let err = resolve(year, "1", "1").unwrap_err();
            assert!(matches!(err, RecordError::InvalidDate { .. }));
            assert!(err.to_string().contains("between 1 and 9999"));
        }
        assert_eq!(resolve("0001", "1", "1").unwrap(), "0001-01-01");
    }

    #[test]
    fn iso_validation_accepts_canonical_dates() {
        assert_eq!(validate_iso_date("2021-06-01").unwrap(), "2021-06-01");
        assert_eq!(validate_iso_date("2020-02-29").unwrap(), "2020-02-29");
    }

    #[test]
    fn iso_validation_rejects_bad_dates() {
        assert!(validate_iso_date("2021-02-29").is_err());
        assert!(validate_iso_date("2021-6-1").is_err());
        assert!(validate_iso_date("June 1, 2021").is_err());
        assert!(validate_iso_date("").is_err());
    }
}
