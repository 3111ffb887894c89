//! Persistent geocode cache.
//!
//! Maps an exact location string to its coordinates and survives across
//! runs, so each location is looked up at most once. An entry missing
//! either coordinate counts as not cached and is looked up again.
//!
//! ## Storage
//!
//! The cache is a JSON object keyed by location, written pretty-printed with
//! sorted keys and a trailing newline:
//!
//! ```json
//! {
//!   "Paris, France": {
//!     "latitude": 48.8566,
//!     "longitude": 2.3522
//!   }
//! }
//! ```
//!
//! A missing or unreadable cache file is not an error: the run starts from
//! an empty cache and rebuilds it. Entries are read one by one, so a single
//! malformed entry only loses itself. Coordinates written as numeric strings
//! are accepted.
//!
//! ## Legacy import
//!
//! Sites that predate the cache only have the generated dataset
//! (`var addressPoints = [...];`). [`GeocodeCache::seed_from_legacy_dataset`]
//! reads its points back as cache entries without overwriting anything the
//! cache already holds.

use crate::types::Coordinate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Cached coordinates of one location. Either half may be absent in a
/// hand-edited or partially written file.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct CacheEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl CacheEntry {
    /// The coordinate, if both halves are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }

    /// Read one stored entry. Anything but an object with numeric (or
    /// numeric string) halves yields an incomplete entry.
    fn from_value(value: &Value) -> Self {
        Self {
            latitude: value.get("latitude").and_then(as_float),
            longitude: value.get("longitude").and_then(as_float),
        }
    }
}

impl From<Coordinate> for CacheEntry {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            latitude: Some(coordinate.latitude),
            longitude: Some(coordinate.longitude),
        }
    }
}

/// Location string to coordinates, in sorted key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeocodeCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl GeocodeCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the cache from `path`.
    ///
    /// Returns an empty cache if the file doesn't exist or isn't a JSON
    /// object. A file that exists but fails to parse is reported as a
    /// warning. Malformed entries are kept as incomplete, so they are looked
    /// up again while every other entry survives.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let map = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(
                    "ignoring geocode cache {}: not a JSON object",
                    path.display()
                );
                return Self::empty();
            }
            Err(err) => {
                warn!("ignoring unreadable geocode cache {}: {err}", path.display());
                return Self::empty();
            }
        };

        let entries: BTreeMap<String, CacheEntry> = map
            .iter()
            .map(|(location, value)| (location.clone(), CacheEntry::from_value(value)))
            .collect();
        let incomplete = entries
            .values()
            .filter(|entry| entry.coordinate().is_none())
            .count();
        if incomplete > 0 {
            debug!(
                "{incomplete} incomplete geocode cache entries in {}",
                path.display()
            );
        }
        Self { entries }
    }

    /// Merge the points of a previously generated dataset into the cache,
    /// keeping every existing entry. Returns how many entries were added.
    pub fn seed_from_legacy_dataset(&mut self, path: &Path) -> usize {
        let Ok(text) = fs::read_to_string(path) else {
            return 0;
        };
        let mut added = 0;
        for (location, coordinate) in parse_legacy_dataset(&text) {
            if !self.entries.contains_key(&location) {
                self.entries.insert(location, coordinate.into());
                added += 1;
            }
        }
        added
    }

    /// Write the cache to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        json.push('\n');
        fs::write(path, json)
    }

    /// Complete coordinates for `location`, if cached.
    pub fn coordinate(&self, location: &str) -> Option<Coordinate> {
        self.entries.get(location)?.coordinate()
    }

    pub fn insert(&mut self, location: &str, coordinate: Coordinate) {
        self.entries.insert(location.to_string(), coordinate.into());
    }

    /// Locations, in input order, with no complete cache entry.
    pub fn missing<'a>(&self, locations: &'a [String]) -> Vec<&'a str> {
        locations
            .iter()
            .filter(|location| self.coordinate(location).is_none())
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Points of a `var addressPoints = [...];` file.
///
/// Best effort: unparseable text yields nothing, and malformed points are
/// dropped individually. A later point for the same location wins.
pub fn parse_legacy_dataset(text: &str) -> BTreeMap<String, Coordinate> {
    let mut points = BTreeMap::new();
    let Some((_, payload)) = text.split_once('=') else {
        return points;
    };
    let payload = payload.trim();
    let payload = payload.strip_suffix(';').map(str::trim).unwrap_or(payload);
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(payload) else {
        return points;
    };

    for item in items {
        let Value::Array(fields) = item else { continue };
        if fields.len() < 3 {
            continue;
        }
        let location = match &fields[0] {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if location.is_empty() {
            continue;
        }
        if let (Some(latitude), Some(longitude)) = (as_float(&fields[1]), as_float(&fields[2])) {
            points.insert(
                location,
                Coordinate {
                    latitude,
                    longitude,
                },
            );
        }
    }
    points
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{read, write_file};
    use tempfile::TempDir;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude,
            longitude,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(GeocodeCache::load(&tmp.path().join("none.json")).is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "cache.json", "{not json");
        assert!(GeocodeCache::load(&path).is_empty());

        let path = write_file(tmp.path(), "list.json", "[1, 2]");
        assert!(GeocodeCache::load(&path).is_empty());
    }

    #[test]
    fn incomplete_entries_count_as_missing() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            "cache.json",
            r#"{"Paris": {"latitude": 1.0, "longitude": 2.0}, "Rome": {"latitude": 3.0}, "Oslo": {}}"#,
        );
        let cache = GeocodeCache::load(&path);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.coordinate("Paris"), Some(coord(1.0, 2.0)));

        let locations: Vec<String> = ["Oslo", "Paris", "Rome", "Kyoto"]
            .map(String::from)
            .to_vec();
        assert_eq!(cache.missing(&locations), ["Oslo", "Rome", "Kyoto"]);
    }

    #[test]
    fn malformed_entry_does_not_discard_the_rest() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            "cache.json",
            r#"{
                "Paris": {"latitude": 48.8, "longitude": 2.3},
                "Rome": null,
                "Lima": "somewhere",
                "Bern": {"latitude": true, "longitude": 7.4},
                "Oslo": {"latitude": "59.9", "longitude": " 10.75 "}
            }"#,
        );
        let cache = GeocodeCache::load(&path);
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.coordinate("Paris"), Some(coord(48.8, 2.3)));
        assert_eq!(cache.coordinate("Oslo"), Some(coord(59.9, 10.75)));

        let locations: Vec<String> = ["Bern", "Lima", "Oslo", "Paris", "Rome"]
            .map(String::from)
            .to_vec();
        assert_eq!(cache.missing(&locations), ["Bern", "Lima", "Rome"]);
    }

    #[test]
    fn string_coordinates_are_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            "cache.json",
            r#"{"Rome": {"latitude": "41.9", "longitude": "12.5"}}"#,
        );
        let cache = GeocodeCache::load(&path);
        assert_eq!(cache.coordinate("Rome"), Some(coord(41.9, 12.5)));
    }

    #[test]
    fn save_is_sorted_indented_with_trailing_newline() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/cache.json");
        let mut cache = GeocodeCache::empty();
        cache.insert("Zurich", coord(47.5, 8.5));
        cache.insert("Athens", coord(38.0, 23.75));
        cache.save(&path).unwrap();

        let expected = "{\n  \"Athens\": {\n    \"latitude\": 38.0,\n    \"longitude\": 23.75\n  },\n  \"Zurich\": {\n    \"latitude\": 47.5,\n    \"longitude\": 8.5\n  }\n}\n";
        assert_eq!(read(&path), expected);
        assert_eq!(GeocodeCache::load(&path), cache);
    }

    #[test]
    fn legacy_dataset_parsing() {
        let text = "var addressPoints = [\n  [\"Paris\", 48.85, 2.35],\n  [\" Lyon \", \"45.75\", \"4.85\"],\n  [\"\", 1, 1],\n  [\"Short\", 1],\n  [\"Bad\", \"x\", 2],\n  \"junk\"\n];\n";
        let points = parse_legacy_dataset(text);
        assert_eq!(points.len(), 2);
        assert_eq!(points["Paris"], coord(48.85, 2.35));
        assert_eq!(points["Lyon"], coord(45.75, 4.85));
    }

    #[test]
    fn legacy_dataset_garbage_is_empty() {
        assert!(parse_legacy_dataset("no assignment here").is_empty());
        assert!(parse_legacy_dataset("var addressPoints = [oops;").is_empty());
        assert!(parse_legacy_dataset("var addressPoints = {};").is_empty());
    }

    #[test]
    fn seeding_never_overwrites_existing_entries() {
        let tmp = TempDir::new().unwrap();
        let dataset = write_file(
            tmp.path(),
            "org-locations.js",
            "var addressPoints = [[\"Paris\", 2, 2], [\"Berlin\", 52.5, 13.4]];\n",
        );
        let mut cache = GeocodeCache::empty();
        cache.insert("Paris", coord(1.0, 1.0));

        assert_eq!(cache.seed_from_legacy_dataset(&dataset), 1);
        assert_eq!(cache.coordinate("Paris"), Some(coord(1.0, 1.0)));
        assert_eq!(cache.coordinate("Berlin"), Some(coord(52.5, 13.4)));
    }

    #[test]
    fn seeding_from_missing_dataset_adds_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut cache = GeocodeCache::empty();
        assert_eq!(cache.seed_from_legacy_dataset(&tmp.path().join("none.js")), 0);
        assert!(cache.is_empty());
    }
}
