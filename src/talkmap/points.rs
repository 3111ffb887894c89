//! Address points and the map dataset file.

use super::cache::GeocodeCache;
use serde::Serialize;

/// `[location, latitude, longitude]` as consumed by the map page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressPoint(pub String, pub f64, pub f64);

/// One point per location with complete cached coordinates, in input
/// order, plus the number of locations left without one.
pub fn build_address_points(
    locations: &[String],
    cache: &GeocodeCache,
) -> (Vec<AddressPoint>, usize) {
    let mut points = Vec::new();
    let mut unresolved = 0;
    for location in locations {
        match cache.coordinate(location) {
            Some(c) => points.push(AddressPoint(location.clone(), c.latitude, c.longitude)),
            None => unresolved += 1,
        }
    }
    (points, unresolved)
}

/// `var addressPoints = [...];` with a trailing newline.
pub fn render_dataset(points: &[AddressPoint]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(points)?;
    Ok(format!("var addressPoints = {json};\n"))
}
