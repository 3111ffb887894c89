//! Geocoding capability and request pacing.
//!
//! The talk map resolves location strings through the [`Geocoder`] trait.
//! The real implementation, [`NominatimGeocoder`], queries the OpenStreetMap
//! Nominatim search API over blocking HTTP and is only compiled with the
//! `nominatim` feature. Without it (or when the client can't be built) the
//! run continues without lookups and reports every uncached location as
//! unresolved.
//!
//! Nominatim's usage policy allows at most one request per second and
//! requires an identifying user agent. [`Throttle`] spaces successive calls
//! by a minimum delay; it is owned by a single run and not shared across
//! processes.

use crate::config::TalkmapConfig;
use crate::types::Coordinate;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
#[cfg(not(feature = "nominatim"))]
use tracing::debug;
#[cfg(feature = "nominatim")]
use tracing::warn;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[cfg(feature = "nominatim")]
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid coordinate {value:?} in geocoding response")]
    InvalidCoordinate { value: String },
}

/// Resolves a free-form location to coordinates.
///
/// `Ok(None)` means the service answered but found no match.
pub trait Geocoder {
    fn resolve(&self, location: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Enforces a minimum delay between successive calls.
#[derive(Debug)]
pub struct Throttle {
    min_delay: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last: None,
        }
    }

    /// Sleep until `min_delay` has passed since the previous call, then
    /// mark now as the latest call. The first call never sleeps.
    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                thread::sleep(self.min_delay - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Nominatim search API client.
#[cfg(feature = "nominatim")]
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

#[cfg(feature = "nominatim")]
#[derive(serde::Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

#[cfg(feature = "nominatim")]
impl NominatimGeocoder {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[cfg(feature = "nominatim")]
fn parse_degrees(value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse()
        .map_err(|_| GeocodeError::InvalidCoordinate {
            value: value.to_string(),
        })
}

#[cfg(feature = "nominatim")]
impl Geocoder for NominatimGeocoder {
    fn resolve(&self, location: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let places: Vec<Place> = self
            .client
            .get(&self.endpoint)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .send()?
            .error_for_status()?
            .json()?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        Ok(Some(Coordinate {
            latitude: parse_degrees(&place.lat)?,
            longitude: parse_degrees(&place.lon)?,
        }))
    }
}

/// The geocoder this build can offer, if any.
#[cfg(feature = "nominatim")]
pub fn default_geocoder(config: &TalkmapConfig) -> Option<Box<dyn Geocoder>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    match NominatimGeocoder::new(&config.endpoint, &config.user_agent, timeout) {
        Ok(geocoder) => Some(Box::new(geocoder)),
        Err(err) => {
            warn!("geocoding client unavailable: {err}");
            None
        }
    }
}

#[cfg(not(feature = "nominatim"))]
pub fn default_geocoder(_config: &TalkmapConfig) -> Option<Box<dyn Geocoder>> {
    debug!("built without the nominatim feature; no geocoder available");
    None
}
