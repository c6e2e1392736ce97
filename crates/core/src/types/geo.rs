//! Geographic points in the normalized form used by the spatial index.
//!
//! A [`GeoPoint`] serializes as a GeoJSON point:
//!
//! ```json
//! {"type": "Point", "coordinates": [-118.243683, 34.052235]}
//! ```
//!
//! Coordinates are **longitude first**, the reverse of the usual lat/lng
//! pair. Constructors take named latitude and longitude arguments so callers
//! never build the array by hand.

use serde::{Deserialize, Serialize};

/// Meters in one statute mile, as used for search radii.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Convert a radius in miles to meters.
#[must_use]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

/// Errors constructing a [`GeoPoint`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("latitude must be between -90 and 90 (got {0})")]
    Latitude(f64),
    #[error("longitude must be between -180 and 180 (got {0})")]
    Longitude(f64),
}

/// The only geometry kind the index stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoKind {
    Point,
}

/// A point on the globe in GeoJSON order: `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    kind: GeoKind,
    coordinates: [f64; 2],
}

impl GeoPoint {
    /// Build a point from latitude and longitude, validating both ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if either coordinate is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::Longitude(longitude));
        }

        Ok(Self {
            kind: GeoKind::Point,
            coordinates: [longitude, latitude],
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    /// The raw `[longitude, latitude]` pair as stored in the index.
    #[must_use]
    pub const fn coordinates(&self) -> [f64; 2] {
        self.coordinates
    }
}
