//! Coordinates tagged with the geodetic frame they are expressed in.
//!
//! Persisted points and authored line geometry live in [`Wgs84`]. The tile
//! provider renders in [`Gcj02`]. A `GeoPoint<Wgs84>` cannot be passed where a
//! `GeoPoint<Gcj02>` is expected; the only bridges are the functions in
//! [`crate::math::gcj`].

use std::fmt;
use std::marker::PhantomData;

/// Marker for a geodetic reference frame.
pub trait CoordSystem: Copy + Clone + fmt::Debug + PartialEq + 'static {
    const NAME: &'static str;
}

/// Canonical storage frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Wgs84;

/// Display frame expected by the tile provider.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Gcj02;

impl CoordSystem for Wgs84 {
    const NAME: &'static str = "WGS-84";
}

impl CoordSystem for Gcj02 {
    const NAME: &'static str = "GCJ-02";
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoError {
    NonFinite { lon: f64, lat: f64 },
    OutOfRange { lon: f64, lat: f64 },
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::NonFinite { lon, lat } => {
                write!(f, "coordinate is not finite: lon={lon} lat={lat}")
            }
            GeoError::OutOfRange { lon, lat } => {
                write!(f, "coordinate out of range: lon={lon} lat={lat}")
            }
        }
    }
}

impl std::error::Error for GeoError {}

/// Validate a raw (lon, lat) pair in degrees.
pub fn check_lon_lat(lon: f64, lat: f64) -> Result<(), GeoError> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(GeoError::NonFinite { lon, lat });
    }
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(GeoError::OutOfRange { lon, lat });
    }
    Ok(())
}

/// A longitude/latitude pair (degrees) in frame `S`.
#[derive(Copy, Clone, PartialEq)]
pub struct GeoPoint<S: CoordSystem> {
    lon: f64,
    lat: f64,
    _frame: PhantomData<S>,
}

pub type CanonicalPoint = GeoPoint<Wgs84>;
pub type DisplayPoint = GeoPoint<Gcj02>;

impl<S: CoordSystem> GeoPoint<S> {
    pub fn new(lon: f64, lat: f64) -> Result<Self, GeoError> {
        check_lon_lat(lon, lat)?;
        Ok(Self::from_checked(lon, lat))
    }

    /// Build from components that already passed [`check_lon_lat`] or are
    /// derived from a valid point by a bounded offset.
    pub(crate) fn from_checked(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            _frame: PhantomData,
        }
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon_lat(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    /// `[lat, lon]`, the order Leaflet-style renderers consume.
    pub fn lat_lon(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

impl<S: CoordSystem> fmt::Debug for GeoPoint<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint<{}>({}, {})", S::NAME, self.lon, self.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::{CanonicalPoint, DisplayPoint, GeoError};

    #[test]
    fn rejects_non_finite() {
        assert!(matches!(
            CanonicalPoint::new(f64::NAN, 10.0),
            Err(GeoError::NonFinite { .. })
        ));
        assert!(matches!(
            DisplayPoint::new(10.0, f64::INFINITY),
            Err(GeoError::NonFinite { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            CanonicalPoint::new(180.5, 0.0),
            Err(GeoError::OutOfRange { .. })
        ));
        assert!(matches!(
            CanonicalPoint::new(0.0, -90.01),
            Err(GeoError::OutOfRange { .. })
        ));
    }

    #[test]
    fn accepts_range_limits() {
        let p = CanonicalPoint::new(-180.0, 90.0).expect("valid");
        assert_eq!(p.lon_lat(), (-180.0, 90.0));
        assert_eq!(p.lat_lon(), [90.0, -180.0]);
    }

    #[test]
    fn debug_names_the_frame() {
        let p = DisplayPoint::new(116.0, 39.0).expect("valid");
        assert_eq!(format!("{p:?}"), "GeoPoint<GCJ-02>(116, 39)");
    }
}
