//! WGS-84 <-> GCJ-02 offset model.
//!
//! GCJ-02 is WGS-84 plus an empirically fitted, non-linear offset applied
//! inside [`OFFSET_REGION`]. The series and constants below are the widely
//! published ones and must be kept bit-for-bit; they are not derived from
//! anything.
//!
//! The inverse is a single fixed-point step (`2p - f(p)`), not an exact
//! inverse. Round-trip error is centimeters to a couple of meters inside the
//! region.

use std::f64::consts::PI;

use crate::bounds::LonLatBox;
use crate::coord::{CanonicalPoint, DisplayPoint, GeoError, check_lon_lat};

/// Semi-major axis of the ellipsoid the offset model is scaled with (meters).
pub const GCJ_A: f64 = 6_378_245.0;
/// First eccentricity squared of the same ellipsoid.
pub const GCJ_EE: f64 = 0.006_693_421_622_965_943_23;

/// Region where the offset applies. Outside (edges included) the two frames
/// coincide.
pub const OFFSET_REGION: LonLatBox = LonLatBox::new(72.004, 0.8293, 137.8347, 55.8271);

/// Whether `(lon, lat)` falls outside the offset region.
pub fn outside_offset_region(lon: f64, lat: f64) -> bool {
    !OFFSET_REGION.contains_strict(lon, lat)
}

fn harmonic_common(x: f64) -> f64 {
    (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0
}

fn lat_series(x: f64, y: f64) -> f64 {
    let mut ret =
        -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += harmonic_common(x);
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn lon_series(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += harmonic_common(x);
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Forward offset on already validated degrees.
fn offset(lon: f64, lat: f64) -> (f64, f64) {
    if outside_offset_region(lon, lat) {
        return (lon, lat);
    }

    let x = lon - 105.0;
    let y = lat - 35.0;
    let mut d_lat = lat_series(x, y);
    let mut d_lon = lon_series(x, y);

    let rad_lat = lat / 180.0 * PI;
    let mut magic = rad_lat.sin();
    magic = 1.0 - GCJ_EE * magic * magic;
    let sqrt_magic = magic.sqrt();

    d_lat = (d_lat * 180.0) / ((GCJ_A * (1.0 - GCJ_EE)) / (magic * sqrt_magic) * PI);
    d_lon = (d_lon * 180.0) / (GCJ_A / sqrt_magic * rad_lat.cos() * PI);

    (lon + d_lon, lat + d_lat)
}

/// Canonical -> display.
pub fn to_display(p: CanonicalPoint) -> DisplayPoint {
    let (lon, lat) = offset(p.lon(), p.lat());
    DisplayPoint::from_checked(lon, lat)
}

/// Display -> canonical, first-order approximation.
pub fn to_canonical(p: DisplayPoint) -> CanonicalPoint {
    let (lon, lat) = p.lon_lat();
    let (mg_lon, mg_lat) = offset(lon, lat);
    CanonicalPoint::from_checked(2.0 * lon - mg_lon, 2.0 * lat - mg_lat)
}

/// Raw-degree form of [`to_display`]; fails fast on invalid input.
pub fn wgs84_to_gcj02(lon: f64, lat: f64) -> Result<(f64, f64), GeoError> {
    check_lon_lat(lon, lat)?;
    Ok(offset(lon, lat))
}

/// Raw-degree form of [`to_canonical`]; fails fast on invalid input.
pub fn gcj02_to_wgs84(lon: f64, lat: f64) -> Result<(f64, f64), GeoError> {
    let p = DisplayPoint::new(lon, lat)?;
    Ok(to_canonical(p).lon_lat())
}

#[cfg(test)]
mod tests {
    use super::{
        OFFSET_REGION, gcj02_to_wgs84, outside_offset_region, to_canonical, to_display,
        wgs84_to_gcj02,
    };
    use crate::coord::{CanonicalPoint, DisplayPoint, GeoError};
    use crate::math::geodesy::{haversine_m, surface_distance_m};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn canonical(lon: f64, lat: f64) -> CanonicalPoint {
        CanonicalPoint::new(lon, lat).expect("valid coordinate")
    }

    #[test]
    fn matches_reference_values() {
        // (input, expected) pairs from the published algorithm.
        let cases = [
            ((116.397428, 39.90923), (116.40367162595768, 39.91063350638631)),
            ((121.4737, 31.2304), (121.47822305927693, 31.22845773757727)),
            ((113.2644, 23.1291), (113.26972959210308, 23.126423339922844)),
            ((87.6168, 43.8256), (87.61964994946926, 43.82680539311119)),
        ];
        for ((lon, lat), (exp_lon, exp_lat)) in cases {
            let out = to_display(canonical(lon, lat));
            assert_close(out.lon(), exp_lon, 1e-9);
            assert_close(out.lat(), exp_lat, 1e-9);
        }
    }

    #[test]
    fn identity_outside_region() {
        for (lon, lat) in [
            (2.3522, 48.8566),
            (-74.006, 40.7128),
            (139.6917, 35.6895),
            (151.2093, -33.8688),
            (100.0, 60.0),
            (-180.0, -90.0),
        ] {
            let out = to_display(canonical(lon, lat));
            assert_eq!(out.lon_lat(), (lon, lat));
            assert_eq!(to_canonical(DisplayPoint::new(lon, lat).unwrap()).lon_lat(), (lon, lat));
        }
    }

    #[test]
    fn region_edges_are_identity() {
        let r = OFFSET_REGION;
        let mid_lat = 30.0;
        let mid_lon = 110.0;
        for (lon, lat) in [
            (r.min_lon, mid_lat),
            (r.max_lon, mid_lat),
            (mid_lon, r.min_lat),
            (mid_lon, r.max_lat),
        ] {
            assert!(outside_offset_region(lon, lat));
            assert_eq!(wgs84_to_gcj02(lon, lat).unwrap(), (lon, lat));
        }
        assert!(!outside_offset_region(mid_lon, mid_lat));
    }

    #[test]
    fn forward_is_bit_reproducible() {
        let p = canonical(118.18, 39.63);
        let a = to_display(p);
        let b = to_display(p);
        assert_eq!(a.lon().to_bits(), b.lon().to_bits());
        assert_eq!(a.lat().to_bits(), b.lat().to_bits());
    }

    #[test]
    fn offset_is_hundreds_of_meters_inside_region() {
        let p = canonical(116.397428, 39.90923);
        let d = to_display(p);
        let shift = haversine_m(p.lon(), p.lat(), d.lon(), d.lat());
        assert!(shift > 100.0 && shift < 1000.0, "shift {shift}");
    }

    #[test]
    fn round_trip_within_ten_meters() {
        for (lon, lat) in [
            (116.397428, 39.90923),
            (121.4737, 31.2304),
            (113.2644, 23.1291),
            (118.18, 39.63),
            (126.6424, 45.7569),
            (104.0665, 30.5723),
        ] {
            let p = canonical(lon, lat);
            let back = to_canonical(to_display(p));
            let err = surface_distance_m(p, back);
            assert!(err < 10.0, "round trip error {err} m at ({lon}, {lat})");
            assert!(back != p, "inverse is approximate, expected a residual");
        }
    }

    #[test]
    fn inverse_is_two_p_minus_forward() {
        let (lon, lat) = (116.40367162595768, 39.91063350638631);
        let (f_lon, f_lat) = wgs84_to_gcj02(lon, lat).unwrap();
        let (c_lon, c_lat) = gcj02_to_wgs84(lon, lat).unwrap();
        assert_eq!(c_lon, 2.0 * lon - f_lon);
        assert_eq!(c_lat, 2.0 * lat - f_lat);
    }

    #[test]
    fn raw_helpers_fail_fast() {
        assert!(matches!(
            wgs84_to_gcj02(f64::NAN, 30.0),
            Err(GeoError::NonFinite { .. })
        ));
        assert!(matches!(
            gcj02_to_wgs84(116.0, f64::NEG_INFINITY),
            Err(GeoError::NonFinite { .. })
        ));
        assert!(matches!(
            wgs84_to_gcj02(200.0, 30.0),
            Err(GeoError::OutOfRange { .. })
        ));
    }
}
