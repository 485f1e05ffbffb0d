use crate::coord::{CoordSystem, GeoPoint};

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 mean radius `(2a + b) / 3` (meters).
pub const WGS84_MEAN_RADIUS: f64 = (2.0 * WGS84_A + WGS84_B) / 3.0;

/// Great-circle distance in meters between two points of the same frame.
///
/// Spherical approximation on the mean radius; good to a few tenths of a
/// percent, which is plenty for measuring offsets of a few hundred meters.
pub fn surface_distance_m<S: CoordSystem>(a: GeoPoint<S>, b: GeoPoint<S>) -> f64 {
    haversine_m(a.lon(), a.lat(), b.lon(), b.lat())
}

/// Great-circle distance in meters between raw (lon, lat) pairs in degrees.
///
/// Used when the two inputs are deliberately expressed in different frames,
/// e.g. to measure how far the display offset moves a point.
pub fn haversine_m(lon_a: f64, lat_a: f64, lon_b: f64, lat_b: f64) -> f64 {
    let phi_a = lat_a.to_radians();
    let phi_b = lat_b.to_radians();
    let d_phi = phi_b - phi_a;
    let d_lambda = (lon_b - lon_a).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * WGS84_MEAN_RADIUS * h.sqrt().min(1.0).asin()
}
