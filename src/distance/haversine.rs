use crate::config::constant::EARTH_RADIUS_KM;
use crate::domain::types::Coordinate;

/// Great-circle distance in kilometres between two lat/lon points (degrees).
///
/// Invalid input is not guarded: NaN coordinates give a NaN distance.
pub fn haversine_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let (lat_a, lat_b) = (lat_a.to_radians(), lat_b.to_radians());
    let d_lat = lat_b - lat_a;
    let d_lon = (lon_b - lon_a).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

pub fn distance_between(a: &Coordinate, b: &Coordinate) -> f64 {
    haversine_km(a.lat, a.lon, b.lat, b.lon)
}
