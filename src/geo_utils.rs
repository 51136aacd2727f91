//! Geographic utilities: great-circle distance, fraction interpolation and
//! angular/linear unit conversion.
//!
//! All linear distances in this crate are kilometres; angular distances are
//! radians of arc on the mean-radius sphere.

use geo::{Distance, Haversine, InterpolatePoint, Point};

use crate::GeoPoint;

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Convert a linear distance in kilometres to radians of arc.
pub fn km_to_rad(km: f64) -> f64 {
    km / EARTH_RADIUS_KM
}

/// Convert radians of arc to a linear distance in kilometres.
pub fn rad_to_km(rad: f64) -> f64 {
    rad * EARTH_RADIUS_KM
}

/// Great-circle distance between two points in kilometres.
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let a = Point::new(p1.longitude, p1.latitude);
    let b = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(a, b) / 1000.0
}

/// Point at `fraction` (0..=1) of the great circle from `p1` to `p2`.
///
/// The result carries no name; callers label it if needed.
pub fn intermediate_point(p1: &GeoPoint, p2: &GeoPoint, fraction: f64) -> GeoPoint {
    let a = Point::new(p1.longitude, p1.latitude);
    let b = Point::new(p2.longitude, p2.latitude);
    let p = Haversine::point_at_ratio_between(a, b, fraction);
    GeoPoint::new(p.y(), p.x())
}

/// Total length of a polyline in kilometres.
pub fn route_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}
