//! # Station Matcher
//!
//! Flight-route resampling and weather-station matching.
//!
//! This library relates a flight route (an ordered sequence of waypoints) to
//! a set of fixed-location weather reporting stations:
//! - Route resampling with label inheritance onto inserted points
//! - Nearby-station aggregation (all stations within radius of the route)
//! - Nearest-station assignment with global closest-wins deduplication
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel candidate collection with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use station_matcher::{nearest_stations, GeoPoint, Route, StationGrid};
//!
//! let route = Route::new(vec![
//!     GeoPoint::named(49.01, 2.55, "LFPG"),
//!     GeoPoint::named(50.9, -8.25, "GOMUP"),
//! ]);
//!
//! let grid = StationGrid::new(vec![
//!     GeoPoint::named(49.02, 2.53, "07157"),
//!     GeoPoint::named(51.93, -10.25, "03953"),
//! ]);
//!
//! let stations = nearest_stations(&route, &grid).unwrap();
//! assert!(!stations.is_empty());
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, StationMatchError};

// Geographic utilities (distance, interpolation, unit conversion)
pub mod geo_utils;

// Route resampling with label inheritance
pub mod resample;
pub use resample::{split_route, split_route_with_labels, DEFAULT_SPACING_KM};

// Spatial index interface and R-tree backed station grid
pub mod index;
pub use index::{StationGrid, StationIndex, DEFAULT_CELL_SIZE_KM};

// Station matching (bounding filter, nearby aggregation, nearest resolution)
pub mod matching;
pub use matching::{
    bounded_stations, nearby_stations, nearest_station_matches, nearest_stations, search_radius,
    NeighbourMatch, BOUNDS_MARGIN_DEG, RADIUS_MARGIN_KM,
};
#[cfg(feature = "parallel")]
pub use matching::nearest_station_matches_parallel;

// Planar cross-track helper, independent of the main pipeline
pub mod planar;
pub use planar::PlanarPoint;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic point with an optional name and free-text description.
///
/// The angular unit is degrees throughout the pipeline. An empty `name`
/// means the point is unnamed; matching operations treat the name string as
/// the point's identity, so two points with the same name are the same
/// station or waypoint.
///
/// # Example
/// ```
/// use station_matcher::GeoPoint;
/// let point = GeoPoint::named(51.5074, -0.1278, "EGLL");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GeoPoint {
    /// Create a new unnamed point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: String::new(),
            description: None,
        }
    }

    /// Create a new named point.
    pub fn named(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: name.into(),
            description: None,
        }
    }

    /// Whether the point carries a non-empty name.
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Degree-minutes representation, e.g. `N4530.0E00230.0`.
    ///
    /// Used to derive synthetic names for unnamed geographic waypoints.
    pub fn dm(&self) -> String {
        fn axis(value: f64, positive: char, negative: char, degree_width: usize) -> String {
            let hemisphere = if value < 0.0 { negative } else { positive };
            let abs = value.abs();
            let mut degrees = abs.trunc() as u32;
            let mut minutes = ((abs - abs.trunc()) * 60.0 * 10.0).round() / 10.0;
            if minutes >= 60.0 {
                degrees += 1;
                minutes = 0.0;
            }
            format!(
                "{}{:0width$}{:04.1}",
                hemisphere,
                degrees,
                minutes,
                width = degree_width
            )
        }
        format!(
            "{}{}",
            axis(self.latitude, 'N', 'S', 2),
            axis(self.longitude, 'E', 'W', 3)
        )
    }
}

/// An ordered sequence of waypoints in flight order.
///
/// Invariant: order is monotonic along the flight path and no two
/// consecutive points are coincident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    /// Create a route from waypoints.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// The waypoints, in flight order.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the route has no waypoints.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the waypoints.
    pub fn iter(&self) -> std::slice::Iter<'_, GeoPoint> {
        self.points.iter()
    }

    /// Total route length in kilometres.
    pub fn length(&self) -> f64 {
        geo_utils::route_length(&self.points)
    }

    /// Parse a route from its JSON representation: an array of objects with
    /// `latitude`, `longitude` and an optional `name`.
    ///
    /// Fails when the document is malformed or any point has out-of-range
    /// coordinates.
    pub fn from_json(json: &str) -> Result<Self> {
        let route: Route =
            serde_json::from_str(json).map_err(|e| StationMatchError::Internal {
                message: format!("route JSON: {}", e),
            })?;
        if let Some(p) = route.points.iter().find(|p| !p.is_valid()) {
            return Err(StationMatchError::InvalidCoordinates {
                name: p.name.clone(),
                message: "latitude/longitude out of range".to_string(),
            });
        }
        Ok(route)
    }

    /// Serialize the route to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| StationMatchError::Internal {
            message: format!("route JSON: {}", e),
        })
    }

    /// Assign a synthetic degree-minutes name to every unnamed waypoint.
    ///
    /// Whole-degree minute groups (`00.0`) are stripped, so a waypoint at
    /// N45 W020 becomes `N45W020`.
    pub fn label_unnamed(&mut self) {
        for p in &mut self.points {
            if !p.has_name() {
                p.name = p.dm().replace("00.0", "");
            }
        }
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a GeoPoint;
    type IntoIter = std::slice::Iter<'a, GeoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Bounding box for a set of points, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points. Returns `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Expand the box outward by `margin` degrees on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min_lat: self.min_lat - margin,
            max_lat: self.max_lat + margin,
            min_lng: self.min_lng - margin,
            max_lng: self.max_lng + margin,
        }
    }

    /// Whether a point lies strictly inside the open box.
    pub fn contains(&self, p: &GeoPoint) -> bool {
        p.latitude > self.min_lat
            && p.latitude < self.max_lat
            && p.longitude > self.min_lng
            && p.longitude < self.max_lng
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(51.5074, -0.1278).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_geo_point_name() {
        assert!(!GeoPoint::new(0.0, 0.0).has_name());
        assert!(GeoPoint::named(0.0, 0.0, "EGLL").has_name());
    }

    #[test]
    fn test_dm_format() {
        let p = GeoPoint::new(45.5, 2.5);
        assert_eq!(p.dm(), "N4530.0E00230.0");

        let q = GeoPoint::new(-12.25, -73.78);
        assert_eq!(q.dm(), "S1215.0W07346.8");
    }

    #[test]
    fn test_label_unnamed_strips_whole_degrees() {
        let mut route = Route::new(vec![
            GeoPoint::named(49.01, 2.55, "LFPG"),
            GeoPoint::new(45.0, -20.0),
        ]);
        route.label_unnamed();
        assert_eq!(route.points()[0].name, "LFPG");
        assert_eq!(route.points()[1].name, "N45W020");
    }

    #[test]
    fn test_bounds_from_points() {
        let points = vec![
            GeoPoint::new(51.50, -0.13),
            GeoPoint::new(51.51, -0.12),
            GeoPoint::new(51.505, -0.125),
        ];
        let bounds = Bounds::from_points(&points).unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);
    }

    #[test]
    fn test_bounds_empty_input() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_contains_is_strict() {
        let bounds = Bounds::from_points(&[GeoPoint::new(50.0, 0.0), GeoPoint::new(52.0, 2.0)])
            .unwrap();
        assert!(bounds.contains(&GeoPoint::new(51.0, 1.0)));
        // on the edge is outside the open box
        assert!(!bounds.contains(&GeoPoint::new(50.0, 1.0)));
        assert!(!bounds.contains(&GeoPoint::new(51.0, 2.0)));
    }

    #[test]
    fn test_route_from_json() {
        let json = r#"[
            {"name": "LFPG", "latitude": 49.01, "longitude": 2.55},
            {"latitude": 50.9, "longitude": -8.25}
        ]"#;
        let route = Route::from_json(json).unwrap();
        assert_eq!(route.len(), 2);
        assert_eq!(route.points()[0].name, "LFPG");
        assert!(!route.points()[1].has_name());

        let round_trip = Route::from_json(&route.to_json().unwrap()).unwrap();
        assert_eq!(round_trip, route);
    }

    #[test]
    fn test_route_from_json_rejects_bad_coordinates() {
        let json = r#"[{"name": "BAD", "latitude": 99.0, "longitude": 0.0}]"#;
        assert!(matches!(
            Route::from_json(json),
            Err(StationMatchError::InvalidCoordinates { .. })
        ));
    }
}
