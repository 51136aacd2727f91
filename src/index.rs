//! Spatial index interface and an R-tree backed station grid.
//!
//! The matching pipeline only depends on the [`StationIndex`] trait: a
//! radius query returning stations with their distances, plus a
//! characteristic cell size used to bound safe query radii. [`StationGrid`]
//! is the bundled implementation over an rstar R-tree.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::error::Result;
use crate::geo_utils::{haversine_distance, km_to_rad, rad_to_km};
use crate::GeoPoint;

/// Read-only station lookup used by the matching pipeline.
///
/// Implementations backed by remote or lazily loaded data may fail with
/// [`crate::StationMatchError::IndexUnavailable`]; the matching pipeline
/// propagates such failures unchanged.
pub trait StationIndex {
    /// Characteristic cell size of the index, in radians of arc.
    fn cell_size(&self) -> f64;

    /// All stations within `radius_km` of `point`, each paired with its
    /// great-circle distance in kilometres. Order is unspecified.
    fn query(&self, point: &GeoPoint, radius_km: f64) -> Result<Vec<(GeoPoint, f64)>>;
}

/// Default grid cell size in kilometres (geohash-precision-3 equivalent).
pub const DEFAULT_CELL_SIZE_KM: f64 = 156.0;

/// A station with its position in degree space, for R-tree queries.
#[derive(Debug, Clone, Copy)]
struct IndexedStation {
    idx: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for IndexedStation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

impl PointDistance for IndexedStation {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlng = self.lng - point[1];
        dlat * dlat + dlng * dlng
    }
}

/// R-tree backed spatial index over a fixed station set.
///
/// Queries never fail; the `Result` return exists for the trait contract.
///
/// # Example
/// ```
/// use station_matcher::{GeoPoint, StationGrid, StationIndex};
///
/// let grid = StationGrid::new(vec![GeoPoint::named(48.72, 2.38, "07149")]);
/// let hits = grid.query(&GeoPoint::new(48.8, 2.3), 20.0).unwrap();
/// assert_eq!(hits.len(), 1);
/// ```
#[derive(Debug)]
pub struct StationGrid {
    tree: RTree<IndexedStation>,
    stations: Vec<GeoPoint>,
    cell_size_km: f64,
}

impl StationGrid {
    /// Build a grid with the default cell size.
    pub fn new(stations: Vec<GeoPoint>) -> Self {
        Self::with_cell_size(stations, DEFAULT_CELL_SIZE_KM)
    }

    /// Build a grid with an explicit cell size in kilometres.
    pub fn with_cell_size(stations: Vec<GeoPoint>, cell_size_km: f64) -> Self {
        let indexed: Vec<IndexedStation> = stations
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedStation {
                idx: i,
                lat: p.latitude,
                lng: p.longitude,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(indexed),
            stations,
            cell_size_km,
        }
    }

    /// The indexed stations, in construction order.
    pub fn stations(&self) -> &[GeoPoint] {
        &self.stations
    }

    /// Number of indexed stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Check if the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl StationIndex for StationGrid {
    fn cell_size(&self) -> f64 {
        km_to_rad(self.cell_size_km)
    }

    fn query(&self, point: &GeoPoint, radius_km: f64) -> Result<Vec<(GeoPoint, f64)>> {
        // coarse envelope in degrees, then exact haversine filter
        let lat_pad = radius_km / rad_to_km(1f64.to_radians());
        let lng_pad = lat_pad / point.latitude.to_radians().cos().abs().max(0.01);
        let envelope = AABB::from_corners(
            [point.latitude - lat_pad, point.longitude - lng_pad],
            [point.latitude + lat_pad, point.longitude + lng_pad],
        );

        let mut hits = Vec::new();
        for candidate in self.tree.locate_in_envelope(&envelope) {
            let station = &self.stations[candidate.idx];
            let d = haversine_distance(point, station);
            if d <= radius_km {
                hits.push((station.clone(), d));
            }
        }
        Ok(hits)
    }
}
