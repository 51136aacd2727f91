//! Station matching: bounding filter, nearby aggregation and nearest
//! resolution.
//!
//! Both matching passes resample the route at the default spacing with
//! originals preserved, then query the spatial index around every resampled
//! point. Aggregation collects every station in range, deduplicated by name
//! and annotated with the contributing route points. Resolution assigns each
//! route point its single closest station, then runs a global closest-wins
//! pass so a station is claimed only by the route point it is truly nearest
//! to.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::debug;

use crate::error::Result;
use crate::geo_utils::rad_to_km;
use crate::index::StationIndex;
use crate::resample::{split_route_with_labels, DEFAULT_SPACING_KM};
use crate::{Bounds, GeoPoint, OptionExt, Route};

/// Margin added around a route's bounding box, in degrees.
pub const BOUNDS_MARGIN_DEG: f64 = 1.0;

/// Safety margin subtracted from the half-cell query radius, in kilometres.
pub const RADIUS_MARGIN_KM: f64 = 0.1;

/// A resampled route point paired with its chosen station.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighbourMatch {
    /// The resampled query point (flight-plan side)
    pub waypoint: GeoPoint,
    /// The matched station
    pub station: GeoPoint,
    /// Great-circle distance in kilometres; 0 for an exact name match
    pub distance: f64,
}

/// Safe query radius for an index, in kilometres.
///
/// Half the characteristic cell size, minus a small margin so a query
/// centred in one cell cannot silently miss stations that a naive
/// single-cell scan would catch.
pub fn search_radius<I: StationIndex + ?Sized>(index: &I) -> f64 {
    rad_to_km(index.cell_size()) / 2.0 - RADIUS_MARGIN_KM
}

/// Restrict a bulk station set to a padded bounding box around the points.
///
/// Coarse pre-filter only; does not replace radius queries. Returns the
/// stations strictly inside the open box. Fails on an empty input slice.
pub fn bounded_stations(
    points: &[GeoPoint],
    stations: &[GeoPoint],
    margin_deg: f64,
) -> Result<Vec<GeoPoint>> {
    let bounds = Bounds::from_points(points)
        .ok_or_empty_route("bounded_stations")?
        .expand(margin_deg);
    Ok(stations
        .iter()
        .filter(|s| bounds.contains(s))
        .cloned()
        .collect())
}

/// Collect every station within radius of any resampled route point.
///
/// Stations are unique by name and returned in first-discovery order along
/// the route. Each station that gathered a non-empty contributor list is
/// renamed `"<name> (<contributors joined by ', '>)"`. An unnamed query
/// point still matches stations but contributes silently: it does not
/// extend the annotation text.
pub fn nearby_stations<I: StationIndex>(route: &Route, index: &I) -> Result<Vec<GeoPoint>> {
    if route.is_empty() {
        return Ok(Vec::new());
    }
    let radius = search_radius(index);
    let mut all_neighbours: Vec<GeoPoint> = Vec::new();
    let mut contributors: HashMap<String, Vec<String>> = HashMap::new();

    for p in split_route_with_labels(route, DEFAULT_SPACING_KM, true)? {
        for (station, _) in index.query(&p, radius)? {
            match contributors.entry(station.name.clone()) {
                Entry::Vacant(e) => {
                    e.insert(vec![p.name.clone()]);
                    all_neighbours.push(station);
                }
                Entry::Occupied(mut e) => {
                    if p.has_name() {
                        e.get_mut().push(p.name.clone());
                    }
                }
            }
        }
    }

    debug!(
        "nearby_stations: {} stations within {:.1} km of the route",
        all_neighbours.len(),
        radius
    );

    for station in &mut all_neighbours {
        let description = contributors[&station.name].join(", ");
        if !description.is_empty() {
            station.name = format!("{} ({})", station.name, description);
        }
    }
    Ok(all_neighbours)
}

/// Assign each resampled route point its single closest station.
///
/// Candidates are taken per point from the index, sorted by distance; an
/// exact name match between the point and a candidate always wins with
/// distance forced to zero. A global deduplication pass then keeps, for
/// each station, only the claim with the smallest distance; losing claims
/// are dropped entirely, not reassigned.
pub fn nearest_station_matches<I: StationIndex>(
    route: &Route,
    index: &I,
) -> Result<Vec<NeighbourMatch>> {
    if route.is_empty() {
        return Ok(Vec::new());
    }
    let radius = search_radius(index);
    let mut matches: Vec<NeighbourMatch> = Vec::new();
    for p in split_route_with_labels(route, DEFAULT_SPACING_KM, true)? {
        if let Some(m) = nearest_candidate(p, index, radius)? {
            matches.push(m);
        }
    }
    Ok(dedupe_closest(matches))
}

/// Parallel variant of [`nearest_station_matches`].
///
/// Candidate collection runs on the rayon thread pool; the closest-wins
/// pass stays sequential.
#[cfg(feature = "parallel")]
pub fn nearest_station_matches_parallel<I: StationIndex + Sync>(
    route: &Route,
    index: &I,
) -> Result<Vec<NeighbourMatch>> {
    use rayon::prelude::*;

    if route.is_empty() {
        return Ok(Vec::new());
    }
    let radius = search_radius(index);
    let points: Vec<GeoPoint> =
        split_route_with_labels(route, DEFAULT_SPACING_KM, true)?.collect();
    let collected: Vec<Option<NeighbourMatch>> = points
        .into_par_iter()
        .map(|p| nearest_candidate(p, index, radius))
        .collect::<Result<_>>()?;
    Ok(dedupe_closest(collected.into_iter().flatten().collect()))
}

/// Nearest stations for a route, annotated with the claiming route point.
///
/// Each surviving station is renamed `"<name> (<route point name>)"` when
/// the claiming point is named, and emitted in traversal order.
///
/// # Example
/// ```
/// use station_matcher::{nearest_stations, GeoPoint, Route, StationGrid};
///
/// let route = Route::new(vec![
///     GeoPoint::named(49.01, 2.55, "LFPG"),
///     GeoPoint::named(50.03, -1.2, "JSY"),
/// ]);
/// let grid = StationGrid::new(vec![GeoPoint::named(49.02, 2.53, "07157")]);
///
/// let stations = nearest_stations(&route, &grid).unwrap();
/// assert_eq!(stations[0].name, "07157 (LFPG)");
/// ```
pub fn nearest_stations<I: StationIndex>(route: &Route, index: &I) -> Result<Vec<GeoPoint>> {
    let matches = nearest_station_matches(route, index)?;
    Ok(matches
        .into_iter()
        .map(|m| {
            let mut station = m.station;
            if m.waypoint.has_name() {
                station.name = format!("{} ({})", station.name, m.waypoint.name);
            }
            station
        })
        .collect())
}

/// Pick the closest candidate station for one query point, if any.
fn nearest_candidate<I: StationIndex>(
    point: GeoPoint,
    index: &I,
    radius_km: f64,
) -> Result<Option<NeighbourMatch>> {
    let mut candidates = index.query(&point, radius_km)?;
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    // an exact name match is definitionally the same location
    let exact = candidates.iter().position(|(s, _)| s.name == point.name);
    let chosen = match exact {
        Some(i) => Some((candidates[i].0.clone(), 0.0)),
        None => candidates.into_iter().next(),
    };

    Ok(chosen.map(|(station, distance)| NeighbourMatch {
        waypoint: point,
        station,
        distance,
    }))
}

/// Keep, per station name, only the claim with the smallest distance.
///
/// Ties keep the earliest claim; updates require a strictly smaller
/// distance. Losing claims are discarded.
fn dedupe_closest(matches: Vec<NeighbourMatch>) -> Vec<NeighbourMatch> {
    let mut winners: HashMap<String, (f64, usize)> = HashMap::new();
    for (i, m) in matches.iter().enumerate() {
        match winners.entry(m.station.name.clone()) {
            Entry::Vacant(e) => {
                e.insert((m.distance, i));
            }
            Entry::Occupied(mut e) => {
                if m.distance < e.get().0 {
                    e.insert((m.distance, i));
                }
            }
        }
    }
    debug!(
        "nearest_station_matches: {} claims, {} stations kept",
        matches.len(),
        winners.len()
    );
    matches
        .into_iter()
        .enumerate()
        .filter(|(i, m)| winners[&m.station.name].1 == *i)
        .map(|(_, m)| m)
        .collect()
}
