//! Route resampling with label inheritance.
//!
//! Turns a sparse route into a denser ordered sequence at a target spacing.
//! With `preserve` set, every original waypoint is kept unchanged at its
//! correct position and each leg longer than the spacing is subdivided into
//! equal great-circle parts. Interpolated points are unnamed; the labeled
//! variant names them after the most recent named point.
//!
//! The returned iterators are lazy and restartable: calling the function
//! again on the same route yields the identical sequence with no side
//! effects on the source.

use crate::error::Result;
use crate::geo_utils::{haversine_distance, intermediate_point};
use crate::{GeoPoint, Route, StationMatchError};

/// Default spacing between resampled points, in kilometres.
pub const DEFAULT_SPACING_KM: f64 = 60.0;

/// Resample a route at `spacing_km`.
///
/// With `preserve` set, emits every original waypoint in order, inserting
/// unnamed interpolated points so that consecutive points are at most
/// `spacing_km` apart. Without it, emits points at exact cumulative
/// multiples of the spacing along the path (plus the start and the final
/// endpoint), dropping original waypoints in between.
///
/// Fails with [`StationMatchError::EmptyRoute`] on an empty route.
///
/// # Example
/// ```
/// use station_matcher::{split_route, GeoPoint, Route};
///
/// let route = Route::new(vec![
///     GeoPoint::named(49.0, 2.5, "LFPG"),
///     GeoPoint::named(50.0, -1.0, "JSY"),
/// ]);
/// let points: Vec<_> = split_route(&route, 60.0, true).unwrap().collect();
/// assert_eq!(points.first().unwrap().name, "LFPG");
/// assert_eq!(points.last().unwrap().name, "JSY");
/// assert!(points.len() > 2);
/// ```
pub fn split_route<'a>(
    route: &'a Route,
    spacing_km: f64,
    preserve: bool,
) -> Result<Box<dyn Iterator<Item = GeoPoint> + 'a>> {
    let points = route.points();
    let last = points
        .last()
        .cloned()
        .ok_or_else(|| StationMatchError::EmptyRoute {
            operation: "split_route".to_string(),
        })?;

    if preserve {
        let iter = points
            .windows(2)
            .flat_map(move |w| {
                let a = w[0].clone();
                let b = w[1].clone();
                let d = haversine_distance(&a, &b);
                let n = if d > spacing_km {
                    (d / spacing_km).ceil() as usize
                } else {
                    1
                };
                let head = a.clone();
                let interior =
                    (1..n).map(move |i| intermediate_point(&a, &b, i as f64 / n as f64));
                std::iter::once(head).chain(interior)
            })
            .chain(std::iter::once(last));
        Ok(Box::new(iter))
    } else {
        Ok(Box::new(EvenSplit::new(points, spacing_km, last)))
    }
}

/// Resample a route and inherit labels onto interpolated points.
///
/// A running label starts empty; every emitted point that carries its own
/// name sets the label and resets a counter to zero, every unnamed point
/// increments the counter and is renamed `"<label>-<counter>"`. A route
/// whose first point is unnamed therefore yields names `"-1"`, `"-2"` until
/// the first named point is seen.
pub fn split_route_with_labels<'a>(
    route: &'a Route,
    spacing_km: f64,
    preserve: bool,
) -> Result<impl Iterator<Item = GeoPoint> + 'a> {
    let inner = split_route(route, spacing_km, preserve)?;
    let mut label = String::new();
    let mut counter = 0u32;
    Ok(inner.map(move |mut p| {
        if p.has_name() {
            label = p.name.clone();
            counter = 0;
        } else {
            counter += 1;
        }
        if counter > 0 {
            p.name = format!("{}-{}", label, counter);
        }
        p
    }))
}

/// Iterator emitting points at exact cumulative multiples of the spacing.
struct EvenSplit<'a> {
    points: &'a [GeoPoint],
    spacing_km: f64,
    seg: usize,
    seg_len: Option<f64>,
    offset: f64,
    started: bool,
    tail: Option<GeoPoint>,
}

impl<'a> EvenSplit<'a> {
    fn new(points: &'a [GeoPoint], spacing_km: f64, last: GeoPoint) -> Self {
        // a single-point route is fully emitted by the start point
        let tail = if points.len() > 1 { Some(last) } else { None };
        Self {
            points,
            spacing_km,
            seg: 0,
            seg_len: None,
            offset: 0.0,
            started: false,
            tail,
        }
    }
}

impl Iterator for EvenSplit<'_> {
    type Item = GeoPoint;

    fn next(&mut self) -> Option<GeoPoint> {
        if !self.started {
            self.started = true;
            return Some(self.points[0].clone());
        }
        let mut to_next = self.spacing_km;
        while self.seg + 1 < self.points.len() {
            let a = &self.points[self.seg];
            let b = &self.points[self.seg + 1];
            let seg_len = *self
                .seg_len
                .get_or_insert_with(|| haversine_distance(a, b));
            let remaining = seg_len - self.offset;
            if to_next < remaining {
                self.offset += to_next;
                return Some(intermediate_point(a, b, self.offset / seg_len));
            }
            // the next mark falls at or beyond this segment's end
            to_next -= remaining;
            self.seg += 1;
            self.seg_len = None;
            self.offset = 0.0;
            if to_next <= 0.0 {
                return Some(GeoPoint::new(b.latitude, b.longitude));
            }
        }
        self.tail.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlantic_route() -> Route {
        Route::new(vec![
            GeoPoint::named(49.01, 2.55, "LFPG"),
            GeoPoint::named(50.9, -8.25, "GOMUP"),
            GeoPoint::named(51.0, -20.0, "N51W020"),
            GeoPoint::named(50.0, -30.0, "N50W030"),
        ])
    }

    #[test]
    fn test_empty_route_is_an_error() {
        let route = Route::default();
        assert!(matches!(
            split_route(&route, 60.0, true),
            Err(StationMatchError::EmptyRoute { .. })
        ));
    }

    #[test]
    fn test_single_point_route() {
        let route = Route::new(vec![GeoPoint::named(49.0, 2.5, "LFPG")]);
        let points: Vec<_> = split_route(&route, 60.0, true).unwrap().collect();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "LFPG");
    }

    #[test]
    fn test_preserve_keeps_originals_in_order() {
        let route = atlantic_route();
        let resampled: Vec<_> = split_route(&route, 60.0, true).unwrap().collect();

        // the subsequence of points matching originals reproduces the route
        let originals: Vec<_> = resampled
            .iter()
            .filter(|p| route.iter().any(|o| o == *p))
            .cloned()
            .collect();
        assert_eq!(originals.as_slice(), route.points());
    }

    #[test]
    fn test_preserve_spacing_bound() {
        let route = atlantic_route();
        let resampled: Vec<_> = split_route(&route, 60.0, true).unwrap().collect();
        for w in resampled.windows(2) {
            assert!(haversine_distance(&w[0], &w[1]) <= 60.0 + 1e-6);
        }
    }

    #[test]
    fn test_labels_inherit_and_reset() {
        let route = atlantic_route();
        let labeled: Vec<_> = split_route_with_labels(&route, 60.0, true)
            .unwrap()
            .collect();

        // every point is named; interpolated ones follow <label>-<n>
        let mut last_label = String::new();
        let mut last_counter = 0u32;
        for p in &labeled {
            assert!(p.has_name());
            match p.name.rsplit_once('-') {
                Some((label, counter)) if route.iter().all(|o| o.name != p.name) => {
                    assert_eq!(label, last_label);
                    let n: u32 = counter.parse().unwrap();
                    assert_eq!(n, last_counter + 1);
                    last_counter = n;
                }
                _ => {
                    last_label = p.name.clone();
                    last_counter = 0;
                }
            }
        }
        assert_eq!(labeled.first().unwrap().name, "LFPG");
        assert_eq!(labeled[1].name, "LFPG-1");
    }

    #[test]
    fn test_unnamed_original_takes_inherited_label() {
        // spacing large enough that no interpolation happens
        let route = Route::new(vec![
            GeoPoint::named(0.0, 0.0, "A"),
            GeoPoint::new(0.0, 1.0),
        ]);
        let labeled: Vec<_> = split_route_with_labels(&route, 200.0, true)
            .unwrap()
            .collect();
        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled[0].name, "A");
        assert_eq!(labeled[1].name, "A-1");
        assert_eq!(labeled[1].latitude, 0.0);
        assert_eq!(labeled[1].longitude, 1.0);
    }

    #[test]
    fn test_leading_unnamed_points_get_empty_label() {
        let route = Route::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::named(0.0, 2.0, "B"),
        ]);
        let labeled: Vec<_> = split_route_with_labels(&route, 200.0, true)
            .unwrap()
            .collect();
        assert_eq!(labeled[0].name, "-1");
        assert_eq!(labeled[1].name, "-2");
        assert_eq!(labeled[2].name, "B");
    }

    #[test]
    fn test_split_is_restartable() {
        let route = atlantic_route();
        let first: Vec<_> = split_route_with_labels(&route, 60.0, true)
            .unwrap()
            .collect();
        let second: Vec<_> = split_route_with_labels(&route, 60.0, true)
            .unwrap()
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_even_split_drops_intermediate_originals() {
        // three waypoints ~111 km apart, resampled every 50 km
        let route = Route::new(vec![
            GeoPoint::named(0.0, 0.0, "A"),
            GeoPoint::named(0.0, 1.0, "B"),
            GeoPoint::named(0.0, 2.0, "C"),
        ]);
        let points: Vec<_> = split_route(&route, 50.0, false).unwrap().collect();

        // start and final endpoint survive, B does not
        assert_eq!(points.first().unwrap().name, "A");
        assert_eq!(points.last().unwrap().name, "C");
        assert!(points.iter().all(|p| p.name != "B"));

        // marks are 50 km apart along the path
        for w in points.windows(2).take(points.len() - 2) {
            let d = haversine_distance(&w[0], &w[1]);
            assert!((d - 50.0).abs() < 0.5, "spacing was {}", d);
        }
    }
}
