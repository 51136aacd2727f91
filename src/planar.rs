//! Planar 2-D point helper for cross-track computations.
//!
//! Works in the point's native coordinate units and is independent of the
//! geographic matching pipeline.

/// A 2-D point with an optional identity and a label.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
    /// Opaque caller-assigned identifier
    pub id: Option<String>,
    pub name: String,
}

impl PlanarPoint {
    /// Create a point labeled `"<x>_<y>"`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            id: None,
            name: format!("{}_{}", x, y),
        }
    }

    /// Create a point with an explicit label.
    pub fn named(x: f64, y: f64, name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            id: None,
            name: name.into(),
        }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &PlanarPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Perpendicular distance from this point to the infinite line through
    /// segment AB.
    ///
    /// Returns 0 for a degenerate segment (A == B).
    pub fn cross_track_distance(&self, a: &PlanarPoint, b: &PlanarPoint) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let den = (dx * dx + dy * dy).sqrt();
        if den == 0.0 {
            return 0.0;
        }
        let num = (dy * self.x - dx * self.y + b.x * a.y - b.y * a.x).abs();
        num / den
    }
}
