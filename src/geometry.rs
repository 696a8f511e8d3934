//! Planar geometry for the local airport coordinate frame.
//!
//! All positions are meters east/north of the airport reference point.
//! Working in a local tangent plane keeps every check below a few
//! multiplications; the conversion from WGS84 is owned by the data feed.

use serde::{Deserialize, Serialize};

/// A point in the local planar frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position in meters.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Ground velocity in meters per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
}

impl Velocity {
    pub fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy }
    }

    /// Speed magnitude in m/s.
    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Bearing from north in degrees, wrapped to `[0, 360)`.
    pub fn heading_deg(&self) -> f64 {
        self.vx.atan2(self.vy).to_degrees().rem_euclid(360.0)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Position,
    pub max: Position,
}

impl Aabb {
    /// Square box centered on `center` with the given half extent.
    pub fn around(center: Position, half_extent: f64) -> Self {
        Self {
            min: Position::new(center.x - half_extent, center.y - half_extent),
            max: Position::new(center.x + half_extent, center.y + half_extent),
        }
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

/// Even-odd (ray casting) polygon containment test.
///
/// Casts a horizontal ray rightward from `point` and counts edge
/// crossings; an odd count means inside. Horizontal edges are skipped
/// explicitly so the crossing-x computation never divides by zero.
/// Points lying exactly on an edge get an implementation-defined answer;
/// callers must not rely on boundary classification.
pub fn point_in_polygon(point: Position, polygon: &[Position]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let p1 = polygon[j];
        let p2 = polygon[i];
        j = i;

        // Horizontal edge: never a crossing.
        if p1.y == p2.y {
            continue;
        }
        if (p1.y > point.y) == (p2.y > point.y) {
            continue;
        }
        let x_cross = p1.x + (point.y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y);
        if point.x < x_cross {
            inside = !inside;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle() -> Vec<Position> {
        vec![
            Position::new(-100.0, -30.0),
            Position::new(3300.0, -30.0),
            Position::new(3300.0, 30.0),
            Position::new(-100.0, 30.0),
        ]
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert!((b.distance_to(&a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn heading_is_bearing_from_north() {
        assert!((Velocity::new(0.0, 10.0).heading_deg() - 0.0).abs() < 1e-9);
        assert!((Velocity::new(10.0, 0.0).heading_deg() - 90.0).abs() < 1e-9);
        assert!((Velocity::new(0.0, -10.0).heading_deg() - 180.0).abs() < 1e-9);
        assert!((Velocity::new(-10.0, 0.0).heading_deg() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn rectangle_containment() {
        let poly = rectangle();
        assert!(point_in_polygon(Position::new(0.0, 0.0), &poly));
        assert!(point_in_polygon(Position::new(3299.0, 29.0), &poly));
        assert!(point_in_polygon(Position::new(-99.0, -29.0), &poly));

        assert!(!point_in_polygon(Position::new(0.0, 31.0), &poly));
        assert!(!point_in_polygon(Position::new(3301.0, 0.0), &poly));
        assert!(!point_in_polygon(Position::new(-101.0, 0.0), &poly));
        assert!(!point_in_polygon(Position::new(0.0, -500.0), &poly));
    }

    #[test]
    fn horizontal_edges_do_not_break_the_ray_cast() {
        // The rectangle has two horizontal edges; a test point level with a
        // vertex must still classify cleanly.
        let poly = rectangle();
        assert!(!point_in_polygon(Position::new(-200.0, -30.0), &poly));
        assert!(point_in_polygon(Position::new(100.0, 0.0), &poly));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let line = vec![Position::new(0.0, 0.0), Position::new(10.0, 0.0)];
        assert!(!point_in_polygon(Position::new(5.0, 0.0), &line));
        assert!(!point_in_polygon(Position::new(5.0, 0.0), &[]));
    }

    #[test]
    fn aabb_containment_and_overlap() {
        let a = Aabb::around(Position::new(0.0, 0.0), 10.0);
        let b = Aabb::around(Position::new(15.0, 0.0), 10.0);
        let c = Aabb::around(Position::new(50.0, 50.0), 5.0);

        assert!(a.contains(Position::new(9.0, -9.0)));
        assert!(!a.contains(Position::new(11.0, 0.0)));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }
}
