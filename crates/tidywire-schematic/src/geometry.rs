//! 2D geometry primitives for schematic space.
//!
//! Points double as positions and displacements. Equality on accumulated
//! segment sums is approximate (`close_to`) to absorb floating-point drift.

use serde::{Deserialize, Serialize};

/// Tolerance used for approximate point comparison.
pub const EPSILON: f64 = 1e-6;

/// A 2D point (or displacement vector) in schematic space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Approximate equality within [`EPSILON`] on both axes.
    pub fn close_to(&self, other: Point) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }

    /// Sum of absolute components.
    pub fn manhattan_len(&self) -> f64 {
        self.x.abs() + self.y.abs()
    }

    pub fn euclidean_distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned bounding box: top-left position plus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub position: Point,
    pub size: Size,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_position_and_size(position: Point, size: Size) -> Self {
        Self { position, size }
    }

    pub fn min_x(&self) -> f64 {
        self.position.x
    }

    pub fn min_y(&self) -> f64 {
        self.position.y
    }

    pub fn max_x(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.position.y + self.size.height
    }

    /// Strict interior intersection test. Boxes that merely share an edge or
    /// a corner do not overlap, so symbols may sit flush against each other.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }

    /// True when `p` lies strictly inside the box.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x > self.min_x() && p.x < self.max_x() && p.y > self.min_y() && p.y < self.max_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(3.0, -2.0);
        let b = Point::new(1.0, 5.0);
        assert_eq!(a + b, Point::new(4.0, 3.0));
        assert_eq!(a - b, Point::new(2.0, -7.0));
        assert_eq!(-a, Point::new(-3.0, 2.0));
        assert_eq!(a.manhattan_len(), 5.0);
        assert!((a.euclidean_distance(b) - 53.0_f64.sqrt()).abs() < EPSILON);
    }

    #[test]
    fn close_to_absorbs_drift() {
        let a = Point::new(0.1 + 0.2, 0.0);
        assert!(a.close_to(Point::new(0.3, 0.0)));
        assert!(!a.close_to(Point::new(0.3001, 0.0)));
    }

    #[test]
    fn overlap_is_strict() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 10.0, 10.0); // shares an edge
        let c = BoundingBox::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn contains_point_excludes_boundary() {
        let b = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains_point(Point::new(5.0, 5.0)));
        assert!(!b.contains_point(Point::new(0.0, 5.0)));
        assert!(!b.contains_point(Point::new(10.0, 10.0)));
    }
}
