//! Core geometry types for pattern-tiler.
//!
//! ## Rust Lesson #3: Operator Overloading
//!
//! In JS, `p1 - p2` on two objects gives you `NaN`.
//! In Rust, implementing `std::ops::Sub` for `Point` makes `p1 - p2`
//! mean exactly what we want: component-wise subtraction.
//!
//! Because `Point` is `Copy`, the operands are copied, not moved,
//! so `a - b` leaves both `a` and `b` usable afterwards.

use std::ops::{Add, Mul, Sub};

use crate::error::{Result, TilerError};

/// A 2D point (or vector) with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle given by its lower-left and upper-right corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

/// An ordered polyline, optionally closed back onto its first point.
///
/// Never empty: construction goes through [`Path::new`], which rejects
/// empty and non-finite input. Transformations return new paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: Vec<Point>,
    closed: bool,
}

// ============================================================================
// POINT
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Rotate about the origin, counter-clockwise.
    #[inline]
    pub fn rotated(&self, angle_degrees: f64) -> Point {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Point::new(
            cos * self.x - sin * self.y,
            sin * self.x + cos * self.y,
        )
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Magnitude of the 2D cross product, `|v1.x * v2.y - v1.y * v2.x|`.
///
/// Zero when the two vectors are parallel.
#[inline]
pub fn cross_norm(v1: Point, v2: Point) -> f64 {
    (v1.x * v2.y - v1.y * v2.x).abs()
}

/// Solve `p3 = p1 + t * (p2 - p1)` for `t`.
///
/// The caller guarantees the three points are (nearly) colinear. The larger
/// axis component of `p2 - p1` is used as divisor to keep the result stable.
#[inline]
pub fn solve_for_t(p1: Point, p2: Point, p3: Point) -> f64 {
    let dir = p2 - p1;
    debug_assert!(
        cross_norm(dir, p3 - p1) <= 1e-6 * (1.0 + dir.dot(dir).sqrt() * (p3 - p1).dot(p3 - p1).sqrt()),
        "solve_for_t called with non-colinear points"
    );

    if dir.x.abs() > dir.y.abs() {
        (p3.x - p1.x) / dir.x
    } else {
        (p3.y - p1.y) / dir.y
    }
}

/// Intersection of the infinite lines `p1 + s * dir1` and `p2 + t * dir2`.
///
/// The lines must not be parallel.
#[inline]
pub fn line_intersection(p1: Point, dir1: Point, p2: Point, dir2: Point) -> Point {
    let t2 = (p1.x * dir1.y + dir1.x * (p2.y - p1.y) - p2.x * dir1.y)
        / (dir2.x * dir1.y - dir1.x * dir2.y);
    p2 + dir2 * t2
}

// ============================================================================
// RECT
// ============================================================================

impl Rect {
    #[inline]
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn lower_right(&self) -> Point {
        Point::new(self.max.x, self.min.y)
    }

    #[inline]
    pub fn upper_left(&self) -> Point {
        Point::new(self.min.x, self.max.y)
    }

    /// Strictly inside: a point lying on an edge counts as outside.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    /// Nearest point of the closed rectangle.
    #[inline]
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Translate by `-origin`.
    #[inline]
    pub fn relative_to(&self, origin: Point) -> Rect {
        Rect::new(self.min - origin, self.max - origin)
    }
}

// ============================================================================
// PATH
// ============================================================================

impl Path {
    /// Build a path, rejecting empty or non-finite input.
    pub fn new(points: Vec<Point>, closed: bool) -> Result<Self> {
        if points.is_empty() {
            return Err(TilerError::EmptyPath);
        }
        if let Some((i, p)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(TilerError::InvalidPoint(format!(
                "point {} is ({}, {})",
                i, p.x, p.y
            )));
        }
        Ok(Self { points, closed })
    }

    pub fn closed(points: Vec<Point>) -> Result<Self> {
        Self::new(points, true)
    }

    pub fn open(points: Vec<Point>) -> Result<Self> {
        Self::new(points, false)
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn first(&self) -> Point {
        self.points[0]
    }

    /// Same path with a different closure flag.
    pub fn with_closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Bounding box as (min_x, min_y, max_x, max_y).
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        let min_x = self.points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = self.points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = self.points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = self.points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        (min_x, min_y, max_x, max_y)
    }

    /// Copy translated so the smallest x and y are both zero.
    pub fn shifted_to_origin(&self) -> Path {
        let (min_x, min_y, _, _) = self.bounding_box();
        let shift = Point::new(min_x, min_y);
        self.map_points(|p| p - shift)
    }

    /// Copy rotated counter-clockwise about the coordinate origin.
    pub fn rotated(&self, angle_degrees: f64) -> Path {
        self.map_points(|p| p.rotated(angle_degrees))
    }

    fn map_points<F>(&self, f: F) -> Path
    where
        F: Fn(Point) -> Point,
    {
        Path {
            points: self.points.iter().map(|&p| f(p)).collect(),
            closed: self.closed,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
