//! Segment / page-boundary intersection.
//!
//! Finds where a segment crosses the four edges of a printable rectangle.
//! Two query shapes are used by the clipper:
//!
//! - [`boundary_crossing`]: one endpoint is inside, the other outside, so
//!   there is exactly one crossing.
//! - [`pass_through`]: both endpoints are outside; the segment either misses
//!   the rectangle or enters and leaves it (zero or two crossings).
//!
//! Each edge test solves for the position parameter along both the segment
//! and the edge and accepts the point only when both lie in `[0, 1]`. A true
//! crossing sitting right on a corner can be rejected by rounding, so rejected
//! points are kept with their parameter error and the best of them can be
//! promoted by [`promote_near_misses`].

use tracing::warn;

use crate::geometry::{Point, Rect, cross_norm, line_intersection, solve_for_t};

/// Below this cross-product magnitude a segment is treated as parallel to an axis [mm].
pub const PARALLEL_TOLERANCE: f64 = 1e-10;

/// Largest parameter error a promoted near-miss may carry.
///
/// A parameter error is the distance of `t` from `[0, 1]`; promoting a
/// candidate beyond this means the caller's inside/outside claim was wrong.
pub const NEAR_MISS_TOLERANCE: f64 = 1e-10;

/// Distance under which two crossings are the same point (a corner hit) [mm].
const COINCIDENT_TOLERANCE: f64 = 1e-9;

/// A boundary point that failed the `[0, 1]` parameter test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearMiss {
    pub point: Point,
    /// Worst distance of either parameter from `[0, 1]`
    pub error: f64,
}

/// Accepted crossings plus the rejected candidates, for one segment.
#[derive(Debug, Clone, Default)]
pub struct EdgeHits {
    pub accepted: Vec<Point>,
    pub rejected: Vec<NearMiss>,
}

/// How far `t` lies outside `[0, 1]`.
#[inline]
fn parameter_error(t: f64) -> f64 {
    if t.is_nan() {
        f64::INFINITY
    } else if t < 0.0 {
        -t
    } else if t > 1.0 {
        t - 1.0
    } else {
        0.0
    }
}

/// Test the segment `p1 -> p2` against one edge.
fn test_edge(hits: &mut EdgeHits, p1: Point, p2: Point, edge_start: Point, edge_end: Point) {
    let direction = p2 - p1;
    let edge_direction = edge_end - edge_start;
    let point = line_intersection(p1, direction, edge_start, edge_direction);

    let t_segment = solve_for_t(p1, p2, point);
    let t_edge = solve_for_t(edge_start, edge_end, point);
    let error = parameter_error(t_segment).max(parameter_error(t_edge));

    if error == 0.0 {
        hits.accepted.push(point);
    } else {
        hits.rejected.push(NearMiss { point, error });
    }
}

/// All crossings of `p1 -> p2` with the edges of `rect`.
pub fn edge_hits(p1: Point, p2: Point, rect: &Rect) -> EdgeHits {
    let mut hits = EdgeHits::default();

    let direction = p2 - p1;
    let right = Point::new(1.0, 0.0);
    let up = Point::new(0.0, 1.0);

    let lower_left = rect.min;
    let lower_right = rect.lower_right();
    let upper_left = rect.upper_left();
    let upper_right = rect.max;

    // A segment lying along the top or bottom (left or right) edge: its
    // in-range endpoints are the crossings. An endpoint strictly inside the
    // page is only within tolerance of the edge and is not a crossing.
    if cross_norm(direction, right) < PARALLEL_TOLERANCE {
        let on_edge = (p1.y - lower_left.y).abs() < PARALLEL_TOLERANCE
            || (p1.y - upper_left.y).abs() < PARALLEL_TOLERANCE;
        if on_edge {
            for p in [p1, p2] {
                if p.x >= lower_left.x && p.x <= lower_right.x && !rect.contains(p) {
                    hits.accepted.push(p);
                }
            }
        }
    } else if cross_norm(direction, up) < PARALLEL_TOLERANCE {
        let on_edge = (p1.x - lower_left.x).abs() < PARALLEL_TOLERANCE
            || (p1.x - lower_right.x).abs() < PARALLEL_TOLERANCE;
        if on_edge {
            for p in [p1, p2] {
                if p.y >= lower_left.y && p.y <= upper_left.y && !rect.contains(p) {
                    hits.accepted.push(p);
                }
            }
        }
    }

    if hits.accepted.len() == 2 {
        return hits;
    }

    if direction.dot(right).abs() > PARALLEL_TOLERANCE {
        test_edge(&mut hits, p1, p2, lower_left, upper_left);
        test_edge(&mut hits, p1, p2, lower_right, upper_right);
    }

    if direction.dot(up).abs() > PARALLEL_TOLERANCE {
        test_edge(&mut hits, p1, p2, lower_left, lower_right);
        test_edge(&mut hits, p1, p2, upper_left, upper_right);
    }

    hits
}

/// Best-effort nearest boundary points.
///
/// Tops `accepted` up to `wanted` entries with the rejected candidates of
/// smallest parameter error. Promoted candidates are expected to be within
/// [`NEAR_MISS_TOLERANCE`]; one that is not signals a geometry bug upstream.
pub fn promote_near_misses(hits: EdgeHits, wanted: usize) -> Vec<Point> {
    let EdgeHits {
        mut accepted,
        mut rejected,
    } = hits;

    if accepted.len() >= wanted {
        return accepted;
    }

    rejected.sort_by(|a, b| a.error.total_cmp(&b.error));

    for miss in rejected.into_iter().take(wanted - accepted.len()) {
        if !(miss.error < NEAR_MISS_TOLERANCE) {
            warn!(
                error = miss.error,
                x = miss.point.x,
                y = miss.point.y,
                "promoted boundary intersection outside tolerance"
            );
        }
        debug_assert!(
            miss.error < NEAR_MISS_TOLERANCE,
            "boundary near-miss error {} exceeds tolerance",
            miss.error
        );
        accepted.push(miss.point);
    }

    accepted
}

/// The single crossing of a segment that has one endpoint inside `rect`.
///
/// Several accepted hits are the same corner found through two edges; a hit
/// strictly inside the page is never returned while another exists.
///
/// A segment shorter than [`PARALLEL_TOLERANCE`] on both axes has no usable
/// direction, so its outside endpoint is moved onto the boundary instead.
pub fn boundary_crossing(p1: Point, p2: Point, rect: &Rect) -> Point {
    let outside = if rect.contains(p1) { p2 } else { p1 };

    let direction = p2 - p1;
    if direction.x.abs() < PARALLEL_TOLERANCE && direction.y.abs() < PARALLEL_TOLERANCE {
        return rect.clamp(outside);
    }

    let crossings = promote_near_misses(edge_hits(p1, p2, rect), 1);
    debug_assert!(
        !crossings.is_empty(),
        "no boundary crossing between ({}, {}) and ({}, {})",
        p1.x,
        p1.y,
        p2.x,
        p2.y
    );

    let on_boundary = crossings.iter().find(|p| !rect.contains(**p));
    match on_boundary.or(crossings.first()) {
        Some(&p) => p,
        // Unreachable for a genuine inside/outside pair; stay on the page.
        None => rect.clamp(outside),
    }
}

/// Entry and exit points of a segment whose endpoints are both outside `rect`.
///
/// Returns `None` when the segment misses the rectangle or only touches a
/// corner. Never returns a single point. The pair is ordered along `p1 -> p2`.
pub fn pass_through(p1: Point, p2: Point, rect: &Rect) -> Option<(Point, Point)> {
    let mut crossings = promote_near_misses(edge_hits(p1, p2, rect), 0);
    if crossings.len() < 2 {
        return None;
    }

    let direction = p2 - p1;
    crossings.sort_by(|a, b| (*a - p1).dot(direction).total_cmp(&((*b - p1).dot(direction))));
    crossings.dedup_by(|a, b| a.distance(*b) < COINCIDENT_TOLERANCE);

    match crossings.as_slice() {
        [first, .., last] => Some((*first, *last)),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn page() -> Rect {
        Rect::new(Point::new(0.0, 0.0), Point::new(100.0, 50.0))
    }

    fn on_boundary(rect: &Rect, p: Point) -> bool {
        let tol = 1e-7;
        let within_x = p.x >= rect.min.x - tol && p.x <= rect.max.x + tol;
        let within_y = p.y >= rect.min.y - tol && p.y <= rect.max.y + tol;
        let on_vertical = (p.x - rect.min.x).abs() < tol || (p.x - rect.max.x).abs() < tol;
        let on_horizontal = (p.y - rect.min.y).abs() < tol || (p.y - rect.max.y).abs() < tol;
        within_x && within_y && (on_vertical || on_horizontal)
    }

    #[test]
    fn parameter_error_is_distance_from_unit_interval() {
        assert_eq!(parameter_error(0.5), 0.0);
        assert_eq!(parameter_error(-0.25), 0.25);
        assert_eq!(parameter_error(1.5), 0.5);
        assert_eq!(parameter_error(f64::NAN), f64::INFINITY);
    }

    #[test]
    fn exit_through_right_edge() {
        let p = boundary_crossing(Point::new(50.0, 25.0), Point::new(150.0, 25.0), &page());
        assert!((p.x - 100.0).abs() < 1e-10);
        assert!((p.y - 25.0).abs() < 1e-10);
    }

    #[test]
    fn entry_through_bottom_edge_on_diagonal() {
        let p = boundary_crossing(Point::new(-10.0, -10.0), Point::new(10.0, 10.0), &page());
        // Passes exactly through the lower-left corner
        assert!(p.distance(Point::new(0.0, 0.0)) < 1e-10);
    }

    #[test]
    fn crossing_to_point_on_edge() {
        let p = boundary_crossing(Point::new(50.0, 25.0), Point::new(100.0, 40.0), &page());
        assert!(p.distance(Point::new(100.0, 40.0)) < 1e-10);
    }

    #[test]
    fn pass_through_both_sides() {
        let (a, b) = pass_through(Point::new(-20.0, 10.0), Point::new(120.0, 10.0), &page()).unwrap();
        assert!(a.distance(Point::new(0.0, 10.0)) < 1e-10);
        assert!(b.distance(Point::new(100.0, 10.0)) < 1e-10);
    }

    #[test]
    fn pass_through_is_ordered_along_segment() {
        let (a, b) = pass_through(Point::new(50.0, 80.0), Point::new(50.0, -30.0), &page()).unwrap();
        assert!(a.distance(Point::new(50.0, 50.0)) < 1e-10);
        assert!(b.distance(Point::new(50.0, 0.0)) < 1e-10);
    }

    #[test]
    fn miss_returns_none() {
        assert!(pass_through(Point::new(-20.0, 60.0), Point::new(120.0, 70.0), &page()).is_none());
        assert!(pass_through(Point::new(-20.0, 10.0), Point::new(-5.0, 40.0), &page()).is_none());
    }

    #[test]
    fn corner_touch_is_not_a_crossing() {
        // Touches only the upper-right corner
        assert!(pass_through(Point::new(90.0, 60.0), Point::new(110.0, 40.0), &page()).is_none());
    }

    #[test]
    fn segment_along_bottom_edge() {
        let (a, b) = pass_through(Point::new(10.0, 0.0), Point::new(60.0, 0.0), &page()).unwrap();
        assert_eq!(a, Point::new(10.0, 0.0));
        assert_eq!(b, Point::new(60.0, 0.0));
    }

    #[test]
    fn segment_along_left_edge_overhanging() {
        let (a, b) = pass_through(Point::new(0.0, -10.0), Point::new(0.0, 30.0), &page()).unwrap();
        assert!(a.distance(Point::new(0.0, 0.0)) < 1e-10);
        assert!(b.distance(Point::new(0.0, 30.0)) < 1e-10);
    }

    #[test]
    fn zero_length_segment_outside() {
        let p = Point::new(-5.0, -5.0);
        assert!(pass_through(p, p, &page()).is_none());
    }

    #[test]
    fn near_miss_is_promoted() {
        let hits = EdgeHits {
            accepted: vec![],
            rejected: vec![
                NearMiss { point: Point::new(1.0, 0.0), error: 1e-3 },
                NearMiss { point: Point::new(2.0, 0.0), error: 1e-14 },
            ],
        };
        let promoted = promote_near_misses(hits, 1);
        assert_eq!(promoted, vec![Point::new(2.0, 0.0)]);
    }

    #[test]
    fn nothing_promoted_when_zero_wanted() {
        let hits = EdgeHits {
            accepted: vec![],
            rejected: vec![NearMiss { point: Point::new(1.0, 0.0), error: 1e-14 }],
        };
        assert!(promote_near_misses(hits, 0).is_empty());
    }

    fn tabloid_printable() -> Rect {
        Rect::new(Point::new(0.0, 0.0), Point::new(406.4, 254.0))
    }

    #[test]
    fn exit_along_bottom_edge_noise() {
        // Rotation noise leaves the inside endpoint a hair above the bottom edge
        let rect = tabloid_printable();
        let p = boundary_crossing(Point::new(358.0, 3e-14), Point::new(408.0, 3e-14), &rect);
        assert!((p.x - 406.4).abs() < 1e-10, "got ({}, {})", p.x, p.y);
        assert!(p.y.abs() < 1e-10);
    }

    #[test]
    fn entry_along_bottom_edge_noise() {
        let rect = tabloid_printable();
        let p = boundary_crossing(Point::new(-5.0, 3e-14), Point::new(40.0, 3e-14), &rect);
        assert!(p.x.abs() < 1e-10, "got ({}, {})", p.x, p.y);
    }

    #[test]
    fn exit_along_right_edge_noise() {
        let rect = tabloid_printable();
        let x = 406.4 - 1e-13;
        assert!(rect.contains(Point::new(x, 100.0)));
        let p = boundary_crossing(Point::new(x, 100.0), Point::new(x, 300.0), &rect);
        assert!((p.y - 254.0).abs() < 1e-10, "got ({}, {})", p.x, p.y);
    }

    #[test]
    fn entry_along_top_edge_noise() {
        let rect = tabloid_printable();
        let p = boundary_crossing(Point::new(420.0, 254.0 - 1e-13), Point::new(200.0, 254.0 - 1e-13), &rect);
        assert!((p.x - 406.4).abs() < 1e-10, "got ({}, {})", p.x, p.y);
    }

    #[test]
    fn tiny_segment_across_edge_lands_on_boundary() {
        let rect = page();
        let inside = Point::new(100.0 - 1e-12, 25.0);
        let outside = Point::new(100.0 + 1e-12, 25.0 + 1e-12);
        let p = boundary_crossing(inside, outside, &rect);
        assert!(on_boundary(&rect, p));
        assert!(p.distance(outside) < 1e-10);
    }

    /// An inside point within `1e-12` of one of the four edges.
    fn near_edge_inside() -> impl Strategy<Value = Point> {
        (0usize..4, 0.5f64..49.5, 1e-14f64..1e-12).prop_map(|(edge, along, gap)| match edge {
            0 => Point::new(along * 2.0, gap),
            1 => Point::new(along * 2.0, 50.0 - gap),
            2 => Point::new(gap, along),
            _ => Point::new(100.0 - gap, along),
        })
    }

    proptest! {
        #[test]
        fn near_edge_axis_parallel_hits_boundary(
            inside in near_edge_inside(),
            reach in 1.0f64..300.0,
            axis in 0usize..2,
            negative in any::<bool>(),
            entering in any::<bool>(),
        ) {
            let rect = page();
            prop_assume!(rect.contains(inside));
            let sign = if negative { -1.0 } else { 1.0 };
            let outside = if axis == 0 {
                Point::new(inside.x + sign * reach, inside.y)
            } else {
                Point::new(inside.x, inside.y + sign * reach)
            };
            prop_assume!(!rect.contains(outside));

            let (p1, p2) = if entering { (outside, inside) } else { (inside, outside) };
            let p = boundary_crossing(p1, p2, &rect);
            prop_assert!(on_boundary(&rect, p), "({}, {}) not on boundary", p.x, p.y);
            prop_assert!(!rect.contains(p), "({}, {}) is strictly inside", p.x, p.y);
            // The crossing lies past the inside endpoint toward the outside one
            prop_assert!((p - inside).dot(outside - inside) > 0.0);
        }

        #[test]
        fn one_inside_one_outside_hits_boundary(
            ix in 0.5f64..99.5, iy in 0.5f64..49.5,
            ox in -200.0f64..300.0, oy in -200.0f64..250.0,
        ) {
            let rect = page();
            let inside = Point::new(ix, iy);
            let outside = Point::new(ox, oy);
            prop_assume!(!rect.contains(outside));

            let p = boundary_crossing(inside, outside, &rect);
            prop_assert!(on_boundary(&rect, p), "({}, {}) not on boundary", p.x, p.y);

            let d = outside - inside;
            let colinear = cross_norm(d, p - inside) / d.dot(d).sqrt();
            prop_assert!(colinear < 1e-7);
        }

        #[test]
        fn pass_through_never_returns_single_point(
            ax in -200.0f64..300.0, ay in -200.0f64..250.0,
            bx in -200.0f64..300.0, by in -200.0f64..250.0,
        ) {
            let rect = page();
            let a = Point::new(ax, ay);
            let b = Point::new(bx, by);
            prop_assume!(!rect.contains(a) && !rect.contains(b));

            let hits = edge_hits(a, b, &rect).accepted;
            if let Some((p, q)) = pass_through(a, b, &rect) {
                prop_assert!(on_boundary(&rect, p));
                prop_assert!(on_boundary(&rect, q));
                prop_assert!(hits.len() >= 2);
            }
        }
    }
}
