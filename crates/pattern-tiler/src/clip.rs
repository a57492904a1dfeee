//! Polyline clipping against one page's printable rectangle.
//!
//! Walks the path in order, tracking whether the previous point was on the
//! page, and cuts the drawing into runs at every boundary crossing:
//!
//! | previous | current | action                                          |
//! |----------|---------|-------------------------------------------------|
//! | outside  | outside | draw the pass-through chord, if there is one    |
//! | outside  | inside  | start a run at the crossing (or at the point)   |
//! | inside   | inside  | extend the run                                  |
//! | inside   | outside | end the run at the crossing                     |
//!
//! "Inside" is strict: a point lying exactly on the boundary is outside.

use crate::boundary::{boundary_crossing, pass_through};
use crate::geometry::{Path, Point, Rect};

/// One contiguous drawn run on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedRun {
    pub points: Vec<Point>,
    /// The run is the whole closed path; the last point connects to the first.
    pub closed: bool,
}

/// Everything of a path that falls on one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClippedPath {
    pub runs: Vec<ClippedRun>,
    /// Path points on the page plus pass-through chords. Zero means a blank page.
    pub points_on_page: usize,
}

impl ClippedPath {
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.points_on_page == 0
    }
}

impl ClippedRun {
    fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }
}

/// Clipping state for one path against one rectangle.
struct Clipper<'a> {
    rect: &'a Rect,
    runs: Vec<ClippedRun>,
    /// Run currently being drawn; empty while the pen is up.
    current: Vec<Point>,
    /// Previous point and whether it was on the page.
    previous: Option<(Point, bool)>,
    /// The first run began at the path's first point.
    first_run_from_start: bool,
    points_on_page: usize,
}

impl<'a> Clipper<'a> {
    fn new(rect: &'a Rect) -> Self {
        Self {
            rect,
            runs: Vec::new(),
            current: Vec::new(),
            previous: None,
            first_run_from_start: false,
            points_on_page: 0,
        }
    }

    /// Advance to `p`. `counted` is false when revisiting the first point
    /// to close the path.
    fn step(&mut self, p: Point, counted: bool) {
        let inside = self.rect.contains(p);

        match (self.previous, inside) {
            (None, true) => {
                self.first_run_from_start = true;
                self.current.push(p);
                self.points_on_page += 1;
            }
            (None, false) => {}
            (Some((last, false)), false) => {
                if let Some((entry, exit)) = pass_through(last, p, self.rect) {
                    self.runs.push(ClippedRun::open(vec![entry, exit]));
                    self.points_on_page += 1;
                }
            }
            (Some((last, false)), true) => {
                let entry = boundary_crossing(last, p, self.rect);
                self.current.push(entry);
                self.current.push(p);
                if counted {
                    self.points_on_page += 1;
                }
            }
            (Some((_, true)), true) => {
                self.current.push(p);
                if counted {
                    self.points_on_page += 1;
                }
            }
            (Some((last, true)), false) => {
                let exit = boundary_crossing(last, p, self.rect);
                self.current.push(exit);
                let run = std::mem::take(&mut self.current);
                self.runs.push(ClippedRun::open(run));
            }
        }

        self.previous = Some((p, inside));
    }

    fn finish(mut self, path: &Path) -> ClippedPath {
        if path.is_closed() && path.len() > 1 {
            let first = path.first();
            let whole_path_inside = self.runs.is_empty()
                && self.first_run_from_start
                && self.current.len() == path.len();

            if whole_path_inside {
                let run = std::mem::take(&mut self.current);
                self.runs.push(ClippedRun { points: run, closed: true });
                return self.into_clipped();
            }

            self.step(first, false);

            // The closing edge ended on the first point, where the first run
            // starts: join them into one continuous run.
            if self.rect.contains(first) && self.first_run_from_start && !self.runs.is_empty() {
                let mut closing = std::mem::take(&mut self.current);
                closing.pop();
                closing.extend(self.runs[0].points.drain(..));
                self.runs[0].points = closing;
            }
        }

        if !self.current.is_empty() {
            let run = std::mem::take(&mut self.current);
            self.runs.push(ClippedRun::open(run));
        }

        self.into_clipped()
    }

    fn into_clipped(self) -> ClippedPath {
        ClippedPath {
            runs: self.runs,
            points_on_page: self.points_on_page,
        }
    }
}

/// Clip `path` to `rect`, returning the drawable runs in path order.
pub fn clip_path(path: &Path, rect: &Rect) -> ClippedPath {
    let mut clipper = Clipper::new(rect);
    for &p in path.points() {
        clipper.step(p, true);
    }
    clipper.finish(path)
}

// ============================================================================
// TESTS
// ============================================================================
