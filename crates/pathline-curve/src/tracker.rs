//! Time-coherent closest-point tracking along a Bezier path.

use std::sync::Arc;

use pathline_math::{Point3, TnbFrame};

use crate::bernstein;
use crate::bezier::BezierPath;

/// Where a closest-point result landed on an open path.
///
/// Closed paths have no boundary, so their queries always report
/// [`PathPosition::Interior`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPosition {
    /// Result coincides with the path's first point
    Start,
    /// Result lies strictly inside the path
    Interior,
    /// Result coincides with the path's last point
    End,
}

impl PathPosition {
    /// Numeric form of the code: -1 at the start, 0 inside, +1 at the end.
    pub fn code(self) -> i8 {
        match self {
            PathPosition::Start => -1,
            PathPosition::Interior => 0,
            PathPosition::End => 1,
        }
    }
}

/// Stateful closest-point queries against one shared path.
///
/// The tracker remembers the segment and local parameter of its previous
/// answer and seeds the next Newton search there. When consecutive query
/// locations move coherently along the path (a vehicle advancing, a
/// sensor sweeping), each query touches only a handful of neighboring
/// segments instead of rescanning the whole path. Call [`reset`] when
/// that assumption breaks (teleports, path replacement).
///
/// [`reset`]: PathTracker::reset
#[derive(Debug, Clone)]
pub struct PathTracker {
    path: Arc<BezierPath>,
    interval: usize,
    param: f64,
}

impl PathTracker {
    /// Bind a tracker to a path, seeded at the path's beginning.
    pub fn new(path: Arc<BezierPath>) -> Self {
        Self {
            path,
            interval: 0,
            param: 0.0,
        }
    }

    pub fn path(&self) -> &Arc<BezierPath> {
        &self.path
    }

    /// Segment index of the most recent answer.
    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Local parameter of the most recent answer.
    pub fn param(&self) -> f64 {
        self.param
    }

    /// Re-seed the tracker from a coarse global scan.
    ///
    /// Picks the segment minimizing the summed squared distances from
    /// `loc` to its two knot endpoints (no Newton, O(num_segments)) and
    /// seeds the search at that segment's midpoint.
    pub fn reset(&mut self, loc: Point3) {
        let points = self.path.points();
        let n = points.len();

        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for i in 0..self.path.num_segments() {
            let dist = (points[i] - loc).length_squared()
                + (points[(i + 1) % n] - loc).length_squared();
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }

        self.interval = best;
        self.param = 0.5;
    }

    /// Find the point on the path closest to `loc`, exploiting coherence
    /// with the previous query.
    ///
    /// Runs Newton in the remembered segment and hops to a neighbor
    /// whenever the converged parameter exits `[0, 1]`, wrapping on
    /// closed paths and clamping at the ends of open ones. The search
    /// never fails; after the hop budget or iteration budget is spent
    /// the best available answer is returned. Updates the remembered
    /// segment and parameter as a side effect.
    pub fn closest_point(&mut self, loc: Point3) -> (Point3, PathPosition) {
        let num = self.path.num_segments();
        let closed = self.path.is_closed();

        let mut interval = self.interval;
        let mut seed = self.param;

        for _ in 0..=num {
            let (point, t) = self.path.project_in_segment(loc, interval, seed);

            if t > 1.0 {
                if !closed && interval == num - 1 {
                    return self.clamp_at_end();
                }
                interval = (interval + 1) % num;
                seed = 0.0;
                continue;
            }
            if t < 0.0 {
                if !closed && interval == 0 {
                    return self.clamp_at_start();
                }
                interval = (interval + num - 1) % num;
                seed = 1.0;
                continue;
            }

            self.interval = interval;
            self.param = t;
            return (point, self.classify(point));
        }

        // Hop budget exhausted (the query defeated the coherence
        // assumption); settle for the clamped answer in the segment the
        // search ended on
        let clamped = seed.clamp(0.0, 1.0);
        let point = bernstein::point(&self.path.segment_control_points(interval), clamped);
        self.interval = interval;
        self.param = clamped;
        (point, self.classify(point))
    }

    /// As [`closest_point`], but returns the full orthonormal frame and
    /// curvature at the result.
    ///
    /// [`closest_point`]: PathTracker::closest_point
    pub fn closest_frame(&mut self, loc: Point3) -> (TnbFrame, PathPosition) {
        let (point, position) = self.closest_point(loc);

        let cp = self.path.segment_control_points(self.interval);
        let d = bernstein::first_derivative(&cp, self.param);
        let dd = bernstein::second_derivative(&cp, self.param);

        (TnbFrame::from_derivatives(point, d, dd), position)
    }

    fn clamp_at_start(&mut self) -> (Point3, PathPosition) {
        self.interval = 0;
        self.param = 0.0;
        (self.path.points()[0], PathPosition::Start)
    }

    fn clamp_at_end(&mut self) -> (Point3, PathPosition) {
        let num = self.path.num_segments();
        self.interval = num - 1;
        self.param = 1.0;
        let points = self.path.points();
        (points[points.len() - 1], PathPosition::End)
    }

    /// Boundary coincidence: interior convergence that lands on an open
    /// path's first or last knot still reports the boundary code.
    fn classify(&self, point: Point3) -> PathPosition {
        if self.path.is_closed() {
            return PathPosition::Interior;
        }
        let points = self.path.points();
        let sqr_dist = self.path.tolerance().sqr_dist;

        if self.interval == 0 && (point - points[0]).length_squared() < sqr_dist {
            PathPosition::Start
        } else if self.interval == self.path.num_segments() - 1
            && (point - points[points.len() - 1]).length_squared() < sqr_dist
        {
            PathPosition::End
        } else {
            PathPosition::Interior
        }
    }
}
