//! Piecewise cubic Bezier path through 3D knots.

use pathline_core::traits::{BoundingBox, Validate};
use pathline_core::{PathError, ProjectionTolerance, Result};
use pathline_math::tridiagonal::{solve_cyclic_tridiagonal, solve_tridiagonal};
use pathline_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::bernstein;
use crate::Curve;

/// A path assembled from cubic Bezier segments joined at knots.
///
/// Each knot `i` carries an incoming control vertex `in_cv[i]` (entry
/// tangent) and an outgoing one `out_cv[i]` (exit tangent); segment `i`
/// is the cubic on `points[i]`, `out_cv[i]`, `in_cv[i+1]`, `points[i+1]`
/// (knot indices wrapping when the path is closed). Built either from
/// explicit control vertices or by fitting a C2 interpolating spline
/// through the knots alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BezierPath {
    points: Vec<Point3>,
    in_cv: Vec<Point3>,
    out_cv: Vec<Point3>,
    closed: bool,
    tol: ProjectionTolerance,
}

impl BezierPath {
    /// Build a path from explicit knots and control vertices.
    ///
    /// No continuity beyond positional is implied; the caller supplies
    /// whatever tangent behavior the control vertices encode.
    pub fn new(
        points: Vec<Point3>,
        in_cv: Vec<Point3>,
        out_cv: Vec<Point3>,
        closed: bool,
    ) -> Result<Self> {
        check_arrays(&points, &in_cv, &out_cv)?;
        Ok(Self {
            points,
            in_cv,
            out_cv,
            closed,
            tol: ProjectionTolerance::default(),
        })
    }

    /// Build a C2 interpolating spline through the given knots.
    ///
    /// Control vertices are derived per coordinate axis from a
    /// tridiagonal system: natural end conditions (zero second
    /// derivative) for open paths, cyclic coupling for closed ones.
    /// Entry control vertices mirror the exit ones through each knot,
    /// which is what makes the tangents continuous.
    pub fn through_points(knots: Vec<Point3>, closed: bool) -> Result<Self> {
        if knots.len() < 2 {
            return Err(PathError::InvalidArgument(format!(
                "a path needs at least 2 knots, got {}",
                knots.len()
            )));
        }
        let (in_cv, out_cv) = if closed {
            fit_closed(&knots)?
        } else {
            fit_open(&knots)?
        };
        Ok(Self {
            points: knots,
            in_cv,
            out_cv,
            closed,
            tol: ProjectionTolerance::default(),
        })
    }

    /// Replace all three control arrays atomically.
    ///
    /// Validates before mutating, so a rejected call leaves the path
    /// untouched. The closed flag is preserved.
    pub fn set_points(
        &mut self,
        points: Vec<Point3>,
        in_cv: Vec<Point3>,
        out_cv: Vec<Point3>,
    ) -> Result<()> {
        check_arrays(&points, &in_cv, &out_cv)?;
        self.points = points;
        self.in_cv = in_cv;
        self.out_cv = out_cv;
        Ok(())
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_segments(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn point(&self, i: usize) -> Result<Point3> {
        if i >= self.points.len() {
            return Err(PathError::IndexOutOfRange(format!(
                "knot {} out of range for {} points",
                i,
                self.points.len()
            )));
        }
        Ok(self.points[i])
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn in_cv(&self) -> &[Point3] {
        &self.in_cv
    }

    pub fn out_cv(&self) -> &[Point3] {
        &self.out_cv
    }

    pub fn tolerance(&self) -> ProjectionTolerance {
        self.tol
    }

    pub fn set_tolerance(&mut self, tol: ProjectionTolerance) {
        self.tol = tol;
    }

    /// Evaluate segment `i` at local parameter `u`.
    pub fn eval(&self, i: usize, u: f64) -> Result<Point3> {
        self.check_segment(i)?;
        Ok(bernstein::point(&self.segment_control_points(i), u))
    }

    /// First derivative of segment `i` with respect to `u`.
    pub fn eval_d(&self, i: usize, u: f64) -> Result<Vector3> {
        self.check_segment(i)?;
        Ok(bernstein::first_derivative(
            &self.segment_control_points(i),
            u,
        ))
    }

    /// Second derivative of segment `i` with respect to `u`.
    pub fn eval_dd(&self, i: usize, u: f64) -> Result<Vector3> {
        self.check_segment(i)?;
        Ok(bernstein::second_derivative(
            &self.segment_control_points(i),
            u,
        ))
    }

    /// Project `loc` onto segment `i` by Newton iteration, seeded at `t`.
    ///
    /// Finds a root of `(C(t) - loc) . C'(t)`, the orthogonality
    /// condition for a squared-distance extremum. Iteration stops when
    /// the residual distance, the residual/tangent angle, or the
    /// parameter change drops below the path's [`ProjectionTolerance`],
    /// or after `max_iters` steps. Non-convergence is not an error: the
    /// last iterate is returned as best effort, and the parameter may
    /// land outside `[0, 1]` (callers needing an in-segment answer clamp
    /// or hand the overshoot to the tracker).
    ///
    /// Returns the projected point and its parameter.
    pub fn closest_point_in_segment(&self, loc: Point3, i: usize, t: f64) -> Result<(Point3, f64)> {
        self.check_segment(i)?;
        Ok(self.project_in_segment(loc, i, t))
    }

    /// Newton projection onto segment `i`, assuming the index is valid.
    pub(crate) fn project_in_segment(&self, loc: Point3, i: usize, t: f64) -> (Point3, f64) {
        let cp = self.segment_control_points(i);

        let mut t = t;
        let mut point = bernstein::point(&cp, t);

        for _ in 0..self.tol.max_iters {
            let vec = point - loc;
            if self.tol.distance_converged(vec.length_squared()) {
                break;
            }

            let d = bernstein::first_derivative(&cp, t);
            let scale = vec.length() * d.length();
            if scale > 0.0 && self.tol.angle_converged(vec.dot(d) / scale) {
                break;
            }

            let dd = bernstein::second_derivative(&cp, t);
            let denom = d.dot(d) + vec.dot(dd);
            if denom == 0.0 {
                break;
            }

            let dt = vec.dot(d) / denom;
            t -= dt;
            point = bernstein::point(&cp, t);

            if self.tol.param_converged(dt) {
                break;
            }
        }

        (point, t)
    }

    pub(crate) fn segment_control_points(&self, i: usize) -> [Point3; 4] {
        let j = (i + 1) % self.points.len();
        [self.points[i], self.out_cv[i], self.in_cv[j], self.points[j]]
    }

    fn check_segment(&self, i: usize) -> Result<()> {
        if i >= self.num_segments() {
            return Err(PathError::IndexOutOfRange(format!(
                "segment {} out of range for {} segments",
                i,
                self.num_segments()
            )));
        }
        Ok(())
    }

    /// Map a global parameter to a segment index and local parameter.
    fn locate(&self, t: f64) -> (usize, f64) {
        let num = self.num_segments();
        let scaled = t.clamp(0.0, 1.0) * num as f64;
        let mut i = scaled.floor() as usize;
        if i >= num {
            i = num - 1;
        }
        (i, scaled - i as f64)
    }
}

impl Curve for BezierPath {
    fn point_at(&self, t: f64) -> Point3 {
        let (i, u) = self.locate(t);
        bernstein::point(&self.segment_control_points(i), u)
    }

    /// Derivative with respect to the global parameter (chain rule over
    /// the uniform segment partition).
    fn tangent_at(&self, t: f64) -> Vector3 {
        let (i, u) = self.locate(t);
        bernstein::first_derivative(&self.segment_control_points(i), u) * self.num_segments() as f64
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Validate for BezierPath {
    fn validate(&self) -> Result<()> {
        check_arrays(&self.points, &self.in_cv, &self.out_cv)
    }
}

impl BoundingBox for BezierPath {
    type Point = Point3;

    /// Conservative box over knots and control vertices; the curve lies
    /// inside the convex hull of its control points. A deserialized path
    /// with no points yields the inverted empty box.
    fn bounding_box(&self) -> (Point3, Point3) {
        let mut min = Point3::splat(f64::INFINITY);
        let mut max = Point3::splat(f64::NEG_INFINITY);
        for &p in self
            .points
            .iter()
            .chain(self.in_cv.iter())
            .chain(self.out_cv.iter())
        {
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }
}

fn check_arrays(points: &[Point3], in_cv: &[Point3], out_cv: &[Point3]) -> Result<()> {
    if points.len() < 2 {
        return Err(PathError::InvalidArgument(format!(
            "a path needs at least 2 knots, got {}",
            points.len()
        )));
    }
    if in_cv.len() != points.len() || out_cv.len() != points.len() {
        return Err(PathError::InvalidArgument(format!(
            "control vertex arrays must match the {} knots, got in {} / out {}",
            points.len(),
            in_cv.len(),
            out_cv.len()
        )));
    }
    Ok(())
}

/// Derive control vertices for an open C2 spline with natural ends.
///
/// Unknowns are the exit control vertices of the `n - 1` segments; the
/// entry ones follow by reflection through the interior knots and from
/// the zero-second-derivative condition at the far end.
fn fit_open(knots: &[Point3]) -> Result<(Vec<Point3>, Vec<Point3>)> {
    let n = knots.len();

    // Single segment: the chord in cubic form
    if n == 2 {
        let in_cv = vec![knots[0], (knots[0] + 2.0 * knots[1]) / 3.0];
        let out_cv = vec![(2.0 * knots[0] + knots[1]) / 3.0, knots[1]];
        return Ok((in_cv, out_cv));
    }

    let m = n - 1;
    let mut lower = vec![1.0; m];
    let mut diag = vec![4.0; m];
    let mut upper = vec![1.0; m];
    lower[0] = 0.0;
    diag[0] = 2.0;
    diag[m - 1] = 3.5;
    upper[m - 1] = 0.0;

    let mut solved: [Vec<f64>; 3] = Default::default();
    for (axis, out) in solved.iter_mut().enumerate() {
        let mut rhs = vec![0.0; m];
        rhs[0] = knots[0][axis] + 2.0 * knots[1][axis];
        for i in 1..m - 1 {
            rhs[i] = 4.0 * knots[i][axis] + 2.0 * knots[i + 1][axis];
        }
        rhs[m - 1] = (8.0 * knots[m - 1][axis] + knots[n - 1][axis]) / 2.0;
        *out = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;
    }
    let exit = |i: usize| Point3::new(solved[0][i], solved[1][i], solved[2][i]);

    let mut out_cv = Vec::with_capacity(n);
    for i in 0..m {
        out_cv.push(exit(i));
    }
    out_cv.push(knots[n - 1]);

    let mut in_cv = Vec::with_capacity(n);
    in_cv.push(knots[0]);
    for i in 1..m {
        in_cv.push(2.0 * knots[i] - exit(i));
    }
    in_cv.push((exit(m - 1) + knots[n - 1]) * 0.5);

    Ok((in_cv, out_cv))
}

/// Derive control vertices for a closed C2 spline.
///
/// The periodic system couples the first and last unknowns, making the
/// matrix cyclic tridiagonal; reflection applies at every knot,
/// including across the wraparound.
fn fit_closed(knots: &[Point3]) -> Result<(Vec<Point3>, Vec<Point3>)> {
    let n = knots.len();
    let lower = vec![1.0; n];
    let diag = vec![4.0; n];
    let upper = vec![1.0; n];

    let mut solved: [Vec<f64>; 3] = Default::default();
    for (axis, out) in solved.iter_mut().enumerate() {
        let mut rhs = vec![0.0; n];
        for (i, r) in rhs.iter_mut().enumerate() {
            *r = 4.0 * knots[i][axis] + 2.0 * knots[(i + 1) % n][axis];
        }
        *out = solve_cyclic_tridiagonal(&lower, &diag, &upper, 1.0, 1.0, &rhs)?;
    }
    let exit = |i: usize| Point3::new(solved[0][i], solved[1][i], solved[2][i]);

    let out_cv: Vec<Point3> = (0..n).map(exit).collect();
    let in_cv: Vec<Point3> = (0..n).map(|i| 2.0 * knots[i] - exit(i)).collect();

    Ok((in_cv, out_cv))
}
