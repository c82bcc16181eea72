//! Bernstein-basis evaluation of cubic Bezier segments.

use pathline_math::{Point3, Vector3};

/// Evaluate a cubic Bezier segment at local parameter `u`.
///
/// Closed-form Bernstein blend of the four control points. Values of `u`
/// outside `[0, 1]` evaluate the polynomial extension of the segment
/// rather than clamping; iterative callers rely on slight overshoot.
///
/// # Arguments
/// * `cp` - The segment control points `[P0, P1, P2, P3]`
/// * `u` - Local parameter
pub fn point(cp: &[Point3; 4], u: f64) -> Point3 {
    let s = 1.0 - u;
    cp[0] * (s * s * s) + cp[1] * (3.0 * s * s * u) + cp[2] * (3.0 * s * u * u) + cp[3] * (u * u * u)
}

/// First derivative of a cubic Bezier segment with respect to `u`.
///
/// Degree-2 Bernstein blend of the control-point first differences,
/// scaled by 3.
pub fn first_derivative(cp: &[Point3; 4], u: f64) -> Vector3 {
    let s = 1.0 - u;
    (cp[1] - cp[0]) * (3.0 * s * s) + (cp[2] - cp[1]) * (6.0 * s * u) + (cp[3] - cp[2]) * (3.0 * u * u)
}

/// Second derivative of a cubic Bezier segment with respect to `u`.
///
/// Degree-1 blend of the control-point second differences, scaled by 6.
pub fn second_derivative(cp: &[Point3; 4], u: f64) -> Vector3 {
    let s = 1.0 - u;
    (cp[2] - 2.0 * cp[1] + cp[0]) * (6.0 * s) + (cp[3] - 2.0 * cp[2] + cp[1]) * (6.0 * u)
}
