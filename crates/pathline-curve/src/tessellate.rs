//! Conversion of curves to polylines for rendering and export.

use pathline_math::Point3;

use crate::Curve;

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;

/// Convert a curve to a polyline using adaptive subdivision.
///
/// Spans are recursively split while the curve deviates from the chord
/// by more than `tolerance`. Deviation is probed at the span midpoint
/// and at a quarter point, so spans with an inflection sitting exactly
/// on the chord still subdivide. On a closed curve the seam point
/// appears at both ends of the polyline.
///
/// # Arguments
/// * `curve` - The curve to tessellate
/// * `tolerance` - Maximum allowed deviation from the true curve
///
/// # Returns
/// A vector of points approximating the curve, including both endpoints.
pub fn curve_to_polyline(curve: &dyn Curve, tolerance: f64) -> Vec<Point3> {
    let (t_min, t_max) = curve.domain();
    let mut points = Vec::new();
    points.push(curve.point_at(t_min));
    subdivide_curve(curve, t_min, t_max, tolerance, &mut points, 0);
    points
}

fn subdivide_curve(
    curve: &dyn Curve,
    t0: f64,
    t1: f64,
    tolerance: f64,
    points: &mut Vec<Point3>,
    depth: u32,
) {
    if depth >= MAX_DEPTH {
        points.push(curve.point_at(t1));
        return;
    }

    let p0 = curve.point_at(t0);
    let p1 = curve.point_at(t1);

    let deviation_at = |f: f64| {
        let on_curve = curve.point_at(t0 + (t1 - t0) * f);
        let on_chord = p0 + (p1 - p0) * f;
        (on_curve - on_chord).length()
    };
    let deviation = deviation_at(0.5).max(deviation_at(0.25));

    if deviation > tolerance {
        let t_mid = (t0 + t1) * 0.5;
        subdivide_curve(curve, t0, t_mid, tolerance, points, depth + 1);
        subdivide_curve(curve, t_mid, t1, tolerance, points, depth + 1);
    } else {
        points.push(p1);
    }
}
