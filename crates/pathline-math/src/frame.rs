//! Orthonormal moving frames on space curves.

use serde::{Deserialize, Serialize};

use crate::{DVec3, Point3, Vector3};

/// Cross products below this magnitude are treated as zero curvature.
const MIN_CROSS: f64 = 1e-12;

/// First derivatives below this magnitude cannot orient a frame.
const MIN_TANGENT: f64 = 1e-12;

/// Tangent/normal/binormal frame at a point on a curve, with the
/// unsigned curvature magnitude at that point.
///
/// The basis is right-handed and orthonormal; the normal points to the
/// concave side of the curve. Where the curve is locally straight (or at
/// an inflection) the normal and binormal directions are chosen by an
/// arbitrary but consistent orthogonalization of the tangent and the
/// curvature is reported as zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TnbFrame {
    pub position: Point3,
    pub tangent: Vector3,
    pub normal: Vector3,
    pub binormal: Vector3,
    pub curvature: f64,
}

impl TnbFrame {
    /// Build the frame at `position` from the curve's first and second
    /// derivative vectors there.
    ///
    /// Curvature is `|d x dd| / |d|^3`. A vanishing first derivative
    /// falls back to the x axis as tangent direction.
    pub fn from_derivatives(position: Point3, first: Vector3, second: Vector3) -> Self {
        let speed = first.length();
        let tangent = if speed > MIN_TANGENT {
            first / speed
        } else {
            DVec3::X
        };

        let cross = first.cross(second);
        let cross_len = cross.length();

        if cross_len > MIN_CROSS && speed > MIN_TANGENT {
            let binormal = cross / cross_len;
            let normal = binormal.cross(tangent);
            Self {
                position,
                tangent,
                normal,
                binormal,
                curvature: cross_len / (speed * speed * speed),
            }
        } else {
            // Choose a reference axis not parallel to the tangent
            let ref_vec = if tangent.x.abs() < 0.9 {
                DVec3::X
            } else {
                DVec3::Y
            };
            let binormal = tangent.cross(ref_vec).normalize();
            let normal = binormal.cross(tangent);
            Self {
                position,
                tangent,
                normal,
                binormal,
                curvature: 0.0,
            }
        }
    }
}
