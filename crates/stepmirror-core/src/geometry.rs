//! Joint-angle geometry.

use nalgebra::Point2;
use std::f64::consts::PI;

/// Bones shorter than this are treated as degenerate
const MIN_BONE_LENGTH: f64 = 1e-9;

/// Angle at `vertex` between the bones toward `parent` and `child`,
/// in radians within [0, π]. Degenerate bones yield 0.
pub fn joint_angle(parent: Point2<f64>, vertex: Point2<f64>, child: Point2<f64>) -> f64 {
    let v1 = parent - vertex;
    let v2 = child - vertex;

    let mag1 = v1.norm();
    let mag2 = v2.norm();
    if mag1 < MIN_BONE_LENGTH || mag2 < MIN_BONE_LENGTH {
        return 0.0;
    }

    let cos_angle = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos()
}

/// Shortest circular distance between two angles, in [0, π].
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    if diff > PI {
        2.0 * PI - diff
    } else {
        diff
    }
}
