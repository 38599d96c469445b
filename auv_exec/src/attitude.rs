//! # Attitude helpers
//!
//! Orientations are exposed as Euler angles in degrees, with each component
//! in `[0, 360)`. The rotation is composed as `R = Ry(y) * Rx(x) * Rz(z)`,
//! i.e. roll about the body Z axis first, then pitch about X, then yaw about
//! Y. The vehicle's forward axis is body +Z.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector3};

// Internal
use util::maths::wrap_deg_360;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Threshold on `cos(pitch)` below which the attitude is treated as gimbal
/// locked.
const GIMBAL_LOCK_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a quaternion from Euler angles in degrees.
pub fn quat_from_euler_deg(euler_deg: &Vector3<f64>) -> UnitQuaternion<f64> {
    let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), euler_deg[0].to_radians());
    let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), euler_deg[1].to_radians());
    let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), euler_deg[2].to_radians());

    ry * rx * rz
}

/// Extract Euler angles in degrees from a quaternion.
///
/// Each component is wrapped into `[0, 360)`. In gimbal lock the Z angle is
/// set to zero and the whole rotation about the vertical is given to Y.
pub fn euler_deg_from_quat(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    let r = q.to_rotation_matrix().into_inner();

    // cos(x) is recovered from the third column, which keeps x well defined
    // close to +/-90 degrees
    let cos_x = r[(0, 2)].hypot(r[(2, 2)]);
    let x = (-r[(1, 2)]).atan2(cos_x);

    let (y, z) = if cos_x > GIMBAL_LOCK_EPSILON {
        (r[(0, 2)].atan2(r[(2, 2)]), r[(1, 0)].atan2(r[(1, 1)]))
    }
    else {
        ((-r[(2, 0)]).atan2(r[(0, 0)]), 0f64)
    };

    Vector3::new(
        wrap_deg_360(x.to_degrees()),
        wrap_deg_360(y.to_degrees()),
        wrap_deg_360(z.to_degrees())
    )
}

/// Euler angles in degrees which point the forward axis from `from` toward
/// `to`, with zero roll.
///
/// If the two points coincide there's no direction to look along and zero is
/// returned.
pub fn look_at_euler_deg(from: &Vector3<f64>, to: &Vector3<f64>) -> Vector3<f64> {
    let dir = to - from;

    if dir.norm() == 0f64 {
        return Vector3::zeros();
    }

    let yaw = dir[0].atan2(dir[2]);
    let pitch = (-dir[1]).atan2(dir[0].hypot(dir[2]));

    Vector3::new(
        wrap_deg_360(pitch.to_degrees()),
        wrap_deg_360(yaw.to_degrees()),
        0f64
    )
}
