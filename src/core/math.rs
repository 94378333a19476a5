// Math utilities and helper functions
//
// The physics side speaks rapier's nalgebra types, the render side speaks glam.
// Everything that crosses between the two goes through here.

use glam::{Quat, Vec3};
use rapier3d::na::{UnitQuaternion, Vector3};

/// Convert a physics vector into a render vector
pub fn to_glam_vec3(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Convert a render vector into a physics vector
pub fn to_na_vector(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

/// Convert a physics rotation into a render rotation
pub fn to_glam_quat(q: &UnitQuaternion<f32>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}
