// Planar projected shadows
//
// Shadow casters are drawn a second time, squashed onto the plane of each shadow
// receiver along the light direction, in a translucent dark tint.

use glam::{Mat4, Vec3, Vec4};

/// Tint of the flattened shadow geometry
pub const SHADOW_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 0.35);

/// Lift above the receiving plane to keep shadows from z-fighting with it
const PLANE_OFFSET: f32 = 0.002;

/// Matrix that projects any point onto the horizontal plane `y = height` along
/// `light_dir` (the direction light travels in)
///
/// Returns `None` for light that never reaches the plane (horizontal or upward).
pub fn planar_shadow_matrix(light_dir: Vec3, height: f32) -> Option<Mat4> {
    if light_dir.y >= -f32::EPSILON {
        return None;
    }

    let h = height + PLANE_OFFSET;
    let sx = light_dir.x / light_dir.y;
    let sz = light_dir.z / light_dir.y;

    // x' = x - sx * (y - h), y' = h, z' = z - sz * (y - h)
    Some(Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(-sx, 0.0, -sz, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(sx * h, h, sz * h, 1.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_straight_down_light_drops_point_vertically() {
        let m = planar_shadow_matrix(Vec3::NEG_Y, 0.0).unwrap();
        let p = m.transform_point3(Vec3::new(1.0, 4.0, -2.0));
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, PLANE_OFFSET);
        assert_relative_eq!(p.z, -2.0);
    }

    #[test]
    fn test_slanted_light_shifts_along_direction() {
        // Light from (5, 5, 5) towards the origin
        let dir = Vec3::new(-1.0, -1.0, -1.0).normalize();
        let m = planar_shadow_matrix(dir, 0.0).unwrap();
        let p = m.transform_point3(Vec3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(p.x, -(2.0 - PLANE_OFFSET), epsilon = 1e-5);
        assert_relative_eq!(p.y, PLANE_OFFSET, epsilon = 1e-6);
        assert_relative_eq!(p.z, -(2.0 - PLANE_OFFSET), epsilon = 1e-5);
    }

    #[test]
    fn test_light_from_below_casts_nothing() {
        assert!(planar_shadow_matrix(Vec3::Y, 0.0).is_none());
        assert!(planar_shadow_matrix(Vec3::X, 0.0).is_none());
    }
}
