// Perspective camera for 3D rendering

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width / height of the output surface
    aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a camera with a 75° vertical field of view
    pub fn new(position: Vec3, target: Vec3, viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self {
            position,
            target,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        };
        camera.resize(viewport_width, viewport_height);
        camera
    }

    /// Recompute the aspect ratio for a new viewport size
    ///
    /// Degenerate sizes (a minimized window) keep the previous aspect.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Get the view-projection matrix
    pub fn view_proj_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(-3.0, 3.0, 3.0), Vec3::ZERO, 1280.0, 720.0)
    }
}

/// Camera uniform for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Camera position (w unused)
    pub eye: [f32; 4],
    /// Direction the light travels in (w unused)
    pub light_dir: [f32; 4],
}

impl CameraUniform {
    /// Create a new camera uniform from a camera and a light direction
    pub fn new(camera: &Camera, light_dir: Vec3) -> Self {
        Self {
            view_proj: camera.view_proj_matrix().to_cols_array_2d(),
            eye: camera.position.extend(1.0).to_array(),
            light_dir: light_dir.normalize_or_zero().extend(0.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = Camera::default();
        camera.resize(800.0, 400.0);
        assert_relative_eq!(camera.aspect(), 2.0);
    }

    #[test]
    fn test_zero_size_keeps_aspect() {
        let mut camera = Camera::default();
        camera.resize(800.0, 400.0);
        camera.resize(0.0, 0.0);
        assert_relative_eq!(camera.aspect(), 2.0);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera::default();
        let clip = camera.view_proj_matrix() * camera.target.extend(1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
        // wgpu depth range is [0, 1]
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }
}
