// Orbit camera controls: drag to circle the target, scroll to zoom

use crate::engine::renderer::Camera;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Keeps the polar angle away from the poles where `look_at` degenerates
const POLAR_EPSILON: f32 = 1e-3;

/// Damped orbit controller around a target point
///
/// Input adds to pending angular and zoom deltas; `update` applies a fraction
/// of them each frame so the camera glides to a stop.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    /// Distance from the target
    radius: f32,
    /// Azimuth around +Y, measured from +Z
    theta: f32,
    /// Polar angle from +Y
    phi: f32,
    theta_delta: f32,
    phi_delta: f32,
    zoom_scale: f32,
    /// Fraction of pending motion applied per frame (0..1]
    pub damping_factor: f32,
    pub rotate_speed: f32,
    /// Distance multiplier per scroll notch
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitControls {
    /// Start orbiting from wherever the camera currently is
    pub fn from_camera(camera: &Camera) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length().max(f32::EPSILON);
        Self {
            target: camera.target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta_delta: 0.0,
            phi_delta: 0.0,
            zoom_scale: 1.0,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 0.95,
            min_distance: 1.0,
            max_distance: 50.0,
        }
    }

    /// Rotate by a mouse drag; a drag across the full viewport height is one turn
    pub fn rotate(&mut self, drag_pixels: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.theta_delta -= TAU * drag_pixels.x / viewport_height * self.rotate_speed;
        self.phi_delta -= TAU * drag_pixels.y / viewport_height * self.rotate_speed;
    }

    /// Zoom by scroll notches; positive moves closer
    pub fn zoom(&mut self, notches: f32) {
        self.zoom_scale *= self.zoom_speed.powf(notches);
    }

    /// Apply pending motion and place the camera; call once per frame
    pub fn update(&mut self, camera: &mut Camera) {
        self.theta += self.theta_delta * self.damping_factor;
        self.phi = (self.phi + self.phi_delta * self.damping_factor)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.radius = (self.radius * self.zoom_scale).clamp(self.min_distance, self.max_distance);

        let sin_phi = self.phi.sin();
        let offset = Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        );
        camera.position = self.target + offset;
        camera.target = self.target;

        self.theta_delta *= 1.0 - self.damping_factor;
        self.phi_delta *= 1.0 - self.damping_factor;
        self.zoom_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_update_without_input_keeps_camera() {
        let mut camera = Camera::default();
        let start = camera.position;
        let mut controls = OrbitControls::from_camera(&camera);

        controls.update(&mut camera);

        assert_relative_eq!(camera.position.x, start.x, epsilon = 1e-4);
        assert_relative_eq!(camera.position.y, start.y, epsilon = 1e-4);
        assert_relative_eq!(camera.position.z, start.z, epsilon = 1e-4);
    }

    #[test]
    fn test_rotation_keeps_distance_and_glides() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::from_camera(&camera);
        let distance = controls.radius;

        controls.rotate(Vec2::new(200.0, 0.0), 720.0);
        controls.update(&mut camera);
        let after_one = camera.position;
        controls.update(&mut camera);

        assert_relative_eq!(camera.position.length(), distance, epsilon = 1e-4);
        // Motion continues after input stops
        assert!((camera.position - after_one).length() > 1e-4);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::from_camera(&camera);

        controls.zoom(1000.0);
        controls.update(&mut camera);
        assert_relative_eq!(controls.radius, controls.min_distance);

        controls.zoom(-1000.0);
        controls.update(&mut camera);
        assert_relative_eq!(controls.radius, controls.max_distance);
    }

    #[test]
    fn test_polar_angle_never_flips_over_the_pole() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::from_camera(&camera);
        controls.damping_factor = 1.0;

        controls.rotate(Vec2::new(0.0, 10_000.0), 720.0);
        controls.update(&mut camera);

        assert!(camera.position.y > 0.0);
        assert!(camera.position.y <= controls.radius);
    }
}
