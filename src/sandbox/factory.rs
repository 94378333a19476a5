// Builds a physics body descriptor and a matching visual proxy from one shape

use glam::{Vec3, Vec4};

use super::SandboxError;
use crate::core::math::to_na_vector;
use crate::engine::physics::{BodyDescriptor, BodyShape};
use crate::engine::renderer::{MeshKind, ProxyNode};

/// Metallic grey of spawned bodies
const BODY_COLOR: Vec4 = Vec4::new(0.72, 0.74, 0.78, 1.0);

/// Floor grey (#777777)
const FLOOR_COLOR: Vec4 = Vec4::new(0.467, 0.467, 0.467, 1.0);

/// Shape and size of a spawnable body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Sphere { radius: f32 },
    Box { width: f32, height: f32, depth: f32 },
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Sphere { .. } => "sphere",
            ShapeKind::Box { .. } => "box",
        }
    }

    /// Every dimension must be a positive finite number
    pub fn validate(&self) -> Result<(), SandboxError> {
        let check = |dimension: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SandboxError::InvalidDimension {
                    shape: self.name(),
                    dimension,
                    value,
                })
            }
        };

        match *self {
            ShapeKind::Sphere { radius } => check("radius", radius),
            ShapeKind::Box {
                width,
                height,
                depth,
            } => {
                check("width", width)?;
                check("height", height)?;
                check("depth", depth)
            }
        }
    }
}

/// Creates (body, proxy) pairs whose physical and visual sizes agree
#[derive(Debug, Clone)]
pub struct RenderProxyFactory {
    /// Mass of every spawned body, in kg
    pub mass: f32,
    pub color: Vec4,
}

impl RenderProxyFactory {
    pub fn new() -> Self {
        Self {
            mass: 1.0,
            color: BODY_COLOR,
        }
    }

    /// Build the body descriptor and the shadow-casting proxy for a shape
    ///
    /// The proxy is a unit mesh scaled to the shape: a sphere of radius r is the
    /// unit sphere scaled by r, a w x h x d box is the unit cube scaled by
    /// (w, h, d) and its collider has half-extents (w/2, h/2, d/2).
    pub fn create(
        &self,
        shape: ShapeKind,
        position: Vec3,
    ) -> Result<(BodyDescriptor, ProxyNode), SandboxError> {
        shape.validate()?;
        if !position.is_finite() {
            return Err(SandboxError::InvalidPosition(position.to_array()));
        }

        let (body_shape, mesh, scale) = match shape {
            ShapeKind::Sphere { radius } => (
                BodyShape::Ball { radius },
                MeshKind::Sphere,
                Vec3::splat(radius),
            ),
            ShapeKind::Box {
                width,
                height,
                depth,
            } => (
                BodyShape::Cuboid {
                    half_extents: to_na_vector(Vec3::new(width, height, depth) * 0.5),
                },
                MeshKind::Cube,
                Vec3::new(width, height, depth),
            ),
        };

        let body = BodyDescriptor::new(body_shape, self.mass, to_na_vector(position));
        let proxy = ProxyNode::new(mesh, scale)
            .with_position(position)
            .with_color(self.color)
            .casting_shadow();

        Ok((body, proxy))
    }

    /// The static floor's proxy: a square plane receiving shadows, top at y = 0
    pub fn floor(half_extent: f32) -> ProxyNode {
        ProxyNode::new(MeshKind::Plane, Vec3::new(half_extent * 2.0, 1.0, half_extent * 2.0))
            .with_color(FLOOR_COLOR)
            .receiving_shadow()
    }
}

impl Default for RenderProxyFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_body_and_proxy_agree() {
        let factory = RenderProxyFactory::new();
        let (body, proxy) = factory
            .create(ShapeKind::Sphere { radius: 0.8 }, Vec3::new(1.0, 3.0, 0.0))
            .unwrap();

        assert_eq!(body.shape, BodyShape::Ball { radius: 0.8 });
        assert_eq!(proxy.mesh, MeshKind::Sphere);
        assert_eq!(proxy.scale, Vec3::splat(0.8));
        assert_eq!(body.translation, to_na_vector(Vec3::new(1.0, 3.0, 0.0)));
        assert_eq!(proxy.position, Vec3::new(1.0, 3.0, 0.0));
    }

    #[test]
    fn test_box_half_extents_match_visual_scale() {
        let factory = RenderProxyFactory::new();
        let (body, proxy) = factory
            .create(
                ShapeKind::Box {
                    width: 0.6,
                    height: 0.9,
                    depth: 0.7,
                },
                Vec3::new(0.0, 3.0, 0.0),
            )
            .unwrap();

        let BodyShape::Cuboid { half_extents } = body.shape else {
            panic!("box should make a cuboid body");
        };
        assert_eq!(proxy.mesh, MeshKind::Cube);
        assert_relative_eq!(half_extents.x * 2.0, proxy.scale.x);
        assert_relative_eq!(half_extents.y * 2.0, proxy.scale.y);
        assert_relative_eq!(half_extents.z * 2.0, proxy.scale.z);
    }

    #[test]
    fn test_spawned_proxies_cast_shadows() {
        let factory = RenderProxyFactory::new();
        let (body, proxy) = factory
            .create(ShapeKind::Sphere { radius: 0.5 }, Vec3::ZERO)
            .unwrap();
        assert!(proxy.cast_shadow);
        assert!(!proxy.receive_shadow);
        assert_eq!(body.mass, 1.0);
        assert!(body.material.is_none());
    }

    #[test]
    fn test_floor_receives_shadows() {
        let floor = RenderProxyFactory::floor(5.0);
        assert!(floor.receive_shadow);
        assert!(!floor.cast_shadow);
        assert_eq!(floor.mesh, MeshKind::Plane);
        assert_eq!(floor.scale, Vec3::new(10.0, 1.0, 10.0));
    }

    #[test]
    fn test_bad_dimensions_rejected() {
        let factory = RenderProxyFactory::new();
        assert!(factory
            .create(ShapeKind::Sphere { radius: 0.0 }, Vec3::ZERO)
            .is_err());
        assert_eq!(
            factory
                .create(
                    ShapeKind::Box {
                        width: 1.0,
                        height: f32::NAN,
                        depth: 1.0
                    },
                    Vec3::ZERO
                )
                .unwrap_err()
                .to_string(),
            "Invalid box height: NaN (must be positive and finite)"
        );
    }

    #[test]
    fn test_bad_position_rejected() {
        let factory = RenderProxyFactory::new();
        let result = factory.create(
            ShapeKind::Sphere { radius: 1.0 },
            Vec3::new(f32::INFINITY, 0.0, 0.0),
        );
        assert!(matches!(result, Err(SandboxError::InvalidPosition(_))));
    }
}
