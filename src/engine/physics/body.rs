use rapier3d::prelude::*;

pub use rapier3d::prelude::RigidBodyHandle;

/// Friction and restitution applied where two bodies touch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMaterial {
    /// Friction coefficient (0.0 = ice)
    pub friction: Real,
    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: Real,
}

impl ContactMaterial {
    pub fn new(friction: Real, restitution: Real) -> Self {
        Self {
            friction,
            restitution,
        }
    }
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self::new(0.1, 0.7)
    }
}

/// Collision shape of a body, in physics units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Ball { radius: Real },
    Cuboid { half_extents: Vector<Real> },
}

impl BodyShape {
    fn to_shared_shape(self) -> SharedShape {
        match self {
            BodyShape::Ball { radius } => SharedShape::ball(radius),
            BodyShape::Cuboid { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
        }
    }
}

/// Everything the physics world needs to create one body and its collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDescriptor {
    pub shape: BodyShape,
    /// Mass in kg; zero makes the body static
    pub mass: Real,
    pub translation: Vector<Real>,
    pub rotation: Rotation<Real>,
    /// Overrides the world's default contact material
    pub material: Option<ContactMaterial>,
}

impl BodyDescriptor {
    pub fn new(shape: BodyShape, mass: Real, translation: Vector<Real>) -> Self {
        Self {
            shape,
            mass,
            translation,
            rotation: Rotation::identity(),
            material: None,
        }
    }

    pub fn with_material(mut self, material: ContactMaterial) -> Self {
        self.material = Some(material);
        self
    }

    /// Static bodies (mass == 0) never move
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

/// Builder for creating rigid bodies with common configurations
pub struct BodyBuilder {
    body_type: RigidBodyType,
    position: Isometry<Real>,
    can_sleep: bool,
}

impl BodyBuilder {
    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: Isometry::identity(),
            can_sleep: true,
        }
    }

    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            position: Isometry::identity(),
            can_sleep: false,
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: Real, y: Real, z: Real) -> Self {
        self.position.translation = Translation::new(x, y, z);
        self
    }

    /// Set the initial orientation
    pub fn rotation(mut self, rotation: Rotation<Real>) -> Self {
        self.position.rotation = rotation;
        self
    }

    /// Set whether the body can sleep when inactive
    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        let mut body = RigidBodyBuilder::new(self.body_type)
            .position(self.position)
            .can_sleep(self.can_sleep)
            .build();

        if self.body_type == RigidBodyType::Dynamic {
            // Light air drag, enough to let resting bodies settle
            body.set_linear_damping(0.01);
            body.set_angular_damping(0.01);
        }

        body
    }
}

/// Builder for creating colliders with common configurations
pub struct ColliderBuilder3D {
    shape: SharedShape,
    friction: Real,
    restitution: Real,
    mass: Option<Real>,
    active_events: ActiveEvents,
}

impl ColliderBuilder3D {
    /// Create a collider from a body shape description
    pub fn from_shape(shape: BodyShape) -> Self {
        let material = ContactMaterial::default();
        Self {
            shape: shape.to_shared_shape(),
            friction: material.friction,
            restitution: material.restitution,
            mass: None,
            active_events: ActiveEvents::COLLISION_EVENTS,
        }
    }

    /// Apply friction and restitution from a contact material
    pub fn material(mut self, material: ContactMaterial) -> Self {
        self.friction = material.friction;
        self.restitution = material.restitution;
        self
    }

    /// Set mass directly (overrides the default unit density)
    pub fn mass(mut self, mass: Real) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Build the collider
    pub fn build(self) -> Collider {
        let mut builder = ColliderBuilder::new(self.shape)
            .friction(self.friction)
            .restitution(self.restitution)
            .active_events(self.active_events);

        if let Some(mass) = self.mass {
            builder = builder.mass(mass);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_builder_dynamic() {
        let body = BodyBuilder::new_dynamic()
            .position(10.0, 20.0, -3.0)
            .build();

        assert_eq!(body.body_type(), RigidBodyType::Dynamic);
        assert_eq!(body.translation().x, 10.0);
        assert_eq!(body.translation().y, 20.0);
        assert_eq!(body.translation().z, -3.0);
        assert_eq!(body.linear_damping(), 0.01);
    }

    #[test]
    fn test_body_builder_fixed() {
        let body = BodyBuilder::new_fixed().position(0.0, -1.0, 0.0).build();
        assert_eq!(body.body_type(), RigidBodyType::Fixed);
    }

    #[test]
    fn test_collider_builder_cuboid() {
        let collider = ColliderBuilder3D::from_shape(BodyShape::Cuboid {
            half_extents: vector![0.5, 1.0, 1.5],
        })
            .material(ContactMaterial::new(0.3, 0.2))
            .build();

        assert!(!collider.is_sensor());
        assert_eq!(collider.friction(), 0.3);
        assert_eq!(collider.restitution(), 0.2);

        let cuboid = collider.shape().as_cuboid().unwrap();
        assert_eq!(cuboid.half_extents, vector![0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_collider_builder_ball_reports_events() {
        let collider = ColliderBuilder3D::from_shape(BodyShape::Ball { radius: 0.75 })
            .mass(1.0)
            .build();
        assert!(collider
            .active_events()
            .contains(ActiveEvents::COLLISION_EVENTS));
        assert_eq!(collider.shape().as_ball().unwrap().radius, 0.75);
    }

    #[test]
    fn test_descriptor_static_flag() {
        let floor = BodyDescriptor::new(BodyShape::Ball { radius: 1.0 }, 0.0, Vector::zeros());
        let ball = BodyDescriptor::new(BodyShape::Ball { radius: 1.0 }, 1.0, Vector::zeros());
        assert!(floor.is_static());
        assert!(!ball.is_static());
    }
}
