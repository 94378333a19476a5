use rapier3d::prelude::*;

use super::body::{BodyBuilder, BodyDescriptor, BodyShape, ColliderBuilder3D, ContactMaterial};
use super::collision::{CollisionEventQueue, ContactEvent};

/// World-level physics configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSettings {
    /// Gravity vector (default: -9.82 m/s² along y)
    pub gravity: Vector<Real>,
    /// Material used for every body that doesn't bring its own
    pub default_material: ContactMaterial,
    /// Let bodies at rest drop out of integration until disturbed
    pub allow_sleep: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: vector![0.0, -9.82, 0.0],
            default_material: ContactMaterial::default(),
            allow_sleep: true,
        }
    }
}

/// Physics world that manages all physics simulation
pub struct PhysicsWorld {
    /// Gravity vector
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Query pipeline for raycasts and shape casts
    query_pipeline: QueryPipeline,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,

    /// Contact events collected since the last drain
    collision_event_queue: CollisionEventQueue,

    default_material: ContactMaterial,
    allow_sleep: bool,

    /// Real time not yet consumed by fixed steps
    accumulator: Real,

    /// Total internal steps taken
    step_count: u64,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::with_settings(WorldSettings::default())
    }

    /// Create a new physics world with custom settings
    pub fn with_settings(settings: WorldSettings) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity: settings.gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            collision_event_queue: CollisionEventQueue::new(),
            default_material: settings.default_material,
            allow_sleep: settings.allow_sleep,
            accumulator: 0.0,
            step_count: 0,
        }
    }

    /// Advance the simulation by the real time that passed since the last call
    ///
    /// Real time is accumulated and consumed in increments of `fixed_dt`, with at
    /// most `max_sub_steps` increments per call. Whatever whole-step debt remains
    /// after hitting the cap is dropped, so a long hitch costs at most
    /// `max_sub_steps` steps instead of a burst of catch-up work. Returns the
    /// number of internal steps taken.
    pub fn step(&mut self, fixed_dt: Real, real_dt: Real, max_sub_steps: u32) -> u32 {
        if !(fixed_dt.is_finite() && fixed_dt > 0.0) {
            log::warn!("Ignoring physics step with invalid fixed timestep {}", fixed_dt);
            return 0;
        }

        // A clock going backwards contributes nothing
        if real_dt.is_finite() && real_dt > 0.0 {
            self.accumulator += real_dt;
        }

        let mut sub_steps = 0;
        while self.accumulator >= fixed_dt && sub_steps < max_sub_steps {
            self.internal_step(fixed_dt);
            self.accumulator -= fixed_dt;
            sub_steps += 1;
        }

        if self.accumulator >= fixed_dt {
            log::debug!(
                "Physics fell behind, dropping {:.1} ms of catch-up",
                (self.accumulator - self.accumulator % fixed_dt) * 1000.0
            );
        }
        self.accumulator %= fixed_dt;

        sub_steps
    }

    /// Step the physics simulation forward by exactly one timestep
    fn internal_step(&mut self, dt: Real) {
        self.integration_parameters.dt = dt;

        // Events accumulate until the caller drains them
        let event_handler = &self.collision_event_queue;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            event_handler,
        );

        self.step_count += 1;
    }

    /// Create a body and its collider from a descriptor
    ///
    /// Bodies without a material override get the world's default contact material.
    pub fn add_body(&mut self, descriptor: &BodyDescriptor) -> RigidBodyHandle {
        let builder = if descriptor.is_static() {
            BodyBuilder::new_fixed()
        } else {
            BodyBuilder::new_dynamic().can_sleep(self.allow_sleep)
        };
        let t = descriptor.translation;
        let body = builder
            .position(t.x, t.y, t.z)
            .rotation(descriptor.rotation)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let mut collider = ColliderBuilder3D::from_shape(descriptor.shape)
            .material(descriptor.material.unwrap_or(self.default_material));
        if !descriptor.is_static() {
            collider = collider.mass(descriptor.mass);
        }
        self.collider_set
            .insert_with_parent(collider.build(), handle, &mut self.rigid_body_set);

        handle
    }

    /// Add the static floor: a thin slab whose top surface is the plane y = 0
    pub fn add_ground(&mut self, half_extent: Real) -> RigidBodyHandle {
        const THICKNESS: Real = 0.1;
        let descriptor = BodyDescriptor::new(
            BodyShape::Cuboid {
                half_extents: vector![half_extent, THICKNESS, half_extent],
            },
            0.0,
            vector![0.0, -THICKNESS, 0.0],
        );
        self.add_body(&descriptor)
    }

    /// Remove a rigid body and all its attached colliders
    ///
    /// Returns false when the body was already gone.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true, // remove attached colliders
            )
            .is_some()
    }

    /// Check whether a body is registered
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    /// Get a reference to a rigid body
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Get a mutable reference to a rigid body
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Current position and orientation of a body
    pub fn body_isometry(&self, handle: RigidBodyHandle) -> Option<Isometry<Real>> {
        self.rigid_body_set.get(handle).map(|body| *body.position())
    }

    /// Whether a body is currently asleep (excluded from integration)
    pub fn is_sleeping(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .get(handle)
            .map(|body| body.is_sleeping())
            .unwrap_or(false)
    }

    /// Total number of bodies, static ones included
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Number of dynamic bodies
    pub fn dynamic_body_count(&self) -> usize {
        self.rigid_body_set
            .iter()
            .filter(|(_, body)| body.is_dynamic())
            .count()
    }

    /// Take every contact event collected since the last call
    pub fn drain_contact_events(&mut self) -> Vec<ContactEvent> {
        self.collision_event_queue.drain()
    }

    /// Cast a ray and return the body it hits first along with the hit distance
    pub fn raycast(
        &self,
        origin: Point<Real>,
        dir: Vector<Real>,
        max_toi: Real,
    ) -> Option<(RigidBodyHandle, Real)> {
        let ray = Ray::new(origin, dir);
        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_toi,
                true,
                QueryFilter::default(),
            )
            .and_then(|(collider, toi)| {
                self.collider_set
                    .get(collider)
                    .and_then(|c| c.parent())
                    .map(|body| (body, toi))
            })
    }

    /// Fraction of a fixed step waiting in the accumulator, for render interpolation
    pub fn interpolation_alpha(&self, fixed_dt: Real) -> Real {
        if fixed_dt > 0.0 {
            self.accumulator / fixed_dt
        } else {
            0.0
        }
    }

    /// Total internal steps taken since creation
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Material applied to bodies without an override
    pub fn default_material(&self) -> ContactMaterial {
        self.default_material
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
