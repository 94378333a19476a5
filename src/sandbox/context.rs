// Simulation context: owns every subsystem and runs one frame at a time

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::factory::RenderProxyFactory;
use super::feedback::CollisionFeedback;
use super::panel::{SpawnRandomizer, SpawnRequest};
use super::registry::{EntityId, EntityRegistry};
use super::SandboxError;
use crate::config::SandboxConfig;
use crate::core::math::to_na_vector;
use crate::engine::audio::CuePlayer;
use crate::engine::game_loop::FrameClock;
use crate::engine::input::{OrbitControls, PanelAction};
use crate::engine::physics::{PhysicsWorld, RigidBodyHandle, WorldSettings};
use crate::engine::renderer::{Camera, FrameOutcome, ProxyId, RenderBackend, Scene};

/// What happened during one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// Seconds since the previous frame
    pub delta: f32,
    /// Internal physics steps taken
    pub sub_steps: u32,
    /// Contacts that started during the steps
    pub contacts: usize,
    /// Collision cues triggered
    pub cues: usize,
    /// Whether the backend drew and presented the frame
    pub rendered: bool,
}

pub struct SimulationContext {
    pub physics: PhysicsWorld,
    pub registry: EntityRegistry,
    pub scene: Scene,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub feedback: CollisionFeedback,
    clock: FrameClock,
    spawner: SpawnRandomizer<Box<dyn RngCore>>,
    ground: RigidBodyHandle,
    floor: ProxyId,
    fixed_timestep: f32,
    max_sub_steps: u32,
    /// Whether the previous frame failed to render
    render_failing: bool,
}

impl SimulationContext {
    /// Build the world with its static floor and an empty registry
    ///
    /// `rng` drives spawn placement and seeds the cue-volume generator, so a
    /// seeded rng makes a whole session reproducible.
    pub fn new(
        config: &SandboxConfig,
        cue_player: Box<dyn CuePlayer>,
        mut rng: Box<dyn RngCore>,
    ) -> Self {
        let physics_settings = &config.physics;
        let mut physics = PhysicsWorld::with_settings(WorldSettings {
            gravity: to_na_vector(physics_settings.gravity.into()),
            default_material: physics_settings.default_material(),
            allow_sleep: physics_settings.allow_sleep,
        });
        let ground = physics.add_ground(physics_settings.floor_half_extent);

        let mut scene = Scene::new();
        let floor = scene.insert(RenderProxyFactory::floor(
            physics_settings.floor_half_extent,
        ));

        let camera = Camera::new(
            glam::Vec3::new(-3.0, 3.0, 3.0),
            glam::Vec3::ZERO,
            config.window.width as f32,
            config.window.height as f32,
        );
        let controls = OrbitControls::from_camera(&camera);

        let volume_rng = StdRng::from_rng(&mut rng);
        let feedback = CollisionFeedback::new(
            config.audio.impact_threshold,
            cue_player,
            Box::new(volume_rng),
        );

        Self {
            physics,
            registry: EntityRegistry::new(RenderProxyFactory::new()),
            scene,
            camera,
            controls,
            feedback,
            clock: FrameClock::new(),
            spawner: SpawnRandomizer::new(rng, config.spawn.clone()),
            ground,
            floor,
            fixed_timestep: physics_settings.fixed_timestep,
            max_sub_steps: physics_settings.max_sub_steps,
            render_failing: false,
        }
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Handle of the static floor body
    pub fn ground(&self) -> RigidBodyHandle {
        self.ground
    }

    pub fn floor_proxy(&self) -> ProxyId {
        self.floor
    }

    pub fn spawn(&mut self, request: SpawnRequest) -> Result<EntityId, SandboxError> {
        self.registry.spawn(
            request,
            &mut self.physics,
            &mut self.scene,
            &mut self.feedback,
        )
    }

    /// Remove every spawned body; the floor stays
    pub fn reset(&mut self) -> usize {
        self.registry
            .clear(&mut self.physics, &mut self.scene, &mut self.feedback)
    }

    /// Run a control panel action
    pub fn apply(&mut self, action: PanelAction) -> Result<(), SandboxError> {
        log::debug!("Panel action: {}", action.label());
        match action {
            PanelAction::CreateSphere => {
                let request = self.spawner.sphere();
                self.spawn(request)?;
            }
            PanelAction::CreateBox => {
                let request = self.spawner.cuboid();
                self.spawn(request)?;
            }
            PanelAction::ResetScene => {
                self.reset();
            }
        }
        Ok(())
    }

    /// Run one frame at `elapsed` seconds since start
    ///
    /// Steps physics, dispatches the contacts it produced, syncs proxies to
    /// bodies, renders and asks for the next frame. A failed render is logged
    /// and the loop carries on.
    pub fn run_frame(&mut self, elapsed: f32, backend: &mut dyn RenderBackend) -> FrameReport {
        let delta = self.clock.tick(elapsed);
        let sub_steps = self
            .physics
            .step(self.fixed_timestep, delta, self.max_sub_steps);

        let events = self.physics.drain_contact_events();
        let cues = events
            .iter()
            .filter(|event| self.feedback.handle(event))
            .count();

        self.registry.sync_all(&self.physics, &mut self.scene);
        self.controls.update(&mut self.camera);

        let rendered = match backend.render(&self.scene, &self.camera) {
            Ok(outcome) => {
                if self.render_failing {
                    log::info!("Rendering recovered");
                }
                self.render_failing = false;
                outcome == FrameOutcome::Presented
            }
            Err(e) => {
                if self.render_failing {
                    log::debug!("Render failed: {:#}", e);
                } else {
                    log::warn!("Render failed: {:#}", e);
                }
                self.render_failing = true;
                false
            }
        };
        backend.request_frame();

        FrameReport {
            delta,
            sub_steps,
            contacts: events.len(),
            cues,
            rendered,
        }
    }

    /// Match camera and output surface to a new viewport size
    pub fn resize(&mut self, width: u32, height: u32, backend: &mut dyn RenderBackend) {
        self.camera.resize(width as f32, height as f32);
        backend.resize(width, height);
    }
}
