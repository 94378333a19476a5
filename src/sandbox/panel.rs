// Control panel spawning: random sizes and drop positions for new bodies

use glam::Vec3;
use rand::Rng;

use super::factory::ShapeKind;
use crate::config::SpawnSettings;

/// A body the registry should create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub shape: ShapeKind,
    pub position: Vec3,
}

impl SpawnRequest {
    pub fn sphere(radius: f32, position: Vec3) -> Self {
        Self {
            shape: ShapeKind::Sphere { radius },
            position,
        }
    }

    pub fn cuboid(width: f32, height: f32, depth: f32, position: Vec3) -> Self {
        Self {
            shape: ShapeKind::Box {
                width,
                height,
                depth,
            },
            position,
        }
    }
}

/// Produces the randomized requests behind "Create Sphere" and "Create Box"
pub struct SpawnRandomizer<R> {
    rng: R,
    settings: SpawnSettings,
}

impl<R: Rng> SpawnRandomizer<R> {
    /// Ranges in `settings` must be non-empty (config validation checks this)
    pub fn new(rng: R, settings: SpawnSettings) -> Self {
        Self { rng, settings }
    }

    pub fn sphere(&mut self) -> SpawnRequest {
        let radius = self.size();
        SpawnRequest::sphere(radius, self.position())
    }

    pub fn cuboid(&mut self) -> SpawnRequest {
        let (width, height, depth) = (self.size(), self.size(), self.size());
        SpawnRequest::cuboid(width, height, depth, self.position())
    }

    fn size(&mut self) -> f32 {
        let [min, max] = self.settings.size_range;
        self.rng.random_range(min..max)
    }

    fn position(&mut self) -> Vec3 {
        let [min, max] = self.settings.x_range;
        Vec3::new(self.rng.random_range(min..max), self.settings.height, 0.0)
    }
}
