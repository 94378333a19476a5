// Runtime configuration
//
// Everything has a sensible default; a `sandbox.toml` next to the binary (or the
// file named by `SANDBOX_CONFIG`) overrides individual fields.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::game_loop::{FIXED_TIMESTEP, MAX_SUB_STEPS};
use crate::engine::physics::ContactMaterial;

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "sandbox.toml";

/// Environment variable that points at an alternative config file
pub const CONFIG_ENV: &str = "SANDBOX_CONFIG";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Physics world settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: [f32; 3],
    pub friction: f32,
    pub restitution: f32,
    pub allow_sleep: bool,
    /// Seconds per internal physics step
    pub fixed_timestep: f32,
    /// Upper bound on internal steps per frame
    pub max_sub_steps: u32,
    /// Half the side length of the square floor
    pub floor_half_extent: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            friction: 0.1,
            restitution: 0.7,
            allow_sleep: true,
            fixed_timestep: FIXED_TIMESTEP,
            max_sub_steps: MAX_SUB_STEPS,
            floor_half_extent: 5.0,
        }
    }
}

impl PhysicsSettings {
    pub fn default_material(&self) -> ContactMaterial {
        ContactMaterial::new(self.friction, self.restitution)
    }
}

/// Spawn placement settings for the control panel
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    pub height: f32,
    /// Half-open range for the randomized x coordinate
    pub x_range: [f32; 2],
    /// Half-open range for randomized radii and box edge lengths
    pub size_range: [f32; 2],
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            height: 3.0,
            x_range: [-2.5, 2.5],
            size_range: [0.5, 1.0],
        }
    }
}

/// Collision sound settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Minimum contact-normal speed (m/s) that makes a sound
    pub impact_threshold: f32,
    /// Sound file for the hit cue (a synthesized click is used when unset)
    pub cue_path: Option<PathBuf>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            impact_threshold: 1.5,
            cue_path: None,
        }
    }
}

/// Window settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Physics Sandbox".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Top-level sandbox configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub physics: PhysicsSettings,
    pub spawn: SpawnSettings,
    pub audio: AudioSettings,
    pub window: WindowSettings,
}

impl SandboxConfig {
    /// Load from `SANDBOX_CONFIG` or `sandbox.toml`, falling back to defaults when
    /// neither file exists
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        let spawn = &self.spawn;

        // TOML accepts `inf` and `nan`; none of them survive the comparisons below
        let [gx, gy, gz] = physics.gravity;
        let [x_min, x_max] = spawn.x_range;
        let [size_min, size_max] = spawn.size_range;
        for (name, value) in [
            ("physics.gravity[0]", gx),
            ("physics.gravity[1]", gy),
            ("physics.gravity[2]", gz),
            ("physics.friction", physics.friction),
            ("physics.restitution", physics.restitution),
            ("physics.fixed_timestep", physics.fixed_timestep),
            ("physics.floor_half_extent", physics.floor_half_extent),
            ("spawn.height", spawn.height),
            ("spawn.x_range[0]", x_min),
            ("spawn.x_range[1]", x_max),
            ("spawn.size_range[0]", size_min),
            ("spawn.size_range[1]", size_max),
            ("audio.impact_threshold", self.audio.impact_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }

        if physics.fixed_timestep <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "physics.fixed_timestep must be positive, got {}",
                physics.fixed_timestep
            )));
        }
        if physics.max_sub_steps == 0 {
            return Err(ConfigError::Invalid(
                "physics.max_sub_steps must be at least 1".to_string(),
            ));
        }
        if physics.floor_half_extent <= 0.0 {
            return Err(ConfigError::Invalid(
                "physics.floor_half_extent must be positive".to_string(),
            ));
        }
        if physics.friction < 0.0 || physics.restitution < 0.0 {
            return Err(ConfigError::Invalid(
                "physics.friction and physics.restitution must not be negative".to_string(),
            ));
        }

        if x_min >= x_max {
            return Err(ConfigError::Invalid(format!(
                "spawn.x_range is empty: [{x_min}, {x_max})"
            )));
        }
        if size_min <= 0.0 || size_min >= size_max {
            return Err(ConfigError::Invalid(format!(
                "spawn.size_range must be a non-empty positive range, got [{size_min}, {size_max})"
            )));
        }

        if self.audio.impact_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "audio.impact_threshold must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}
