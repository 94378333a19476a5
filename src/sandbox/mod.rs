// Sandbox logic: paired physics bodies and visual proxies, spawned and cleared
// at runtime, kept in lockstep every frame

mod context;
mod factory;
mod feedback;
mod panel;
mod registry;

pub use context::SimulationContext;
pub use panel::SpawnRequest;

/// Sandbox errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SandboxError {
    #[error("Invalid {shape} {dimension}: {value} (must be positive and finite)")]
    InvalidDimension {
        shape: &'static str,
        dimension: &'static str,
        value: f32,
    },

    #[error("Invalid spawn position: {0:?}")]
    InvalidPosition([f32; 3]),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_error_display() {
        let err = SandboxError::InvalidDimension {
            shape: "sphere",
            dimension: "radius",
            value: -1.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid sphere radius: -1 (must be positive and finite)"
        );
    }
}
