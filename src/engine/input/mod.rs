// Input handling system
//
// Keyboard shortcuts stand in for the debug control panel's buttons, the mouse
// orbits the camera.
//
// - `action`: panel actions and their default bindings
// - `manager`: collects window events between frames
// - `orbit`: damped orbit camera controls

pub mod action;
pub mod manager;
pub mod orbit;

// Re-export commonly used types
pub use action::PanelAction;
pub use manager::InputManager;
pub use orbit::OrbitControls;
