// Control panel actions and their key bindings

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Actions offered by the debug control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelAction {
    /// Drop a sphere with a random radius
    CreateSphere,
    /// Drop a box with random edge lengths
    CreateBox,
    /// Remove every spawned body
    ResetScene,
}

impl PanelAction {
    /// Name shown on the panel
    pub fn label(self) -> &'static str {
        match self {
            PanelAction::CreateSphere => "Create Sphere",
            PanelAction::CreateBox => "Create Box",
            PanelAction::ResetScene => "Reset Scene",
        }
    }
}

/// Represents an input source (keyboard key or mouse button)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
    Mouse(MouseButton),
}

impl InputSource {
    /// Create a keyboard input source
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }
}

/// Default key bindings for the panel actions
pub fn default_panel_bindings() -> Vec<(InputSource, PanelAction)> {
    vec![
        (InputSource::key(KeyCode::Digit1), PanelAction::CreateSphere),
        (InputSource::key(KeyCode::Numpad1), PanelAction::CreateSphere),
        (InputSource::key(KeyCode::Digit2), PanelAction::CreateBox),
        (InputSource::key(KeyCode::Numpad2), PanelAction::CreateBox),
        (InputSource::key(KeyCode::KeyR), PanelAction::ResetScene),
    ]
}

/// Mouse button that orbits the camera while held
pub const ORBIT_BUTTON: MouseButton = MouseButton::Left;

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIONS: [PanelAction; 3] = [
        PanelAction::CreateSphere,
        PanelAction::CreateBox,
        PanelAction::ResetScene,
    ];

    #[test]
    fn test_labels_match_panel() {
        let labels: Vec<_> = ACTIONS.iter().map(|a| a.label()).collect();
        assert_eq!(labels, ["Create Sphere", "Create Box", "Reset Scene"]);
    }

    #[test]
    fn test_input_source_keyboard_creation() {
        let source = InputSource::key(KeyCode::KeyR);
        assert_eq!(source, InputSource::Keyboard(KeyCode::KeyR));
    }

    #[test]
    fn test_every_action_has_a_binding() {
        let bindings = default_panel_bindings();
        for action in ACTIONS {
            assert!(
                bindings.iter().any(|(_, bound)| *bound == action),
                "{:?} has no binding",
                action
            );
        }
    }

    #[test]
    fn test_no_duplicate_inputs() {
        let bindings = default_panel_bindings();
        let mut seen_sources = std::collections::HashSet::new();
        for (source, _) in bindings {
            assert!(
                seen_sources.insert(source),
                "Duplicate input source found in panel bindings"
            );
        }
    }
}
