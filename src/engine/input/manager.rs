// Input manager - turns raw window events into panel actions and camera motion

use super::action::{default_panel_bindings, InputSource, PanelAction, ORBIT_BUTTON};
use super::orbit::OrbitControls;
use glam::Vec2;
use std::collections::HashMap;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels of touchpad scroll that count as one wheel notch
const PIXELS_PER_NOTCH: f32 = 50.0;

/// Collects input between frames
pub struct InputManager {
    /// Mapping from input sources to panel actions
    bindings: HashMap<InputSource, PanelAction>,

    /// Panel actions triggered since the last drain, in order
    pending_actions: Vec<PanelAction>,

    /// Whether the orbit button is held
    dragging: bool,

    /// Last known cursor position
    cursor: Option<Vec2>,

    /// Accumulated drag since the last frame
    drag: Vec2,

    /// Accumulated scroll notches since the last frame
    scroll: f32,
}

impl InputManager {
    /// Create an input manager with the default bindings
    pub fn new() -> Self {
        Self::from_bindings(default_panel_bindings())
    }

    /// Create an input manager from a list of bindings
    pub fn from_bindings(bindings: Vec<(InputSource, PanelAction)>) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
            pending_actions: Vec::new(),
            dragging: false,
            cursor: None,
            drag: Vec2::ZERO,
            scroll: 0.0,
        }
    }

    /// Process a keyboard event from winit
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        // Only process physical key presses
        if let PhysicalKey::Code(key_code) = event.physical_key {
            self.process_key(
                key_code,
                event.state == ElementState::Pressed,
                event.repeat,
            );
        }
    }

    /// Process a key press or release
    pub fn process_key(&mut self, key_code: KeyCode, pressed: bool, repeat: bool) {
        // Holding a key down must not spawn a stream of bodies
        if pressed && !repeat {
            self.trigger(InputSource::Keyboard(key_code));
        }
    }

    /// Process a mouse button event
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let pressed = state == ElementState::Pressed;
        if button == ORBIT_BUTTON {
            self.dragging = pressed;
        }
        if pressed {
            self.trigger(InputSource::Mouse(button));
        }
    }

    /// Process cursor movement, in physical pixels
    pub fn process_cursor_moved(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if let (true, Some(previous)) = (self.dragging, self.cursor) {
            self.drag += position - previous;
        }
        self.cursor = Some(position);
    }

    /// Process a mouse wheel or touchpad scroll
    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_NOTCH,
        };
    }

    /// The cursor left the window; a drag can't continue without it
    pub fn process_cursor_left(&mut self) {
        self.dragging = false;
        self.cursor = None;
    }

    /// Take the panel actions triggered since the last call
    pub fn take_actions(&mut self) -> Vec<PanelAction> {
        std::mem::take(&mut self.pending_actions)
    }

    /// Feed accumulated drag and scroll into the orbit controls
    pub fn apply_orbit(&mut self, controls: &mut OrbitControls, viewport_height: f32) {
        if self.drag != Vec2::ZERO {
            controls.rotate(self.drag, viewport_height);
        }
        if self.scroll != 0.0 {
            controls.zoom(self.scroll);
        }
        self.drag = Vec2::ZERO;
        self.scroll = 0.0;
    }

    fn trigger(&mut self, source: InputSource) {
        if let Some(&action) = self.bindings.get(&source) {
            log::debug!("{:?} -> {}", source, action.label());
            self.pending_actions.push(action);
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::renderer::Camera;

    #[test]
    fn test_bound_keys_queue_actions_in_order() {
        let mut manager = InputManager::new();
        manager.process_key(KeyCode::Digit1, true, false);
        manager.process_key(KeyCode::Digit2, true, false);
        manager.process_key(KeyCode::KeyR, true, false);

        assert_eq!(
            manager.take_actions(),
            vec![
                PanelAction::CreateSphere,
                PanelAction::CreateBox,
                PanelAction::ResetScene
            ]
        );
        assert!(manager.take_actions().is_empty());
    }

    #[test]
    fn test_release_and_repeat_are_ignored() {
        let mut manager = InputManager::new();
        manager.process_key(KeyCode::Digit1, false, false);
        manager.process_key(KeyCode::Digit1, true, true);
        manager.process_key(KeyCode::KeyQ, true, false);
        assert!(manager.take_actions().is_empty());
    }

    #[test]
    fn test_custom_mouse_binding() {
        let mut manager = InputManager::from_bindings(vec![(
            InputSource::Mouse(MouseButton::Right),
            PanelAction::CreateBox,
        )]);
        manager.process_mouse_button(MouseButton::Right, ElementState::Pressed);
        assert_eq!(manager.take_actions(), vec![PanelAction::CreateBox]);
    }

    #[test]
    fn test_drag_only_counts_while_button_held() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::from_camera(&camera);
        let mut manager = InputManager::new();

        manager.process_cursor_moved(10.0, 10.0);
        manager.process_cursor_moved(60.0, 10.0);
        manager.apply_orbit(&mut controls, 720.0);
        controls.update(&mut camera);
        let resting = camera.position;

        manager.process_mouse_button(ORBIT_BUTTON, ElementState::Pressed);
        manager.process_cursor_moved(160.0, 10.0);
        manager.process_mouse_button(ORBIT_BUTTON, ElementState::Released);
        manager.apply_orbit(&mut controls, 720.0);
        controls.update(&mut camera);

        assert!((camera.position - resting).length() > 1e-3);
    }

    #[test]
    fn test_scroll_zooms_in() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::from_camera(&camera);
        let start = (camera.position - camera.target).length();
        let mut manager = InputManager::new();

        manager.process_scroll(MouseScrollDelta::LineDelta(0.0, 3.0));
        manager.apply_orbit(&mut controls, 720.0);
        controls.update(&mut camera);

        assert!((camera.position - camera.target).length() < start);
    }
}
