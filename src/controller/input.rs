//! Platform-agnostic directional input tracking
use std::collections::HashSet;

/// Logical movement/rotation keys the camera understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Back,
    Left,
    Right,
    YawLeft,
    YawRight,
}

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseClick { button: MouseButton, is_down: bool },
    MouseWheel { delta_y: f32 },
    FocusLost,
    VisibilityChanged { visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// Pointer motion gathered between two frames. `dx`/`dy` only count while the
/// primary button is held; `wheel` counts notches, positive when scrolling down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDelta {
    pub dx: f32,
    pub dy: f32,
    pub wheel: f32,
}

/// Set of currently held logical keys (pure membership, no ordering) plus
/// the pointer drag and wheel accumulated since the last frame.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pressed: HashSet<MoveKey>,
    dragging: bool,
    pointer: PointerDelta,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: MoveKey) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: MoveKey) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: MoveKey) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    pub fn pressed(&self) -> impl Iterator<Item = MoveKey> + '_ {
        self.pressed.iter().copied()
    }

    pub fn clear_keys(&mut self) {
        self.pressed.clear();
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Hand over the pointer motion gathered so far and start a new frame.
    pub fn take_pointer_delta(&mut self) -> PointerDelta {
        std::mem::take(&mut self.pointer)
    }

    /// Apply an event. Returns `false` when a key event names a key with no
    /// binding, or a click uses a button other than the primary one; the state
    /// is left untouched in that case.
    pub fn process_event(&mut self, event: &InputEvent, bindings: &KeyBindings) -> bool {
        match event {
            InputEvent::KeyDown(raw) => match bindings.resolve(raw) {
                Some(key) => {
                    self.press(key);
                    true
                }
                None => false,
            },
            InputEvent::KeyUp(raw) => match bindings.resolve(raw) {
                Some(key) => {
                    self.release(key);
                    true
                }
                None => false,
            },
            InputEvent::MouseMove { dx, dy } => {
                if self.dragging {
                    self.pointer.dx += dx;
                    self.pointer.dy += dy;
                }
                true
            }
            InputEvent::MouseClick { button: MouseButton::Left, is_down } => {
                self.dragging = *is_down;
                true
            }
            InputEvent::MouseClick { .. } => false,
            InputEvent::MouseWheel { delta_y } => {
                // Browsers disagree on wheel units, so only the direction counts
                if *delta_y > 0.0 {
                    self.pointer.wheel += 1.0;
                } else if *delta_y < 0.0 {
                    self.pointer.wheel -= 1.0;
                }
                true
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear_keys();
                self.dragging = false;
                self.pointer = PointerDelta::default();
                true
            }
        }
    }
}

/// Key mapping configuration, raw DOM key names to logical keys
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub back: String,
    pub left: String,
    pub right: String,
    pub yaw_left: String,
    pub yaw_right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            back: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            yaw_left: "q".to_string(),
            yaw_right: "e".to_string(),
        }
    }
}

impl KeyBindings {
    /// Map a raw key identifier to a logical key. Letters match either case and
    /// the arrow keys alias the four movement directions.
    pub fn resolve(&self, raw: &str) -> Option<MoveKey> {
        let bound = [
            (&self.forward, MoveKey::Forward),
            (&self.back, MoveKey::Back),
            (&self.left, MoveKey::Left),
            (&self.right, MoveKey::Right),
            (&self.yaw_left, MoveKey::YawLeft),
            (&self.yaw_right, MoveKey::YawRight),
        ];
        if let Some((_, key)) = bound.iter().find(|(name, _)| raw.eq_ignore_ascii_case(name)) {
            return Some(*key);
        }
        match raw {
            "ArrowUp" => Some(MoveKey::Forward),
            "ArrowDown" => Some(MoveKey::Back),
            "ArrowLeft" => Some(MoveKey::Left),
            "ArrowRight" => Some(MoveKey::Right),
            _ => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{Event, KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }

    pub fn mouse_click_to_input(e: &MouseEvent, is_down: bool) -> InputEvent {
        InputEvent::MouseClick {
            button: MouseButton::from_web_button(e.button()),
            is_down,
        }
    }

    /// `wheel` arrives as a plain `Event`; read `deltaY` off the JS object.
    pub fn mouse_wheel_to_input(e: &Event) -> Option<InputEvent> {
        let js_val: &wasm_bindgen::JsValue = e.as_ref();
        js_sys::Reflect::get(js_val, &wasm_bindgen::JsValue::from_str("deltaY"))
            .ok()
            .and_then(|delta_y| delta_y.as_f64())
            .map(|dy| InputEvent::MouseWheel { delta_y: dy as f32 })
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use winit::event::{ElementState, KeyEvent, MouseScrollDelta};
    use winit::keyboard::{KeyCode, PhysicalKey};

    /// Name a physical key the way the DOM `key` field would for an unmodified
    /// US layout, so one set of bindings serves both hosts. Letters become
    /// lowercase (`KeyZ` -> `z`); arrows already share the DOM name.
    pub fn key_name(code: KeyCode) -> String {
        let name = format!("{code:?}");
        match name.strip_prefix("Key") {
            Some(letter) if letter.len() == 1 => letter.to_ascii_lowercase(),
            _ => name,
        }
    }

    pub fn key_event_to_input(event: &KeyEvent) -> Option<InputEvent> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        let name = key_name(code);
        Some(match event.state {
            ElementState::Pressed => InputEvent::KeyDown(name),
            ElementState::Released => InputEvent::KeyUp(name),
        })
    }

    pub fn mouse_button_to_input(state: ElementState, button: winit::event::MouseButton) -> Option<InputEvent> {
        let button = match button {
            winit::event::MouseButton::Left => MouseButton::Left,
            winit::event::MouseButton::Middle => MouseButton::Middle,
            winit::event::MouseButton::Right => MouseButton::Right,
            _ => return None,
        };
        Some(InputEvent::MouseClick { button, is_down: state.is_pressed() })
    }

    /// winit reports scrolling up as positive, the DOM as negative `deltaY`.
    pub fn wheel_to_input(delta: &MouseScrollDelta) -> InputEvent {
        let delta_y = match delta {
            MouseScrollDelta::LineDelta(_, y) => -*y,
            MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
        };
        InputEvent::MouseWheel { delta_y }
    }
}
