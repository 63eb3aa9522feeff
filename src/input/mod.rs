use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use glam::Vec2;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window};

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Represents a raw input source that can be bound to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Key(KeyCode),
    Mouse(MouseButton),
}

/// The runtime commands the tile-map scene listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Held while drag-scrolling.
    Scroll,
    Screenshot,
    Quit,
}

/// Level of an action this frame plus whether it changed since last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signal {
    pub active: bool,
    pub changed: bool,
}

impl Signal {
    pub fn rising(self) -> bool { self.active && self.changed }
    pub fn falling(self) -> bool { !self.active && self.changed }
}

// ── InputState ────────────────────────────────────────────────────────────────

/// Raw hardware state for a single frame.
#[derive(Debug, Default)]
pub struct InputState {
    pub keys_held: HashSet<KeyCode>,
    pub keys_pressed: HashSet<KeyCode>,
    pub keys_released: HashSet<KeyCode>,

    /// Pointer position in physical window pixels.
    pub mouse_pos: [f32; 2],
    pub mouse_held: HashSet<MouseButton>,
    pub mouse_pressed: HashSet<MouseButton>,
    pub mouse_released: HashSet<MouseButton>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget this frame's edges; call at the end of every frame.
    pub fn clear_frame_state(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_pressed.clear();
        self.mouse_released.clear();
    }

    /// Fold one winit window event into the state.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = [position.x as f32, position.y as f32];
            }
            WindowEvent::MouseInput { button, state, .. } => match state {
                ElementState::Pressed => self.press_mouse(*button),
                ElementState::Released => self.release_mouse(*button),
            },
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, .. },
                ..
            } => match state {
                ElementState::Pressed => self.press_key(*code),
                ElementState::Released => self.release_key(*code),
            },
            WindowEvent::Focused(false) => {
                // Avoid stuck keys/buttons when focus changes mid-press.
                for key in self.keys_held.drain() {
                    self.keys_released.insert(key);
                }
                for button in self.mouse_held.drain() {
                    self.mouse_released.insert(button);
                }
            }
            _ => {}
        }
    }

    pub fn press_key(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        if self.keys_held.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    pub fn press_mouse(&mut self, button: MouseButton) {
        if self.mouse_held.insert(button) {
            self.mouse_pressed.insert(button);
        }
    }

    pub fn release_mouse(&mut self, button: MouseButton) {
        if self.mouse_held.remove(&button) {
            self.mouse_released.insert(button);
        }
    }

    pub fn pointer(&self) -> Vec2 { Vec2::from_array(self.mouse_pos) }

    pub fn is_key_held(&self, key: KeyCode) -> bool { self.keys_held.contains(&key) }
    pub fn is_key_pressed(&self, key: KeyCode) -> bool { self.keys_pressed.contains(&key) }
    pub fn is_key_released(&self, key: KeyCode) -> bool { self.keys_released.contains(&key) }

    pub fn is_mouse_held(&self, button: MouseButton) -> bool { self.mouse_held.contains(&button) }
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool { self.mouse_pressed.contains(&button) }
    pub fn is_mouse_released(&self, button: MouseButton) -> bool { self.mouse_released.contains(&button) }
}

// ── ActionMap ─────────────────────────────────────────────────────────────────

/// Maps logical actions to one or more physical inputs.
#[derive(Debug, Clone)]
pub struct ActionMap<A: Hash + Eq + Copy> {
    bindings: HashMap<A, Vec<InputSource>>,
}

impl<A: Hash + Eq + Copy> ActionMap<A> {
    pub fn new() -> Self {
        Self { bindings: HashMap::new() }
    }

    pub fn bind(&mut self, action: A, source: InputSource) {
        self.bindings.entry(action).or_default().push(source);
    }

    fn any(&self, action: A, test: impl Fn(&InputSource) -> bool) -> bool {
        self.bindings.get(&action).is_some_and(|sources| sources.iter().any(test))
    }

    /// Returns true if the action was triggered this frame (pressed).
    pub fn is_pressed(&self, action: A, input: &InputState) -> bool {
        self.any(action, |s| match s {
            InputSource::Key(k) => input.is_key_pressed(*k),
            InputSource::Mouse(b) => input.is_mouse_pressed(*b),
        })
    }

    /// Returns true if the action is currently being held.
    pub fn is_held(&self, action: A, input: &InputState) -> bool {
        self.any(action, |s| match s {
            InputSource::Key(k) => input.is_key_held(*k),
            InputSource::Mouse(b) => input.is_mouse_held(*b),
        })
    }

    /// Returns true if any bound source was released this frame.
    pub fn is_released(&self, action: A, input: &InputState) -> bool {
        self.any(action, |s| match s {
            InputSource::Key(k) => input.is_key_released(*k),
            InputSource::Mouse(b) => input.is_mouse_released(*b),
        })
    }

    /// Level plus edge flag for `action`.
    pub fn signal(&self, action: A, input: &InputState) -> Signal {
        let active = self.is_held(action, input);
        let changed = if active {
            self.is_pressed(action, input)
        } else {
            self.is_released(action, input)
        };
        Signal { active, changed }
    }
}

impl<A: Hash + Eq + Copy> Default for ActionMap<A> {
    fn default() -> Self { Self::new() }
}

impl ActionMap<Action> {
    /// Left mouse drags, `F12` takes a screenshot, `Escape` quits.
    pub fn with_default_bindings() -> Self {
        let mut map = Self::new();
        map.bind(Action::Scroll, InputSource::Mouse(MouseButton::Left));
        map.bind(Action::Screenshot, InputSource::Key(KeyCode::F12));
        map.bind(Action::Quit, InputSource::Key(KeyCode::Escape));
        map
    }
}

// ── PointerDevice ─────────────────────────────────────────────────────────────

/// The pointer operations drag scrolling needs from the windowing layer.
pub trait PointerDevice {
    /// Capture (or release) the pointer exclusively for this window.
    fn set_grab(&mut self, grab: bool);
    /// Warp the pointer to `pos` in window pixels.
    fn set_position(&mut self, pos: Vec2);
}

/// Implemented on a shared reference so an `Arc<Window>` owner can lend it
/// for the duration of one update.
impl PointerDevice for &Window {
    fn set_grab(&mut self, grab: bool) {
        let result = if grab {
            self.set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| self.set_cursor_grab(CursorGrabMode::Locked))
        } else {
            self.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = result {
            log::warn!("pointer grab ({grab}) not supported: {e}");
        }
        self.set_cursor_visible(!grab);
    }

    fn set_position(&mut self, pos: Vec2) {
        let target = winit::dpi::PhysicalPosition::new(pos.x as f64, pos.y as f64);
        if let Err(e) = self.set_cursor_position(target) {
            log::warn!("pointer warp not supported: {e}");
        }
    }
}

/// Pointer stand-in for headless runs; records what it was asked to do.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NullPointer {
    pub grabbed: bool,
    pub warped_to: Option<Vec2>,
}

impl PointerDevice for NullPointer {
    fn set_grab(&mut self, grab: bool) { self.grabbed = grab; }
    fn set_position(&mut self, pos: Vec2) { self.warped_to = Some(pos); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_reports_edges_and_level() {
        let map = ActionMap::with_default_bindings();
        let mut input = InputState::new();

        input.press_mouse(MouseButton::Left);
        let s = map.signal(Action::Scroll, &input);
        assert!(s.rising());

        input.clear_frame_state();
        let s = map.signal(Action::Scroll, &input);
        assert_eq!(s, Signal { active: true, changed: false });

        input.release_mouse(MouseButton::Left);
        assert!(map.signal(Action::Scroll, &input).falling());

        input.clear_frame_state();
        assert_eq!(map.signal(Action::Scroll, &input), Signal::default());
    }

    #[test]
    fn repeated_press_is_not_a_new_edge() {
        let mut input = InputState::new();
        input.press_key(KeyCode::F12);
        input.clear_frame_state();
        input.press_key(KeyCode::F12);
        assert!(!input.is_key_pressed(KeyCode::F12));
        assert!(input.is_key_held(KeyCode::F12));
    }

    #[test]
    fn unbound_action_is_inactive() {
        let map: ActionMap<Action> = ActionMap::new();
        let mut input = InputState::new();
        input.press_key(KeyCode::Escape);
        assert!(!map.is_held(Action::Quit, &input));
    }
}
