use glam::Vec2;

use crate::input::PointerDevice;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScrollState {
    #[default]
    Idle,
    Dragging,
}

/// Drag-to-scroll with momentum.
///
/// While the scroll input is held, the per-tick pointer delta (scaled to
/// world units) becomes the scroll velocity. The velocity is *not* decayed on
/// release: the offset keeps moving at the last sampled velocity until the
/// next drag starts, which resets it to zero. A quick flick therefore keeps
/// the map gliding.
#[derive(Clone, Debug, Default)]
pub struct ScrollController {
    state: ScrollState,
    /// Pointer position sampled on the previous tick of the drag.
    last_pointer: Vec2,
    /// Pointer position when the drag started.
    anchor: Vec2,
    velocity: Vec2,
    offset: Vec2,
    grab_pointer: bool,
    restore_pointer: bool,
}

impl ScrollController {
    pub fn new(grab_pointer: bool, restore_pointer: bool) -> Self {
        Self { grab_pointer, restore_pointer, ..Self::default() }
    }

    pub fn state(&self) -> ScrollState { self.state }
    pub fn velocity(&self) -> Vec2 { self.velocity }
    /// Accumulated scroll offset in world units.
    pub fn offset(&self) -> Vec2 { self.offset }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Advance one tick.
    ///
    /// `scrolling` is the level of the scroll input, `pointer` the current
    /// pointer position in screen pixels and `ratio` the world-units-per-pixel
    /// scale. Returns the new offset.
    pub fn tick(
        &mut self,
        scrolling: bool,
        pointer: Vec2,
        ratio: Vec2,
        device: &mut dyn PointerDevice,
    ) -> Vec2 {
        match (self.state, scrolling) {
            (ScrollState::Idle, true) => {
                log::debug!("scroll: drag started at {pointer}");
                self.state = ScrollState::Dragging;
                self.velocity = Vec2::ZERO;
                self.anchor = pointer;
                self.last_pointer = pointer;
                if self.grab_pointer {
                    device.set_grab(true);
                }
            }
            (ScrollState::Dragging, true) => {
                self.velocity = (self.last_pointer - pointer) * ratio;
                self.last_pointer = pointer;
            }
            (ScrollState::Dragging, false) => {
                self.velocity = (self.last_pointer - pointer) * ratio;
                self.state = ScrollState::Idle;
                if self.grab_pointer {
                    device.set_grab(false);
                }
                if self.restore_pointer {
                    device.set_position(self.anchor);
                }
                log::debug!("scroll: drag released with velocity {}", self.velocity);
            }
            (ScrollState::Idle, false) => {}
        }

        self.offset += self.velocity;
        self.offset
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::NullPointer;

    fn v(x: f32, y: f32) -> Vec2 { Vec2::new(x, y) }

    #[test]
    fn idle_without_input_stays_put() {
        let mut s = ScrollController::new(true, true);
        let mut p = NullPointer::default();
        for _ in 0..5 {
            assert_eq!(s.tick(false, v(10.0, 10.0), Vec2::ONE, &mut p), Vec2::ZERO);
        }
        assert_eq!(s.state(), ScrollState::Idle);
    }

    #[test]
    fn drag_moves_opposite_to_pointer() {
        let mut s = ScrollController::new(false, false);
        let mut p = NullPointer::default();
        s.tick(true, v(100.0, 100.0), Vec2::ONE, &mut p);
        assert_eq!(s.velocity(), Vec2::ZERO);
        let off = s.tick(true, v(90.0, 105.0), Vec2::ONE, &mut p);
        assert_eq!(s.velocity(), v(10.0, -5.0));
        assert_eq!(off, v(10.0, -5.0));
    }

    #[test]
    fn ratio_scales_velocity() {
        let mut s = ScrollController::new(false, false);
        let mut p = NullPointer::default();
        s.tick(true, v(0.0, 0.0), v(0.5, 2.0), &mut p);
        s.tick(true, v(-4.0, -4.0), v(0.5, 2.0), &mut p);
        assert_eq!(s.velocity(), v(2.0, 8.0));
    }

    #[test]
    fn flick_keeps_gliding_at_last_velocity() {
        let mut s = ScrollController::new(false, false);
        let mut p = NullPointer::default();
        s.tick(true, v(50.0, 50.0), Vec2::ONE, &mut p);
        s.tick(true, v(45.0, 50.0), Vec2::ONE, &mut p);
        // Release samples one final delta.
        let released = s.tick(false, v(42.0, 49.0), Vec2::ONE, &mut p);
        let vel = s.velocity();
        assert_eq!(vel, v(3.0, 1.0));

        let mut prev = released;
        for _ in 0..10 {
            let next = s.tick(false, v(0.0, 0.0), Vec2::ONE, &mut p);
            assert_eq!(next - prev, vel);
            prev = next;
        }
    }

    #[test]
    fn new_drag_resets_velocity() {
        let mut s = ScrollController::new(false, false);
        let mut p = NullPointer::default();
        s.tick(true, v(10.0, 0.0), Vec2::ONE, &mut p);
        s.tick(true, v(0.0, 0.0), Vec2::ONE, &mut p);
        s.tick(false, v(0.0, 0.0), Vec2::ONE, &mut p);
        let before = s.offset();

        s.tick(true, v(300.0, 300.0), Vec2::ONE, &mut p);
        assert_eq!(s.velocity(), Vec2::ZERO);
        assert_eq!(s.offset(), before);
        assert_eq!(s.state(), ScrollState::Dragging);
    }

    #[test]
    fn pointer_is_grabbed_and_restored() {
        let mut s = ScrollController::new(true, true);
        let mut p = NullPointer::default();
        s.tick(true, v(20.0, 30.0), Vec2::ONE, &mut p);
        assert!(p.grabbed);
        s.tick(true, v(25.0, 35.0), Vec2::ONE, &mut p);
        s.tick(false, v(40.0, 60.0), Vec2::ONE, &mut p);
        assert!(!p.grabbed);
        assert_eq!(p.warped_to, Some(v(20.0, 30.0)));
    }

    #[test]
    fn pointer_untouched_when_disabled() {
        let mut s = ScrollController::new(false, false);
        let mut p = NullPointer::default();
        s.tick(true, v(1.0, 1.0), Vec2::ONE, &mut p);
        s.tick(false, v(2.0, 2.0), Vec2::ONE, &mut p);
        assert_eq!(p, NullPointer::default());
    }
}
