// ── Camera aspect correction ──────────────────────────────────────────────────
//
// The camera is displayed letterboxed/pillarboxed inside the screen. For drag
// scrolling the visible world extent matters, not the nominal camera size:
// when the aspect ratios differ the camera is stretched along the axis with
// the bars so that one screen pixel covers the same world distance on both
// axes.

use glam::Vec2;

/// Sizes the map decoder and the scroll controller work with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewMetrics {
    /// Camera size in world units after aspect correction.
    pub camera_size: Vec2,
    /// Screen size in pixels.
    pub resolution: Vec2,
}

impl ViewMetrics {
    /// Metrics for a `camera` frustum shown on a `screen` of pixels.
    pub fn new(camera: Vec2, screen: Vec2) -> Self {
        Self { camera_size: corrected_camera_size(camera, screen), resolution: screen }
    }

    /// World units per screen pixel on each axis; `Vec2::ONE` when
    /// `enabled` is false or the screen has no area.
    pub fn scroll_ratio(&self, enabled: bool) -> Vec2 {
        if !enabled || self.resolution.x <= 0.0 || self.resolution.y <= 0.0 {
            return Vec2::ONE;
        }
        self.camera_size / self.resolution
    }
}

/// Correction ratio between camera and screen aspect:
/// ```text
/// ratio = (camera_w / camera_h) / (screen_w / screen_h)
/// ```
/// Returns `1.0` when any dimension is zero.
pub fn correction_ratio(camera: Vec2, screen: Vec2) -> f32 {
    if camera.x <= 0.0 || camera.y <= 0.0 || screen.x <= 0.0 || screen.y <= 0.0 {
        return 1.0;
    }
    (camera.x / camera.y) / (screen.x / screen.y)
}

/// Extend `camera` along the letterboxed axis so its aspect matches `screen`.
///
/// A wider camera (`ratio >= 1`) gains height; a narrower one gains width.
pub fn corrected_camera_size(camera: Vec2, screen: Vec2) -> Vec2 {
    let ratio = correction_ratio(camera, screen);
    if ratio >= 1.0 {
        Vec2::new(camera.x, camera.y * ratio)
    } else {
        Vec2::new(camera.x / ratio, camera.y)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
