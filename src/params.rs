//! The named parameter set shared with the render-time map decoder.
//!
//! Names, order, and units are a contract with the decoder shader:
//!
//! | name         | value                                              |
//! |--------------|----------------------------------------------------|
//! | `SetSize`    | atlas grid in tiles                                |
//! | `TileSize`   | tile size in pixels (`z = 1`)                      |
//! | `MapSize`    | map size in tiles (`z` = width padded to 2)        |
//! | `CameraSize` | corrected camera size in world units               |
//! | `Resolution` | screen size in pixels                              |
//! | `CameraPos`  | accumulated scroll offset (per frame)              |
//! | `Highlight`  | pointer position in screen pixels (per frame)      |

use glam::{UVec2, Vec3};

use crate::map::padded_width;
use crate::tileset::TileSet;
use crate::viewport::ViewMetrics;

pub const SET_SIZE: &str = "SetSize";
pub const TILE_SIZE: &str = "TileSize";
pub const MAP_SIZE: &str = "MapSize";
pub const CAMERA_SIZE: &str = "CameraSize";
pub const RESOLUTION: &str = "Resolution";
pub const CAMERA_POS: &str = "CameraPos";
pub const HIGHLIGHT: &str = "Highlight";

/// Anything that accepts named vector parameters, typically one live
/// decoder instance.
pub trait ParamConsumer {
    /// Set parameter `name`. Returns `false` if the consumer has no such
    /// parameter.
    fn set_vector(&mut self, name: &str, value: Vec3) -> bool;
}

// ── MapParams ─────────────────────────────────────────────────────────────────

/// CPU-side copy of one decoder instance's parameters.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MapParams {
    pub set_size: Vec3,
    pub tile_size: Vec3,
    pub map_size: Vec3,
    pub camera_size: Vec3,
    pub resolution: Vec3,
    pub camera_pos: Vec3,
    pub highlight: Vec3,
}

impl MapParams {
    /// Static parameters for a `map_size` map drawn from `tiles`.
    /// `CameraPos` and `Highlight` start at zero.
    pub fn new(tiles: &TileSet, map_size: UVec2, view: &ViewMetrics) -> Self {
        let padded = padded_width(map_size.x);
        Self {
            set_size: tiles.grid().as_vec2().extend(0.0),
            tile_size: tiles.tile_size().extend(1.0),
            map_size: Vec3::new(map_size.x as f32, map_size.y as f32, padded as f32),
            camera_size: view.camera_size.extend(0.0),
            resolution: view.resolution.extend(0.0),
            camera_pos: Vec3::ZERO,
            highlight: Vec3::ZERO,
        }
    }

    /// Every parameter with its contract name, in table order.
    pub fn named(&self) -> [(&'static str, Vec3); 7] {
        [
            (SET_SIZE, self.set_size),
            (TILE_SIZE, self.tile_size),
            (MAP_SIZE, self.map_size),
            (CAMERA_SIZE, self.camera_size),
            (RESOLUTION, self.resolution),
            (CAMERA_POS, self.camera_pos),
            (HIGHLIGHT, self.highlight),
        ]
    }

    pub fn get(&self, name: &str) -> Option<Vec3> {
        self.named().into_iter().find(|&(n, _)| n == name).map(|(_, v)| v)
    }
}

impl ParamConsumer for MapParams {
    fn set_vector(&mut self, name: &str, value: Vec3) -> bool {
        let slot = match name {
            SET_SIZE => &mut self.set_size,
            TILE_SIZE => &mut self.tile_size,
            MAP_SIZE => &mut self.map_size,
            CAMERA_SIZE => &mut self.camera_size,
            RESOLUTION => &mut self.resolution,
            CAMERA_POS => &mut self.camera_pos,
            HIGHLIGHT => &mut self.highlight,
            _ => return false,
        };
        *slot = value;
        true
    }
}

// ── MapUniform ────────────────────────────────────────────────────────────────

/// GPU layout of [`MapParams`]: seven `vec4<f32>` in table order (`w` unused),
/// matching a WGSL uniform struct of `vec4` fields.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MapUniform {
    pub set_size: [f32; 4],
    pub tile_size: [f32; 4],
    pub map_size: [f32; 4],
    pub camera_size: [f32; 4],
    pub resolution: [f32; 4],
    pub camera_pos: [f32; 4],
    pub highlight: [f32; 4],
}

impl From<&MapParams> for MapUniform {
    fn from(p: &MapParams) -> Self {
        let v = |v: Vec3| v.extend(0.0).to_array();
        Self {
            set_size: v(p.set_size),
            tile_size: v(p.tile_size),
            map_size: v(p.map_size),
            camera_size: v(p.camera_size),
            resolution: v(p.resolution),
            camera_pos: v(p.camera_pos),
            highlight: v(p.highlight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_vector_accepts_only_contract_names() {
        let mut p = MapParams::default();
        assert!(p.set_vector(CAMERA_POS, Vec3::new(1.0, 2.0, 0.0)));
        assert!(!p.set_vector("CameraPosition", Vec3::ONE));
        assert_eq!(p.get(CAMERA_POS), Some(Vec3::new(1.0, 2.0, 0.0)));
        assert_eq!(p.get("Nope"), None);
    }

    #[test]
    fn uniform_is_seven_vec4s() {
        assert_eq!(std::mem::size_of::<MapUniform>(), 7 * 16);
        let mut p = MapParams::default();
        p.highlight = Vec3::new(5.0, 6.0, 7.0);
        let u = MapUniform::from(&p);
        assert_eq!(u.highlight, [5.0, 6.0, 7.0, 0.0]);
        let raw: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&u));
        assert_eq!(&raw[24..28], &[5.0, 6.0, 7.0, 0.0]);
    }
}
