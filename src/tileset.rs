use std::collections::HashMap;
use std::sync::Arc;

use glam::{UVec2, Vec2};

use crate::content::Content;
use crate::error::{Result, TilemapError};
use crate::renderer::atlas::{AtlasImage, AtlasLoader};

/// Index written for a map cell that names no tile of the set.
///
/// Atlas indices are 0-based (`col + grid_w * row`); the top of the 16-bit
/// range is reserved, so a set may address at most `MAX_TILES` cells.
pub const EMPTY_TILE: u16 = u16::MAX;

/// Number of addressable atlas cells (indices `0..MAX_TILES`).
pub const MAX_TILES: u32 = EMPTY_TILE as u32;

/// Field holding the atlas image path of a tile set.
pub const TEXTURE_KEY: &str = "Texture";
/// Field holding the pixel size of one tile.
pub const TILE_SIZE_KEY: &str = "TextureSize";
/// Field holding a tile's pixel origin inside the atlas.
pub const TILE_ORIGIN_KEY: &str = "TextureOrigin";

// ── TileKey ───────────────────────────────────────────────────────────────────

/// 64-bit content fingerprint of a tile name (FNV-1a).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileKey(pub u64);

impl TileKey {
    pub fn of(name: &str) -> Self {
        Self(fnv1a_64(name.as_bytes()))
    }
}

fn fnv1a_64(data: &[u8]) -> u64 {
    data.iter().fold(0xcbf2_9ce4_8422_2325_u64, |h, &b| {
        (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

// ── TileTables ────────────────────────────────────────────────────────────────

/// The two lookup directions, kept consistent by `insert`.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TileTables {
    by_key: HashMap<TileKey, u16>,
    by_index: HashMap<u16, String>,
}

impl TileTables {
    fn with_capacity(n: usize) -> Self {
        Self { by_key: HashMap::with_capacity(n), by_index: HashMap::with_capacity(n) }
    }

    /// Register `name` at `index` under `key`. Never overwrites: a key that
    /// already belongs to another name, or a cell that already belongs to
    /// another tile, is an integrity error.
    pub(crate) fn insert(&mut self, set: &str, key: TileKey, name: &str, index: u16) -> Result<()> {
        if let Some(&existing) = self.by_key.get(&key) {
            let first = self.by_index.get(&existing).cloned().unwrap_or_default();
            return Err(TilemapError::NameCollision {
                set: set.to_string(),
                first,
                second: name.to_string(),
                key: key.0,
            });
        }
        if let Some(first) = self.by_index.get(&index) {
            return Err(TilemapError::SharedCell {
                set: set.to_string(),
                first: first.clone(),
                second: name.to_string(),
                index,
            });
        }
        self.by_key.insert(key, index);
        self.by_index.insert(index, name.to_string());
        Ok(())
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<u16> {
        let &index = self.by_key.get(&TileKey::of(name))?;
        // A foreign name can share a key with a registered one; only accept
        // the index when the stored name matches.
        (self.by_index.get(&index).map(String::as_str) == Some(name)).then_some(index)
    }

    fn len(&self) -> usize { self.by_key.len() }
}

// ── TileSet ───────────────────────────────────────────────────────────────────

/// Bidirectional tile name ↔ atlas index lookup for one atlas.
///
/// Built once from content; immutable afterwards.
#[derive(Debug)]
pub struct TileSet {
    name: String,
    /// Atlas size in whole tiles (partial trailing rows/columns dropped).
    grid: UVec2,
    /// Pixel size of one tile.
    tile_size: Vec2,
    atlas: Arc<AtlasImage>,
    tables: TileTables,
}

impl TileSet {
    /// Build the tile set declared by section `set`.
    ///
    /// Loads the atlas named by its `Texture` field, derives the grid from
    /// `TextureSize`, and indexes every direct child section by its rounded
    /// `TextureOrigin` cell. Tiles whose cell falls outside the truncated grid
    /// are skipped with a warning.
    pub fn build(content: &Content, loader: &mut dyn AtlasLoader, set: &str) -> Result<Self> {
        content.section(set)?;

        let texture = content.string(set, TEXTURE_KEY)?;
        let atlas = loader.load_atlas(texture)?;

        let tile_size = content.vector(set, TILE_SIZE_KEY)?.truncate();
        if !(tile_size.x > 0.0 && tile_size.y > 0.0) || !tile_size.is_finite() {
            return Err(TilemapError::InvalidTileSize {
                set: set.to_string(),
                width: tile_size.x,
                height: tile_size.y,
            });
        }

        let grid = grid_size(atlas.size(), tile_size);
        let cells = grid.x as u64 * grid.y as u64;
        if cells > MAX_TILES as u64 {
            return Err(TilemapError::AtlasTooLarge {
                set: set.to_string(),
                cells: cells.min(u32::MAX as u64) as u32,
                max: MAX_TILES,
            });
        }

        let mut tables = TileTables::with_capacity(cells as usize);
        for tile in content.children(set) {
            let origin = content.vector(tile.name(), TILE_ORIGIN_KEY)?.truncate();
            let Some(index) = tile_index(origin, tile_size, grid) else {
                log::warn!(
                    "tileset '{set}': tile '{}' at origin {origin} lies outside the {}x{} grid; skipping",
                    tile.name(), grid.x, grid.y
                );
                continue;
            };
            log::debug!("tileset '{set}': '{}' -> {index}", tile.name());
            tables.insert(set, TileKey::of(tile.name()), tile.name(), index)?;
        }

        log::info!(
            "tileset '{set}': {} tiles indexed on a {}x{} grid ({}x{} px tiles)",
            tables.len(), grid.x, grid.y, tile_size.x, tile_size.y
        );

        Ok(Self { name: set.to_string(), grid, tile_size, atlas, tables })
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn name(&self) -> &str { &self.name }
    pub fn grid(&self) -> UVec2 { self.grid }
    pub fn tile_size(&self) -> Vec2 { self.tile_size }
    pub fn atlas(&self) -> &Arc<AtlasImage> { &self.atlas }

    /// Number of indexed tiles.
    pub fn len(&self) -> usize { self.tables.len() }
    pub fn is_empty(&self) -> bool { self.tables.len() == 0 }

    /// Atlas index of `name`, or `None` when the set declares no such tile.
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.tables.index_of(name)
    }

    /// Atlas index of `name`, or `EMPTY_TILE`.
    pub fn resolve(&self, name: &str) -> u16 {
        self.index_of(name).unwrap_or(EMPTY_TILE)
    }

    /// Name of the tile declared at `index`.
    pub fn name_of(&self, index: u16) -> Option<&str> {
        self.tables.by_index.get(&index).map(String::as_str)
    }

    /// All `(name, index)` pairs, sorted by index.
    pub fn tiles(&self) -> Vec<(&str, u16)> {
        let mut out: Vec<_> = self.tables.by_index.iter().map(|(&i, n)| (n.as_str(), i)).collect();
        out.sort_by_key(|&(_, i)| i);
        out
    }

    /// Grid cell `(col, row)` addressed by `index`.
    pub fn cell_of(&self, index: u16) -> UVec2 {
        let cols = self.grid.x.max(1);
        UVec2::new(index as u32 % cols, index as u32 / cols)
    }

    /// Returns (uv_min, uv_max) of the cell at `index`, relative to the full
    /// atlas image (a truncated remainder stays outside every cell).
    pub fn uv_for_index(&self, index: u16) -> ([f32; 2], [f32; 2]) {
        let cell = self.cell_of(index).as_vec2();
        let (w, h) = self.atlas.size();
        let total = Vec2::new(w as f32, h as f32);
        let min = cell * self.tile_size / total;
        let max = (cell + Vec2::ONE) * self.tile_size / total;
        (min.to_array(), max.to_array())
    }
}

/// Whole tiles that fit in an atlas of `atlas_px` pixels.
pub fn grid_size(atlas_px: (u32, u32), tile_size: Vec2) -> UVec2 {
    let cols = (atlas_px.0 as f32 / tile_size.x).floor();
    let rows = (atlas_px.1 as f32 / tile_size.y).floor();
    UVec2::new(cols as u32, rows as u32)
}

/// Linear index of the cell containing pixel `origin`, rounded to the
/// nearest cell, or `None` outside the grid.
pub fn tile_index(origin: Vec2, tile_size: Vec2, grid: UVec2) -> Option<u16> {
    let cell = (origin / tile_size).round();
    if cell.x < 0.0 || cell.y < 0.0 || cell.x >= grid.x as f32 || cell.y >= grid.y as f32 {
        return None;
    }
    let index = cell.x as u32 + grid.x * cell.y as u32;
    u16::try_from(index).ok().filter(|&i| i != EMPTY_TILE)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
