//! Map packing: a grid of tile names → a padded buffer of 16-bit indices.
//!
//! Wire layout (consumed by the render-time decoder):
//! ```text
//! row 0: [hi lo][hi lo] [hi lo][hi lo] ... [hi lo][00 00]   <- odd width: one pad slot
//! row 1: ...
//! ```
//! Each index is big-endian; two indices form one 4-byte unit, which is one
//! RGBA8 texel of the index texture. Rows are padded to a whole unit, so the
//! texture is `ceil(width / 2) × height` texels.

use std::collections::HashSet;

use glam::UVec2;

use crate::config::MissingTilePolicy;
use crate::content::Content;
use crate::error::{Result, TilemapError};
use crate::params::MapParams;
use crate::renderer::TextureSink;
use crate::tileset::{TileSet, EMPTY_TILE};
use crate::viewport::ViewMetrics;

/// Field holding the map size in tiles.
pub const SIZE_KEY: &str = "Size";
/// Indices carried by one packing unit.
pub const INDICES_PER_UNIT: u32 = 2;
/// Bytes per packing unit (one RGBA8 texel).
pub const BYTES_PER_UNIT: usize = 4;

/// Field name of row `row` (0-based): `Row1`, `Row2`, ...
pub fn row_key(row: u32) -> String {
    format!("Row{}", row + 1)
}

/// Packing units needed for one row of `width` tiles.
pub fn units_per_row(width: u32) -> u32 {
    width.div_ceil(INDICES_PER_UNIT)
}

/// Row width in index slots, padding included.
pub fn padded_width(width: u32) -> u64 {
    units_per_row(width) as u64 * INDICES_PER_UNIT as u64
}

/// Bytes held by `texels` packing units, or `None` if that overflows `usize`.
pub fn texel_bytes(texels: UVec2) -> Option<usize> {
    (texels.x as usize)
        .checked_mul(texels.y as usize)?
        .checked_mul(BYTES_PER_UNIT)
}

/// Total packed byte length of a `size` map, or `None` if it overflows.
pub fn packed_len(size: UVec2) -> Option<usize> {
    texel_bytes(UVec2::new(units_per_row(size.x), size.y))
}

// ── PackedMap ─────────────────────────────────────────────────────────────────

/// A map encoded into its wire layout.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedMap {
    name: String,
    size: UVec2,
    bytes: Vec<u8>,
    /// Cells written as `EMPTY_TILE` because their name was not in the set.
    unresolved: usize,
}

impl PackedMap {
    pub fn name(&self) -> &str { &self.name }
    /// Declared size in tiles.
    pub fn size(&self) -> UVec2 { self.size }
    pub fn bytes(&self) -> &[u8] { &self.bytes }
    pub fn into_bytes(self) -> Vec<u8> { self.bytes }
    pub fn unresolved(&self) -> usize { self.unresolved }

    /// Texel size of the index texture: `(ceil(width / 2), height)`.
    pub fn texture_size(&self) -> UVec2 {
        UVec2::new(units_per_row(self.size.x), self.size.y)
    }

    /// Index stored for cell `(x, y)`.
    pub fn index_at(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        let row_bytes = units_per_row(self.size.x) as usize * BYTES_PER_UNIT;
        let at = y as usize * row_bytes + x as usize * 2;
        Some(u16::from_be_bytes([self.bytes[at], self.bytes[at + 1]]))
    }

    /// Decode the whole grid back into row-major indices (padding dropped).
    pub fn decode(&self) -> Vec<u16> {
        unpack_grid(self.size, &self.bytes)
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Serialize a row-major grid of `size.x * size.y` indices.
pub fn pack_grid(size: UVec2, indices: &[u16]) -> Result<Vec<u8>> {
    debug_assert_eq!(indices.len(), size.x as usize * size.y as usize);

    let len = packed_len(size)
        .ok_or(TilemapError::Allocation { what: "packed map buffer", bytes: usize::MAX })?;
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| TilemapError::Allocation { what: "packed map buffer", bytes: len })?;

    let pad = (size.x % INDICES_PER_UNIT) as usize;
    if size.x > 0 {
        for row in indices.chunks(size.x as usize) {
            for &index in row {
                bytes.extend_from_slice(&index.to_be_bytes());
            }
            bytes.extend(std::iter::repeat_n(0u8, pad * 2));
        }
    }
    debug_assert_eq!(bytes.len(), len);
    Ok(bytes)
}

/// Inverse of [`pack_grid`].
pub fn unpack_grid(size: UVec2, bytes: &[u8]) -> Vec<u16> {
    let row_bytes = units_per_row(size.x) as usize * BYTES_PER_UNIT;
    if row_bytes == 0 {
        return Vec::new();
    }
    bytes
        .chunks(row_bytes)
        .take(size.y as usize)
        .flat_map(|row| {
            row.chunks_exact(2)
                .take(size.x as usize)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        })
        .collect()
}

/// Read the declared size of map `map` in whole tiles.
pub fn map_size(content: &Content, map: &str) -> Result<UVec2> {
    let size = content.vector(map, SIZE_KEY)?.truncate();
    if !size.is_finite() || size.x < 0.0 || size.y < 0.0 {
        return Err(TilemapError::InvalidField {
            section: map.to_string(),
            field: SIZE_KEY.to_string(),
            expected: "non-negative size",
        });
    }
    Ok(size.as_uvec2())
}

/// Resolve every cell of `map` against `tiles` and pack the result.
///
/// Names the set does not declare become `EMPTY_TILE` (logged once per
/// name). Rows shorter than the map width are handled per `policy`; extra
/// entries beyond the width are ignored.
pub fn encode_map(
    content: &Content,
    map: &str,
    tiles: &TileSet,
    policy: MissingTilePolicy,
) -> Result<PackedMap> {
    let size = map_size(content, map)?;
    let width = size.x as usize;

    let cells = width.checked_mul(size.y as usize);
    let grid_bytes = cells.and_then(|n| n.checked_mul(2)).unwrap_or(usize::MAX);
    let mut grid = Vec::new();
    grid.try_reserve_exact(cells.unwrap_or(usize::MAX))
        .map_err(|_| TilemapError::Allocation { what: "map index grid", bytes: grid_bytes })?;

    let mut unresolved = 0;
    let mut warned: HashSet<&str> = HashSet::new();

    for y in 0..size.y {
        let key = row_key(y);
        let names = match content.field(map, &key)? {
            Some(_) => content.list(map, &key)?,
            None => Vec::new(),
        };

        if names.len() < width {
            match policy {
                MissingTilePolicy::Fail => {
                    return Err(TilemapError::MissingTile {
                        map: map.to_string(),
                        row: y + 1,
                        found: names.len(),
                        expected: size.x,
                    });
                }
                MissingTilePolicy::Empty => log::warn!(
                    "map '{map}': {key} declares {} of {width} tiles; filling with empty",
                    names.len()
                ),
            }
        } else if names.len() > width {
            log::debug!("map '{map}': {key} has {} extra entries", names.len() - width);
        }

        for x in 0..width {
            let index = match names.get(x) {
                Some(&name) => tiles.index_of(name).unwrap_or_else(|| {
                    unresolved += 1;
                    if warned.insert(name) {
                        log::warn!("map '{map}': tile '{name}' is not in set '{}'", tiles.name());
                    }
                    EMPTY_TILE
                }),
                None => EMPTY_TILE,
            };
            grid.push(index);
        }
    }

    let bytes = pack_grid(size, &grid)?;
    Ok(PackedMap { name: map.to_string(), size, bytes, unresolved })
}

// ── LoadedMap ─────────────────────────────────────────────────────────────────

/// A map after upload: the long-lived index texture plus the parameter set
/// its decoder instance reads.
#[derive(Debug)]
pub struct LoadedMap<T> {
    pub name: String,
    pub size: UVec2,
    pub texture: T,
    pub params: MapParams,
}

/// Encode `map`, copy it into a fresh texture from `sink`, and publish the
/// static decoder parameters. The packed buffer is dropped before returning.
pub fn load_map<S: TextureSink>(
    content: &Content,
    map: &str,
    tiles: &TileSet,
    policy: MissingTilePolicy,
    sink: &mut S,
    view: &ViewMetrics,
) -> Result<LoadedMap<S::Texture>> {
    let packed = encode_map(content, map, tiles, policy)?;
    let size = packed.size();
    let texels = packed.texture_size();

    let texture = sink.upload_indices(map, texels, packed.bytes())?;
    log::info!(
        "map '{map}': {}x{} tiles packed into {}x{} texels ({} bytes, {} unresolved)",
        size.x, size.y, texels.x, texels.y, packed.bytes().len(), packed.unresolved()
    );
    drop(packed);

    let params = MapParams::new(tiles, size, view);
    Ok(LoadedMap { name: map.to_string(), size, texture, params })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_len_pads_each_row() {
        assert_eq!(packed_len(UVec2::new(3, 2)), Some(16));
        assert_eq!(packed_len(UVec2::new(4, 2)), Some(16));
        assert_eq!(packed_len(UVec2::new(1, 1)), Some(4));
        assert_eq!(packed_len(UVec2::new(0, 5)), Some(0));
    }

    #[test]
    fn extreme_widths_do_not_overflow() {
        assert_eq!(padded_width(u32::MAX), u32::MAX as u64 + 1);
        assert_eq!(packed_len(UVec2::new(u32::MAX, 0)), Some(0));
        assert_eq!(texel_bytes(UVec2::new(u32::MAX, u32::MAX)), None);
    }

    #[test]
    fn odd_width_example_layout() {
        let bytes = pack_grid(UVec2::new(3, 2), &[0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(
            bytes,
            vec![0, 0, 0, 1, 0, 2, 0, 0, 0, 3, 0, 4, 0, 5, 0, 0]
        );
    }

    #[test]
    fn indices_are_big_endian() {
        let bytes = pack_grid(UVec2::new(2, 1), &[0x1234, EMPTY_TILE]).unwrap();
        assert_eq!(bytes, vec![0x12, 0x34, 0xFF, 0xFF]);
    }

    #[test]
    fn unpack_inverts_pack() {
        let size = UVec2::new(5, 3);
        let grid: Vec<u16> = (0..15).map(|i| i * 7).collect();
        let bytes = pack_grid(size, &grid).unwrap();
        assert_eq!(unpack_grid(size, &bytes), grid);
    }

    #[test]
    fn row_keys_are_one_based() {
        assert_eq!(row_key(0), "Row1");
        assert_eq!(row_key(9), "Row10");
    }
}
