use std::path::PathBuf;

use thiserror::Error;

/// Every failure the tile-set builder and map packer can report.
///
/// All variants except `MissingTile` (under `MissingTilePolicy::Fail`) are
/// raised while building static content at startup and abort the scene.
/// Unresolved tile names are not errors: they degrade to `EMPTY_TILE` and are
/// logged as warnings.
#[derive(Debug, Error)]
pub enum TilemapError {
    #[error("failed to load atlas image '{path}': {reason}")]
    AtlasLoad { path: String, reason: String },

    #[error("failed to allocate {what} ({bytes} bytes)")]
    Allocation { what: &'static str, bytes: usize },

    #[error("tile names '{first}' and '{second}' share the key {key:#018x} in set '{set}'")]
    NameCollision { set: String, first: String, second: String, key: u64 },

    #[error("tiles '{first}' and '{second}' both claim atlas cell {index} in set '{set}'")]
    SharedCell { set: String, first: String, second: String, index: u16 },

    #[error("section '{0}' is not declared")]
    MissingSection(String),

    #[error("section '{section}' has no field '{field}'")]
    MissingField { section: String, field: String },

    #[error("field '{field}' of section '{section}' is not a {expected}")]
    InvalidField { section: String, field: String, expected: &'static str },

    #[error("tile size {width}x{height} of set '{set}' must be positive")]
    InvalidTileSize { set: String, width: f32, height: f32 },

    #[error("atlas of set '{set}' has {cells} cells; at most {max} are addressable")]
    AtlasTooLarge { set: String, cells: u32, max: u32 },

    #[error("map '{map}' row {row} declares {found} tiles, expected {expected}")]
    MissingTile { map: String, row: u32, found: usize, expected: u32 },

    #[error("section '{0}' inherits from itself")]
    ParentCycle(String),

    #[error("invalid content in {path}: {source}")]
    ContentParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TilemapError>;
