//! Tile-map packing for GPU decoding.
//!
//! A tile set assigns every named tile variant of an atlas a stable 16-bit
//! index; a map is then resolved against that set and packed into an index
//! texture that a shader decodes at render time. [`context::TilemapContext`]
//! ties both together with drag scrolling for the host's frame loop.

pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod input;
pub mod logging;
pub mod map;
pub mod params;
pub mod renderer;
pub mod scroll;
pub mod tileset;
pub mod viewport;

pub use config::{MissingTilePolicy, TilemapConfig};
pub use content::Content;
pub use context::{FrameRequests, MapDecl, TilemapContext};
pub use error::{Result, TilemapError};
pub use map::{encode_map, load_map, LoadedMap, PackedMap};
pub use tileset::{TileSet, EMPTY_TILE};
