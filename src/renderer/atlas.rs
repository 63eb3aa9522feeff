use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;

use crate::content::ResourceStorage;
use crate::error::{Result, TilemapError};

/// A decoded atlas image shared between tile sets and the renderer.
pub struct AtlasImage {
    /// Path the atlas was requested under (the tile set's `Texture` field).
    pub name: String,
    pub pixels: RgbaImage,
}

impl AtlasImage {
    pub fn new(name: impl Into<String>, pixels: RgbaImage) -> Self {
        Self { name: name.into(), pixels }
    }

    pub fn width(&self) -> u32 { self.pixels.width() }
    pub fn height(&self) -> u32 { self.pixels.height() }

    /// Pixel dimensions `(width, height)`.
    pub fn size(&self) -> (u32, u32) { self.pixels.dimensions() }
}

impl std::fmt::Debug for AtlasImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtlasImage")
            .field("name", &self.name)
            .field("size", &self.size())
            .finish()
    }
}

/// Source of atlas images, keyed by the path declared in content.
pub trait AtlasLoader {
    fn load_atlas(&mut self, path: &str) -> Result<Arc<AtlasImage>>;
}

// ── FsAtlasLoader ─────────────────────────────────────────────────────────────

/// Loads atlases from disk through a [`ResourceStorage`]. Each path is decoded
/// once; later requests share the same image.
pub struct FsAtlasLoader {
    storage: ResourceStorage,
    cache: HashMap<String, Arc<AtlasImage>>,
}

impl FsAtlasLoader {
    pub fn new(storage: ResourceStorage) -> Self {
        Self { storage, cache: HashMap::new() }
    }

    fn locate(&self, path: &str) -> Result<PathBuf> {
        self.storage.resolve(path).ok_or_else(|| TilemapError::AtlasLoad {
            path: path.to_string(),
            reason: format!("not found in {:?}", self.storage.roots()),
        })
    }
}

impl AtlasLoader for FsAtlasLoader {
    fn load_atlas(&mut self, path: &str) -> Result<Arc<AtlasImage>> {
        if let Some(img) = self.cache.get(path) {
            return Ok(Arc::clone(img));
        }
        let file = self.locate(path)?;
        let pixels = image::open(&file)
            .map_err(|e| TilemapError::AtlasLoad {
                path: path.to_string(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        log::debug!("atlas: loaded {file:?} ({}x{})", pixels.width(), pixels.height());

        let img = Arc::new(AtlasImage::new(path, pixels));
        self.cache.insert(path.to_string(), Arc::clone(&img));
        Ok(img)
    }
}

// ── MemoryAtlasLoader ─────────────────────────────────────────────────────────

/// Serves atlases registered up front, e.g. images embedded in the binary or
/// generated by tooling.
#[derive(Default)]
pub struct MemoryAtlasLoader {
    images: HashMap<String, Arc<AtlasImage>>,
}

impl MemoryAtlasLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, pixels: RgbaImage) {
        self.images.insert(path.to_string(), Arc::new(AtlasImage::new(path, pixels)));
    }

    /// Decode an encoded image (PNG bytes) and register it under `path`.
    pub fn insert_encoded(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let pixels = image::load_from_memory(bytes)?.to_rgba8();
        self.insert(path, pixels);
        Ok(())
    }
}

impl AtlasLoader for MemoryAtlasLoader {
    fn load_atlas(&mut self, path: &str) -> Result<Arc<AtlasImage>> {
        self.images.get(path).cloned().ok_or_else(|| TilemapError::AtlasLoad {
            path: path.to_string(),
            reason: "no such image registered".to_string(),
        })
    }
}
