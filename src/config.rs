use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, TilemapError};

// ── MissingTilePolicy ─────────────────────────────────────────────────────────

/// What the map packer does with a row that declares fewer names than the
/// map width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTilePolicy {
    /// Abort the build with `TilemapError::MissingTile`.
    #[default]
    Fail,
    /// Treat every missing entry as `EMPTY_TILE`.
    Empty,
}

// ── TilemapConfig ─────────────────────────────────────────────────────────────

/// Startup configuration for the tile-map pipeline.
///
/// Every field has a default, so a config file only needs to list what it
/// overrides:
/// ```json
/// { "storages": ["../data", "../../data"], "missing_tiles": "empty" }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TilemapConfig {
    /// Root directories searched, in order, for content and atlas files.
    pub storages: Vec<PathBuf>,
    /// Policy for rows shorter than the declared map width.
    pub missing_tiles: MissingTilePolicy,
    /// Exclusively capture the pointer while a drag is in progress.
    pub grab_pointer: bool,
    /// Put the pointer back where the drag started once it ends.
    pub restore_pointer: bool,
    /// Scale drag deltas by `camera size / screen size`.
    pub aspect_correction: bool,
    /// Camera frustum size in world units, before aspect correction.
    pub camera_size: [f32; 2],
    /// `env_logger` filter for the binary; `RUST_LOG` applies when unset.
    pub log_filter: Option<String>,
}

impl Default for TilemapConfig {
    fn default() -> Self {
        Self {
            storages: vec![PathBuf::from(".")],
            missing_tiles: MissingTilePolicy::Fail,
            grab_pointer: true,
            restore_pointer: true,
            aspect_correction: true,
            camera_size: [1280.0, 720.0],
            log_filter: None,
        }
    }
}

impl TilemapConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TilemapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| TilemapError::ContentParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_storage(mut self, root: impl Into<PathBuf>) -> Self {
        self.storages.push(root.into());
        self
    }

    pub fn with_missing_tiles(mut self, policy: MissingTilePolicy) -> Self {
        self.missing_tiles = policy;
        self
    }

    pub fn with_pointer_grab(mut self, grab: bool, restore: bool) -> Self {
        self.grab_pointer = grab;
        self.restore_pointer = restore;
        self
    }

    pub fn with_aspect_correction(mut self, enabled: bool) -> Self {
        self.aspect_correction = enabled;
        self
    }

    pub fn with_camera_size(mut self, width: f32, height: f32) -> Self {
        self.camera_size = [width, height];
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
