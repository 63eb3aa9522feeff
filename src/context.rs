use std::collections::HashMap;

use glam::Vec2;

use crate::config::TilemapConfig;
use crate::content::Content;
use crate::error::{Result, TilemapError};
use crate::input::{Action, ActionMap, InputState, PointerDevice};
use crate::map::{self, LoadedMap};
use crate::params::{self, ParamConsumer};
use crate::renderer::{AtlasLoader, TextureSink};
use crate::scroll::ScrollController;
use crate::tileset::TileSet;
use crate::viewport::ViewMetrics;

/// What the host loop should do after an update.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameRequests {
    /// Capture a screenshot this frame (rising edge of the screenshot input).
    pub screenshot: bool,
    /// Leave the main loop.
    pub quit: bool,
}

/// One map to build at startup and the tile set it draws from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapDecl {
    pub map: String,
    pub tile_set: String,
}

impl MapDecl {
    pub fn new(map: &str, tile_set: &str) -> Self {
        Self { map: map.to_string(), tile_set: tile_set.to_string() }
    }
}

/// Everything the tile-map scene owns, threaded through init / update / exit
/// by the host.
///
/// `T` is the texture type produced by the host's [`TextureSink`].
pub struct TilemapContext<T> {
    config: TilemapConfig,
    view: ViewMetrics,
    actions: ActionMap<Action>,
    tile_sets: HashMap<String, TileSet>,
    maps: Vec<LoadedMap<T>>,
    scroll: ScrollController,
    highlight: Vec2,
}

impl<T> TilemapContext<T> {
    /// Empty context for a screen of `screen` pixels.
    pub fn new(config: TilemapConfig, screen: Vec2) -> Self {
        let view = ViewMetrics::new(Vec2::from_array(config.camera_size), screen);
        let scroll = ScrollController::new(config.grab_pointer, config.restore_pointer);
        Self {
            config,
            view,
            actions: ActionMap::with_default_bindings(),
            tile_sets: HashMap::new(),
            maps: Vec::new(),
            scroll,
            highlight: Vec2::ZERO,
        }
    }

    /// Build every declared map (and the tile sets they need). Any failure
    /// aborts startup.
    pub fn init<S>(
        config: TilemapConfig,
        screen: Vec2,
        content: &Content,
        loader: &mut dyn AtlasLoader,
        sink: &mut S,
        scene: &[MapDecl],
    ) -> Result<Self>
    where
        S: TextureSink<Texture = T>,
    {
        let mut ctx = Self::new(config, screen);
        for decl in scene {
            if !ctx.tile_sets.contains_key(&decl.tile_set) {
                ctx.load_tile_set(content, loader, &decl.tile_set)?;
            }
            ctx.load_map(content, &decl.map, &decl.tile_set, sink)?;
        }
        Ok(ctx)
    }

    pub fn with_actions(mut self, actions: ActionMap<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Build (or rebuild) tile set `name`.
    pub fn load_tile_set(
        &mut self,
        content: &Content,
        loader: &mut dyn AtlasLoader,
        name: &str,
    ) -> Result<&TileSet> {
        let set = TileSet::build(content, loader, name)?;
        self.tile_sets.insert(name.to_string(), set);
        Ok(&self.tile_sets[name])
    }

    /// Pack map `name` with the already-loaded tile set `tile_set`.
    pub fn load_map<S>(
        &mut self,
        content: &Content,
        name: &str,
        tile_set: &str,
        sink: &mut S,
    ) -> Result<&LoadedMap<T>>
    where
        S: TextureSink<Texture = T>,
    {
        let set = self
            .tile_sets
            .get(tile_set)
            .ok_or_else(|| TilemapError::MissingSection(tile_set.to_string()))?;
        let mut loaded = map::load_map(content, name, set, self.config.missing_tiles, sink, &self.view)?;
        loaded.params.set_vector(params::CAMERA_POS, self.scroll.offset().extend(0.0));
        self.maps.push(loaded);
        Ok(&self.maps[self.maps.len() - 1])
    }

    // ── Per-frame ───────────────────────────────────────────────────────────

    /// Run one tick: drag scrolling, then parameter broadcast.
    pub fn update(&mut self, input: &InputState, pointer: &mut dyn PointerDevice) -> FrameRequests {
        let requests = FrameRequests {
            screenshot: self.actions.signal(Action::Screenshot, input).rising(),
            quit: self.actions.is_held(Action::Quit, input),
        };
        if requests.screenshot {
            log::info!("screenshot requested");
        }

        let scrolling = self.actions.signal(Action::Scroll, input).active;
        let ratio = self.view.scroll_ratio(self.config.aspect_correction);
        self.scroll.tick(scrolling, input.pointer(), ratio, pointer);
        self.highlight = input.pointer();

        self.broadcast();
        requests
    }

    /// Push the per-frame parameters to every loaded map.
    pub fn broadcast(&mut self) {
        let offset = self.scroll.offset().extend(0.0);
        let highlight = self.highlight.extend(0.0);
        for m in &mut self.maps {
            m.params.set_vector(params::CAMERA_POS, offset);
            m.params.set_vector(params::HIGHLIGHT, highlight);
        }
    }

    /// The screen changed size: refresh the size-dependent parameters.
    pub fn resize(&mut self, screen: Vec2) {
        self.view = ViewMetrics::new(Vec2::from_array(self.config.camera_size), screen);
        let camera = self.view.camera_size.extend(0.0);
        let resolution = screen.extend(0.0);
        for m in &mut self.maps {
            m.params.set_vector(params::CAMERA_SIZE, camera);
            m.params.set_vector(params::RESOLUTION, resolution);
        }
    }

    /// Tear down, handing the map textures back to the host.
    pub fn exit(self) -> Vec<LoadedMap<T>> {
        log::info!(
            "tilemap context: releasing {} tile sets and {} maps",
            self.tile_sets.len(),
            self.maps.len()
        );
        self.maps
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &TilemapConfig { &self.config }
    pub fn view(&self) -> &ViewMetrics { &self.view }
    pub fn scroll(&self) -> &ScrollController { &self.scroll }
    pub fn tile_set(&self, name: &str) -> Option<&TileSet> { self.tile_sets.get(name) }
    pub fn maps(&self) -> &[LoadedMap<T>] { &self.maps }
    pub fn map(&self, name: &str) -> Option<&LoadedMap<T>> {
        self.maps.iter().find(|m| m.name == name)
    }
}
