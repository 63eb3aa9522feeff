use std::path::Path;

use glam::{Vec2, Vec3};
use image::RgbaImage;
use tilepack::content::Content;
use tilepack::input::{InputState, KeyCode, MouseButton, NullPointer};
use tilepack::params;
use tilepack::renderer::{ImageSink, MemoryAtlasLoader};
use tilepack::scroll::ScrollState;
use tilepack::{MapDecl, TilemapConfig, TilemapContext, TilemapError};

// ── Helpers ───────────────────────────────────────────────────────────────────

const WORLD: &str = r#"{
    "Green": { "Texture": "green.png", "TextureSize": [32, 32] },
    "Grass": { "Parent": "Green", "TextureOrigin": [0, 0] },
    "Cliff": { "Parent": "Green", "TextureOrigin": [32, 0] },
    "Small": { "Size": [3, 1], "Row1": ["Grass", "Cliff", "Grass"] },
    "Wide":  { "Size": [4, 2], "Row1": ["Cliff", "Cliff", "Cliff", "Cliff"], "Row2": ["Grass", "Grass", "Grass", "Grass"] }
}"#;

fn setup(scene: &[MapDecl]) -> tilepack::Result<TilemapContext<RgbaImage>> {
    let content = Content::from_json_str(WORLD, Path::new("<test>")).unwrap();
    let mut loader = MemoryAtlasLoader::new();
    loader.insert("green.png", RgbaImage::new(64, 64));
    TilemapContext::init(
        TilemapConfig::default(),
        Vec2::new(1280.0, 720.0),
        &content,
        &mut loader,
        &mut ImageSink,
        scene,
    )
}

fn both() -> Vec<MapDecl> {
    vec![MapDecl::new("Small", "Green"), MapDecl::new("Wide", "Green")]
}

fn camera_pos(ctx: &TilemapContext<RgbaImage>, map: &str) -> Vec3 {
    ctx.map(map).unwrap().params.get(params::CAMERA_POS).unwrap()
}

// ── Init ──────────────────────────────────────────────────────────────────────

#[test]
fn init_builds_shared_set_once_and_every_map() {
    let ctx = setup(&both()).unwrap();
    assert_eq!(ctx.maps().len(), 2);
    assert_eq!(ctx.tile_set("Green").unwrap().len(), 2);

    let small = ctx.map("Small").unwrap();
    assert_eq!(small.texture.dimensions(), (2, 1));
    assert_eq!(small.texture.get_pixel(0, 0).0, [0, 0, 0, 1]);
    assert_eq!(small.texture.get_pixel(1, 0).0, [0, 0, 0, 0]);

    let wide = ctx.map("Wide").unwrap();
    assert_eq!(wide.texture.dimensions(), (2, 2));
    assert_eq!(wide.params.get(params::MAP_SIZE), Some(Vec3::new(4.0, 2.0, 4.0)));
}

#[test]
fn init_fails_on_unknown_tile_set() {
    let err = setup(&[MapDecl::new("Small", "Blue")]).err().unwrap();
    assert!(matches!(err, TilemapError::MissingSection(name) if name == "Blue"));
}

#[test]
fn load_map_requires_a_loaded_set() {
    let content = Content::from_json_str(WORLD, Path::new("<test>")).unwrap();
    let mut ctx: TilemapContext<RgbaImage> =
        TilemapContext::new(TilemapConfig::default(), Vec2::new(1280.0, 720.0));
    let err = ctx.load_map(&content, "Small", "Green", &mut ImageSink).err().unwrap();
    assert!(matches!(err, TilemapError::MissingSection(_)));
}

// ── Update ────────────────────────────────────────────────────────────────────

#[test]
fn drag_scroll_is_broadcast_to_every_map() {
    let mut ctx = setup(&both()).unwrap();
    let mut input = InputState::new();
    let mut pointer = NullPointer::default();

    input.mouse_pos = [100.0, 100.0];
    input.press_mouse(MouseButton::Left);
    ctx.update(&input, &mut pointer);
    input.clear_frame_state();
    assert_eq!(ctx.scroll().state(), ScrollState::Dragging);
    assert!(pointer.grabbed);

    input.mouse_pos = [90.0, 100.0];
    ctx.update(&input, &mut pointer);
    assert_eq!(camera_pos(&ctx, "Small"), Vec3::new(10.0, 0.0, 0.0));
    assert_eq!(camera_pos(&ctx, "Wide"), Vec3::new(10.0, 0.0, 0.0));
    assert_eq!(
        ctx.map("Wide").unwrap().params.get(params::HIGHLIGHT),
        Some(Vec3::new(90.0, 100.0, 0.0))
    );

    input.mouse_pos = [85.0, 100.0];
    input.release_mouse(MouseButton::Left);
    ctx.update(&input, &mut pointer);
    input.clear_frame_state();
    assert_eq!(camera_pos(&ctx, "Small"), Vec3::new(15.0, 0.0, 0.0));
    assert!(!pointer.grabbed);
    assert_eq!(pointer.warped_to, Some(Vec2::new(100.0, 100.0)));

    // Momentum carries on without input.
    ctx.update(&input, &mut pointer);
    ctx.update(&input, &mut pointer);
    assert_eq!(camera_pos(&ctx, "Small"), Vec3::new(25.0, 0.0, 0.0));
}

#[test]
fn screenshot_fires_on_press_only() {
    let mut ctx = setup(&both()).unwrap();
    let mut input = InputState::new();
    let mut pointer = NullPointer::default();

    input.press_key(KeyCode::F12);
    assert!(ctx.update(&input, &mut pointer).screenshot);
    input.clear_frame_state();
    assert!(!ctx.update(&input, &mut pointer).screenshot);
}

#[test]
fn quit_follows_the_held_key() {
    let mut ctx = setup(&both()).unwrap();
    let mut input = InputState::new();
    let mut pointer = NullPointer::default();

    assert!(!ctx.update(&input, &mut pointer).quit);
    input.press_key(KeyCode::Escape);
    assert!(ctx.update(&input, &mut pointer).quit);
    input.clear_frame_state();
    assert!(ctx.update(&input, &mut pointer).quit);
}

// ── Resize / exit ─────────────────────────────────────────────────────────────

#[test]
fn resize_refreshes_size_parameters() {
    let mut ctx = setup(&both()).unwrap();
    ctx.resize(Vec2::new(2560.0, 720.0));

    for m in ctx.maps() {
        assert_eq!(m.params.get(params::CAMERA_SIZE), Some(Vec3::new(2560.0, 720.0, 0.0)));
        assert_eq!(m.params.get(params::RESOLUTION), Some(Vec3::new(2560.0, 720.0, 0.0)));
    }
    assert_eq!(ctx.view().scroll_ratio(true), Vec2::ONE);
}

#[test]
fn exit_hands_back_textures() {
    let ctx = setup(&both()).unwrap();
    let maps = ctx.exit();
    let names: Vec<_> = maps.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Small", "Wide"]);
}
