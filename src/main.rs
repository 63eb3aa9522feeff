//! `tilepack`: build tile sets and pack maps from the command line.
//!
//! ```text
//! tilepack <content> --set GreenTiles --map CliffMap [--map Other ...]
//!          [--storage DIR]... [--config FILE] [--out DIR] [--screen WxH]
//!          [--fill-missing]
//! ```
//! Each `--map` uses the most recent `--set`. Every packed map is written as
//! `<out>/<map>.png`: one RGBA8 pixel per pair of big-endian indices.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use glam::Vec2;

use tilepack::content::ResourceStorage;
use tilepack::logging::{init_logging, LoggingConfig};
use tilepack::renderer::{FsAtlasLoader, ImageSink};
use tilepack::{Content, MapDecl, MissingTilePolicy, TilemapConfig, TilemapContext};

#[derive(Debug, Default)]
struct Args {
    content: Option<PathBuf>,
    scene: Vec<MapDecl>,
    storages: Vec<PathBuf>,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
    screen: Option<Vec2>,
    fill_missing: bool,
}

const USAGE: &str = "usage: tilepack <content> --set NAME --map NAME [--map NAME]... \
                     [--storage DIR]... [--config FILE] [--out DIR] [--screen WxH] [--fill-missing]";

fn parse_args(mut it: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut current_set: Option<String> = None;

    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--set" => current_set = Some(value("--set")?),
            "--map" => {
                let map = value("--map")?;
                let Some(set) = &current_set else { bail!("--map {map} given before any --set") };
                args.scene.push(MapDecl::new(&map, set));
            }
            "--storage" => args.storages.push(value("--storage")?.into()),
            "--config" => args.config = Some(value("--config")?.into()),
            "--out" => args.out = Some(value("--out")?.into()),
            "--screen" => args.screen = Some(parse_screen(&value("--screen")?)?),
            "--fill-missing" => args.fill_missing = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            path => {
                if args.content.replace(path.into()).is_some() {
                    bail!("more than one content path given\n{USAGE}");
                }
            }
        }
    }

    if args.content.is_none() || args.scene.is_empty() {
        bail!(USAGE);
    }
    Ok(args)
}

fn parse_screen(s: &str) -> Result<Vec2> {
    let (w, h) = s.split_once('x').with_context(|| format!("bad screen size '{s}', expected WxH"))?;
    Ok(Vec2::new(w.trim().parse()?, h.trim().parse()?))
}

fn content_root(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
    }
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let Some(content_path) = args.content else { bail!(USAGE) };

    let mut config = match &args.config {
        Some(path) => TilemapConfig::from_file(path)?,
        None => TilemapConfig::default(),
    };
    init_logging(LoggingConfig::from(&config));

    config = config.with_storage(content_root(&content_path));
    for root in args.storages {
        config = config.with_storage(root);
    }
    if args.fill_missing {
        config = config.with_missing_tiles(MissingTilePolicy::Empty);
    }

    let content = Content::load(&content_path)
        .with_context(|| format!("loading content from {content_path:?}"))?;
    let mut loader = FsAtlasLoader::new(ResourceStorage::new(config.storages.clone()));
    let screen = args.screen.unwrap_or(Vec2::new(1280.0, 720.0));

    let ctx = TilemapContext::init(config, screen, &content, &mut loader, &mut ImageSink, &args.scene)
        .context("building tile maps")?;

    let out_dir = args.out.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {out_dir:?}"))?;

    for map in ctx.exit() {
        for (name, value) in map.params.named() {
            log::info!("map '{}': {name} = {value}", map.name);
        }
        let file = out_dir.join(format!("{}.png", map.name));
        map.texture.save(&file).with_context(|| format!("writing {file:?}"))?;
        log::info!("map '{}': wrote {file:?}", map.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn maps_bind_to_latest_set() {
        let a = args(&["data", "--set", "A", "--map", "M1", "--set", "B", "--map", "M2"]).unwrap();
        assert_eq!(a.scene, vec![MapDecl::new("M1", "A"), MapDecl::new("M2", "B")]);
        assert_eq!(a.content, Some(PathBuf::from("data")));
    }

    #[test]
    fn map_before_set_is_an_error() {
        assert!(args(&["data", "--map", "M"]).is_err());
    }

    #[test]
    fn screen_size_parses() {
        let a = args(&["d", "--set", "S", "--map", "M", "--screen", "800x600"]).unwrap();
        assert_eq!(a.screen, Some(Vec2::new(800.0, 600.0)));
        assert!(parse_screen("800").is_err());
    }
}
