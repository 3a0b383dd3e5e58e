//! # Level Rendering
//!
//! Paints level records into PNG maps using externally supplied artwork.
//!
//! - Base layer: one `<tile_name>.png` per legend entry, all the same size.
//!   Vertical doors are turned a quarter clockwise.
//! - Overlays (optional): `pressure_plate.png`, `button.png`, `fountain.png`, centred
//!   on their tile. Buttons and fountains are turned to face their wall side.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use image::{
    imageops::{self, overlay, replace},
    RgbaImage,
};

use crate::{
    dungeon::{
        tiles::{Orientation, TileKind},
        Direction,
    },
    error::{Error, Result},
    export::{Legend, LevelInfo},
};

const OVERLAY_NAMES: [&str; 3] = ["pressure_plate", "button", "fountain"];

/// Base tile artwork keyed by tile name.
pub struct TileAtlas {
    tiles: HashMap<String, RgbaImage>,
    tile_width: u32,
    tile_height: u32,
}

impl TileAtlas {
    /// Load `<name>.png` for every name. Every file must exist.
    pub fn load<'a, I>(assets_dir: &Path, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tiles = HashMap::new();
        for name in names {
            let path = assets_dir.join(format!("{}.png", name));
            if !path.is_file() {
                return Err(Error::MissingAsset(path));
            }
            tiles.insert(name.to_string(), image::open(&path)?.to_rgba8());
        }
        Self::from_images(tiles)
    }

    pub fn from_images(tiles: HashMap<String, RgbaImage>) -> Result<Self> {
        let mut sizes = tiles.iter().map(|(name, img)| (name, img.dimensions()));
        let Some((first, (tile_width, tile_height))) = sizes.next() else {
            return Err(Error::MissingAsset(PathBuf::from("wall.png")));
        };
        // vertical doors are turned in place
        if tile_width != tile_height {
            return Err(Error::NonSquareTile {
                name: first.clone(),
                size: (tile_width, tile_height),
            });
        }
        for (name, found) in sizes {
            if found != (tile_width, tile_height) {
                return Err(Error::AssetSizeMismatch {
                    name: name.clone(),
                    expected: (tile_width, tile_height),
                    found,
                });
            }
        }

        Ok(TileAtlas {
            tiles,
            tile_width,
            tile_height,
        })
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    /// Artwork for a tile name, falling back to the wall tile for unknown names.
    fn get(&self, name: &str) -> Option<&RgbaImage> {
        self.tiles
            .get(name)
            .or_else(|| self.tiles.get(TileKind::Wall.name()))
    }
}

#[derive(Default)]
pub struct Overlays {
    pub pressure_plate: Option<RgbaImage>,
    pub button: Option<RgbaImage>,
    pub fountain: Option<RgbaImage>,
}

impl Overlays {
    /// Load whichever overlay icons exist in `assets_dir`.
    pub fn load(assets_dir: &Path) -> Result<Self> {
        let mut loaded: HashMap<&str, RgbaImage> = HashMap::new();
        for name in OVERLAY_NAMES {
            let path = assets_dir.join(format!("{}.png", name));
            if path.is_file() {
                loaded.insert(name, image::open(&path)?.to_rgba8());
            } else {
                log::debug!("No {} overlay in {}", name, assets_dir.display());
            }
        }

        Ok(Overlays {
            pressure_plate: loaded.remove("pressure_plate"),
            button: loaded.remove("button"),
            fountain: loaded.remove("fountain"),
        })
    }
}

/// Markers belong to a level record when both the level number and the map index agree.
/// Records from older files carry map index 0 throughout, which reduces this to a level match.
fn on_level(level: &LevelInfo, marker_level: u8, marker_map: usize) -> bool {
    level.level == marker_level && level.map_index == marker_map
}

fn face(icon: &RgbaImage, direction: Direction) -> RgbaImage {
    match direction {
        Direction::North => icon.clone(),
        Direction::East => imageops::rotate90(icon),
        Direction::South => imageops::rotate180(icon),
        Direction::West => imageops::rotate270(icon),
    }
}

pub fn render_level(
    level: &LevelInfo,
    legend: &Legend,
    atlas: &TileAtlas,
    overlays: &Overlays,
) -> RgbaImage {
    let (tw, th) = atlas.tile_size();
    let rows = level.grid.len() as u32;
    let cols = level.grid.first().map_or(0, |row| row.len()) as u32;
    let mut canvas = RgbaImage::new(cols * tw, rows * th);

    for (y, row) in level.grid.iter().enumerate() {
        for (x, name) in row.iter().enumerate() {
            let Some(base) = atlas.get(name) else {
                continue;
            };
            let vertical_door = name == TileKind::Door.name()
                && level
                    .door_orientation
                    .get(y)
                    .and_then(|r| r.get(x))
                    .copied()
                    .flatten()
                    == Some(Orientation::Vertical);

            let px = x as i64 * tw as i64;
            let py = y as i64 * th as i64;
            if vertical_door {
                replace(&mut canvas, &imageops::rotate90(base), px, py);
            } else {
                replace(&mut canvas, base, px, py);
            }
        }
    }

    let mut stamp = |icon: &RgbaImage, x: usize, y: usize| {
        let dx = x as i64 * tw as i64 + (tw as i64 - icon.width() as i64) / 2;
        let dy = y as i64 * th as i64 + (th as i64 - icon.height() as i64) / 2;
        overlay(&mut canvas, icon, dx, dy);
    };

    if let Some(icon) = &overlays.pressure_plate {
        for plate in &legend.pressure_plates {
            if on_level(level, plate.level, plate.map_index) {
                stamp(icon, plate.x, plate.y);
            }
        }
    }
    if let Some(icon) = &overlays.button {
        for button in &legend.buttons {
            if on_level(level, button.level, button.map_index) {
                stamp(&face(icon, button.direction), button.x, button.y);
            }
        }
    }
    if let Some(icon) = &overlays.fountain {
        for fountain in &legend.fountains {
            if on_level(level, fountain.level, fountain.map_index) {
                stamp(&face(icon, fountain.direction), fountain.x, fountain.y);
            }
        }
    }

    canvas
}

/// Save a PNG, then shrink it with oxipng. A failed optimisation keeps the plain file.
pub fn save_png(image: &RgbaImage, path: &Path, optimise: bool) -> Result<()> {
    if !optimise {
        image.save(path)?;
        return Ok(());
    }

    let temp_path = path.with_extension("temp.png");
    image.save(&temp_path)?;

    let mut options = oxipng::Options::from_preset(2);
    options.bit_depth_reduction = true;
    options.interlace = None;

    match oxipng::optimize(
        &oxipng::InFile::Path(temp_path.clone()),
        &oxipng::OutFile::Path(Some(path.to_path_buf())),
        &options,
    ) {
        Ok(_) => {
            let _ = fs::remove_file(temp_path);
        }
        Err(e) => {
            fs::rename(&temp_path, path)?;
            log::warn!(
                "oxipng optimisation failed for {}: {}. File saved unoptimised.",
                path.display(),
                e
            );
        }
    }
    Ok(())
}

/// Render every level record to `<stem>.png` in `output_dir`.
pub fn render_levels(
    levels: &[(String, LevelInfo)],
    legend: &Legend,
    assets_dir: &Path,
    output_dir: &Path,
    optimise: bool,
) -> Result<Vec<PathBuf>> {
    let atlas = TileAtlas::load(assets_dir, legend.tile_names.values().map(String::as_str))?;
    let overlays = Overlays::load(assets_dir)?;
    fs::create_dir_all(output_dir)?;

    levels
        .iter()
        .map(|(stem, level)| {
            let path = output_dir.join(format!("{}.png", stem));
            save_png(&render_level(level, legend, &atlas, &overlays), &path, optimise)?;
            log::info!("Rendered level {} -> {}", level.level, path.display());
            Ok(path)
        })
        .collect()
}
