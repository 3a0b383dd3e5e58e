//! # Level and Legend Records
//!
//! Serialisable views of a decoded dungeon, as consumed by the renderer and by
//! external tools: one record per map and a single legend holding the tile-name table,
//! the starting position and the classified sensors.

use std::{
    collections::{BTreeMap, HashSet},
    fs::{self, File},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    dungeon::{
        header::StartPosition,
        objects::{Button, Fountain, PressurePlate},
        tiles::{Orientation, StairsDirection, TileKind},
        DecodedMap, Dungeon,
    },
    error::Result,
};

pub const LEGEND_FILE: &str = "legend.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u8,
    /// Physical map index. Absent from files written by older tools.
    #[serde(default)]
    pub map_index: usize,
    pub width: usize,
    pub height: usize,
    /// 32x32 tile names, rows first, padded with wall
    pub grid: Vec<Vec<String>>,
    pub door_orientation: Vec<Vec<Option<Orientation>>>,
    pub stairs_orientation: Vec<Vec<Option<Orientation>>>,
    pub stairs_direction: Vec<Vec<Option<StairsDirection>>>,
}

impl LevelInfo {
    pub fn from_map(map: &DecodedMap) -> Self {
        let tiles = &map.tiles;
        LevelInfo {
            level: map.level(),
            map_index: map.map_index,
            width: tiles.width,
            height: tiles.height,
            grid: tiles.padded(TileKind::Wall.name().to_string(), |cell| {
                cell.kind.name().to_string()
            }),
            door_orientation: tiles.padded(None, |cell| cell.door_orientation),
            stairs_orientation: tiles.padded(None, |cell| cell.stairs_orientation),
            stairs_direction: tiles.padded(None, |cell| cell.stairs_direction),
        }
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    /// Tile code ("0".."7") to tile name
    #[serde(flatten)]
    pub tile_names: BTreeMap<String, String>,
    pub starting_position: StartPosition,
    pub pressure_plates: Vec<PressurePlate>,
    pub buttons: Vec<Button>,
    #[serde(default)]
    pub fountains: Vec<Fountain>,
}

impl Legend {
    pub fn from_dungeon(dungeon: &Dungeon) -> Self {
        Legend {
            tile_names: tile_legend(),
            starting_position: dungeon.start,
            pressure_plates: dungeon.sensors.pressure_plates.clone(),
            buttons: dungeon.sensors.buttons.clone(),
            fountains: dungeon.sensors.fountains.clone(),
        }
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

pub fn tile_legend() -> BTreeMap<String, String> {
    TileKind::ALL
        .iter()
        .map(|kind| (kind.code().to_string(), kind.name().to_string()))
        .collect()
}

/// File stems for each level record: `level_XX`, or `level_XX_map_YY` when an
/// earlier map already used level number `XX`.
pub fn level_file_stems(levels: &[LevelInfo]) -> Vec<String> {
    let mut seen = HashSet::new();
    levels
        .iter()
        .map(|info| {
            if seen.insert(info.level) {
                format!("level_{:02}", info.level)
            } else {
                log::warn!(
                    "Map {} repeats level number {}, writing it under its map index",
                    info.map_index,
                    info.level
                );
                format!("level_{:02}_map_{:02}", info.level, info.map_index)
            }
        })
        .collect()
}

/// Write one JSON file per level record. Returns the paths in map order.
pub fn write_levels_json(levels: &[LevelInfo], output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    levels
        .iter()
        .zip(level_file_stems(levels))
        .map(|(info, stem)| {
            let path = output_dir.join(format!("{}.json", stem));
            let file = File::create(&path)?;
            serde_json::to_writer_pretty(file, info)?;
            log::debug!("Wrote {}", path.display());
            Ok(path)
        })
        .collect()
}

pub fn write_legend_json(legend: &Legend, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(LEGEND_FILE);
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, legend)?;
    Ok(path)
}
