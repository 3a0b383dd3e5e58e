//! # Tile Grids
//!
//! Each map stores one byte per tile, column by column (`x * height + y`).
//!
//! ```text
//! bit  7 6 5 | 4      | 3           | 2
//!      kind  | object | orientation | stairs up
//! ```
//!
//! Consumers work on a fixed 32x32 canvas, so grids can be viewed padded with wall.

use serde::{Deserialize, Serialize};

use super::{error::DecodeError, layout::FormatLayout, map_def::MapDefinition};
use crate::binary_utils::{entry_offset, read_bytes, remaining};

pub const PADDED_DIM: usize = 32;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Wall = 0,
    Floor = 1,
    Pit = 2,
    Stairs = 3,
    Door = 4,
    Teleporter = 5,
    TrickWall = 6,
    Empty = 7,
}

impl TileKind {
    pub const ALL: [TileKind; 8] = [
        TileKind::Wall,
        TileKind::Floor,
        TileKind::Pit,
        TileKind::Stairs,
        TileKind::Door,
        TileKind::Teleporter,
        TileKind::TrickWall,
        TileKind::Empty,
    ];

    pub fn from_code(code: u8) -> Self {
        Self::ALL[(code & 0x7) as usize]
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            TileKind::Wall => "wall",
            TileKind::Floor => "floor",
            TileKind::Pit => "pit",
            TileKind::Stairs => "stairs",
            TileKind::Door => "door",
            TileKind::Teleporter => "teleporter",
            TileKind::TrickWall => "trick_wall",
            TileKind::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Runs west-east
    Horizontal,
    /// Runs north-south
    Vertical,
}

impl Orientation {
    fn from_bit(bit: u8) -> Self {
        if bit & 1 == 1 {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StairsDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCell {
    pub kind: TileKind,
    pub has_object: bool,
    pub door_orientation: Option<Orientation>,
    pub stairs_orientation: Option<Orientation>,
    pub stairs_direction: Option<StairsDirection>,
}

impl TileCell {
    pub fn from_byte(byte: u8) -> Self {
        let kind = TileKind::from_code(byte >> 5);
        let orientation = Orientation::from_bit(byte >> 3);

        let mut cell = TileCell {
            kind,
            has_object: byte & 0x10 != 0,
            door_orientation: None,
            stairs_orientation: None,
            stairs_direction: None,
        };
        match kind {
            TileKind::Door => cell.door_orientation = Some(orientation),
            TileKind::Stairs => {
                cell.stairs_orientation = Some(orientation);
                cell.stairs_direction = Some(if (byte >> 2) & 1 == 1 {
                    StairsDirection::Up
                } else {
                    StairsDirection::Down
                });
            }
            _ => {}
        }
        cell
    }

    pub fn is_wall(&self) -> bool {
        self.kind == TileKind::Wall
    }
}

/// Decoded tiles of one map, stored row-major (`y * width + x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    pub width: usize,
    pub height: usize,
    cells: Vec<TileCell>,
}

impl TileGrid {
    /// Absolute offset of a map's first tile byte.
    pub fn data_start(def: &MapDefinition, layout: &FormatLayout) -> Result<usize, DecodeError> {
        entry_offset(layout.tile_data_offset, def.data_offset as usize, 1)
    }

    pub fn decode(
        data: &[u8],
        map_index: usize,
        def: &MapDefinition,
        layout: &FormatLayout,
    ) -> Result<Self, DecodeError> {
        let start = Self::data_start(def, layout)?;
        let needed = def.tile_count();
        let available = remaining(data, start);
        if available < needed {
            return Err(DecodeError::TruncatedTileData {
                map_index,
                offset: start,
                needed,
                available,
            });
        }
        let bytes = read_bytes(data, start, needed)?;

        let width = def.width as usize;
        let height = def.height as usize;
        let mut cells = vec![TileCell::from_byte(0); needed];
        for (idx, &byte) in bytes.iter().enumerate() {
            let x = idx / height;
            let y = idx % height;
            cells[y * width + x] = TileCell::from_byte(byte);
        }

        Ok(TileGrid {
            width,
            height,
            cells,
        })
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&TileCell> {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Coordinates of tiles carrying objects, in storage order (columns, then rows).
    pub fn object_tiles(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.width)
            .flat_map(move |x| (0..self.height).map(move |y| (x, y)))
            .filter(|&(x, y)| self.cells[y * self.width + x].has_object)
    }

    /// Project every cell onto a 32x32 canvas, rows first. Cells outside the map take `pad`.
    pub fn padded<T, F>(&self, pad: T, project: F) -> Vec<Vec<T>>
    where
        T: Clone,
        F: Fn(&TileCell) -> T,
    {
        (0..PADDED_DIM)
            .map(|y| {
                (0..PADDED_DIM)
                    .map(|x| self.cell(x, y).map_or_else(|| pad.clone(), &project))
                    .collect()
            })
            .collect()
    }
}
