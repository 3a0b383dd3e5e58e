//! # Map Definitions
//!
//! One fixed-size record per map, in physical order. The record's `level` is only a
//! label: several maps may carry the same level number and the numbers need not be
//! contiguous, so maps are always addressed by their index in this table.

use super::{error::DecodeError, layout::FormatLayout};
use crate::binary_utils::{entry_offset, read_u16_le, remaining};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapDefinition {
    /// Offset of the tile bytes inside the global tile data region
    pub data_offset: u16,
    pub width: u8,
    pub height: u8,
    pub level: u8,
    pub creature_graphics_count: u8,
    pub wall_graphics_count: u8,
    pub floor_graphics_count: u8,
    pub door_decoration_count: u8,
}

impl MapDefinition {
    /// Decode one 16-byte record.
    ///
    /// - 0x00: tile data offset
    /// - 0x08: size word, `hhhhh wwwww llllll` (height-1, width-1, level)
    /// - 0x0A: graphics word, floor count in bits 8-11, wall count in bits 0-3
    /// - 0x0C: misc word, creature count in bits 4-7, door decoration count in bits 0-3
    ///
    /// The remaining words (map offsets, difficulty, door indices) are not needed.
    pub fn from_record(data: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let data_offset = read_u16_le(data, offset)?;

        let size_word = read_u16_le(data, offset + 0x08)?;
        let height = ((size_word >> 11) & 0x1F) as u8 + 1;
        let width = ((size_word >> 6) & 0x1F) as u8 + 1;
        let level = (size_word & 0x3F) as u8;

        let graphics_word = read_u16_le(data, offset + 0x0A)?;
        let misc_word = read_u16_le(data, offset + 0x0C)?;

        Ok(MapDefinition {
            data_offset,
            width,
            height,
            level,
            creature_graphics_count: ((misc_word >> 4) & 0x0F) as u8,
            wall_graphics_count: (graphics_word & 0x0F) as u8,
            floor_graphics_count: ((graphics_word >> 8) & 0x0F) as u8,
            door_decoration_count: (misc_word & 0x0F) as u8,
        })
    }

    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn decoration_count(&self) -> usize {
        self.creature_graphics_count as usize
            + self.wall_graphics_count as usize
            + self.floor_graphics_count as usize
            + self.door_decoration_count as usize
    }
}

/// Decode `num_maps` records from the map table, index-aligned with physical order.
pub fn parse_map_definitions(
    data: &[u8],
    num_maps: usize,
    layout: &FormatLayout,
) -> Result<Vec<MapDefinition>, DecodeError> {
    let needed = entry_offset(0, num_maps, layout.map_record_size)?;
    let available = remaining(data, layout.map_table_offset);
    if available < needed {
        return Err(DecodeError::TruncatedMapTable {
            num_maps,
            needed,
            available,
        });
    }

    (0..num_maps)
        .map(|i| {
            let offset = entry_offset(layout.map_table_offset, i, layout.map_record_size)?;
            MapDefinition::from_record(data, offset)
        })
        .collect()
}
