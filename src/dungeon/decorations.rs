//! # Decoration Lists
//!
//! Directly after a map's tile bytes come its graphic ID lists, one byte per entry, in
//! the order creatures, wall decorations, floor decorations, door decorations. Only the
//! wall decoration IDs are kept; sensors refer to them by 1-based ordinal.

use super::{error::DecodeError, map_def::MapDefinition};
use crate::binary_utils::read_bytes;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationLists {
    pub wall_decorations: Vec<u8>,
    /// Offset of the first byte after this map's decoration region
    pub end_offset: usize,
}

impl DecorationLists {
    pub fn read(data: &[u8], offset: usize, def: &MapDefinition) -> Result<Self, DecodeError> {
        let mut offset = offset;

        read_bytes(data, offset, def.creature_graphics_count as usize)?;
        offset += def.creature_graphics_count as usize;

        let wall_decorations = read_bytes(data, offset, def.wall_graphics_count as usize)?.to_vec();
        offset += def.wall_graphics_count as usize;

        read_bytes(data, offset, def.floor_graphics_count as usize)?;
        offset += def.floor_graphics_count as usize;

        read_bytes(data, offset, def.door_decoration_count as usize)?;
        offset += def.door_decoration_count as usize;

        Ok(DecorationLists {
            wall_decorations,
            end_offset: offset,
        })
    }

    /// Resolve a sensor's decoration ordinal (0 = none) to a wall decoration ID.
    pub fn wall_decoration(&self, ordinal: u8) -> Option<u8> {
        let index = (ordinal as usize).checked_sub(1)?;
        self.wall_decorations.get(index).copied()
    }
}
