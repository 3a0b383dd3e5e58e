//! # Format Layout
//!
//! Fixed offsets and table geometry for one version of the dungeon file format.
//! Every decoder reads its addresses from a [`FormatLayout`], so supporting another
//! version means supplying another table (built in code or loaded from JSON).

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::{
    error::DecodeError,
    objects::{ObjectCategory, CATEGORY_COUNT},
};
use crate::{binary_utils, error::Error};

/// Location and stride of one object category's sub-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTable {
    pub offset: usize,
    pub entry_size: usize,
}

impl ObjectTable {
    pub const fn new(offset: usize, entry_size: usize) -> Self {
        ObjectTable { offset, entry_size }
    }

    /// Byte offset of entry `number`. Fails if the table geometry overflows.
    pub fn entry_offset(&self, number: u16) -> Result<usize, DecodeError> {
        binary_utils::entry_offset(self.offset, number as usize, self.entry_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatLayout {
    pub header_len: usize,
    pub map_table_offset: usize,
    pub map_record_size: usize,
    pub first_object_list_offset: usize,
    pub tile_data_offset: usize,
    /// Indexed by category code; `None` ends any chain that reaches that category.
    pub object_tables: [Option<ObjectTable>; CATEGORY_COUNT],
    /// Number of sensor records. Taken from the header object counts when absent.
    pub sensor_count: Option<u16>,
    pub fountain_decoration_id: u8,
    pub max_chain_length: usize,
}

/// Dungeon Master, PC release, uncompressed DUNGEON.DAT
pub const DM1_PC: FormatLayout = FormatLayout {
    header_len: 0x2C,
    map_table_offset: 0x2C,
    map_record_size: 16,
    first_object_list_offset: 0x043E,
    tile_data_offset: 0x5250,
    object_tables: [
        Some(ObjectTable::new(0x1F06, 4)),  // doors
        Some(ObjectTable::new(0x21AE, 6)),  // teleporters
        Some(ObjectTable::new(0x25E0, 4)),  // texts
        Some(ObjectTable::new(0x27D4, 8)),  // sensors
        Some(ObjectTable::new(0x3D34, 16)), // creatures
        Some(ObjectTable::new(0x4894, 4)),  // weapons
        Some(ObjectTable::new(0x4A40, 4)),  // clothes
        Some(ObjectTable::new(0x4C24, 4)),  // scrolls
        Some(ObjectTable::new(0x4CB0, 4)),  // potions
        Some(ObjectTable::new(0x4D90, 8)),  // containers
        Some(ObjectTable::new(0x4DF0, 4)),  // misc
        None,
        None,
        None,
        // projectiles and clouds never appear in a stored dungeon
        None,
        None,
    ],
    sensor_count: Some(684),
    fountain_decoration_id: 35,
    max_chain_length: 1024,
};

impl Default for FormatLayout {
    fn default() -> Self {
        DM1_PC
    }
}

impl FormatLayout {
    pub fn object_table(&self, category: ObjectCategory) -> Option<ObjectTable> {
        self.object_tables[category.code() as usize]
    }

    pub fn sensor_table(&self) -> Option<ObjectTable> {
        self.object_table(ObjectCategory::Sensor)
    }

    /// Load a layout override from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        let layout = serde_json::from_str(&text)?;
        log::info!("Loaded format layout from {}", path.display());
        Ok(layout)
    }
}
