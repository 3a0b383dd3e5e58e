//! # File Header
//!
//! The first 0x2C bytes of the dungeon file: a handful of scalar fields followed by
//! the number of objects stored in each category sub-table.

use serde::{Deserialize, Serialize};

use super::{error::DecodeError, layout::FormatLayout, objects::CATEGORY_COUNT, Direction};
use crate::binary_utils::{read_u16_le, read_u8};

const OBJECT_COUNTS_OFFSET: usize = 0x0C;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub random_seed: u16,
    pub map_data_size: u16,
    pub num_maps: u8,
    pub text_data_size_words: u16,
    pub start_position_word: u16,
    pub object_list_size_words: u16,
    /// Stored object count for each category code
    pub object_counts: [u16; CATEGORY_COUNT],
}

impl FileHeader {
    /// Extract the header fields. The map count is not range-checked here.
    pub fn parse(data: &[u8], layout: &FormatLayout) -> Result<Self, DecodeError> {
        if data.len() < layout.header_len {
            return Err(DecodeError::TruncatedHeader { len: data.len() });
        }

        let mut object_counts = [0u16; CATEGORY_COUNT];
        for (category, count) in object_counts.iter_mut().enumerate() {
            *count = read_u16_le(data, OBJECT_COUNTS_OFFSET + category * 2)?;
        }

        Ok(FileHeader {
            random_seed: read_u16_le(data, 0x00)?,
            map_data_size: read_u16_le(data, 0x02)?,
            num_maps: read_u8(data, 0x04)?,
            // 0x05 is padding
            text_data_size_words: read_u16_le(data, 0x06)?,
            start_position_word: read_u16_le(data, 0x08)?,
            object_list_size_words: read_u16_le(data, 0x0A)?,
            object_counts,
        })
    }

    pub fn start_position(&self) -> StartPosition {
        StartPosition::from_word(self.start_position_word)
    }
}

/// Where the party begins. Always on the first map in physical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPosition {
    pub map: usize,
    pub x: u8,
    pub y: u8,
    pub direction: Direction,
}

impl StartPosition {
    pub fn from_word(word: u16) -> Self {
        StartPosition {
            map: 0,
            x: (word & 0x1F) as u8,
            y: ((word >> 5) & 0x1F) as u8,
            direction: Direction::from_bits((word >> 10) as u8),
        }
    }
}
