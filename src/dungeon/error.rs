use thiserror::Error;

/// Structural failures while decoding a dungeon file. All of them abort the decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("read of {width} byte(s) at offset 0x{offset:X} exceeds buffer length {len}")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("table offset 0x{base:X} + {index} * {stride} overflows the address space")]
    OffsetOverflow {
        base: usize,
        index: usize,
        stride: usize,
    },

    #[error("file header truncated: only {len} byte(s)")]
    TruncatedHeader { len: usize },

    #[error("map count {0} outside 1..=64")]
    InvalidMapCount(u8),

    #[error("map table truncated: {num_maps} map(s) need {needed} byte(s), {available} available")]
    TruncatedMapTable {
        num_maps: usize,
        needed: usize,
        available: usize,
    },

    #[error(
        "tile data for map {map_index} truncated at offset 0x{offset:X}: need {needed} byte(s), {available} available"
    )]
    TruncatedTileData {
        map_index: usize,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{entries} first-object entries but only {slots} tile(s) flagged with objects")]
    InsufficientTileSlots { slots: usize, entries: usize },

    #[error("object chain on map {map_index} at ({x}, {y}) exceeds {limit} steps without a terminator")]
    MalformedObjectChain {
        map_index: usize,
        x: usize,
        y: usize,
        limit: usize,
    },
}
