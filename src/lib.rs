//! Decoder and renderer for Dungeon Master `DUNGEON.DAT` files.

pub mod binary_utils;
pub mod dungeon;
pub mod error;
pub mod export;
pub mod extractor;
pub mod progress;
pub mod render;
