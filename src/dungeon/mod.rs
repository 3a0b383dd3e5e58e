//! # Dungeon Decoding
//!
//! Turns an uncompressed dungeon file into per-map tile grids and a catalogue of
//! interactive sensors.
//!
//! header -> map definitions -> (tiles, decorations) per map -> object chains

pub mod decorations;
pub mod error;
pub mod header;
pub mod layout;
pub mod map_def;
pub mod objects;
pub mod tiles;

#[cfg(test)]
pub(crate) mod test_support;

use serde::{Deserialize, Serialize};

use crate::binary_utils::{entry_offset, read_u16_le};
use decorations::DecorationLists;
use error::DecodeError;
use header::{FileHeader, StartPosition};
use layout::FormatLayout;
use map_def::{parse_map_definitions, MapDefinition};
use objects::{ChainResolver, MapContext, ObjectCategory, ObjectId, SensorCatalogue};
use tiles::TileGrid;

pub const MAX_MAPS: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Map the two-bit facing code used throughout the format. Higher bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Direction::North,
            1 => Direction::East,
            2 => Direction::South,
            _ => Direction::West,
        }
    }
}

/// Everything decoded for one map, addressed by its physical index.
#[derive(Debug, Clone)]
pub struct DecodedMap {
    pub map_index: usize,
    pub definition: MapDefinition,
    pub tiles: TileGrid,
    pub decorations: DecorationLists,
}

impl DecodedMap {
    pub fn level(&self) -> u8 {
        self.definition.level
    }

    fn context(&self) -> MapContext<'_> {
        MapContext {
            map_index: self.map_index,
            level: self.definition.level,
            tiles: &self.tiles,
            decorations: &self.decorations,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dungeon {
    pub header: FileHeader,
    pub maps: Vec<DecodedMap>,
    pub start: StartPosition,
    pub sensors: SensorCatalogue,
}

/// Decode a whole dungeon file. Any structural problem aborts with no partial result.
pub fn decode(data: &[u8], layout: &FormatLayout) -> Result<Dungeon, DecodeError> {
    let header = FileHeader::parse(data, layout)?;
    if header.num_maps == 0 || header.num_maps > MAX_MAPS {
        return Err(DecodeError::InvalidMapCount(header.num_maps));
    }
    log::debug!(
        "Header: {} maps, {} first-object entries",
        header.num_maps,
        header.object_list_size_words
    );

    let definitions = parse_map_definitions(data, header.num_maps as usize, layout)?;

    let maps = definitions
        .into_iter()
        .enumerate()
        .map(|(map_index, definition)| decode_map(data, map_index, definition, layout))
        .collect::<Result<Vec<_>, _>>()?;

    let first_objects = read_first_objects(data, &header, layout)?;
    let sensor_count = layout
        .sensor_count
        .unwrap_or(header.object_counts[ObjectCategory::Sensor.code() as usize]);

    let contexts: Vec<MapContext<'_>> = maps.iter().map(DecodedMap::context).collect();
    let sensors =
        ChainResolver::new(data, layout, sensor_count).resolve(&contexts, &first_objects)?;

    Ok(Dungeon {
        start: header.start_position(),
        header,
        maps,
        sensors,
    })
}

fn decode_map(
    data: &[u8],
    map_index: usize,
    definition: MapDefinition,
    layout: &FormatLayout,
) -> Result<DecodedMap, DecodeError> {
    let tiles = TileGrid::decode(data, map_index, &definition, layout)?;
    // the tile read succeeded, so this stays within the buffer
    let decoration_start = TileGrid::data_start(&definition, layout)? + definition.tile_count();
    let decorations = DecorationLists::read(data, decoration_start, &definition)?;

    log::debug!(
        "Map {} (level {}): {}x{}, {} wall decoration(s), region ends at 0x{:X}",
        map_index,
        definition.level,
        definition.width,
        definition.height,
        decorations.wall_decorations.len(),
        decorations.end_offset
    );

    Ok(DecodedMap {
        map_index,
        definition,
        tiles,
        decorations,
    })
}

fn read_first_objects(
    data: &[u8],
    header: &FileHeader,
    layout: &FormatLayout,
) -> Result<Vec<ObjectId>, DecodeError> {
    (0..header.object_list_size_words as usize)
        .map(|i| {
            let offset = entry_offset(layout.first_object_list_offset, i, 2)?;
            read_u16_le(data, offset).map(ObjectId)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::layout::DM1_PC;
    use super::test_support::{object_id, DungeonBuilder, TestMap};
    use super::tiles::TileKind;
    use super::*;
    use test_log::test;

    #[test]
    fn two_by_two_map_is_column_major() {
        let data = DungeonBuilder::new()
            .map(TestMap::from_columns(0, 2, 2, &[0x00, 0x20, 0x40, 0x60]))
            .build();

        let dungeon = decode(&data, &DM1_PC).unwrap();
        let tiles = &dungeon.maps[0].tiles;
        let kind = |x, y| tiles.cell(x, y).unwrap().kind;
        assert_eq!(kind(0, 0), TileKind::Wall);
        assert_eq!(kind(1, 0), TileKind::Pit);
        assert_eq!(kind(0, 1), TileKind::Floor);
        assert_eq!(kind(1, 1), TileKind::Stairs);
        assert_eq!(tiles.object_tiles().count(), 0);
        assert_eq!(dungeon.sensors, SensorCatalogue::default());
    }

    #[test]
    fn start_position_comes_from_header() {
        let data = DungeonBuilder::new()
            .start_word(0b0101_01010_00001)
            .map(TestMap::filled(0, 4, 4, 0x20))
            .build();

        let dungeon = decode(&data, &DM1_PC).unwrap();
        assert_eq!(dungeon.start.direction, Direction::East);
        assert_eq!((dungeon.start.x, dungeon.start.y), (1, 10));
        assert_eq!(dungeon.start.map, 0);
    }

    #[test]
    fn map_count_outside_range_is_rejected() {
        let mut data = DungeonBuilder::new().map(TestMap::filled(0, 2, 2, 0)).build();
        data[0x04] = 0;
        assert_eq!(decode(&data, &DM1_PC).unwrap_err(), DecodeError::InvalidMapCount(0));
        data[0x04] = 65;
        assert_eq!(decode(&data, &DM1_PC).unwrap_err(), DecodeError::InvalidMapCount(65));
    }

    #[test]
    fn sensors_bind_across_maps_with_repeated_levels() {
        // Two maps both labelled level 4: the second map's objects must land on map 1
        let mut first = TestMap::filled(4, 3, 3, 0x20);
        first.set(2, 1, 0x20 | 0x10);
        let mut second = TestMap::filled(4, 2, 2, 0x00);
        second.set(0, 1, 0x10);
        second.set(1, 1, 0x20 | 0x10);

        let data = DungeonBuilder::new()
            .map(first)
            .map(second)
            .first_object(object_id(0, 3, 0))
            .first_object(0xFFFF)
            .first_object(object_id(2, 3, 1))
            .first_object(object_id(0, 3, 2))
            .sensor(0, 0xFFFE, 3, 0)
            .sensor(1, 0xFFFE, 4, 0)
            .sensor(2, 0xFFFE, 7, 0)
            .build();

        let dungeon = decode(&data, &DM1_PC).unwrap();
        let plates: Vec<_> = dungeon
            .sensors
            .pressure_plates
            .iter()
            .map(|p| (p.map_index, p.level, p.x, p.y, p.sensor_type))
            .collect();
        assert_eq!(plates, vec![(0, 4, 2, 1, 3), (1, 4, 1, 1, 7)]);

        let button = &dungeon.sensors.buttons[0];
        assert_eq!((button.map_index, button.x, button.y), (1, 0, 1));
        assert_eq!(button.direction, Direction::South);
        assert_eq!(dungeon.sensors.buttons.len(), 1);
    }

    #[test]
    fn fountain_uses_its_own_maps_decorations() {
        let mut first = TestMap::filled(0, 2, 2, 0x20);
        first.walls = vec![35];
        let mut second = TestMap::filled(1, 2, 2, 0x20);
        second.set(0, 0, 0x10);
        second.creatures = vec![35, 35];
        second.walls = vec![10, 35];
        second.floors = vec![35];
        second.doors = vec![1];

        let build = |ordinal| {
            DungeonBuilder::new()
                .map(first.clone())
                .map(second.clone())
                .first_object(object_id(1, 3, 0))
                .sensor(0, 0xFFFE, 0, ordinal)
                .build()
        };

        let dungeon = decode(&build(2), &DM1_PC).unwrap();
        assert_eq!(dungeon.maps[1].decorations.wall_decorations, vec![10, 35]);
        assert_eq!(dungeon.sensors.fountains.len(), 1);
        assert_eq!(dungeon.sensors.fountains[0].direction, Direction::East);
        assert_eq!(dungeon.sensors.fountains[0].level, 1);

        let dungeon = decode(&build(1), &DM1_PC).unwrap();
        assert!(dungeon.sensors.fountains.is_empty());
    }

    #[test]
    fn sensor_count_falls_back_to_header() {
        let mut map = TestMap::filled(0, 2, 1, 0x20);
        map.set(1, 0, 0x30);
        let data = DungeonBuilder::new()
            .map(map)
            .first_object(object_id(0, 3, 5))
            .sensor(5, 0xFFFE, 1, 0)
            .sensor_count(5)
            .build();

        let mut layout = DM1_PC;
        layout.sensor_count = None;
        let dungeon = decode(&data, &layout).unwrap();
        assert!(dungeon.sensors.pressure_plates.is_empty());

        let dungeon = decode(&data, &DM1_PC).unwrap();
        assert_eq!(dungeon.sensors.pressure_plates.len(), 1);
    }

    #[test]
    fn decoration_region_end_is_recorded() {
        let mut map = TestMap::filled(0, 3, 2, 0x20);
        map.creatures = vec![1];
        map.walls = vec![2, 3];
        map.doors = vec![4];
        let data = DungeonBuilder::new().map(map).build();

        let dungeon = decode(&data, &DM1_PC).unwrap();
        let start = DM1_PC.tile_data_offset;
        assert_eq!(dungeon.maps[0].decorations.end_offset, start + 6 + 4);
    }

    #[test]
    fn overflowing_layout_geometry_is_an_error() {
        let mut map = TestMap::filled(0, 2, 2, 0x20);
        map.set(1, 0, 0x30);
        let data = DungeonBuilder::new()
            .map(map)
            .first_object(object_id(0, 5, 3))
            .build();

        let mut layout = DM1_PC;
        layout.object_tables[5] = Some(layout::ObjectTable::new(0x4894, usize::MAX / 2));
        assert!(matches!(
            decode(&data, &layout),
            Err(DecodeError::OffsetOverflow { index: 3, .. })
        ));

        let mut layout = DM1_PC;
        layout.map_record_size = usize::MAX;
        assert!(matches!(
            decode(&data, &layout),
            Err(DecodeError::TruncatedMapTable { needed: usize::MAX, .. })
        ));

        // map stored 4 bytes into the tile region
        let mut shifted = data.clone();
        shifted[0x2C..0x2E].copy_from_slice(&4u16.to_le_bytes());
        let mut layout = DM1_PC;
        layout.tile_data_offset = usize::MAX;
        assert_eq!(
            decode(&shifted, &layout).unwrap_err(),
            DecodeError::OffsetOverflow {
                base: usize::MAX,
                index: 4,
                stride: 1
            }
        );

        let mut layout = DM1_PC;
        layout.first_object_list_offset = usize::MAX;
        assert!(matches!(decode(&data, &layout), Err(DecodeError::OutOfBounds { .. })));
    }

    #[test]
    fn truncated_tiles_abort_the_decode() {
        let mut data = DungeonBuilder::new().map(TestMap::filled(0, 4, 4, 0x20)).build();
        data.truncate(DM1_PC.tile_data_offset + 10);
        assert!(matches!(
            decode(&data, &DM1_PC),
            Err(DecodeError::TruncatedTileData {
                map_index: 0,
                needed: 16,
                available: 10,
                ..
            })
        ));
    }
}
