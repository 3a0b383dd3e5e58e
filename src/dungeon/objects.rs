//! # Object Chains
//!
//! Objects sharing a tile form a singly linked list threaded through the per-category
//! sub-tables. Every record starts with the ID of the next object on the same tile.
//!
//! An object ID packs three fields:
//!
//! ```text
//! bit 15 14 | 13 12 11 10 | 9 .. 0
//!     pos   | category    | number
//! ```
//!
//! The list of first objects has one entry per tile whose object bit is set, in the
//! order those tiles are stored (maps in physical order, columns, then rows).

use serde::{Deserialize, Serialize};

use super::{
    decorations::DecorationLists, error::DecodeError, layout::FormatLayout, tiles::TileGrid,
    Direction,
};
use crate::binary_utils::read_u16_le;

pub const CATEGORY_COUNT: usize = 16;

const SENSOR_TYPE_OFFSET: usize = 2;
const SENSOR_DECORATION_OFFSET: usize = 4;
const FLOOR_TRIGGER_TYPES: [u8; 5] = [1, 2, 3, 4, 7];
const WALL_TRIGGER_TYPES: [u8; 4] = [1, 2, 3, 4];
const DECORATION_ONLY_TYPE: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    Door,
    Teleporter,
    Text,
    Sensor,
    Creature,
    Weapon,
    Clothing,
    Scroll,
    Potion,
    Container,
    Junk,
    Unused(u8),
    Projectile,
    Cloud,
}

impl ObjectCategory {
    pub fn from_code(code: u8) -> Self {
        match code & 0xF {
            0 => ObjectCategory::Door,
            1 => ObjectCategory::Teleporter,
            2 => ObjectCategory::Text,
            3 => ObjectCategory::Sensor,
            4 => ObjectCategory::Creature,
            5 => ObjectCategory::Weapon,
            6 => ObjectCategory::Clothing,
            7 => ObjectCategory::Scroll,
            8 => ObjectCategory::Potion,
            9 => ObjectCategory::Container,
            10 => ObjectCategory::Junk,
            14 => ObjectCategory::Projectile,
            15 => ObjectCategory::Cloud,
            other => ObjectCategory::Unused(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            ObjectCategory::Door => 0,
            ObjectCategory::Teleporter => 1,
            ObjectCategory::Text => 2,
            ObjectCategory::Sensor => 3,
            ObjectCategory::Creature => 4,
            ObjectCategory::Weapon => 5,
            ObjectCategory::Clothing => 6,
            ObjectCategory::Scroll => 7,
            ObjectCategory::Potion => 8,
            ObjectCategory::Container => 9,
            ObjectCategory::Junk => 10,
            ObjectCategory::Unused(code) => code & 0xF,
            ObjectCategory::Projectile => 14,
            ObjectCategory::Cloud => 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u16);

impl ObjectId {
    /// Empty tile slot, or a chain with nothing further to report
    pub const NONE: ObjectId = ObjectId(0xFFFF);
    pub const END_OF_CHAIN: ObjectId = ObjectId(0xFFFE);

    pub fn is_sentinel(self) -> bool {
        self == Self::NONE || self == Self::END_OF_CHAIN
    }

    pub fn position_bits(self) -> u8 {
        (self.0 >> 14) as u8 & 0x3
    }

    pub fn category(self) -> ObjectCategory {
        ObjectCategory::from_code((self.0 >> 10) as u8)
    }

    pub fn number(self) -> u16 {
        self.0 & 0x3FF
    }

    /// Wall side or tile quadrant the object sits on
    pub fn direction(self) -> Direction {
        Direction::from_bits(self.position_bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorRecord {
    pub next: ObjectId,
    pub sensor_type: u8,
    /// 1-based index into the map's wall decorations, 0 when none
    pub decoration_ordinal: u8,
}

impl SensorRecord {
    pub fn read(data: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let next = ObjectId(read_u16_le(data, offset)?);
        let sensor_type = (read_u16_le(data, offset + SENSOR_TYPE_OFFSET)? & 0x7F) as u8;
        let decoration_word = read_u16_le(data, offset + SENSOR_DECORATION_OFFSET)?;
        let decoration_ordinal = (decoration_word >> 12) as u8;
        Ok(SensorRecord {
            next,
            sensor_type,
            decoration_ordinal,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressurePlate {
    pub level: u8,
    #[serde(default)]
    pub map_index: usize,
    pub x: usize,
    pub y: usize,
    #[serde(rename = "type")]
    pub sensor_type: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub level: u8,
    #[serde(default)]
    pub map_index: usize,
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub sensor_type: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fountain {
    pub level: u8,
    #[serde(default)]
    pub map_index: usize,
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
}

/// Classified sensors in tile scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorCatalogue {
    pub pressure_plates: Vec<PressurePlate>,
    pub buttons: Vec<Button>,
    pub fountains: Vec<Fountain>,
}

/// Why a chain walk stopped without failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    Terminator,
    NoObject,
    UnknownCategory(u8),
    SensorOutOfRange(u16),
}

/// What the resolver needs to know about one decoded map.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    pub map_index: usize,
    pub level: u8,
    pub tiles: &'a TileGrid,
    pub decorations: &'a DecorationLists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TileSlot {
    map: usize,
    x: usize,
    y: usize,
}

pub struct ChainResolver<'a> {
    data: &'a [u8],
    layout: &'a FormatLayout,
    sensor_count: u16,
}

impl<'a> ChainResolver<'a> {
    pub fn new(data: &'a [u8], layout: &'a FormatLayout, sensor_count: u16) -> Self {
        ChainResolver {
            data,
            layout,
            sensor_count,
        }
    }

    /// Bind each first-object entry to its tile and classify every sensor on the chain.
    pub fn resolve(
        &self,
        maps: &[MapContext<'_>],
        first_objects: &[ObjectId],
    ) -> Result<SensorCatalogue, DecodeError> {
        let slots: Vec<TileSlot> = maps
            .iter()
            .enumerate()
            .flat_map(|(map, ctx)| {
                ctx.tiles
                    .object_tiles()
                    .map(move |(x, y)| TileSlot { map, x, y })
            })
            .collect();

        let entries: Vec<ObjectId> = first_objects
            .iter()
            .copied()
            .filter(|&id| id != ObjectId::NONE)
            .collect();

        if slots.len() < entries.len() {
            return Err(DecodeError::InsufficientTileSlots {
                slots: slots.len(),
                entries: entries.len(),
            });
        }
        log::debug!(
            "Binding {} first-object entries to {} flagged tiles",
            entries.len(),
            slots.len()
        );

        let mut catalogue = SensorCatalogue::default();
        for (slot, &first) in slots.iter().zip(&entries) {
            let ctx = &maps[slot.map];
            let end = self.walk_chain(ctx, slot.x, slot.y, first, &mut catalogue)?;
            match end {
                ChainEnd::Terminator | ChainEnd::NoObject => {}
                ChainEnd::UnknownCategory(code) => log::debug!(
                    "Chain on map {} at ({}, {}) stopped at category {} with no table",
                    ctx.map_index,
                    slot.x,
                    slot.y,
                    code
                ),
                ChainEnd::SensorOutOfRange(number) => log::warn!(
                    "Sensor {} on map {} at ({}, {}) is beyond the {} stored sensors",
                    number,
                    ctx.map_index,
                    slot.x,
                    slot.y,
                    self.sensor_count
                ),
            }
        }

        log::debug!(
            "Classified {} pressure plates, {} buttons, {} fountains",
            catalogue.pressure_plates.len(),
            catalogue.buttons.len(),
            catalogue.fountains.len()
        );
        Ok(catalogue)
    }

    /// Follow one tile's chain until a sentinel or a category without a table.
    pub fn walk_chain(
        &self,
        ctx: &MapContext<'_>,
        x: usize,
        y: usize,
        first: ObjectId,
        catalogue: &mut SensorCatalogue,
    ) -> Result<ChainEnd, DecodeError> {
        let limit = self.layout.max_chain_length;
        let mut current = first;
        let mut visited = 0usize;

        loop {
            if current == ObjectId::END_OF_CHAIN {
                return Ok(ChainEnd::Terminator);
            }
            if current == ObjectId::NONE {
                return Ok(ChainEnd::NoObject);
            }
            if visited >= limit {
                return Err(DecodeError::MalformedObjectChain {
                    map_index: ctx.map_index,
                    x,
                    y,
                    limit,
                });
            }
            visited += 1;

            let category = current.category();
            let number = current.number();
            log::trace!(
                "map {} ({}, {}): object 0x{:04X} category {:?} number {}",
                ctx.map_index,
                x,
                y,
                current.0,
                category,
                number
            );

            let Some(table) = self.layout.object_table(category) else {
                return Ok(ChainEnd::UnknownCategory(category.code()));
            };
            if category == ObjectCategory::Sensor && number >= self.sensor_count {
                return Ok(ChainEnd::SensorOutOfRange(number));
            }
            let record_offset = table.entry_offset(number)?;

            current = if category == ObjectCategory::Sensor {
                let sensor = SensorRecord::read(self.data, record_offset)?;
                self.classify(ctx, x, y, current, &sensor, catalogue);
                sensor.next
            } else {
                ObjectId(read_u16_le(self.data, record_offset)?)
            };
        }
    }

    fn classify(
        &self,
        ctx: &MapContext<'_>,
        x: usize,
        y: usize,
        id: ObjectId,
        sensor: &SensorRecord,
        catalogue: &mut SensorCatalogue,
    ) {
        let is_wall = ctx.tiles.cell(x, y).map_or(true, |cell| cell.is_wall());

        if !is_wall && FLOOR_TRIGGER_TYPES.contains(&sensor.sensor_type) {
            catalogue.pressure_plates.push(PressurePlate {
                level: ctx.level,
                map_index: ctx.map_index,
                x,
                y,
                sensor_type: sensor.sensor_type,
            });
        } else if is_wall && WALL_TRIGGER_TYPES.contains(&sensor.sensor_type) {
            catalogue.buttons.push(Button {
                level: ctx.level,
                map_index: ctx.map_index,
                x,
                y,
                direction: id.direction(),
                sensor_type: sensor.sensor_type,
            });
        } else if is_wall
            && sensor.sensor_type == DECORATION_ONLY_TYPE
            && ctx.decorations.wall_decoration(sensor.decoration_ordinal)
                == Some(self.layout.fountain_decoration_id)
        {
            catalogue.fountains.push(Fountain {
                level: ctx.level,
                map_index: ctx.map_index,
                x,
                y,
                direction: id.direction(),
            });
        }
    }
}
