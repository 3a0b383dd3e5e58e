//! Builders for synthetic dungeon files laid out like [`DM1_PC`].

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use super::layout::{FormatLayout, DM1_PC};
use super::objects::ObjectCategory;

/// Scratch directory under the system temp dir, removed on drop.
pub struct ScratchDir(PathBuf);

impl ScratchDir {
    pub fn new(prefix: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "{}_{}_{}_{}",
            prefix,
            std::process::id(),
            nanos,
            n
        ));
        fs::create_dir_all(&dir).unwrap();
        ScratchDir(dir)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

pub fn object_id(position: u8, category: u8, number: u16) -> u16 {
    ((position as u16 & 0x3) << 14) | ((category as u16 & 0xF) << 10) | (number & 0x3FF)
}

/// One 8-byte sensor record. Data bits are set above the type to exercise masking.
pub fn sensor_bytes(next: u16, sensor_type: u8, ordinal: u8) -> [u8; 8] {
    let type_word = (sensor_type as u16 & 0x7F) | (0x15 << 7);
    let decoration_word = ((ordinal as u16 & 0xF) << 12) | 0x0ABC;
    let mut record = [0u8; 8];
    record[0..2].copy_from_slice(&next.to_le_bytes());
    record[2..4].copy_from_slice(&type_word.to_le_bytes());
    record[4..6].copy_from_slice(&decoration_word.to_le_bytes());
    record
}

/// One 16-byte map definition record.
pub fn map_record(
    data_offset: u16,
    width: u8,
    height: u8,
    level: u8,
    (creature, wall, floor, door): (u8, u8, u8, u8),
) -> [u8; 16] {
    let size_word = ((height as u16 - 1) << 11) | ((width as u16 - 1) << 6) | level as u16;
    // unrelated high bits in both words
    let graphics_word = ((floor as u16) << 8) | wall as u16 | 0xF0F0;
    let misc_word = ((creature as u16) << 4) | door as u16 | 0xFF00;
    let mut record = [0u8; 16];
    record[0x00..0x02].copy_from_slice(&data_offset.to_le_bytes());
    record[0x08..0x0A].copy_from_slice(&size_word.to_le_bytes());
    record[0x0A..0x0C].copy_from_slice(&graphics_word.to_le_bytes());
    record[0x0C..0x0E].copy_from_slice(&misc_word.to_le_bytes());
    record
}

#[derive(Debug, Clone)]
pub struct TestMap {
    pub level: u8,
    pub width: u8,
    pub height: u8,
    /// Column-major, like the file
    pub tiles: Vec<u8>,
    pub creatures: Vec<u8>,
    pub walls: Vec<u8>,
    pub floors: Vec<u8>,
    pub doors: Vec<u8>,
}

impl TestMap {
    pub fn from_columns(level: u8, width: u8, height: u8, tiles: &[u8]) -> Self {
        assert_eq!(tiles.len(), width as usize * height as usize);
        TestMap {
            level,
            width,
            height,
            tiles: tiles.to_vec(),
            creatures: Vec::new(),
            walls: Vec::new(),
            floors: Vec::new(),
            doors: Vec::new(),
        }
    }

    pub fn filled(level: u8, width: u8, height: u8, byte: u8) -> Self {
        Self::from_columns(level, width, height, &vec![byte; width as usize * height as usize])
    }

    pub fn set(&mut self, x: usize, y: usize, byte: u8) {
        self.tiles[x * self.height as usize + y] = byte;
    }
}

pub struct DungeonBuilder {
    layout: FormatLayout,
    start_word: u16,
    maps: Vec<TestMap>,
    first_objects: Vec<u16>,
    sensors: Vec<(u16, [u8; 8])>,
    sensor_count: u16,
}

impl DungeonBuilder {
    pub fn new() -> Self {
        DungeonBuilder {
            layout: DM1_PC,
            start_word: 0,
            maps: Vec::new(),
            first_objects: Vec::new(),
            sensors: Vec::new(),
            sensor_count: 0,
        }
    }

    pub fn start_word(mut self, word: u16) -> Self {
        self.start_word = word;
        self
    }

    pub fn map(mut self, map: TestMap) -> Self {
        self.maps.push(map);
        self
    }

    pub fn first_object(mut self, id: u16) -> Self {
        self.first_objects.push(id);
        self
    }

    pub fn sensor(mut self, number: u16, next: u16, sensor_type: u8, ordinal: u8) -> Self {
        self.sensors.push((number, sensor_bytes(next, sensor_type, ordinal)));
        self
    }

    /// Sensor count stored in the header
    pub fn sensor_count(mut self, count: u16) -> Self {
        self.sensor_count = count;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let layout = &self.layout;
        let mut data = vec![0u8; layout.tile_data_offset];

        data[0x00..0x02].copy_from_slice(&0x1234u16.to_le_bytes());
        data[0x04] = self.maps.len() as u8;
        data[0x08..0x0A].copy_from_slice(&self.start_word.to_le_bytes());
        data[0x0A..0x0C].copy_from_slice(&(self.first_objects.len() as u16).to_le_bytes());
        let count_offset = 0x0C + ObjectCategory::Sensor.code() as usize * 2;
        data[count_offset..count_offset + 2].copy_from_slice(&self.sensor_count.to_le_bytes());

        for (i, &id) in self.first_objects.iter().enumerate() {
            let offset = layout.first_object_list_offset + i * 2;
            data[offset..offset + 2].copy_from_slice(&id.to_le_bytes());
        }

        let sensor_table = layout.sensor_table().expect("layout has a sensor table");
        for (number, record) in &self.sensors {
            let offset = sensor_table.entry_offset(*number).expect("sensor offset");
            data[offset..offset + 8].copy_from_slice(record);
        }

        for (i, map) in self.maps.iter().enumerate() {
            let data_offset = (data.len() - layout.tile_data_offset) as u16;
            let counts = (
                map.creatures.len() as u8,
                map.walls.len() as u8,
                map.floors.len() as u8,
                map.doors.len() as u8,
            );
            let record = map_record(data_offset, map.width, map.height, map.level, counts);
            let offset = layout.map_table_offset + i * layout.map_record_size;
            data[offset..offset + 16].copy_from_slice(&record);

            data.extend(&map.tiles);
            data.extend(&map.creatures);
            data.extend(&map.walls);
            data.extend(&map.floors);
            data.extend(&map.doors);
        }

        data
    }
}
