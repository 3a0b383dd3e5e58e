use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    dungeon::{self, layout::FormatLayout, Dungeon},
    error::{Error, Result},
    export::{self, Legend, LevelInfo},
    progress::Progress,
    render,
};

/// What a parse run wrote to disk.
#[derive(Debug, Clone)]
pub struct ExtractSummary {
    pub level_files: Vec<PathBuf>,
    pub legend_file: PathBuf,
    pub images: Vec<PathBuf>,
}

pub struct DungeonExtractor {
    data: Vec<u8>,
    layout: FormatLayout,
}

impl DungeonExtractor {
    pub fn open(path: &Path, layout: FormatLayout) -> Result<Self> {
        let data = fs::read(path)?;
        log::info!("Read {} ({} bytes)", path.display(), data.len());
        Ok(Self::from_bytes(data, layout))
    }

    pub fn from_bytes(data: Vec<u8>, layout: FormatLayout) -> Self {
        DungeonExtractor { data, layout }
    }

    pub fn decode(&self) -> Result<Dungeon> {
        Ok(dungeon::decode(&self.data, &self.layout)?)
    }

    /// Decode, write `level_*.json` and `legend.json`, then render PNGs when an
    /// assets directory is given.
    pub fn extract(
        &self,
        output_dir: &Path,
        assets_dir: Option<&Path>,
        progress: &Progress,
        optimise: bool,
    ) -> Result<ExtractSummary> {
        let total = if assets_dir.is_some() { 3 } else { 2 };

        let dungeon = self.decode()?;
        log::info!(
            "Decoded {} map(s): {} pressure plate(s), {} button(s), {} fountain(s)",
            dungeon.maps.len(),
            dungeon.sensors.pressure_plates.len(),
            dungeon.sensors.buttons.len(),
            dungeon.sensors.fountains.len()
        );
        progress.update(1, total, "decode", "running");

        let levels: Vec<LevelInfo> = dungeon.maps.iter().map(LevelInfo::from_map).collect();
        let legend = Legend::from_dungeon(&dungeon);
        let level_files = export::write_levels_json(&levels, output_dir)?;
        let legend_file = export::write_legend_json(&legend, output_dir)?;
        log::info!(
            "Wrote {} level file(s) and {} to {}",
            level_files.len(),
            export::LEGEND_FILE,
            output_dir.display()
        );
        progress.update(2, total, "export", "running");

        let images = match assets_dir {
            Some(assets_dir) => {
                let named: Vec<(String, LevelInfo)> =
                    export::level_file_stems(&levels).into_iter().zip(levels).collect();
                let images =
                    render::render_levels(&named, &legend, assets_dir, output_dir, optimise)?;
                progress.update(3, total, "render", "running");
                images
            }
            None => Vec::new(),
        };

        progress.update(total, total, "done", "complete");
        Ok(ExtractSummary {
            level_files,
            legend_file,
            images,
        })
    }
}

/// Load every `level_*.json` from `levels_dir`, sorted by file name, keyed by file stem.
pub fn read_level_dir(levels_dir: &Path) -> Result<Vec<(String, LevelInfo)>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(levels_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            name.starts_with("level_") && name.ends_with(".json")
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(Error::NoLevels(levels_dir.to_path_buf()));
    }

    paths
        .into_iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            Ok((stem, LevelInfo::read_json(&path)?))
        })
        .collect()
}

/// Re-render a directory of previously written level records.
pub fn render_directory(
    levels_dir: &Path,
    legend_path: &Path,
    assets_dir: &Path,
    output_dir: &Path,
    optimise: bool,
    progress: &Progress,
) -> Result<Vec<PathBuf>> {
    let levels = read_level_dir(levels_dir)?;
    let legend = Legend::read_json(legend_path)?;
    log::info!("Rendering {} level(s) from {}", levels.len(), levels_dir.display());

    progress.update(0, 1, "render", "running");
    let images = render::render_levels(&levels, &legend, assets_dir, output_dir, optimise)?;
    progress.update(1, 1, "render", "complete");
    Ok(images)
}
