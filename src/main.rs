use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use dungeon_scraper::{
    dungeon::layout::FormatLayout,
    error::Result,
    extractor::{self, DungeonExtractor},
    progress::Progress,
};

#[derive(Parser, Debug)]
#[command(name = "dungeon_scraper", version, about = "Extract level maps from DUNGEON.DAT")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a dungeon file into level_XX.json files and legend.json
    Parse {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// JSON file overriding the built-in DM1 PC format layout
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Tile artwork; when given, level PNGs are rendered as well
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Write progress updates to this JSON file
        #[arg(long)]
        progress: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        no_optimise: bool,
    },
    /// Render previously written level files to PNG
    Render {
        #[arg(long)]
        levels_dir: PathBuf,

        #[arg(long)]
        legend: PathBuf,

        #[arg(long)]
        assets_dir: PathBuf,

        #[arg(long)]
        output_dir: PathBuf,

        #[arg(long, default_value_t = false)]
        no_optimise: bool,
    },
}

fn progress_for(path: Option<PathBuf>) -> Progress {
    path.map(Progress::to_file).unwrap_or_default()
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Parse {
            input,
            output_dir,
            layout,
            assets_dir,
            progress,
            no_optimise,
        } => {
            let layout = match layout {
                Some(path) => FormatLayout::from_json_file(&path)?,
                None => FormatLayout::default(),
            };
            let summary = DungeonExtractor::open(&input, layout)?.extract(
                &output_dir,
                assets_dir.as_deref(),
                &progress_for(progress),
                !no_optimise,
            )?;
            log::info!(
                "Done: {} level file(s), {} image(s) in {}",
                summary.level_files.len(),
                summary.images.len(),
                output_dir.display()
            );
        }
        Command::Render {
            levels_dir,
            legend,
            assets_dir,
            output_dir,
            no_optimise,
        } => {
            let images = extractor::render_directory(
                &levels_dir,
                &legend,
                &assets_dir,
                &output_dir,
                !no_optimise,
                &Progress::disabled(),
            )?;
            log::info!("Done: {} image(s) in {}", images.len(), output_dir.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
