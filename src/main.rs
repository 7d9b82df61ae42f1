use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use tilemapper::config::EditorConfig;
use tilemapper::constants::STAMP_SIZES;
use tilemapper::{Layer, MapDocument, MapError, RgbColor, TileSheet, paths};

/// Set up logging: stdout always, plus a log file in debug builds
fn setup_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::prelude::*;

    // Use env filter to control log levels (default to info, debug for tilemapper)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tilemapper=debug"));

    // Configure stdout layer (with ANSI colors)
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_level(true);

    let (file_layer, guard) = match file_log_writer() {
        Some((writer, guard)) => {
            // No ANSI colors for file output
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_level(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

#[cfg(debug_assertions)]
fn file_log_writer() -> Option<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    use std::fs::OpenOptions;
    use std::io::Write;

    let logs_dir = paths::logs_dir();
    if std::fs::create_dir_all(&logs_dir).is_err() {
        eprintln!("Failed to create logs directory");
        return None;
    }

    let log_file_path = logs_dir.join("tilemapper.log");

    // Append session separator to existing log file
    if let Ok(mut file) = OpenOptions::new().append(true).open(&log_file_path) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let separator = "=".repeat(80);
        let _ = writeln!(
            file,
            "\n\n{}\n=== New Session Started at {} ===\n{}\n",
            separator, timestamp, separator
        );
    }

    let file_appender = tracing_appender::rolling::never(&logs_dir, "tilemapper.log");
    Some(tracing_appender::non_blocking(file_appender))
}

#[cfg(not(debug_assertions))]
fn file_log_writer() -> Option<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    None
}

#[derive(Parser)]
#[command(version, about = "Cut sprite sheets into tiles and edit .tmf tile maps")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment a sheet and save an empty map that embeds it.
    New(NewArgs),

    /// Print a map's dimensions, sheet parameters and layer counts.
    Info {
        /// Map file to inspect
        map: PathBuf,
    },

    /// Edit one cell (or a stamp square) and save the map in place.
    Paint(PaintArgs),

    /// Write every catalogue entry of a map's sheet as a PNG.
    ExportTiles {
        /// Map file to read
        map: PathBuf,

        /// Output directory
        dir: PathBuf,
    },
}

#[derive(Args)]
struct NewArgs {
    /// Sprite sheet image (PNG, JPEG, BMP or GIF)
    sheet: PathBuf,

    /// Map file to create (`.tmf` is appended when missing)
    output: PathBuf,

    /// Map width in cells
    #[arg(long)]
    width: u32,

    /// Map height in cells
    #[arg(long)]
    height: u32,

    /// Tile width in pixels [default: from config]
    #[arg(long)]
    tile_width: Option<u32>,

    /// Tile height in pixels [default: from config]
    #[arg(long)]
    tile_height: Option<u32>,

    /// Transparent key color as R,G,B [default: from config]
    #[arg(long, value_name = "R,G,B")]
    transparent: Option<RgbColor>,
}

#[derive(Args)]
struct PaintArgs {
    /// Map file to edit
    map: PathBuf,

    #[arg(long)]
    x: u32,

    #[arg(long)]
    y: u32,

    /// Tile catalogue id to paint
    #[arg(long, conflicts_with = "clear_tile")]
    tile: Option<u32>,

    /// Erase the tile layer
    #[arg(long)]
    clear_tile: bool,

    /// Object catalogue id to paint
    #[arg(long, conflicts_with = "clear_object")]
    object: Option<u32>,

    /// Erase the object layer
    #[arg(long)]
    clear_object: bool,

    /// Set or clear the collision flag
    #[arg(long, value_name = "BOOL")]
    collide: Option<bool>,

    /// Paint a square of this many cells per side, anchored at (x, y)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    stamp: u32,
}

impl PaintArgs {
    /// The requested write for `layer`: `None` leaves it alone, `Some(None)` erases.
    fn layer_edit(&self, layer: Layer) -> Option<Option<u32>> {
        let (id, clear) = match layer {
            Layer::Tile => (self.tile, self.clear_tile),
            Layer::Object => (self.object, self.clear_object),
        };
        if clear { Some(None) } else { id.map(Some) }
    }
}

fn run_new(args: NewArgs, config: &mut EditorConfig) -> Result<(), MapError> {
    let tile_width = args.tile_width.unwrap_or(config.data.default_tile_width);
    let tile_height = args.tile_height.unwrap_or(config.data.default_tile_height);
    let transparent = args
        .transparent
        .unwrap_or(config.data.default_transparent_color);

    let sheet = TileSheet::open(&args.sheet, tile_width, tile_height, transparent)?;
    info!(
        "Sheet {:?}: {} tiles, {} objects",
        args.sheet,
        sheet.tile_count(),
        sheet.object_count()
    );

    let document = MapDocument::new(args.width, args.height, Arc::new(sheet))?;
    let written = tilemapper::save_document(&document, &args.output)?;
    config.remember_map(&written);
    Ok(())
}

fn run_info(map: &Path) -> Result<(), MapError> {
    let document = tilemapper::load_document(map)?;
    let sheet = document.sheet();
    let stats = document.stats();

    println!("map:          {}", map.display());
    println!("size:         {}x{} cells", document.width(), document.height());
    println!("tile size:    {}x{} px", sheet.tile_width(), sheet.tile_height());
    println!("transparent:  {}", sheet.transparent_color());
    println!(
        "catalogue:    {} tiles, {} objects",
        sheet.tile_count(),
        sheet.object_count()
    );
    println!(
        "painted:      {} tiles, {} objects, {} collidable",
        stats.tiles, stats.objects, stats.collidable
    );
    Ok(())
}

fn run_paint(args: PaintArgs, config: &mut EditorConfig) -> Result<(), MapError> {
    if !STAMP_SIZES.contains(&args.stamp) {
        warn!(
            "Stamp size {} is not one of the editor presets {:?}",
            args.stamp, STAMP_SIZES
        );
    }

    let mut document = tilemapper::load_document(&args.map)?;

    let mut changed = false;
    for &layer in Layer::all() {
        if let Some(id) = args.layer_edit(layer) {
            let written = document.stamp(args.x, args.y, args.stamp, layer, id)?;
            info!("{} layer: {} cells written", layer, written);
            changed = true;
        }
    }

    if let Some(collidable) = args.collide {
        let x_end = args.x.saturating_add(args.stamp).min(document.width());
        let y_end = args.y.saturating_add(args.stamp).min(document.height());
        // Validates the anchor even when the square is clipped away
        document.set_collidable(args.x, args.y, collidable)?;
        for y in args.y..y_end {
            for x in args.x..x_end {
                document.set_collidable(x, y, collidable)?;
            }
        }
        changed = true;
    }

    if !changed {
        warn!("Nothing to paint; pass --tile, --object, --collide or a --clear flag");
        return Ok(());
    }

    let written = tilemapper::save_document(&document, &args.map)?;
    config.remember_map(&written);
    Ok(())
}

fn run_export_tiles(map: &Path, dir: &Path) -> Result<(), MapError> {
    let document = tilemapper::load_document(map)?;
    std::fs::create_dir_all(dir)?;

    for &layer in Layer::all() {
        let catalogue = document.sheet().catalogue(layer);
        for (id, tile) in catalogue.iter().enumerate() {
            let path = dir.join(format!("{}_{:03}.png", layer.file_prefix(), id));
            tile.image.save(&path)?;
        }
        info!("Exported {} {} images to {:?}", catalogue.len(), layer, dir);
    }
    Ok(())
}

fn main() -> ExitCode {
    // Keep the guard alive for the duration of the program
    let _log_guard = setup_logging();
    let cli = Cli::parse();

    if let Err(e) = paths::ensure_directories() {
        warn!("Failed to create data directories: {}", e);
    }

    let loaded = EditorConfig::load();
    if let Some(reason) = loaded.reset_reason {
        warn!("Configuration reset to defaults: {}", reason);
    }
    let mut config = loaded.config;
    if let Some(path) = config.missing_last_map() {
        info!("Last opened map no longer exists: {:?}", path);
    }

    let result = match cli.command {
        Command::New(args) => run_new(args, &mut config),
        Command::Info { map } => run_info(&map),
        Command::Paint(args) => run_paint(args, &mut config),
        Command::ExportTiles { map, dir } => run_export_tiles(&map, &dir),
    };

    if let Err(e) = config.save() {
        error!("{}", e);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
