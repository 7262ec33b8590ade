//! heightbake CLI - tiled 16-bit heightmap baker.
//!
//! Bakes fractal noise over a tile grid into PNG/RAW16 tiles or a single
//! RAW16 mosaic, and resamples existing OBJ meshes into heightmaps.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use heightbake::export::expected_file_size;
use heightbake::geometry::{Mesh, SceneObject};
use heightbake::noise::{FractalHeightSource, FractalNoiseConfig, NoiseSettings};
use heightbake::pipeline::{BakeConfig, BakeJob, BakeOutcome};
use heightbake::{OutputFormat, PngLayout};

/// Tiled 16-bit heightmap baker.
#[derive(Parser)]
#[command(name = "heightbake")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake fractal noise over a tile grid.
    Bake {
        /// TOML configuration file; flags override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        grid: GridArgs,

        /// Footprint width along X.
        #[arg(long)]
        size_x: Option<f64>,

        /// Footprint depth along Y.
        #[arg(long)]
        size_y: Option<f64>,

        /// Vertical extent of the footprint.
        #[arg(long)]
        z_max: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        noise: NoiseArgs,

        /// Sample tiles in parallel.
        #[arg(long)]
        parallel: bool,
    },

    /// Resample the vertices of an OBJ mesh into a single heightmap.
    Resample {
        /// Wavefront OBJ file to read vertices from.
        #[arg(short, long)]
        mesh: PathBuf,

        /// Image width in pixels.
        #[arg(long, default_value = "512")]
        width: u32,

        /// Image height in pixels.
        #[arg(long, default_value = "512")]
        height: u32,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Display tile and file size information for a grid.
    Info {
        /// TOML configuration file; flags override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        grid: GridArgs,
    },
}

#[derive(Args)]
struct GridArgs {
    /// Number of tiles along X.
    #[arg(long)]
    range_x: Option<u32>,

    /// Number of tiles along Y.
    #[arg(long)]
    range_y: Option<u32>,

    /// Samples per tile along X, including the shared edge.
    #[arg(long)]
    cell_width: Option<u32>,

    /// Samples per tile along Y, including the shared edge.
    #[arg(long)]
    cell_height: Option<u32>,

    /// Taper the outer border of the tile set.
    #[arg(long)]
    edge_falloff: bool,

    /// Write one RAW16 mosaic instead of one file per tile.
    #[arg(long)]
    single_heightmap: bool,
}

#[derive(Args)]
struct OutputArgs {
    /// Output base path; suffixes are appended to it.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export format for tiles and single images.
    #[arg(short, long)]
    format: Option<ExportFormat>,

    /// Channel layout of PNG output.
    #[arg(long)]
    png_layout: Option<ChannelLayout>,
}

#[derive(Args)]
struct NoiseArgs {
    /// Noise seed.
    #[arg(short, long)]
    seed: Option<i32>,

    /// Number of noise octaves.
    #[arg(long)]
    octaves: Option<u8>,

    /// Base noise frequency.
    #[arg(long)]
    frequency: Option<f32>,

    /// Domain units per noise unit.
    #[arg(long)]
    noise_size: Option<f64>,

    /// Noise offset of the first tile along X.
    #[arg(long)]
    offset_x: Option<f64>,

    /// Noise offset of the first tile along Y.
    #[arg(long)]
    offset_y: Option<f64>,

    /// Start from a terrain preset.
    #[arg(long)]
    preset: Option<Preset>,
}

impl NoiseArgs {
    fn is_empty(&self) -> bool {
        self.seed.is_none()
            && self.octaves.is_none()
            && self.frequency.is_none()
            && self.noise_size.is_none()
            && self.offset_x.is_none()
            && self.offset_y.is_none()
            && self.preset.is_none()
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG.
    Png,
    /// 16-bit RAW little-endian.
    Raw,
}

impl From<ExportFormat> for OutputFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Png => OutputFormat::Png,
            ExportFormat::Raw => OutputFormat::Raw,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelLayout {
    /// Grey replicated into RGB, opaque alpha.
    Rgba,
    /// Single grey channel.
    Luma,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Hills,
    Mountains,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Bake {
            config,
            grid,
            size_x,
            size_y,
            z_max,
            output,
            noise,
            parallel,
        } => {
            let mut config = load_config(config.as_deref());
            apply_grid_args(&mut config, &grid);
            apply_output_args(&mut config, &output);
            if let Some(v) = size_x {
                config.extent.size_x = v;
            }
            if let Some(v) = size_y {
                config.extent.size_y = v;
            }
            if let Some(v) = z_max {
                config.extent.z_max = v;
            }
            apply_noise_args(&mut config, &noise);
            config.parallel |= parallel;
            run_bake(config);
        }
        Commands::Resample {
            mesh,
            width,
            height,
            output,
        } => {
            let mut config = BakeConfig::default();
            config.resample.width = width;
            config.resample.height = height;
            apply_output_args(&mut config, &output);
            run_resample(&mesh, config);
        }
        Commands::Info { config, grid } => {
            let mut config = load_config(config.as_deref());
            apply_grid_args(&mut config, &grid);
            run_info(&config);
        }
    }
}

fn load_config(path: Option<&Path>) -> BakeConfig {
    match path {
        Some(path) => BakeConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => BakeConfig::default(),
    }
}

fn fail(error: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(1);
}

fn apply_grid_args(config: &mut BakeConfig, args: &GridArgs) {
    let grid = &mut config.grid;
    if let Some(v) = args.range_x {
        grid.range_x = v;
    }
    if let Some(v) = args.range_y {
        grid.range_y = v;
    }
    if let Some(v) = args.cell_width {
        grid.cell_width = v;
    }
    if let Some(v) = args.cell_height {
        grid.cell_height = v;
    }
    grid.edge_falloff_active |= args.edge_falloff;
    grid.single_heightmap |= args.single_heightmap;
}

fn apply_output_args(config: &mut BakeConfig, args: &OutputArgs) {
    let output = &mut config.output;
    if let Some(path) = &args.output {
        output.outpath = path.clone();
    }
    if let Some(format) = args.format {
        output.format = format.into();
    }
    if let Some(layout) = args.png_layout {
        output.png_layout = match layout {
            ChannelLayout::Rgba => PngLayout::Rgba,
            ChannelLayout::Luma => PngLayout::Luma,
        };
    }
}

/// Noise flags create the noise section when the config has none.
fn apply_noise_args(config: &mut BakeConfig, args: &NoiseArgs) {
    if args.is_empty() {
        return;
    }
    let noise = config.noise.get_or_insert_with(NoiseSettings::default);
    let seed = args.seed.unwrap_or(noise.fractal.seed);
    match args.preset {
        Some(Preset::Hills) => noise.fractal = FractalNoiseConfig::hills(seed),
        Some(Preset::Mountains) => noise.fractal = FractalNoiseConfig::mountains(seed),
        None => noise.fractal.seed = seed,
    }
    if let Some(v) = args.octaves {
        noise.fractal.octaves = v;
    }
    if let Some(v) = args.frequency {
        noise.fractal.frequency = v;
    }
    if let Some(v) = args.noise_size {
        noise.noise_size = v;
    }
    if let Some(v) = args.offset_x {
        noise.base_offset_x = v;
    }
    if let Some(v) = args.offset_y {
        noise.base_offset_y = v;
    }
}

fn run_bake(config: BakeConfig) {
    if let Err(e) = config.validate() {
        fail(e);
    }
    let grid = config.grid;

    println!("heightbake - Tiled Heightmap Baker");
    println!("==================================");
    println!("Tiles: {}x{} of {}x{} samples", grid.range_x, grid.range_y, grid.cell_width, grid.cell_height);
    println!(
        "Footprint: {} x {} (z_max {})",
        config.extent.size_x, config.extent.size_y, config.extent.z_max
    );
    println!("Output: {}", config.output.outpath.display());

    let start = Instant::now();
    let object = SceneObject::plane("Plane", config.extent, config.noise.clone());
    let source = fractal_source(&config);
    let result = BakeJob::new(&config).run_with_progress(Some(&object), &source, |cursor, done, total| {
        println!("  [{}/{}] tile x{} y{}", done, total, cursor.cell_x, cursor.cell_y);
    });

    match result {
        Ok(outcome) => report(&outcome, start),
        Err(e) => fail(e),
    }
}

fn fractal_source(config: &BakeConfig) -> FractalHeightSource {
    config
        .noise
        .as_ref()
        .map(|noise| FractalHeightSource::new(noise.fractal.clone()))
        .unwrap_or_default()
}

fn run_resample(mesh_path: &Path, config: BakeConfig) {
    println!("heightbake - Vertex Resample");
    println!("============================");
    println!("Mesh: {}", mesh_path.display());
    println!("Image: {}x{}", config.resample.width, config.resample.height);

    let start = Instant::now();
    let mesh = Mesh::load_obj(mesh_path).unwrap_or_else(|e| fail(e)).recentered();
    let name = mesh_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Mesh".to_string());
    let object = SceneObject::from_mesh(name, mesh, None).unwrap_or_else(|e| fail(e));

    match BakeJob::new(&config).resample(Some(&object)) {
        Ok(outcome) => report(&outcome, start),
        Err(e) => fail(e),
    }
}

fn report(outcome: &BakeOutcome, start: Instant) {
    let elapsed = start.elapsed();
    match outcome {
        BakeOutcome::Skipped { reason } => {
            println!("\nNothing exported: {}", reason);
            return;
        }
        BakeOutcome::Mosaic { width, height, .. } => println!("\nMosaic: {}x{}", width, height),
        BakeOutcome::Tiles { paths } => println!("\nTiles written: {}", paths.len()),
        BakeOutcome::Image { width, height, .. } => println!("\nImage: {}x{}", width, height),
    }
    if let Some(strategy) = outcome.strategy() {
        println!("Strategy: {:?}", strategy);
    }
    for path in outcome.files() {
        println!("  {}", path.display());
    }
    println!("Completed in {:.2}s", elapsed.as_secs_f64());
}

fn run_info(config: &BakeConfig) {
    let grid = config.grid;
    if let Err(e) = grid.validate() {
        fail(e);
    }
    let (mosaic_w, mosaic_h) = grid.mosaic_size();
    let tile_bytes = expected_file_size(grid.cell_width, grid.cell_height);
    let mosaic_bytes = expected_file_size(mosaic_w, mosaic_h);
    let extent = config.extent;

    println!("heightbake - Grid Info");
    println!("======================");
    println!();
    println!("Tiles:       {} ({}x{})", grid.tile_count(), grid.range_x, grid.range_y);
    println!("Cell size:   {}x{} samples", grid.cell_width, grid.cell_height);
    println!("Mosaic size: {}x{} samples", mosaic_w, mosaic_h);
    println!("Footprint:   {} x {} per tile", extent.size_x, extent.size_y);
    println!();
    println!("Export file sizes:");
    println!(
        "  RAW16 tile:   {:>12} bytes ({:.2} MB) - {} files",
        tile_bytes,
        tile_bytes as f64 / 1024.0 / 1024.0,
        grid.tile_count()
    );
    println!(
        "  RAW16 mosaic: {:>12} bytes ({:.2} MB) - 1 file",
        mosaic_bytes,
        mosaic_bytes as f64 / 1024.0 / 1024.0
    );
    println!();
    println!(
        "Mode: {}",
        if grid.single_heightmap { "single mosaic (.r16)" } else { "one file per tile" }
    );
    println!("Edge falloff: {}", if grid.edge_falloff_active { "on" } else { "off" });
}
